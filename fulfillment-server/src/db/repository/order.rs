//! Order Repository

use super::{RepoError, RepoResult};
use shared::OrderStatus;
use shared::models::{Order, OrderCreate, OrderItem, OrderNote};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

const SELECT_ORDER: &str =
    "SELECT id, order_number, status, total, created_at, delivered_at, closed_at FROM customer_order";

const SELECT_ITEM: &str = "SELECT id, order_id, product_id, name, quantity, price, is_digital, digital_file_id, download_count, max_downloads FROM order_item";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{SELECT_ORDER} WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_number(pool: &SqlitePool, order_number: &str) -> RepoResult<Option<Order>> {
    let sql = format!("{SELECT_ORDER} WHERE order_number = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(order_number)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// WHERE fragment for the optional created_at bounds.
fn range_clause(from: Option<i64>, to: Option<i64>) -> &'static str {
    match (from, to) {
        (Some(_), Some(_)) => " WHERE created_at >= ? AND created_at < ?",
        (Some(_), None) => " WHERE created_at >= ?",
        (None, Some(_)) => " WHERE created_at < ?",
        (None, None) => "",
    }
}

/// List orders, newest first, optionally bounded by creation time.
/// Half-open range in epoch millis: `from` inclusive, `to` exclusive.
pub async fn list(
    pool: &SqlitePool,
    created_from: Option<i64>,
    created_to: Option<i64>,
    limit: u32,
    offset: u32,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "{SELECT_ORDER}{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        range_clause(created_from, created_to)
    );
    let mut query = sqlx::query_as::<_, Order>(&sql);
    if let Some(from) = created_from {
        query = query.bind(from);
    }
    if let Some(to) = created_to {
        query = query.bind(to);
    }
    let rows = query.bind(limit).bind(offset).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn count(
    pool: &SqlitePool,
    created_from: Option<i64>,
    created_to: Option<i64>,
) -> RepoResult<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM customer_order{}",
        range_clause(created_from, created_to)
    );
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(from) = created_from {
        query = query.bind(from);
    }
    if let Some(to) = created_to {
        query = query.bind(to);
    }
    let total = query.fetch_one(pool).await?;
    Ok(total)
}

/// Create an order with its line items in one transaction.
pub async fn create(pool: &SqlitePool, data: &OrderCreate, now: i64) -> RepoResult<Order> {
    let order_id = snowflake_id();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO customer_order (id, order_number, status, total, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(order_id)
    .bind(&data.order_number)
    .bind(OrderStatus::Pending)
    .bind(data.total)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for item in &data.items {
        sqlx::query(
            "INSERT INTO order_item (id, order_id, product_id, name, quantity, price, is_digital, digital_file_id, download_count, max_downloads) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(snowflake_id())
        .bind(order_id)
        .bind(item.product_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.is_digital)
        .bind(item.digital_file_id)
        .bind(item.max_downloads)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

pub async fn items_for_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("{SELECT_ITEM} WHERE order_id = ? ORDER BY id");
    let rows = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_item(pool: &SqlitePool, item_id: i64) -> RepoResult<Option<OrderItem>> {
    let sql = format!("{SELECT_ITEM} WHERE id = ?");
    let row = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(item_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Audit notes in chronological order.
pub async fn notes_for_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderNote>> {
    let rows = sqlx::query_as::<_, OrderNote>(
        "SELECT id, order_id, actor, note, created_at FROM order_note WHERE order_id = ? ORDER BY created_at, id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// IDs of DELIVERED orders whose delivery stamp is at or before `cutoff_ms`.
///
/// Orders without a `delivered_at` stamp are never auto-completed.
pub async fn find_auto_completable(pool: &SqlitePool, cutoff_ms: i64) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM customer_order WHERE status = ? AND delivered_at IS NOT NULL AND delivered_at <= ? ORDER BY delivered_at, id",
    )
    .bind(OrderStatus::Delivered)
    .bind(cutoff_ms)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use shared::models::OrderItemCreate;

    fn sample_order(number: &str) -> OrderCreate {
        OrderCreate {
            order_number: number.to_string(),
            total: 59.98,
            items: vec![
                OrderItemCreate {
                    product_id: 101,
                    name: "Ceramic mug".to_string(),
                    quantity: 2,
                    price: 14.99,
                    is_digital: false,
                    digital_file_id: None,
                    max_downloads: 0,
                },
                OrderItemCreate {
                    product_id: 102,
                    name: "Knitting pattern (PDF)".to_string(),
                    quantity: 1,
                    price: 30.0,
                    is_digital: true,
                    digital_file_id: None,
                    max_downloads: 3,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_pool().await;
        let order = create(&pool, &sample_order("SO-1001"), 1_000).await.unwrap();

        assert_eq!(order.order_number, "SO-1001");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.created_at, 1_000);
        assert!(order.delivered_at.is_none());
        assert!(order.closed_at.is_none());

        let found = find_by_id(&pool, order.id).await.unwrap().unwrap();
        assert_eq!(found.order_number, "SO-1001");

        let by_number = find_by_number(&pool, "SO-1001").await.unwrap().unwrap();
        assert_eq!(by_number.id, order.id);

        let items = items_for_order(&pool, order.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| i.is_digital && i.max_downloads == 3));
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let pool = test_pool().await;
        assert!(find_by_id(&pool, 424242).await.unwrap().is_none());
        assert!(find_item(&pool, 424242).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let pool = test_pool().await;
        create(&pool, &sample_order("SO-1"), 1_000).await.unwrap();
        create(&pool, &sample_order("SO-2"), 2_000).await.unwrap();
        create(&pool, &sample_order("SO-3"), 3_000).await.unwrap();

        assert_eq!(count(&pool, None, None).await.unwrap(), 3);

        let page = list(&pool, None, None, 2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].order_number, "SO-3");
        assert_eq!(page[1].order_number, "SO-2");

        let rest = list(&pool, None, None, 2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].order_number, "SO-1");
    }

    #[tokio::test]
    async fn test_list_bounded_by_created_range() {
        let pool = test_pool().await;
        create(&pool, &sample_order("SO-1"), 1_000).await.unwrap();
        create(&pool, &sample_order("SO-2"), 2_000).await.unwrap();
        create(&pool, &sample_order("SO-3"), 3_000).await.unwrap();

        // Half-open: from inclusive, to exclusive
        let mid = list(&pool, Some(2_000), Some(3_000), 10, 0).await.unwrap();
        assert_eq!(mid.len(), 1);
        assert_eq!(mid[0].order_number, "SO-2");
        assert_eq!(count(&pool, Some(2_000), Some(3_001)).await.unwrap(), 2);

        let from_only = list(&pool, Some(3_000), None, 10, 0).await.unwrap();
        assert_eq!(from_only.len(), 1);
        assert_eq!(from_only[0].order_number, "SO-3");

        let to_only = count(&pool, None, Some(2_000)).await.unwrap();
        assert_eq!(to_only, 1);
    }

    #[tokio::test]
    async fn test_auto_completable_respects_cutoff_and_status() {
        let pool = test_pool().await;
        let old = create(&pool, &sample_order("SO-OLD"), 1_000).await.unwrap();
        let fresh = create(&pool, &sample_order("SO-FRESH"), 1_000).await.unwrap();
        let unstamped = create(&pool, &sample_order("SO-NOSTAMP"), 1_000).await.unwrap();

        sqlx::query("UPDATE customer_order SET status = 'DELIVERED', delivered_at = ? WHERE id = ?")
            .bind(5_000_i64)
            .bind(old.id)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("UPDATE customer_order SET status = 'DELIVERED', delivered_at = ? WHERE id = ?")
            .bind(9_000_i64)
            .bind(fresh.id)
            .execute(&pool)
            .await
            .unwrap();
        // Delivered status but no stamp: must be skipped
        sqlx::query("UPDATE customer_order SET status = 'DELIVERED' WHERE id = ?")
            .bind(unstamped.id)
            .execute(&pool)
            .await
            .unwrap();

        let due = find_auto_completable(&pool, 5_000).await.unwrap();
        assert_eq!(due, vec![old.id]);

        let due_later = find_auto_completable(&pool, 10_000).await.unwrap();
        assert_eq!(due_later, vec![old.id, fresh.id]);
    }
}
