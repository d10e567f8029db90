//! Return Request Repository

use super::RepoResult;
use shared::models::ReturnRequest;
use sqlx::SqlitePool;

const SELECT_RETURN: &str = "SELECT id, order_id, order_item_id, reason, details, voided, created_at FROM return_request";

/// Whether the item already has a non-voided return request.
pub async fn has_open_request(pool: &SqlitePool, order_item_id: i64) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM return_request WHERE order_item_id = ? AND voided = 0",
    )
    .bind(order_item_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

pub async fn find_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<ReturnRequest>> {
    let sql = format!("{SELECT_RETURN} WHERE order_id = ? ORDER BY created_at, id");
    let rows = sqlx::query_as::<_, ReturnRequest>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ReturnRequest>> {
    let sql = format!("{SELECT_RETURN} WHERE id = ?");
    let row = sqlx::query_as::<_, ReturnRequest>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}
