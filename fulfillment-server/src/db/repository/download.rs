//! Digital File and Download Token Repository

use super::{RepoError, RepoResult};
use shared::models::{DigitalFile, DigitalFileCreate, DownloadToken};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

const SELECT_FILE: &str =
    "SELECT id, file_name, file_url, format, file_size, created_at FROM digital_file";

const SELECT_TOKEN: &str = "SELECT id, token, order_item_id, digital_file_id, created_at, expires_at, downloaded_at, ip_address, user_agent FROM download_token";

pub async fn create_file(
    pool: &SqlitePool,
    data: &DigitalFileCreate,
    now: i64,
) -> RepoResult<DigitalFile> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO digital_file (id, file_name, file_url, format, file_size, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.file_name)
    .bind(&data.file_url)
    .bind(&data.format)
    .bind(data.file_size)
    .bind(now)
    .execute(pool)
    .await?;

    find_file(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create digital file".into()))
}

pub async fn find_file(pool: &SqlitePool, id: i64) -> RepoResult<Option<DigitalFile>> {
    let sql = format!("{SELECT_FILE} WHERE id = ?");
    let row = sqlx::query_as::<_, DigitalFile>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create_token(
    pool: &SqlitePool,
    token: &str,
    order_item_id: i64,
    digital_file_id: i64,
    now: i64,
    expires_at: i64,
) -> RepoResult<DownloadToken> {
    sqlx::query(
        "INSERT INTO download_token (id, token, order_item_id, digital_file_id, created_at, expires_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(snowflake_id())
    .bind(token)
    .bind(order_item_id)
    .bind(digital_file_id)
    .bind(now)
    .bind(expires_at)
    .execute(pool)
    .await?;

    find_by_token(pool, token)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create download token".into()))
}

pub async fn find_by_token(pool: &SqlitePool, token: &str) -> RepoResult<Option<DownloadToken>> {
    let sql = format!("{SELECT_TOKEN} WHERE token = ?");
    let row = sqlx::query_as::<_, DownloadToken>(&sql)
        .bind(token)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use shared::models::{OrderCreate, OrderItemCreate};

    /// 返回 (订单行 id, 数字文件 id)
    async fn seed_item(pool: &SqlitePool) -> (i64, i64) {
        let file = create_file(
            pool,
            &DigitalFileCreate {
                file_name: "maps.zip".to_string(),
                file_url: "https://files.example.com/maps.zip".to_string(),
                format: "zip".to_string(),
                file_size: 1024,
            },
            1_000,
        )
        .await
        .unwrap();

        let order = crate::db::repository::order::create(
            pool,
            &OrderCreate {
                order_number: "SO-DL".to_string(),
                total: 12.0,
                items: vec![OrderItemCreate {
                    product_id: 7,
                    name: "City map pack".to_string(),
                    quantity: 1,
                    price: 12.0,
                    is_digital: true,
                    digital_file_id: Some(file.id),
                    max_downloads: 2,
                }],
            },
            1_000,
        )
        .await
        .unwrap();
        let item_id =
            crate::db::repository::order::items_for_order(pool, order.id).await.unwrap()[0].id;
        (item_id, file.id)
    }

    #[tokio::test]
    async fn test_file_roundtrip() {
        let pool = test_pool().await;
        let file = create_file(
            &pool,
            &DigitalFileCreate {
                file_name: "maps.zip".to_string(),
                file_url: "https://files.example.com/maps.zip".to_string(),
                format: "zip".to_string(),
                file_size: 1024,
            },
            1_000,
        )
        .await
        .unwrap();

        let found = find_file(&pool, file.id).await.unwrap().unwrap();
        assert_eq!(found.file_name, "maps.zip");
        assert_eq!(found.file_size, 1024);
    }

    #[tokio::test]
    async fn test_token_roundtrip() {
        let pool = test_pool().await;
        let (item_id, file_id) = seed_item(&pool).await;

        let token = create_token(&pool, "abc123", item_id, file_id, 1_000, 2_000)
            .await
            .unwrap();
        assert_eq!(token.order_item_id, item_id);
        assert_eq!(token.digital_file_id, file_id);
        assert_eq!(token.expires_at, 2_000);
        assert!(token.downloaded_at.is_none());

        assert!(find_by_token(&pool, "abc123").await.unwrap().is_some());
        assert!(find_by_token(&pool, "missing").await.unwrap().is_none());
    }
}
