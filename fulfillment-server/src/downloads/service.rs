//! Download token issue and redemption
//!
//! 令牌兑换是本服务唯一的"先到先得"竞争点：同一令牌只允许消费一次，
//! 同一行项目的下载总次数有上限。两条条件 UPDATE 在一个事务里完成,
//! WHERE 子句即检查本身，没有 check-then-act 窗口。
//!
//! 源文件字节在事务提交之后才拉取。拉取失败返回上游错误，但令牌
//! 保持已消费状态：失败的下载不归还名额，重试不会重复计数。

use std::time::Duration;

use axum::body::Bytes;
use sqlx::SqlitePool;
use tracing::info;

use crate::core::ServerState;
use crate::db::repository::{RepoError, download as download_repo, order as order_repo};
use shared::models::DownloadTokenIssued;
use shared::util::secure_token;

/// Token issue error
#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    /// 行项目不存在
    #[error("Order item {0} not found")]
    ItemNotFound(i64),

    /// 行项目不是数字商品或没有关联文件
    #[error("Order item {0} is not a digital product with a linked file")]
    NotDigital(i64),

    /// 数据库错误
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for IssueError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<RepoError> for IssueError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) | RepoError::Database(msg) => Self::Database(msg),
        }
    }
}

/// Token redemption error
///
/// `Expired` and `AlreadyConsumed` stay separate here for logs and tests;
/// the HTTP layer collapses both into one 410 response.
#[derive(Debug, thiserror::Error)]
pub enum RedeemError {
    /// 令牌不存在
    #[error("Download token not found")]
    NotFound,

    /// 令牌已过期
    #[error("Download token expired")]
    Expired,

    /// 令牌已被消费
    #[error("Download token already used")]
    AlreadyConsumed,

    /// 行项目下载次数已用完
    #[error("Download limit reached for this item")]
    LimitExceeded,

    /// 源文件拉取失败 (令牌已消费)
    #[error("Upstream fetch failed: {0}")]
    Upstream(String),

    /// 数据库错误
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RedeemError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<RepoError> for RedeemError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) | RepoError::Database(msg) => Self::Database(msg),
        }
    }
}

/// Requester fingerprint recorded on the consumed token.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A successfully redeemed file, ready to stream to the client.
#[derive(Debug, Clone)]
pub struct RedeemedFile {
    pub file_name: String,
    /// Lowercase extension, drives the content type
    pub format: String,
    pub bytes: Bytes,
}

/// Token joined with its owning item and linked file.
#[derive(Debug, sqlx::FromRow)]
struct RedemptionRow {
    expires_at: i64,
    downloaded_at: Option<i64>,
    order_item_id: i64,
    download_count: i32,
    max_downloads: i32,
    file_name: String,
    file_url: String,
    format: String,
}

const SELECT_REDEMPTION: &str = "SELECT t.expires_at, t.downloaded_at, t.order_item_id, \
     i.download_count, i.max_downloads, \
     f.file_name, f.file_url, f.format \
     FROM download_token t \
     JOIN order_item i ON i.id = t.order_item_id \
     JOIN digital_file f ON f.id = t.digital_file_id \
     WHERE t.token = ?";

/// First write of the redemption transaction. The WHERE clause is the
/// single-use check: zero rows affected means another redemption won,
/// or the token expired under us.
const CONSUME_TOKEN: &str = "UPDATE download_token \
     SET downloaded_at = ?, ip_address = ?, user_agent = ? \
     WHERE token = ? AND downloaded_at IS NULL AND expires_at >= ?";

const COUNT_DOWNLOAD: &str = "UPDATE order_item \
     SET download_count = download_count + 1 \
     WHERE id = ? AND download_count < max_downloads";

/// Issue a single-use download token for a digital order item.
///
/// The item must be digital and carry a linked file. The token is 32
/// random bytes hex-encoded; expiry is `now + ttl_hours`.
pub async fn issue(
    pool: &SqlitePool,
    order_item_id: i64,
    ttl_hours: i64,
    now: i64,
) -> Result<DownloadTokenIssued, IssueError> {
    let item = order_repo::find_item(pool, order_item_id)
        .await?
        .ok_or(IssueError::ItemNotFound(order_item_id))?;
    if !item.is_digital {
        return Err(IssueError::NotDigital(order_item_id));
    }
    // The token pins the file it was issued for
    let Some(file_id) = item.digital_file_id else {
        return Err(IssueError::NotDigital(order_item_id));
    };

    let token = secure_token();
    let expires_at = now + ttl_hours * 3_600_000;
    download_repo::create_token(pool, &token, order_item_id, file_id, now, expires_at).await?;

    info!(
        target: "download",
        order_item_id,
        expires_at,
        "Download token issued"
    );

    Ok(DownloadTokenIssued {
        url: format!("/download/{token}"),
        token,
        expires_at,
    })
}

/// Consume a token: mark it used and count the download, atomically.
///
/// On any rejection the transaction rolls back, so a `LimitExceeded`
/// token survives unconsumed and can be redeemed once the limit allows.
async fn consume_token(
    pool: &SqlitePool,
    token: &str,
    ctx: &RequestContext,
    now: i64,
) -> Result<RedemptionRow, RedeemError> {
    // 1. Load the token with its item and file
    let row = sqlx::query_as::<_, RedemptionRow>(SELECT_REDEMPTION)
        .bind(token)
        .fetch_optional(pool)
        .await?
        .ok_or(RedeemError::NotFound)?;

    // 2. Cheap rejects before opening a write transaction. The conditional
    //    UPDATEs below remain the authoritative check.
    if now > row.expires_at {
        return Err(RedeemError::Expired);
    }
    if row.downloaded_at.is_some() {
        return Err(RedeemError::AlreadyConsumed);
    }
    if row.download_count >= row.max_downloads {
        return Err(RedeemError::LimitExceeded);
    }

    // 3. Mark the token consumed
    let mut tx = pool.begin().await?;
    let consumed = sqlx::query(CONSUME_TOKEN)
        .bind(now)
        .bind(ctx.ip_address.as_deref())
        .bind(ctx.user_agent.as_deref())
        .bind(token)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    // 4. Zero rows: re-read inside the transaction to name the loser's reason
    if consumed.rows_affected() == 0 {
        let fresh: Option<Option<i64>> =
            sqlx::query_scalar("SELECT downloaded_at FROM download_token WHERE token = ?")
                .bind(token)
                .fetch_optional(&mut *tx)
                .await?;
        return Err(match fresh {
            None => RedeemError::NotFound,
            Some(Some(_)) => RedeemError::AlreadyConsumed,
            Some(None) => RedeemError::Expired,
        });
    }

    // 5. Count the download against the item's limit
    let counted = sqlx::query(COUNT_DOWNLOAD)
        .bind(row.order_item_id)
        .execute(&mut *tx)
        .await?;
    if counted.rows_affected() == 0 {
        // Transaction drops here, the token stays unconsumed
        return Err(RedeemError::LimitExceeded);
    }

    tx.commit().await?;
    Ok(row)
}

/// Redeem a token and fetch the file bytes from the origin.
///
/// The fetch happens after the redemption transaction commits. A failed
/// fetch returns `Upstream` with the token already consumed: retrying
/// the link yields 410, not a second download slot.
pub async fn redeem(
    state: &ServerState,
    token: &str,
    ctx: &RequestContext,
    now: i64,
) -> Result<RedeemedFile, RedeemError> {
    let row = consume_token(&state.pool, token, ctx, now).await?;

    let response = state
        .http_client
        .get(&row.file_url)
        .timeout(Duration::from_millis(state.config.download_fetch_timeout_ms))
        .send()
        .await
        .map_err(|e| RedeemError::Upstream(e.to_string()))?;

    if !response.status().is_success() {
        return Err(RedeemError::Upstream(format!(
            "origin returned status {}",
            response.status().as_u16()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| RedeemError::Upstream(e.to_string()))?;

    info!(
        target: "download",
        order_item_id = row.order_item_id,
        file = %row.file_name,
        size = bytes.len(),
        "Download served"
    );

    Ok(RedeemedFile {
        file_name: row.file_name,
        format: row.format,
        bytes,
    })
}
