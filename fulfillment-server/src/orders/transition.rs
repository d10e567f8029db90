//! Order status transition engine
//!
//! 订单状态迁移。所有状态变更（人工操作与自动完成扫描）都经过这里：
//! 先查迁移表，再做条件更新，同一事务内写审计备注，提交后发出关单
//! 通知。并发迁移通过 `WHERE status = ?` 守卫串行化，输掉的一方收到
//! `InvalidTransition`。

use sqlx::SqlitePool;

use crate::core::ServerState;
use crate::db::repository::{RepoError, order as order_repo};
use crate::orders::money;
use shared::models::Order;
use shared::notify::OrderNotice;
use shared::util::snowflake_id;
use shared::{NotifyEvent, OrderStatus};

/// Status transition error
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    /// 订单不存在
    #[error("Order {0} not found")]
    NotFound(i64),

    /// 迁移表不允许，或并发迁移输掉 (快照已过期)
    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// 数据库错误
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for TransitionError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<RepoError> for TransitionError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) | RepoError::Database(msg) => Self::Database(msg),
        }
    }
}

/// Result of a committed transition.
#[derive(Debug)]
pub struct TransitionOutcome {
    /// Order snapshot after the update
    pub order: Order,
    /// Status the order held before the update
    pub previous: OrderStatus,
}

/// Conditional status update.
///
/// - `delivered_at` is stamped only on first entry into DELIVERED, so a
///   reopen from COMPLETED keeps the original delivery date (and with it
///   the return window).
/// - `closed_at` is set when entering COMPLETED/CANCELLED and cleared when
///   leaving them into an open status.
/// - `WHERE status = ?` makes the update a compare-and-swap: zero rows
///   affected means another actor moved the order first.
const UPDATE_STATUS: &str = "UPDATE customer_order \
     SET status = ?, \
         delivered_at = CASE WHEN ? = 'DELIVERED' AND delivered_at IS NULL THEN ? ELSE delivered_at END, \
         closed_at = CASE WHEN ? IN ('COMPLETED', 'CANCELLED') THEN ? ELSE NULL END \
     WHERE id = ? AND status = ?";

const INSERT_NOTE: &str =
    "INSERT INTO order_note (id, order_id, actor, note, created_at) VALUES (?, ?, ?, ?, ?)";

/// Apply one status change to an order.
///
/// Validates against the transition table, performs the conditional update
/// and writes the audit note in the same transaction. Returns the refreshed
/// order plus the status it held before. Notifications are the caller's job
/// (see [`transition`]).
pub async fn apply_transition(
    pool: &SqlitePool,
    order_id: i64,
    new_status: OrderStatus,
    actor: &str,
    note: Option<&str>,
    now: i64,
) -> Result<TransitionOutcome, TransitionError> {
    // 1. Load current snapshot
    let order = order_repo::find_by_id(pool, order_id)
        .await?
        .ok_or(TransitionError::NotFound(order_id))?;
    let previous = order.status;

    // 2. Validate against the transition table
    if !previous.can_transition_to(new_status) {
        return Err(TransitionError::InvalidTransition {
            from: previous,
            to: new_status,
        });
    }

    // 3. Conditional update. The status write is the first statement in the
    //    transaction so the connection takes the SQLite write lock up front.
    let mut tx = pool.begin().await?;
    let updated = sqlx::query(UPDATE_STATUS)
        .bind(new_status)
        .bind(new_status)
        .bind(now)
        .bind(new_status)
        .bind(now)
        .bind(order_id)
        .bind(previous)
        .execute(&mut *tx)
        .await?;

    if updated.rows_affected() == 0 {
        // A concurrent actor moved the order between steps 1 and 3
        drop(tx);
        let fresh = order_repo::find_by_id(pool, order_id)
            .await?
            .ok_or(TransitionError::NotFound(order_id))?;
        return Err(TransitionError::InvalidTransition {
            from: fresh.status,
            to: new_status,
        });
    }

    // 4. Audit note in the same transaction
    let mut text = format!("Status changed from {} to {}", previous, new_status);
    if let Some(extra) = note
        && !extra.is_empty()
    {
        text.push_str(": ");
        text.push_str(extra);
    }
    sqlx::query(INSERT_NOTE)
        .bind(snowflake_id())
        .bind(order_id)
        .bind(actor)
        .bind(&text)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    // 5. Reload the committed snapshot
    let order = order_repo::find_by_id(pool, order_id)
        .await?
        .ok_or(TransitionError::NotFound(order_id))?;

    Ok(TransitionOutcome { order, previous })
}

/// Apply a transition and emit the matching close notification.
///
/// COMPLETED 发 `order.completed`，CANCELLED 发 `order.cancelled`（带行
/// 项目和取消原因）。通知在事务提交之后才发出，投递失败由
/// [`ServerState::notify`] 记录日志并吞掉。
pub async fn transition(
    state: &ServerState,
    order_id: i64,
    new_status: OrderStatus,
    actor: &str,
    note: Option<&str>,
    now: i64,
) -> Result<Order, TransitionError> {
    let outcome = apply_transition(&state.pool, order_id, new_status, actor, note, now).await?;

    match new_status {
        OrderStatus::Completed => {
            state
                .notify(NotifyEvent::OrderCompleted {
                    order: OrderNotice::from(&outcome.order),
                })
                .await;
        }
        OrderStatus::Cancelled => {
            let items = order_repo::items_for_order(&state.pool, order_id).await?;
            state
                .notify(NotifyEvent::OrderCancelled {
                    order: OrderNotice::from(&outcome.order),
                    items: items.iter().map(money::item_notice).collect(),
                    note: note.map(|s| s.to_string()),
                })
                .await;
        }
        _ => {}
    }

    Ok(outcome.order)
}
