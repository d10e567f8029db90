//! Bulk return submission
//!
//! 一次申请多行退货：同一订单、同一原因。每行单独判定资格并报告
//! 结果；真正创建了申请才发一条 `return.confirmed` 汇总通知。

use tracing::info;

use crate::core::ServerState;
use crate::db::repository::{RepoError, order as order_repo, return_request as return_repo};
use crate::orders::money;
use crate::returns::evaluator;
use shared::NotifyEvent;
use shared::models::{ItemReturnOutcome, OrderItem, ReturnOutcome, ReturnSummary, ReturnableItem};
use shared::order::{ReturnIneligibility, ReturnReason};
use shared::util::snowflake_id;

/// Return submission error
#[derive(Debug, thiserror::Error)]
pub enum ReturnError {
    /// 订单不存在
    #[error("Order {0} not found")]
    OrderNotFound(i64),

    /// 行项目不存在 (整个请求失败)
    #[error("Order item {0} not found")]
    ItemNotFound(i64),

    /// 请求形状不合法
    #[error("{0}")]
    Validation(String),

    /// 数据库错误
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for ReturnError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<RepoError> for ReturnError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) | RepoError::Database(msg) => Self::Database(msg),
        }
    }
}

enum Decision {
    Rejected(ReturnIneligibility),
    Eligible(OrderItem),
}

const INSERT_REQUEST: &str = "INSERT OR IGNORE INTO return_request \
     (id, order_id, order_item_id, reason, details, voided, created_at) \
     VALUES (?, ?, ?, ?, ?, 0, ?)";

/// Create return requests for a batch of order items.
///
/// All items must belong to one order and share one reason. Ineligible
/// lines are reported per item, never failing the batch; only a missing
/// item or a cross-order batch fails the whole request.
pub async fn create_return_requests(
    state: &ServerState,
    order_item_ids: &[i64],
    reason: ReturnReason,
    details: Option<&str>,
    now: i64,
) -> Result<ReturnSummary, ReturnError> {
    if order_item_ids.is_empty() {
        return Err(ReturnError::Validation(
            "order_item_ids must not be empty".to_string(),
        ));
    }

    // 1. Resolve items; the whole batch must target one order
    let pool = &state.pool;
    let mut items = Vec::with_capacity(order_item_ids.len());
    for &item_id in order_item_ids {
        let item = order_repo::find_item(pool, item_id)
            .await?
            .ok_or(ReturnError::ItemNotFound(item_id))?;
        items.push(item);
    }

    let order_id = items[0].order_id;
    if items.iter().any(|i| i.order_id != order_id) {
        return Err(ReturnError::Validation(
            "All items in one return request must belong to the same order".to_string(),
        ));
    }

    let order = order_repo::find_by_id(pool, order_id)
        .await?
        .ok_or(ReturnError::OrderNotFound(order_id))?;

    // 2. Classify each line before touching the database
    let window_days = state.config.return_window_days;
    let mut decisions = Vec::with_capacity(items.len());
    for item in items {
        let has_open = return_repo::has_open_request(pool, item.id).await?;
        match evaluator::evaluate(&order, &item, has_open, window_days, now) {
            Ok(()) => decisions.push((item.id, Decision::Eligible(item))),
            Err(reason) => decisions.push((item.id, Decision::Rejected(reason))),
        }
    }

    // 3. Insert eligible lines in one transaction. INSERT OR IGNORE lets the
    //    partial unique index absorb races: a line that lost the race comes
    //    back with zero rows affected and is reported as ALREADY_REQUESTED.
    //    Duplicate ids inside one batch collapse the same way.
    let mut outcomes = Vec::with_capacity(decisions.len());
    let mut created_items: Vec<OrderItem> = Vec::new();
    let mut tx = pool.begin().await?;
    for (item_id, decision) in decisions {
        match decision {
            Decision::Rejected(reason) => outcomes.push(ReturnOutcome {
                order_item_id: item_id,
                outcome: ItemReturnOutcome::Rejected { reason },
            }),
            Decision::Eligible(item) => {
                let request_id = snowflake_id();
                let inserted = sqlx::query(INSERT_REQUEST)
                    .bind(request_id)
                    .bind(order_id)
                    .bind(item_id)
                    .bind(reason)
                    .bind(details)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;

                if inserted.rows_affected() == 0 {
                    outcomes.push(ReturnOutcome {
                        order_item_id: item_id,
                        outcome: ItemReturnOutcome::Rejected {
                            reason: ReturnIneligibility::AlreadyRequested,
                        },
                    });
                } else {
                    outcomes.push(ReturnOutcome {
                        order_item_id: item_id,
                        outcome: ItemReturnOutcome::Created {
                            return_request_id: request_id,
                        },
                    });
                    created_items.push(item);
                }
            }
        }
    }
    tx.commit().await?;

    // 4. Exactly one summary notification per submission, and only when
    //    something was actually created
    if !created_items.is_empty() {
        info!(
            target: "returns",
            order_id,
            count = created_items.len(),
            "Return requests created"
        );
        state
            .notify(NotifyEvent::ReturnConfirmed {
                order_id,
                order_number: order.order_number.clone(),
                reason,
                items: created_items.iter().map(money::item_notice).collect(),
                refund_total: money::sum_line_totals(&created_items),
            })
            .await;
    }

    Ok(ReturnSummary {
        order_id,
        created_count: created_items.len(),
        outcomes,
    })
}

/// Eligibility preview for every line of an order (the storefront's
/// "request a return" screen).
pub async fn returnable_items(
    state: &ServerState,
    order_id: i64,
    now: i64,
) -> Result<Vec<ReturnableItem>, ReturnError> {
    let pool = &state.pool;
    let order = order_repo::find_by_id(pool, order_id)
        .await?
        .ok_or(ReturnError::OrderNotFound(order_id))?;
    let items = order_repo::items_for_order(pool, order_id).await?;

    let window_days = state.config.return_window_days;
    let mut views = Vec::with_capacity(items.len());
    for item in items {
        let has_open = return_repo::has_open_request(pool, item.id).await?;
        let verdict = evaluator::evaluate(&order, &item, has_open, window_days, now);
        views.push(ReturnableItem {
            item,
            eligible: verdict.is_ok(),
            reason: verdict.err(),
        });
    }
    Ok(views)
}
