//! Return Request Models

use serde::{Deserialize, Serialize};

use crate::order::{ReturnIneligibility, ReturnReason};
use crate::models::order::OrderItem;

/// Return request entity (退货申请)
///
/// At most one non-voided request may exist per order item; voided
/// requests stay behind as history and free the item up again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReturnRequest {
    pub id: i64,
    pub order_id: i64,
    pub order_item_id: i64,
    pub reason: ReturnReason,
    pub details: Option<String>,
    pub voided: bool,
    pub created_at: i64,
}

/// Per-item result of a return submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemReturnOutcome {
    /// 申请已创建
    Created { return_request_id: i64 },
    /// 该行项目被拒绝
    Rejected { reason: ReturnIneligibility },
}

/// Outcome row for one requested order item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnOutcome {
    pub order_item_id: i64,
    #[serde(flatten)]
    pub outcome: ItemReturnOutcome,
}

/// Response body for a bulk return submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnSummary {
    pub order_id: i64,
    pub created_count: usize,
    pub outcomes: Vec<ReturnOutcome>,
}

/// Return eligibility view of one order line (for the storefront's
/// "request a return" screen)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnableItem {
    pub item: OrderItem,
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReturnIneligibility>,
}
