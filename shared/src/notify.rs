//! Notification event payloads
//!
//! 通知事件。订单关单（完成/取消）与退货确认时发往商户 webhook 的
//! 消息体。Events are emitted after the owning database transaction has
//! committed, never inside it.

use serde::{Deserialize, Serialize};

use crate::models::Order;
use crate::order::{OrderStatus, ReturnReason};

/// Compact order view embedded in notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderNotice {
    pub id: i64,
    pub order_number: String,
    pub status: OrderStatus,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<i64>,
}

impl From<&Order> for OrderNotice {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            status: order.status,
            total: order.total,
            closed_at: order.closed_at,
        }
    }
}

/// Single order line embedded in notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemNotice {
    pub order_item_id: i64,
    pub name: String,
    pub quantity: i32,
    /// Line amount (price * quantity, rounded to cents)
    pub amount: f64,
}

/// Outbound notification event
///
/// Serialized internally tagged, e.g.
/// `{"event": "order.completed", "order": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum NotifyEvent {
    /// 订单完成
    #[serde(rename = "order.completed")]
    OrderCompleted { order: OrderNotice },

    /// 订单取消
    #[serde(rename = "order.cancelled")]
    OrderCancelled {
        order: OrderNotice,
        items: Vec<ItemNotice>,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    /// 退货确认（一次申请只发一条汇总通知）
    #[serde(rename = "return.confirmed")]
    ReturnConfirmed {
        order_id: i64,
        order_number: String,
        reason: ReturnReason,
        items: Vec<ItemNotice>,
        refund_total: f64,
    },
}

impl NotifyEvent {
    /// Event name as it appears on the wire, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderCompleted { .. } => "order.completed",
            Self::OrderCancelled { .. } => "order.cancelled",
            Self::ReturnConfirmed { .. } => "return.confirmed",
        }
    }
}
