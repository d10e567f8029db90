//! Order status state machine
//!
//! 订单状态机。状态存储为 SCREAMING_SNAKE_CASE 文本，数据库列与 JSON
//! 字段使用同一编码。
//!
//! The allowed-transition table is the single source of truth: the
//! transition engine, the API layer and the sweep all consult it through
//! [`OrderStatus::can_transition_to`].

use serde::{Deserialize, Serialize};

/// Order status (订单状态)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    /// 已下单，等待商家处理
    #[default]
    Pending,
    /// 处理中，正在备货
    Processing,
    /// 已发货，在途
    Shipped,
    /// 已送达买家
    Delivered,
    /// 已完成（送达后确认或自动完成）
    Completed,
    /// 已取消
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Statuses reachable from `self` in a single step.
    ///
    /// `Completed -> Delivered` and `Cancelled -> Pending` are the two
    /// reopen edges for support staff; nothing automatic ever takes them.
    pub fn allowed_transitions(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Processing, OrderStatus::Cancelled],
            OrderStatus::Processing => &[OrderStatus::Shipped, OrderStatus::Cancelled],
            OrderStatus::Shipped => &[OrderStatus::Delivered, OrderStatus::Cancelled],
            OrderStatus::Delivered => &[OrderStatus::Completed, OrderStatus::Cancelled],
            OrderStatus::Completed => &[OrderStatus::Delivered],
            OrderStatus::Cancelled => &[OrderStatus::Pending],
        }
    }

    /// Whether moving from `self` to `next` is a legal single step.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Closed statuses carry a `closed_at` timestamp and end the normal
    /// fulfillment flow.
    pub fn is_closed(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Wire form, identical in JSON and in the database column.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
