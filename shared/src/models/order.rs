//! Order Models

use serde::{Deserialize, Serialize};

use crate::order::OrderStatus;

/// Order entity (订单)
///
/// `delivered_at` is stamped on the first arrival in DELIVERED and kept
/// across later status changes. `closed_at` is set while the order sits
/// in COMPLETED or CANCELLED and cleared if support reopens it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub status: OrderStatus,
    pub total: f64,
    pub created_at: i64,
    pub delivered_at: Option<i64>,
    pub closed_at: Option<i64>,
}

/// Order line item entity (订单行项目)
///
/// Digital lines reference a `digital_file` row and carry their own
/// download counters; physical lines keep both counters at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
    pub is_digital: bool,
    pub digital_file_id: Option<i64>,
    pub download_count: i32,
    pub max_downloads: i32,
}

/// Order audit note entity (订单备注)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderNote {
    pub id: i64,
    pub order_id: i64,
    pub actor: String,
    pub note: String,
    pub created_at: i64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub order_number: String,
    pub total: f64,
    pub items: Vec<OrderItemCreate>,
}

/// Create order line payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub product_id: i64,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
    #[serde(default)]
    pub is_digital: bool,
    pub digital_file_id: Option<i64>,
    #[serde(default)]
    pub max_downloads: i32,
}

/// Order with line items (for detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}
