//! Shared types for the Cowrie fulfillment backend
//!
//! Common types used across crates: entities, status enums, error codes,
//! response envelopes and notification payloads. The `db` feature derives
//! `sqlx::FromRow` / `sqlx::Type` on entity types so the server can map
//! query rows directly.

pub mod error;
pub mod models;
pub mod notify;
pub mod order;
pub mod response;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::ErrorCode;
pub use notify::NotifyEvent;
pub use order::{OrderStatus, ReturnIneligibility, ReturnReason};
pub use response::{ApiResponse, PaginatedResponse, Pagination};
pub use util::{now_millis, snowflake_id};
