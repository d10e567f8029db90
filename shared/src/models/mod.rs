//! Data models
//!
//! Shared between fulfillment-server and storefront clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), all timestamps are
//! UTC milliseconds.

pub mod download;
pub mod order;
pub mod return_request;

// Re-exports
pub use download::*;
pub use order::*;
pub use return_request::*;
