//! Order Lifecycle Module
//!
//! Types for the order fulfillment lifecycle:
//! - Status: the order state machine and its allowed transitions
//! - Types: return reasons and return eligibility outcomes

pub mod status;
pub mod types;

// Re-exports
pub use status::OrderStatus;
pub use types::{ReturnIneligibility, ReturnReason};
