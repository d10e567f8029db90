//! Order Lifecycle Module
//!
//! This module owns every status change an order goes through:
//!
//! - **transition**: validation against the transition table, conditional
//!   update, audit note, close notifications
//! - **sweep**: time-triggered auto-completion of delivered orders
//! - **money**: decimal helpers for line totals and notification sums
//!
//! # Data Flow
//!
//! ```text
//! API handler / sweep → transition() → conditional UPDATE + order_note
//!                            ↓ (after commit)
//!                      NotifyEvent → Notifier (webhook)
//! ```

pub mod money;
pub mod sweep;
pub mod transition;

// Re-exports
pub use sweep::{SweepSummary, auto_complete_sweep};
pub use transition::{TransitionError, TransitionOutcome, apply_transition, transition};

// Re-export shared types for convenience
pub use shared::order::OrderStatus;
