//! Returns Module
//!
//! Return eligibility and submission for delivered orders:
//!
//! - **evaluator**: pure per-item eligibility rules (delivered, physical,
//!   no open request, window)
//! - **service**: bulk submission with per-line outcomes, plus the
//!   "which lines can I still return" preview
//!
//! # Data Flow
//!
//! ```text
//! POST /api/returns → service::create_return_requests
//!                        ↓ evaluator::evaluate (per line)
//!                     INSERT OR IGNORE return_request
//!                        ↓ (after commit, if any created)
//!                     NotifyEvent::ReturnConfirmed → Notifier
//! ```

pub mod evaluator;
pub mod service;

// Re-exports
pub use evaluator::{evaluate, is_returnable};
pub use service::{ReturnError, create_return_requests, returnable_items};
