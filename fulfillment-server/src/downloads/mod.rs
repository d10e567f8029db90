//! Downloads Module
//!
//! Single-use download tokens for digital order items:
//!
//! - **service**: token issue (admin side) and redemption (public link),
//!   including the origin fetch
//!
//! # Data Flow
//!
//! ```text
//! POST /api/downloads/tokens → service::issue → download_token row
//!
//! GET /download/{token} → service::redeem
//!                           ↓ consume (two conditional UPDATEs, one tx)
//!                           ↓ (after commit)
//!                         origin fetch → file bytes + attachment headers
//! ```

pub mod service;

// Re-exports
pub use service::{
    IssueError, RedeemError, RedeemedFile, RequestContext, issue, redeem,
};
