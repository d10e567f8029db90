//! Order API Module
//!
//! 订单查询、创建与生命周期操作。所有状态变更统一走迁移引擎，
//! 不存在绕过状态机的写路径。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Order list (paginated) + checkout hand-off
        .route("/", get(handler::list).post(handler::create))
        // Auto-completion sweep trigger (cron / ops)
        .route("/auto-complete", get(handler::auto_complete))
        // Order detail with line items
        .route("/{id}", get(handler::get_by_id))
        // Audit trail
        .route("/{id}/notes", get(handler::list_notes))
        // Status transition
        .route("/{id}/status", post(handler::change_status))
        // Return eligibility preview
        .route("/{id}/returnable-items", get(handler::returnable_items))
        // Return requests filed against the order
        .route("/{id}/returns", get(handler::list_returns))
}
