//! Return API Module
//!
//! 批量退货申请入口。资格预览挂在订单资源下
//! (`GET /api/orders/{id}/returnable-items`)。

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Return router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/returns", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Bulk return submission
        .route("/", post(handler::create))
}
