//! Download API Module
//!
//! 令牌签发在 `/api` 下 (管理端)，兑换链接挂在根路径 (买家邮件里的
//! 公开链接)。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Token administration router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/downloads", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Issue a single-use token for a digital order item
        .route("/tokens", post(handler::issue_token))
}

/// Public download link, mounted at the root (outside `/api`)
pub fn public_router() -> Router<ServerState> {
    Router::new().route("/download/{token}", get(handler::download))
}
