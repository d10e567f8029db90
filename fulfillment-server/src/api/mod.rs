//! HTTP API Module
//!
//! 所有对外 HTTP 接口。公开下载链接挂在根路径（邮件里的链接要短），
//! 其余接口统一在 `/api` 前缀下：
//!
//! | 路径 | 模块 | 说明 |
//! |------|------|------|
//! | `/api/orders/*` | [`orders`] | 订单查询、创建、状态变更、自动完成 |
//! | `/api/returns` | [`returns`] | 批量退货申请 |
//! | `/api/downloads/tokens` | [`downloads`] | 签发下载令牌 |
//! | `/download/{token}` | [`downloads`] | 公开下载链接 (无压缩) |
//! | `/api/health*` | [`health`] | 健康检查 |

mod middleware;

pub mod downloads;
pub mod health;
pub mod orders;
pub mod returns;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // JSON API - gzip compressed
        .merge(api_routes().layer(CompressionLayer::new()))
        // Public download link - served uncompressed so the response keeps
        // an exact content-length for the file bytes
        .merge(downloads::public_router())
}

fn api_routes() -> Router<ServerState> {
    Router::new()
        // Order API
        .merge(orders::router())
        // Return API
        .merge(returns::router())
        // Download token API
        .merge(downloads::router())
        // Health API - public route
        .merge(health::router())
}

/// Build a fully configured application with all middleware and state
///
/// This is used by both the HTTP server and in-process test calls
pub fn build_app(state: ServerState) -> Router {
    build_router()
        // ========== Tower HTTP Middleware ==========
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Request logging
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // Request ID - Generate unique ID for each request. Added last so it
        // wraps the propagate layer: the generated id must already be on the
        // request when the propagate layer captures it for the response.
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .with_state(state)
}
