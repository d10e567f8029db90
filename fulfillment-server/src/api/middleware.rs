//! 请求日志中间件
//!
//! 记录每个 HTTP 请求的开始与结束。日志里只写路由模板，不写原始
//! 路径：公开下载链接的路径就是一次性令牌本身，绝不能落进日志。

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

/// Route template for the log line.
///
/// Unmatched requests fall back to the raw path, except under `/download/`
/// where the path carries the single-use token.
fn loggable_path(req: &Request) -> String {
    if let Some(matched) = req.extensions().get::<MatchedPath>() {
        return matched.as_str().to_string();
    }
    let path = req.uri().path();
    if path.starts_with("/download/") {
        "/download/{token}".to_string()
    } else {
        path.to_string()
    }
}

/// 请求日志中间件
///
/// 每个请求两行日志：开始（请求 ID、方法、路由模板）和结束（加上
/// 状态码与耗时）。4xx/5xx 统一用 warn，方便在日志里直接过滤。
/// 请求 ID 由外层的 `SetRequestIdLayer` 生成。
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let method = req.method().clone();
    let path = loggable_path(&req);

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Request started"
    );

    let response = next.run(req).await;

    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;

    if status.is_client_error() || status.is_server_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            latency_ms,
            "Request failed"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            latency_ms,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_for(path: &str) -> Request {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_unmatched_download_path_is_redacted() {
        // No MatchedPath extension: simulates an unrouted request
        let req = request_for("/download/0123456789abcdef0123456789abcdef");
        assert_eq!(loggable_path(&req), "/download/{token}");
    }

    #[test]
    fn test_other_unmatched_paths_log_verbatim() {
        let req = request_for("/api/nope");
        assert_eq!(loggable_path(&req), "/api/nope");
    }
}
