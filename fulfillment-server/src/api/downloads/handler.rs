//! Download API Handlers

use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::downloads::{self, RequestContext};
use crate::utils::{AppError, AppResult, ok};
use shared::ApiResponse;
use shared::models::DownloadTokenIssued;
use shared::util::now_millis;

/// Token issue payload
#[derive(Debug, Deserialize, Validate)]
pub struct IssueTokenRequest {
    pub order_item_id: i64,
    /// Overrides `DOWNLOAD_TOKEN_TTL_HOURS` when set
    #[validate(range(min = 1, max = 720))]
    pub ttl_hours: Option<i64>,
}

/// Issue a download token for a digital order item
pub async fn issue_token(
    State(state): State<ServerState>,
    Json(payload): Json<IssueTokenRequest>,
) -> AppResult<Json<ApiResponse<DownloadTokenIssued>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let ttl_hours = payload
        .ttl_hours
        .unwrap_or(state.config.download_token_ttl_hours);
    let issued =
        downloads::issue(&state.pool, payload.order_item_id, ttl_hours, now_millis()).await?;
    Ok(ok(issued))
}

/// Redeem a download token (the link from the customer's email)
pub async fn download(
    State(state): State<ServerState>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let ctx = request_context(&headers);
    let file = downloads::redeem(&state, &token, &ctx, now_millis()).await?;

    let mime = mime_guess::from_ext(&file.format.to_lowercase()).first_or_octet_stream();
    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_filename(&file.file_name)
    );

    // Single-use responses must never land in a shared cache
    Response::builder()
        .header(http::header::CONTENT_TYPE, mime.as_ref())
        .header(http::header::CONTENT_LENGTH, file.bytes.len())
        .header(http::header::CONTENT_DISPOSITION, disposition)
        .header(
            http::header::CACHE_CONTROL,
            "no-store, no-cache, must-revalidate, private",
        )
        .header(http::header::PRAGMA, "no-cache")
        .header(http::header::EXPIRES, "0")
        .header("x-content-type-options", "nosniff")
        .header("x-robots-tag", "noindex, nofollow")
        .body(Body::from(file.bytes))
        .map_err(|e| AppError::Internal(format!("Failed to build download response: {}", e)))
}

/// Requester fingerprint from proxy-aware headers.
fn request_context(headers: &HeaderMap) -> RequestContext {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        });

    let user_agent = headers
        .get(http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    RequestContext {
        ip_address,
        user_agent,
    }
}

/// Header-safe file name: visible ASCII only, no quotes.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control() && *c != '"')
        .collect();
    if cleaned.is_empty() {
        "download".to_string()
    } else {
        cleaned
    }
}
