//! Return API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::returns;
use crate::utils::{AppError, AppResult, ok};
use shared::ApiResponse;
use shared::models::ReturnSummary;
use shared::order::ReturnReason;
use shared::util::now_millis;

/// Bulk return submission payload
///
/// One order, one reason, any number of its line items.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReturnRequest {
    #[validate(length(min = 1, max = 100))]
    pub order_item_ids: Vec<i64>,
    pub reason: ReturnReason,
    #[validate(length(max = 500))]
    pub details: Option<String>,
}

/// Submit return requests for a batch of order items
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateReturnRequest>,
) -> AppResult<Json<ApiResponse<ReturnSummary>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let summary = returns::create_return_requests(
        &state,
        &payload.order_item_ids,
        payload.reason,
        payload.details.as_deref(),
        now_millis(),
    )
    .await?;
    Ok(ok(summary))
}
