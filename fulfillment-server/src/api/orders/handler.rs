//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::ServerState;
use crate::db::repository::{order as order_repo, return_request as return_repo};
use crate::orders::{self, SweepSummary};
use crate::returns;
use crate::utils::time::{day_end_millis, day_start_millis, parse_date};
use crate::utils::{AppError, AppResult, ok};
use shared::models::{
    Order, OrderCreate, OrderItemCreate, OrderNote, OrderWithItems, ReturnRequest, ReturnableItem,
};
use shared::order::OrderStatus;
use shared::util::now_millis;
use shared::{ApiResponse, PaginatedResponse};

const MAX_PER_PAGE: u32 = 100;

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Creation date lower bound, `YYYY-MM-DD` (UTC, inclusive)
    pub from: Option<String>,
    /// Creation date upper bound, `YYYY-MM-DD` (UTC, inclusive)
    pub to: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

/// Checkout hand-off payload
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 64))]
    pub order_number: String,
    /// Order total as charged at checkout. Not required to equal the
    /// line sum: shipping and discounts live upstream.
    #[validate(range(min = 0.0, max = 10_000_000.0))]
    pub total: f64,
    #[validate(length(min = 1), nested)]
    pub items: Vec<CreateOrderItem>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateOrderItem {
    pub product_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(range(min = 0.0, max = 1_000_000.0))]
    pub price: f64,
    #[serde(default)]
    pub is_digital: bool,
    pub digital_file_id: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub max_downloads: i32,
}

/// Status change payload
#[derive(Debug, Deserialize, Validate)]
pub struct StatusChangeRequest {
    pub status: OrderStatus,
    /// Who performed the change ("system" is reserved for the sweep)
    #[validate(length(min = 1, max = 64))]
    pub actor: String,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// List orders (paginated, newest first)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Order>>>> {
    let page = query.page.max(1);
    let per_page = query.per_page.clamp(1, MAX_PER_PAGE);

    let created_from = match &query.from {
        Some(day) => Some(day_start_millis(parse_date(day)?)),
        None => None,
    };
    let created_to = match &query.to {
        Some(day) => Some(day_end_millis(parse_date(day)?)),
        None => None,
    };

    let offset = (page - 1) * per_page;
    let orders = order_repo::list(&state.pool, created_from, created_to, per_page, offset).await?;
    let total = order_repo::count(&state.pool, created_from, created_to).await?;

    Ok(ok(PaginatedResponse::new(
        orders,
        page,
        per_page,
        total as u64,
    )))
}

/// Accept an order from checkout
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if order_repo::find_by_number(&state.pool, &payload.order_number)
        .await?
        .is_some()
    {
        return Err(AppError::Validation(format!(
            "Order number {} already exists",
            payload.order_number
        )));
    }

    let data = OrderCreate {
        order_number: payload.order_number,
        total: payload.total,
        items: payload
            .items
            .into_iter()
            .map(|i| OrderItemCreate {
                product_id: i.product_id,
                name: i.name,
                quantity: i.quantity,
                price: i.price,
                is_digital: i.is_digital,
                digital_file_id: i.digital_file_id,
                max_downloads: i.max_downloads,
            })
            .collect(),
    };

    let order = order_repo::create(&state.pool, &data, now_millis()).await?;
    let items = order_repo::items_for_order(&state.pool, order.id).await?;
    Ok(ok(OrderWithItems { order, items }))
}

/// Get order by id, with line items
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let order = order_repo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;
    let items = order_repo::items_for_order(&state.pool, id).await?;
    Ok(ok(OrderWithItems { order, items }))
}

/// Audit notes for an order, oldest first
pub async fn list_notes(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<OrderNote>>>> {
    if order_repo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::NotFound(format!("Order {} not found", id)));
    }
    let notes = order_repo::notes_for_order(&state.pool, id).await?;
    Ok(ok(notes))
}

/// Change order status
pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusChangeRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let order = orders::transition(
        &state,
        id,
        payload.status,
        &payload.actor,
        payload.note.as_deref(),
        now_millis(),
    )
    .await?;
    Ok(ok(order))
}

/// Auto-complete delivered orders past the completion window
pub async fn auto_complete(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<SweepSummary>>> {
    let summary = orders::auto_complete_sweep(&state, now_millis()).await?;
    Ok(ok(summary))
}

/// Per-line return eligibility for an order
pub async fn returnable_items(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<ReturnableItem>>>> {
    let views = returns::returnable_items(&state, id, now_millis()).await?;
    Ok(ok(views))
}

/// Return requests filed against an order, oldest first
pub async fn list_returns(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<ReturnRequest>>>> {
    if order_repo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::NotFound(format!("Order {} not found", id)));
    }
    let requests = return_repo::find_by_order(&state.pool, id).await?;
    Ok(ok(requests))
}
