//! 统一错误处理
//!
//! 应用级错误类型。每个变体对应 [`shared::ErrorCode`] 表中的一个码，
//! 渲染为统一的 JSON 信封。
//!
//! # 错误码规范
//!
//! | 前缀 | 分类 | 示例 |
//! |------|------|------|
//! | E0xxx | 通用错误 | E0003 资源不存在 |
//! | E01xx | 履约领域错误 | E0102 下载链接失效 |
//! | E9xxx | 系统错误 | E9002 数据库错误 |
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::NotFound("Order not found".to_string()))
//!
//! // 返回成功响应
//! Ok(ok(data))
//! ```

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::{ApiResponse, ErrorCode};
use tracing::{error, warn};

use crate::db::repository::RepoError;
use crate::downloads::service::{IssueError, RedeemError};
use crate::orders::transition::TransitionError;
use crate::returns::service::ReturnError;

/// 应用错误枚举
///
/// 5xx 变体在渲染响应时记录完整错误详情，但对外只返回固定文案，
/// 避免泄漏内部信息。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    #[error("Invalid status transition: {0}")]
    /// 非法状态迁移 (409)
    InvalidTransition(String),

    #[error("Download link expired or already used")]
    /// 下载令牌已过期或已使用 (410)，两种情况对外不可区分
    TokenGone,

    #[error("Download limit reached")]
    /// 下载次数已用完 (429)
    DownloadLimit,

    // ========== 系统错误 (5xx) ==========
    #[error("Upstream fetch failed: {0}")]
    /// 文件源不可用 (503)
    Upstream(String),

    #[error("Database error: {0}")]
    /// 数据库错误 (500)
    Database(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            AppError::NotFound(msg) => (ErrorCode::NotFound, msg.clone()),
            AppError::Validation(msg) => (ErrorCode::Validation, msg.clone()),
            AppError::InvalidTransition(msg) => (ErrorCode::InvalidTransition, msg.clone()),

            // Fixed messages: the response must not reveal which check failed
            AppError::TokenGone => {
                let code = ErrorCode::TokenGone;
                (code, code.default_message().to_string())
            }
            AppError::DownloadLimit => {
                let code = ErrorCode::DownloadLimit;
                (code, code.default_message().to_string())
            }

            AppError::Upstream(msg) => {
                warn!(target: "download", error = %msg, "Upstream fetch failed");
                let code = ErrorCode::Upstream;
                (code, code.default_message().to_string())
            }
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                let code = ErrorCode::Database;
                (code, code.default_message().to_string())
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                let code = ErrorCode::Internal;
                (code, code.default_message().to_string())
            }
        };

        let body = Json(ApiResponse::<()>::error(code.code(), message));
        (code.status_code(), body).into_response()
    }
}

// ========== From implementations ==========

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::NotFound(id) => AppError::NotFound(format!("Order {} not found", id)),
            TransitionError::InvalidTransition { from, to } => AppError::InvalidTransition(
                format!("Cannot change status from {} to {}", from, to),
            ),
            TransitionError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<RedeemError> for AppError {
    fn from(e: RedeemError) -> Self {
        match e {
            RedeemError::NotFound => AppError::NotFound("Download link not found".to_string()),
            RedeemError::Expired | RedeemError::AlreadyConsumed => AppError::TokenGone,
            RedeemError::LimitExceeded => AppError::DownloadLimit,
            RedeemError::Upstream(msg) => AppError::Upstream(msg),
            RedeemError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<IssueError> for AppError {
    fn from(e: IssueError) -> Self {
        match e {
            IssueError::ItemNotFound(id) => {
                AppError::NotFound(format!("Order item {} not found", id))
            }
            IssueError::NotDigital(id) => AppError::Validation(format!(
                "Order item {} is not a downloadable digital product",
                id
            )),
            IssueError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<ReturnError> for AppError {
    fn from(e: ReturnError) -> Self {
        match e {
            ReturnError::OrderNotFound(id) => {
                AppError::NotFound(format!("Order {} not found", id))
            }
            ReturnError::ItemNotFound(id) => {
                AppError::NotFound(format!("Order item {} not found", id))
            }
            ReturnError::Validation(msg) => AppError::Validation(msg),
            ReturnError::Database(msg) => AppError::Database(msg),
        }
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data))
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok_with_message(data, message))
}
