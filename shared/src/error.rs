//! Error codes shared between server and clients
//!
//! Every JSON error response carries one of these codes in its envelope.
//! The server-side error type maps onto this table when rendering a
//! response, so clients can switch on `code` without parsing messages.

use http::StatusCode;

/// Standard API error codes
///
/// E0xxx 为通用错误，E01xx 为履约领域错误，E9xxx 为服务端内部错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Success
    Success,
    /// Validation error (400)
    Validation,
    /// Resource not found (404)
    NotFound,
    /// Order status change not allowed (409)
    InvalidTransition,
    /// Download token expired or already used (410)
    ///
    /// Expired and consumed tokens intentionally share one code so the
    /// response does not reveal whether a guessed token ever existed in
    /// a usable state.
    TokenGone,
    /// Download limit reached for the purchased item (429)
    DownloadLimit,
    /// File origin unreachable (503)
    Upstream,
    /// Internal server error (500)
    Internal,
    /// Database error (500)
    Database,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidTransition => StatusCode::CONFLICT,
            Self::TokenGone => StatusCode::GONE,
            Self::DownloadLimit => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the default message for this error
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Validation => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::InvalidTransition => "Status change not allowed",
            Self::TokenGone => "Download link expired or already used",
            Self::DownloadLimit => "Download limit reached",
            Self::Upstream => "File source temporarily unavailable",
            Self::Internal => "Internal server error",
            Self::Database => "Database error",
        }
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Success => "E0000",
            Self::Validation => "E0002",
            Self::NotFound => "E0003",
            Self::InvalidTransition => "E0101",
            Self::TokenGone => "E0102",
            Self::DownloadLimit => "E0103",
            Self::Upstream => "E0104",
            Self::Internal => "E9001",
            Self::Database => "E9002",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
