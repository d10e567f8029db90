//! Digital Download Models

use serde::{Deserialize, Serialize};

/// Digital file entity (数字商品文件)
///
/// The file body lives at an origin URL (object storage). The server
/// streams it through on redemption and never exposes `file_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DigitalFile {
    pub id: i64,
    pub file_name: String,
    pub file_url: String,
    /// Lowercase extension, e.g. "pdf", "zip"
    pub format: String,
    pub file_size: i64,
    pub created_at: i64,
}

/// Create digital file payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitalFileCreate {
    pub file_name: String,
    pub file_url: String,
    pub format: String,
    pub file_size: i64,
}

/// Download token entity (下载令牌)
///
/// Single use: `downloaded_at` flips from NULL exactly once, together
/// with the requester's address and user agent for the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DownloadToken {
    pub id: i64,
    pub token: String,
    pub order_item_id: i64,
    /// Pinned at issue time; later item edits cannot swap the payload
    pub digital_file_id: i64,
    pub created_at: i64,
    pub expires_at: i64,
    pub downloaded_at: Option<i64>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Issued token view (for the token issue endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadTokenIssued {
    pub token: String,
    /// Relative redemption path, e.g. `/download/{token}`
    pub url: String,
    pub expires_at: i64,
}
