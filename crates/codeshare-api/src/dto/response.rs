//! Response DTOs.
//!
//! Every JSON body carries `code` (1 success, 0 failure) and `msg`.

use serde::{Deserialize, Serialize};

use codeshare_entity::share::{ShareDetail, ShareResult};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always 1.
    pub code: u8,
    /// Human-readable status.
    pub msg: String,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self::with_msg("success", data)
    }

    /// Creates a successful response with a custom message.
    pub fn with_msg(msg: impl Into<String>, data: T) -> Self {
        Self {
            code: 1,
            msg: msg.into(),
            data,
        }
    }
}

/// Standard failure body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always 0.
    pub code: u8,
    /// Human-readable message.
    pub msg: String,
    /// Machine-readable error kind.
    pub error: String,
}

/// Upload result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Locator of the stored file; `null` for text-only shares.
    pub file_url: Option<String>,
    /// Access code.
    pub code: String,
}

impl From<ShareResult> for UploadResponse {
    fn from(result: ShareResult) -> Self {
        Self {
            file_url: result.locator,
            code: result.code,
        }
    }
}

/// Share preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailResponse {
    /// Inline text.
    pub text: Option<String>,
    /// Original file name.
    pub file_name: Option<String>,
}

impl From<ShareDetail> for DetailResponse {
    fn from(detail: ShareDetail) -> Self {
        Self {
            text: detail.text,
            file_name: detail.file_name,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Record store reachability.
    pub database: bool,
    /// Content root availability.
    pub storage: bool,
}
