//! Request and response bodies of the admin API

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Result envelope returned by every admin endpoint
///
/// `code` is 0 on success; any other value identifies the failure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResult {
    /// Result code (0 = success)
    pub code: i32,
    /// Human readable message
    pub message: String,
    /// Operation payload
    #[schema(value_type = Option<Object>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ApiResult {
    pub fn ok() -> Self {
        Self {
            code: 0,
            message: "ok".to_string(),
            data: None,
        }
    }

    pub fn with_data<T: Serialize>(data: &T) -> Self {
        Self {
            data: serde_json::to_value(data).ok(),
            ..Self::ok()
        }
    }
}

/// Authentication failure, raised before any control-plane call
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Page selector for listings
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    /// 1-based page index (default: 1)
    pub page: Option<u64>,
}

/// Create member request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMemberRequest {
    /// Login handle, 3-50 letters or digits
    pub account: String,
    pub password: String,
    pub confirm_password: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// 1 = administrator, 2 = member; unknown codes become member
    #[serde(default)]
    pub role: Option<i32>,
    /// 0 = active, 1 = disabled; unknown codes become active
    #[serde(default)]
    pub status: Option<i32>,
}

/// Member status change
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberStatusRequest {
    /// 0 = active, 1 = disabled
    pub status: i32,
}

/// Member role change
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberRoleRequest {
    /// 1 = administrator, 2 = member
    pub role: i32,
}

/// Create book request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateBookRequest {
    pub book_name: String,
    /// Unique slug used in reader URLs
    pub identify: String,
    #[serde(default)]
    pub description: String,
    /// `open` (public, default) or `close` (private)
    #[serde(default)]
    pub status: Option<String>,
}

/// Book metadata edit
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EditBookRequest {
    pub book_name: String,
    /// At most 500 characters
    #[serde(default)]
    pub description: String,
    /// open, closed, group_only or registered_only
    #[serde(default)]
    pub comment_status: String,
    /// `;` separated, at most 10
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub order_index: i32,
}

/// Visibility change
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VisibilityRequest {
    /// `open` (public) or `close` (private)
    pub status: String,
}

/// Access token action
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenRequest {
    /// `create` mints a new token, `delete` revokes it
    pub action: String,
}

/// Administrator login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub account: String,
    pub password: String,
}

/// Ownership transfer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferRequest {
    /// Recipient account
    pub account: String,
}

/// Book deletion
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteBookRequest {
    pub book_id: i32,
}

/// Comment moderation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteCommentRequest {
    pub comment_id: i32,
}

/// Site settings update, keyed by option name
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveSettingsRequest {
    pub options: BTreeMap<String, String>,
}

/// Reader token check
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct AccessQuery {
    pub token: String,
}

/// Reader token check result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessResponse {
    pub valid: bool,
}
