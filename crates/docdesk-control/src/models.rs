//! Value types returned by the control plane
//!
//! These are read-only snapshots. Writes go through component methods that
//! apply explicit patches, never through these values.

use chrono::{DateTime, Utc};
use docdesk_db::entities::{book, comment, member, relationship, site_option};
use serde::{Deserialize, Serialize};

pub use docdesk_db::entities::book::{CommentPolicy, Visibility};
pub use docdesk_db::entities::comment::Approval;
pub use docdesk_db::entities::member::{MemberRole, MemberStatus};
pub use docdesk_db::entities::relationship::BookRole;

/// Member account without credentials
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    pub member_id: i32,
    pub account: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar: String,
    pub role: MemberRole,
    pub role_name: String,
    pub status: MemberStatus,
    /// Creating administrator, 0 when self-registered
    pub create_at: i32,
    pub create_time: DateTime<Utc>,
    pub last_login_time: Option<DateTime<Utc>>,
}

impl From<member::Model> for Member {
    fn from(model: member::Model) -> Self {
        Self {
            member_id: model.member_id,
            account: model.account,
            email: model.email,
            phone: model.phone,
            avatar: model.avatar,
            role_name: model.role.display_name().to_string(),
            role: model.role,
            status: model.status,
            create_at: model.create_at,
            create_time: model.create_time,
            last_login_time: model.last_login_time,
        }
    }
}

/// Input for member creation
///
/// `role` and `status` are raw codes; unknown codes are coerced to
/// `General` and `Active`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMember {
    pub account: String,
    pub password: String,
    pub confirm_password: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_role_code")]
    pub role: i32,
    #[serde(default)]
    pub status: i32,
}

fn default_role_code() -> i32 {
    MemberRole::General.code()
}

/// Book record; the access token is reported only as present or absent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    pub book_id: i32,
    pub book_name: String,
    pub identify: String,
    pub order_index: i32,
    pub description: String,
    pub labels: Vec<String>,
    pub comment_status: CommentPolicy,
    pub visibility: Visibility,
    pub has_token: bool,
    pub member_id: i32,
    pub create_time: DateTime<Utc>,
    pub modify_time: DateTime<Utc>,
}

impl From<book::Model> for Book {
    fn from(model: book::Model) -> Self {
        Self {
            book_id: model.book_id,
            book_name: model.book_name,
            identify: model.identify,
            order_index: model.order_index,
            description: model.description,
            labels: split_labels(&model.label),
            comment_status: model.comment_status,
            visibility: model.privately_owned,
            has_token: model.private_token.as_deref().is_some_and(|t| !t.is_empty()),
            member_id: model.member_id,
            create_time: model.create_time,
            modify_time: model.modify_time,
        }
    }
}

fn split_labels(raw: &str) -> Vec<String> {
    raw.split(';')
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// Book as shown on the administrator edit page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookView {
    #[serde(flatten)]
    pub book: Book,
    /// Reader URL carrying the stored token, if one is active
    pub access_url: Option<String>,
}

/// Input for book creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub book_name: String,
    pub identify: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_visibility")]
    pub visibility: Visibility,
}

fn default_visibility() -> Visibility {
    Visibility::Public
}

/// Metadata patch applied by `update_metadata`
#[derive(Debug, Clone, Deserialize)]
pub struct BookMetadata {
    pub book_name: String,
    #[serde(default)]
    pub description: String,
    /// Unrecognized names become `closed`
    #[serde(default)]
    pub comment_status: String,
    /// `;` separated
    #[serde(default)]
    pub labels: String,
    #[serde(default)]
    pub order_index: i32,
}

/// One member's standing on one book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Membership {
    pub relationship_id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub role: BookRole,
}

impl From<relationship::Model> for Membership {
    fn from(model: relationship::Model) -> Self {
        Self {
            relationship_id: model.relationship_id,
            book_id: model.book_id,
            member_id: model.member_id,
            role: model.role_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub comment_id: i32,
    pub book_id: i32,
    pub document_id: i32,
    pub member_id: i32,
    pub approved: Approval,
    pub comment_date: DateTime<Utc>,
}

impl From<comment::Model> for Comment {
    fn from(model: comment::Model) -> Self {
        Self {
            comment_id: model.comment_id,
            book_id: model.book_id,
            document_id: model.document_id,
            member_id: model.member_id,
            approved: model.approved,
            comment_date: model.comment_date,
        }
    }
}

/// Freshly minted access token and its reader URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub access_url: String,
}

/// One page of a listing, as consumed by the pagination layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_size: u64,
    /// 1-based
    pub page_index: u64,
}

/// Bound a requested 1-based page index so its row offset fits in an `i64`
///
/// Indexes past the end still yield an empty page.
pub(crate) fn clamp_page_index(page_index: u64, page_size: u64) -> u64 {
    page_index.clamp(1, i64::MAX as u64 / page_size.max(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub member_count: u64,
    pub book_count: u64,
    pub comment_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteOptionEntry {
    pub option_name: String,
    pub option_title: String,
    pub option_value: String,
    pub remark: Option<String>,
}

impl From<site_option::Model> for SiteOptionEntry {
    fn from(model: site_option::Model) -> Self {
        Self {
            option_name: model.option_name,
            option_title: model.option_title,
            option_value: model.option_value,
            remark: model.remark,
        }
    }
}
