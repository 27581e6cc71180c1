//! Book entity, the top-level project whose access is controlled

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Book visibility
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum Visibility {
    #[sea_orm(num_value = 0)]
    Public,

    #[sea_orm(num_value = 1)]
    Private,
}

/// Who may comment on a book
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum CommentPolicy {
    #[sea_orm(string_value = "open")]
    Open,

    #[sea_orm(string_value = "closed")]
    Closed,

    #[sea_orm(string_value = "group_only")]
    GroupOnly,

    #[sea_orm(string_value = "registered_only")]
    RegisteredOnly,
}

impl CommentPolicy {
    /// Parse a policy name, unrecognized names fall back to `Closed`
    pub fn parse_or_closed(value: &str) -> Self {
        match value {
            "open" => Self::Open,
            "group_only" => Self::GroupOnly,
            "registered_only" => Self::RegisteredOnly,
            _ => Self::Closed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub book_id: i32,

    pub book_name: String,

    /// Slug-like identifier used in URLs (unique)
    #[sea_orm(unique)]
    pub identify: String,

    pub order_index: i32,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// `;` separated labels
    pub label: String,

    pub comment_status: CommentPolicy,

    pub privately_owned: Visibility,

    /// Shared-access token, `None` when no token is active
    #[serde(skip_serializing)]
    pub private_token: Option<String>,

    /// Member that created the book
    pub member_id: i32,

    pub create_time: ChronoDateTimeUtc,

    pub modify_time: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Book has member relationships
    #[sea_orm(has_many = "super::relationship::Entity")]
    Relationships,

    /// Book has comments
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::relationship::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Relationships.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
