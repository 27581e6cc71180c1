//! Comment entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Moderation state of a comment
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum Approval {
    #[sea_orm(num_value = 0)]
    Pending,

    #[sea_orm(num_value = 1)]
    Approved,

    #[sea_orm(num_value = 2)]
    Rejected,

    /// Soft-deleted by a moderator; terminal
    #[sea_orm(num_value = 3)]
    Deleted,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub comment_id: i32,

    pub book_id: i32,

    pub document_id: i32,

    pub member_id: i32,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub approved: Approval,

    pub comment_date: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::BookId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Book,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
