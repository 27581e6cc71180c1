//! Relationship entity, one member's standing on one book

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a member within a book
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum BookRole {
    /// Exclusive owner, exactly one per book
    #[sea_orm(num_value = 0)]
    Founder,

    #[sea_orm(num_value = 1)]
    Administrator,

    #[sea_orm(num_value = 2)]
    Editor,

    #[sea_orm(num_value = 3)]
    Observer,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "relationship")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub relationship_id: i32,

    pub member_id: i32,

    pub book_id: i32,

    pub role_id: BookRole,
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

    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::MemberId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Member,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
