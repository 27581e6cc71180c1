//! Site option entity (key/value settings)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_option")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub option_id: i32,

    pub option_title: String,

    #[sea_orm(unique)]
    pub option_name: String,

    #[sea_orm(column_type = "Text")]
    pub option_value: String,

    pub remark: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
