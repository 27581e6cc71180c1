//! Member entity for site accounts and their global role

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Site-wide role of a member
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum MemberRole {
    /// Installation owner, created by `bootstrap-admin`
    #[sea_orm(num_value = 0)]
    SuperAdministrator,

    /// Site administrator
    #[sea_orm(num_value = 1)]
    Administrator,

    /// Regular member
    #[sea_orm(num_value = 2)]
    General,
}

impl MemberRole {
    /// Resolve a numeric role code, `None` for unknown codes
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::SuperAdministrator),
            1 => Some(Self::Administrator),
            2 => Some(Self::General),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::SuperAdministrator => 0,
            Self::Administrator => 1,
            Self::General => 2,
        }
    }

    /// Both administrator variants pass administrator checks
    pub fn is_administrator(self) -> bool {
        matches!(self, Self::SuperAdministrator | Self::Administrator)
    }

    /// Human readable role name shown in admin listings
    pub fn display_name(self) -> &'static str {
        match self {
            Self::SuperAdministrator => "Super administrator",
            Self::Administrator => "Administrator",
            Self::General => "Member",
        }
    }
}

/// Account status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum MemberStatus {
    #[sea_orm(num_value = 0)]
    Active,

    #[sea_orm(num_value = 1)]
    Disabled,
}

impl MemberStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Active),
            1 => Some(Self::Disabled),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Active => 0,
            Self::Disabled => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub member_id: i32,

    /// Login handle (unique)
    #[sea_orm(unique)]
    pub account: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password: String,

    pub email: String,

    pub phone: Option<String>,

    /// Avatar URL or path
    pub avatar: String,

    pub role: MemberRole,

    pub status: MemberStatus,

    /// Member id of the administrator that created this account, 0 when self-registered
    pub create_at: i32,

    pub create_time: ChronoDateTimeUtc,

    pub last_login_time: Option<ChronoDateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Member belongs to books through relationships
    #[sea_orm(has_many = "super::relationship::Entity")]
    Relationships,
}

impl Related<super::relationship::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Relationships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
