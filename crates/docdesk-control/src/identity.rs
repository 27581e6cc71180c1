//! Identity store: member accounts, roles and status

use std::sync::Arc;

use chrono::Utc;
use docdesk_auth::{hash_password, verify_password, Action, Caller, Resource};
use docdesk_db::entities::member::{self, Entity as MemberEntity, MemberRole, MemberStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, error, info, warn};

use crate::config::ControlConfig;
use crate::error::{ControlError, Entity, ValidationError};
use crate::guard::{bounded, is_unique_violation, require, storage};
use crate::models::{clamp_page_index, Member, NewMember, Page};
use crate::options;
use crate::validation;

#[derive(Clone)]
pub struct IdentityStore {
    db: DatabaseConnection,
    config: Arc<ControlConfig>,
}

impl IdentityStore {
    pub fn new(db: DatabaseConnection, config: Arc<ControlConfig>) -> Self {
        Self { db, config }
    }

    /// Create a member on behalf of an administrator
    pub async fn create_member(
        &self,
        caller: &Caller,
        new: NewMember,
    ) -> Result<Member, ControlError> {
        require(caller, Action::CreateMember, Resource::Site)?;

        let account = new.account.trim().to_string();
        validation::account(&account)?;
        let password = new.password.trim();
        validation::password(password, new.confirm_password.trim())?;
        let email = new.email.trim().to_string();
        validation::email(&email)?;

        let role = MemberRole::from_code(new.role).unwrap_or(MemberRole::General);
        let status = MemberStatus::from_code(new.status).unwrap_or(MemberStatus::Active);
        let phone = new
            .phone
            .map(|phone| phone.trim().to_string())
            .filter(|phone| !phone.is_empty());

        self.insert(account, password, email, phone, role, status, caller.member_id)
            .await
    }

    /// Create the first super-administrator of an empty store
    ///
    /// Returns `Ok(None)` when members already exist.
    pub async fn bootstrap_administrator(
        &self,
        account: &str,
        password: &str,
        email: &str,
    ) -> Result<Option<Member>, ControlError> {
        validation::account(account)?;
        validation::password(password, password)?;
        validation::email(email)?;

        let existing = bounded(self.config.storage_timeout, "members.count", async {
            MemberEntity::find()
                .count(&self.db)
                .await
                .map_err(storage("members.count"))
        })
        .await?;

        if existing > 0 {
            debug!(existing, "Member store already initialized, skipping bootstrap");
            return Ok(None);
        }

        let member = self
            .insert(
                account.to_string(),
                password,
                email.to_string(),
                None,
                MemberRole::SuperAdministrator,
                MemberStatus::Active,
                0,
            )
            .await?;

        Ok(Some(member))
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert(
        &self,
        account: String,
        password: &str,
        email: String,
        phone: Option<String>,
        role: MemberRole,
        status: MemberStatus,
        creator: i32,
    ) -> Result<Member, ControlError> {
        let password_hash = hash_password(password).map_err(|e| {
            error!(error = %e, "Failed to hash member password");
            ControlError::Storage {
                operation: "members.hash_password",
            }
        })?;

        bounded(self.config.storage_timeout, "members.create", async {
            let taken = MemberEntity::find()
                .filter(member::Column::Account.eq(account.as_str()))
                .one(&self.db)
                .await
                .map_err(storage("members.create"))?
                .is_some();
            if taken {
                return Err(ControlError::DuplicateAccount(account));
            }

            let avatar = options::default_avatar(&self.db, &self.config)
                .await
                .map_err(storage("members.create"))?;

            let record = member::ActiveModel {
                account: Set(account.clone()),
                password: Set(password_hash),
                email: Set(email),
                phone: Set(phone),
                avatar: Set(avatar),
                role: Set(role),
                status: Set(status),
                create_at: Set(creator),
                create_time: Set(Utc::now()),
                last_login_time: Set(None),
                ..Default::default()
            };

            // The unique index decides races between concurrent creations.
            let model = match record.insert(&self.db).await {
                Ok(model) => model,
                Err(e) if is_unique_violation(&e) => {
                    return Err(ControlError::DuplicateAccount(account));
                }
                Err(e) => return Err(storage("members.create")(e)),
            };

            info!(
                member_id = model.member_id,
                account = %model.account,
                role = ?model.role,
                created_by = creator,
                "Member created"
            );
            Ok(Member::from(model))
        })
        .await
    }

    /// Enable or disable a member; unknown status codes become `Active`
    pub async fn set_status(
        &self,
        caller: &Caller,
        member_id: i32,
        status: i32,
    ) -> Result<Member, ControlError> {
        require(caller, Action::SetMemberStatus, Resource::Member(member_id))?;
        validation::positive_id(member_id, "member")?;

        let status = MemberStatus::from_code(status).unwrap_or(MemberStatus::Active);

        bounded(self.config.storage_timeout, "members.set_status", async {
            let record = self.find_model(member_id, "members.set_status").await?;

            let mut active: member::ActiveModel = record.into();
            active.status = Set(status);
            let model = active
                .update(&self.db)
                .await
                .map_err(storage("members.set_status"))?;

            info!(member_id, status = ?status, by = caller.member_id, "Member status updated");
            Ok(Member::from(model))
        })
        .await
    }

    /// Change a member's site role; only `Administrator` (1) and `General` (2) are assignable
    pub async fn set_role(
        &self,
        caller: &Caller,
        member_id: i32,
        role: i32,
    ) -> Result<Member, ControlError> {
        require(caller, Action::SetMemberRole, Resource::Member(member_id))?;
        validation::positive_id(member_id, "member")?;

        let role = match MemberRole::from_code(role) {
            Some(role @ (MemberRole::Administrator | MemberRole::General)) => role,
            _ => return Err(ValidationError::InvalidRole(role).into()),
        };

        bounded(self.config.storage_timeout, "members.set_role", async {
            let record = self.find_model(member_id, "members.set_role").await?;

            let mut active: member::ActiveModel = record.into();
            active.role = Set(role);
            let model = active
                .update(&self.db)
                .await
                .map_err(storage("members.set_role"))?;

            info!(member_id, role = ?role, by = caller.member_id, "Member role updated");
            Ok(Member::from(model))
        })
        .await
    }

    pub async fn find_by_account(&self, account: &str) -> Result<Member, ControlError> {
        bounded(self.config.storage_timeout, "members.find_by_account", async {
            MemberEntity::find()
                .filter(member::Column::Account.eq(account))
                .one(&self.db)
                .await
                .map_err(storage("members.find_by_account"))?
                .map(Member::from)
                .ok_or(ControlError::NotFound(Entity::Member))
        })
        .await
    }

    pub async fn find_by_id(&self, member_id: i32) -> Result<Member, ControlError> {
        bounded(self.config.storage_timeout, "members.find", async {
            self.find_model(member_id, "members.find")
                .await
                .map(Member::from)
        })
        .await
    }

    /// Check a login attempt and record the login time
    ///
    /// Unknown accounts, wrong passwords and disabled accounts all fail with
    /// the same `InvalidCredentials` error.
    pub async fn authenticate(&self, account: &str, password: &str) -> Result<Member, ControlError> {
        let record = bounded(self.config.storage_timeout, "members.authenticate", async {
            MemberEntity::find()
                .filter(member::Column::Account.eq(account.trim()))
                .one(&self.db)
                .await
                .map_err(storage("members.authenticate"))
        })
        .await?;

        let Some(record) = record else {
            warn!(account = %account, "Login for unknown account");
            return Err(ControlError::InvalidCredentials);
        };

        let valid = verify_password(password.trim(), &record.password).map_err(|e| {
            error!(member_id = record.member_id, error = %e, "Stored password hash is unreadable");
            ControlError::InvalidCredentials
        })?;
        if !valid || record.status != MemberStatus::Active {
            warn!(member_id = record.member_id, "Rejected login");
            return Err(ControlError::InvalidCredentials);
        }

        bounded(self.config.storage_timeout, "members.authenticate", async {
            let mut active: member::ActiveModel = record.into();
            active.last_login_time = Set(Some(Utc::now()));
            let model = active
                .update(&self.db)
                .await
                .map_err(storage("members.authenticate"))?;

            info!(member_id = model.member_id, "Member logged in");
            Ok(Member::from(model))
        })
        .await
    }

    /// Load the caller snapshot for an authenticated session
    ///
    /// Role and status are read fresh so demotions apply on the next request.
    pub async fn resolve_caller(&self, member_id: i32) -> Result<Caller, ControlError> {
        let member = self.find_by_id(member_id).await?;
        Ok(Caller::new(member.member_id, member.role, member.status))
    }

    /// Paged member listing, newest first
    pub async fn list(&self, caller: &Caller, page_index: u64) -> Result<Page<Member>, ControlError> {
        require(caller, Action::ListMembers, Resource::Site)?;

        let page_size = self.config.member_page_size.max(1);
        let page_index = clamp_page_index(page_index, page_size);

        bounded(self.config.storage_timeout, "members.list", async {
            let paginator = MemberEntity::find()
                .order_by_desc(member::Column::MemberId)
                .paginate(&self.db, page_size);

            let total_count = paginator
                .num_items()
                .await
                .map_err(storage("members.list"))?;
            let items = paginator
                .fetch_page(page_index - 1)
                .await
                .map_err(storage("members.list"))?;

            debug!(total_count, page_index, "Listed members");
            Ok(Page {
                items: items.into_iter().map(Member::from).collect(),
                total_count,
                page_size,
                page_index,
            })
        })
        .await
    }

    async fn find_model(
        &self,
        member_id: i32,
        operation: &'static str,
    ) -> Result<member::Model, ControlError> {
        MemberEntity::find_by_id(member_id)
            .one(&self.db)
            .await
            .map_err(storage(operation))?
            .ok_or(ControlError::NotFound(Entity::Member))
    }
}
