//! Site options: defaults read by the core plus the settings page

use std::collections::BTreeMap;
use std::sync::Arc;

use docdesk_auth::token::MAX_TOKEN_SIZE;
use docdesk_auth::{Action, Caller, Resource};
use docdesk_db::entities::site_option::{self, Entity as SiteOption};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::config::ControlConfig;
use crate::error::ControlError;
use crate::guard::{bounded, require, storage};
use crate::models::SiteOptionEntry;

pub const DEFAULT_AVATAR: &str = "DEFAULT_AVATAR";
pub const TOKEN_SIZE: &str = "TOKEN_SIZE";

/// Raw option value, `None` when the option is absent or blank
pub(crate) async fn read<C>(conn: &C, name: &str) -> Result<Option<String>, DbErr>
where
    C: ConnectionTrait,
{
    let value = SiteOption::find()
        .filter(site_option::Column::OptionName.eq(name))
        .one(conn)
        .await?
        .map(|option| option.option_value.trim().to_string())
        .filter(|value| !value.is_empty());

    Ok(value)
}

pub(crate) async fn default_avatar<C>(conn: &C, config: &ControlConfig) -> Result<String, DbErr>
where
    C: ConnectionTrait,
{
    Ok(read(conn, DEFAULT_AVATAR)
        .await?
        .unwrap_or_else(|| config.default_avatar.clone()))
}

/// Token length from `TOKEN_SIZE`
///
/// Unparsable values and values outside `1..=MAX_TOKEN_SIZE` use the configured size.
pub(crate) async fn token_size<C>(conn: &C, config: &ControlConfig) -> Result<usize, DbErr>
where
    C: ConnectionTrait,
{
    let size = read(conn, TOKEN_SIZE)
        .await?
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|size| (1..=MAX_TOKEN_SIZE).contains(size));

    match size {
        Some(size) => Ok(size),
        None => Ok(config.token_size),
    }
}

/// Administrator settings page over the options table
#[derive(Clone)]
pub struct SiteOptions {
    db: DatabaseConnection,
    config: Arc<ControlConfig>,
}

impl SiteOptions {
    pub fn new(db: DatabaseConnection, config: Arc<ControlConfig>) -> Self {
        Self { db, config }
    }

    pub async fn list(&self, caller: &Caller) -> Result<Vec<SiteOptionEntry>, ControlError> {
        require(caller, Action::ManageSettings, Resource::Site)?;

        bounded(self.config.storage_timeout, "options.list", async {
            let options = SiteOption::find()
                .order_by_asc(site_option::Column::OptionId)
                .all(&self.db)
                .await
                .map_err(storage("options.list"))?;

            debug!(count = options.len(), "Listed site options");
            Ok(options.into_iter().map(SiteOptionEntry::from).collect())
        })
        .await
    }

    /// Update the named options; names that do not exist are ignored
    pub async fn save(
        &self,
        caller: &Caller,
        values: BTreeMap<String, String>,
    ) -> Result<Vec<SiteOptionEntry>, ControlError> {
        require(caller, Action::ManageSettings, Resource::Site)?;

        bounded(self.config.storage_timeout, "options.save", async {
            let txn = self.db.begin().await.map_err(storage("options.save"))?;

            let existing = SiteOption::find()
                .order_by_asc(site_option::Column::OptionId)
                .all(&txn)
                .await
                .map_err(storage("options.save"))?;

            let mut saved = Vec::with_capacity(existing.len());
            for option in existing {
                match values.get(&option.option_name) {
                    Some(value) if *value != option.option_value => {
                        let mut active: site_option::ActiveModel = option.into();
                        active.option_value = Set(value.clone());
                        let updated = active
                            .update(&txn)
                            .await
                            .map_err(storage("options.save"))?;
                        saved.push(SiteOptionEntry::from(updated));
                    }
                    _ => saved.push(SiteOptionEntry::from(option)),
                }
            }

            txn.commit().await.map_err(storage("options.save"))?;

            info!(member_id = caller.member_id, "Site options saved");
            Ok(saved)
        })
        .await
    }
}
