//! Facade bundling every control-plane component over one connection

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::ControlConfig;
use crate::dashboard::Dashboard;
use crate::identity::IdentityStore;
use crate::ledger::MembershipLedger;
use crate::moderation::ModerationGate;
use crate::options::SiteOptions;
use crate::registry::ProjectRegistry;
use crate::tokens::AccessTokenIssuer;
use crate::transfer::OwnershipTransfer;

#[derive(Clone)]
pub struct ControlPlane {
    pub identity: IdentityStore,
    pub registry: ProjectRegistry,
    pub tokens: AccessTokenIssuer,
    pub ledger: MembershipLedger,
    pub transfer: OwnershipTransfer,
    pub moderation: ModerationGate,
    pub options: SiteOptions,
    pub dashboard: Dashboard,
    config: Arc<ControlConfig>,
}

impl ControlPlane {
    pub fn new(db: DatabaseConnection, config: ControlConfig) -> Self {
        let config = Arc::new(config);

        Self {
            identity: IdentityStore::new(db.clone(), config.clone()),
            registry: ProjectRegistry::new(db.clone(), config.clone()),
            tokens: AccessTokenIssuer::new(db.clone(), config.clone()),
            ledger: MembershipLedger::new(db.clone(), config.clone()),
            transfer: OwnershipTransfer::new(db.clone(), config.clone()),
            moderation: ModerationGate::new(db.clone(), config.clone()),
            options: SiteOptions::new(db.clone(), config.clone()),
            dashboard: Dashboard::new(db, config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }
}
