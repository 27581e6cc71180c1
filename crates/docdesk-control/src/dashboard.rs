//! Administrator dashboard counters

use std::sync::Arc;

use docdesk_auth::{Action, Caller, Resource};
use docdesk_db::entities::{Book, Comment, Member};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::config::ControlConfig;
use crate::error::ControlError;
use crate::guard::{bounded, require, storage};
use crate::models::DashboardSummary;

#[derive(Clone)]
pub struct Dashboard {
    db: DatabaseConnection,
    config: Arc<ControlConfig>,
}

impl Dashboard {
    pub fn new(db: DatabaseConnection, config: Arc<ControlConfig>) -> Self {
        Self { db, config }
    }

    pub async fn summary(&self, caller: &Caller) -> Result<DashboardSummary, ControlError> {
        require(caller, Action::ViewDashboard, Resource::Site)?;

        bounded(self.config.storage_timeout, "dashboard.summary", async {
            let member_count = Member::find()
                .count(&self.db)
                .await
                .map_err(storage("dashboard.summary"))?;
            let book_count = Book::find()
                .count(&self.db)
                .await
                .map_err(storage("dashboard.summary"))?;
            let comment_count = Comment::find()
                .count(&self.db)
                .await
                .map_err(storage("dashboard.summary"))?;

            Ok(DashboardSummary {
                member_count,
                book_count,
                comment_count,
            })
        })
        .await
    }
}
