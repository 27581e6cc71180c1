//! Shared-access tokens for private books
//!
//! A token is a bearer capability: whoever holds the reader URL can read the
//! private book without logging in. Tokens are only ever written by a
//! conditional update that re-checks `privately_owned = Private`, so a book
//! made public concurrently never receives one.

use std::sync::Arc;

use docdesk_auth::{AccessTokenGenerator, Action, Caller, Resource};
use docdesk_db::entities::book::{self, Entity as BookEntity, Visibility};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use tracing::{debug, info, warn};

use crate::config::ControlConfig;
use crate::error::{ControlError, Entity};
use crate::guard::{bounded, require, storage};
use crate::models::IssuedToken;
use crate::options;
use crate::registry::find_by_identify;
use crate::validation;

#[derive(Clone)]
pub struct AccessTokenIssuer {
    db: DatabaseConnection,
    config: Arc<ControlConfig>,
}

impl AccessTokenIssuer {
    pub fn new(db: DatabaseConnection, config: Arc<ControlConfig>) -> Self {
        Self { db, config }
    }

    /// Mint a fresh token for a private book, replacing any previous one
    pub async fn issue(&self, caller: &Caller, identify: &str) -> Result<IssuedToken, ControlError> {
        require(caller, Action::IssueToken, Resource::Book(identify))?;
        let identify = validation::identify(identify)?;

        bounded(self.config.storage_timeout, "tokens.issue", async {
            let txn = self.db.begin().await.map_err(storage("tokens.issue"))?;

            let size = options::token_size(&txn, &self.config)
                .await
                .map_err(storage("tokens.issue"))?;
            let generator =
                AccessTokenGenerator::new(size, self.config.token_alphabet).unwrap_or_default();

            let current = find_by_identify(&txn, identify, "tokens.issue").await?;
            let mut token = generator.generate();
            while current.private_token.as_deref() == Some(token.as_str()) {
                token = generator.generate();
            }

            let result = BookEntity::update_many()
                .col_expr(book::Column::PrivateToken, Expr::value(token.clone()))
                .filter(book::Column::Identify.eq(identify))
                .filter(book::Column::PrivatelyOwned.eq(Visibility::Private))
                .exec(&txn)
                .await
                .map_err(storage("tokens.issue"))?;

            if result.rows_affected == 0 {
                // Re-read to tell a vanished book from a public one.
                let book = BookEntity::find()
                    .filter(book::Column::Identify.eq(identify))
                    .one(&txn)
                    .await
                    .map_err(storage("tokens.issue"))?;
                return match book {
                    None => Err(ControlError::NotFound(Entity::Book)),
                    Some(_) => {
                        warn!(identify, by = caller.member_id, "Refused token for public book");
                        Err(ControlError::PublicBookToken)
                    }
                };
            }

            txn.commit().await.map_err(storage("tokens.issue"))?;

            info!(
                identify,
                length = generator.length(),
                by = caller.member_id,
                "Access token issued"
            );
            let access_url = self.config.access_url(identify, &token);
            Ok(IssuedToken { token, access_url })
        })
        .await
    }

    /// Clear the stored token; revoking an absent token succeeds
    pub async fn revoke(&self, caller: &Caller, identify: &str) -> Result<(), ControlError> {
        require(caller, Action::RevokeToken, Resource::Book(identify))?;
        let identify = validation::identify(identify)?;

        bounded(self.config.storage_timeout, "tokens.revoke", async {
            let result = BookEntity::update_many()
                .col_expr(book::Column::PrivateToken, Expr::value(Option::<String>::None))
                .filter(book::Column::Identify.eq(identify))
                .exec(&self.db)
                .await
                .map_err(storage("tokens.revoke"))?;

            if result.rows_affected == 0 {
                return Err(ControlError::NotFound(Entity::Book));
            }

            info!(identify, by = caller.member_id, "Access token revoked");
            Ok(())
        })
        .await
    }

    /// Whether `presented` opens book `identify`
    ///
    /// True only for a private book with a stored token equal to `presented`.
    pub async fn verify(&self, identify: &str, presented: &str) -> Result<bool, ControlError> {
        if identify.trim().is_empty() || presented.is_empty() {
            return Ok(false);
        }

        bounded(self.config.storage_timeout, "tokens.verify", async {
            let book = BookEntity::find()
                .filter(book::Column::Identify.eq(identify.trim()))
                .one(&self.db)
                .await
                .map_err(storage("tokens.verify"))?;

            let valid = match book {
                Some(book) if book.privately_owned == Visibility::Private => book
                    .private_token
                    .as_deref()
                    .is_some_and(|stored| constant_time_eq(stored.as_bytes(), presented.as_bytes())),
                _ => false,
            };

            debug!(identify, valid, "Access token checked");
            Ok(valid)
        })
        .await
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() || a.is_empty() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
