//! Ownership transfer by book identifier and recipient account
//!
//! Resolves both sides, then hands the write to the ledger inside the same
//! transaction. Any failure leaves ownership untouched.

use std::sync::Arc;

use docdesk_auth::{Action, Caller, Resource};
use docdesk_db::entities::book::{self, Entity as BookEntity};
use docdesk_db::entities::member::{self, Entity as MemberEntity};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use tracing::info;

use crate::config::ControlConfig;
use crate::error::{ControlError, Entity, ValidationError};
use crate::guard::{bounded, require, storage};
use crate::ledger::{check_recipient, founder_of, reassign_founder};
use crate::models::Membership;
use crate::validation;

const OPERATION: &str = "books.transfer";

#[derive(Clone)]
pub struct OwnershipTransfer {
    db: DatabaseConnection,
    config: Arc<ControlConfig>,
}

impl OwnershipTransfer {
    pub fn new(db: DatabaseConnection, config: Arc<ControlConfig>) -> Self {
        Self { db, config }
    }

    /// Make `account` the founder of book `identify`
    ///
    /// Returns the recipient's new founder row.
    pub async fn transfer(
        &self,
        caller: &Caller,
        identify: &str,
        account: &str,
    ) -> Result<Membership, ControlError> {
        let account = account.trim();
        if account.is_empty() {
            return Err(ValidationError::MissingRecipient.into());
        }
        let identify = validation::identify(identify)?;

        bounded(self.config.storage_timeout, OPERATION, async {
            let txn = self.db.begin().await.map_err(storage(OPERATION))?;

            let recipient = MemberEntity::find()
                .filter(member::Column::Account.eq(account))
                .one(&txn)
                .await
                .map_err(storage(OPERATION))?;
            let recipient = check_recipient(recipient)?;

            let book = BookEntity::find()
                .filter(book::Column::Identify.eq(identify))
                .one(&txn)
                .await
                .map_err(storage(OPERATION))?
                .ok_or(ControlError::NotFound(Entity::Book))?;

            let founder = founder_of(&txn, book.book_id, OPERATION).await?;
            if founder.member_id == recipient.member_id {
                return Err(ControlError::SelfTransfer);
            }

            require(caller, Action::TransferOwnership, Resource::Book(identify))?;

            reassign_founder(&txn, book.book_id, founder.member_id, recipient.member_id).await?;
            let new_founder = founder_of(&txn, book.book_id, OPERATION).await?;

            txn.commit().await.map_err(storage(OPERATION))?;

            info!(
                identify,
                from = founder.member_id,
                to = recipient.member_id,
                by = caller.member_id,
                "Book ownership transferred"
            );
            Ok(Membership::from(new_founder))
        })
        .await
    }
}
