//! Membership ledger: who holds which role on which book
//!
//! The ledger is the source of truth for ownership. Every book has exactly
//! one `Founder` row; the partial unique index on `relationship (book_id)
//! WHERE role_id = 0` backs this up at the storage level.

use std::sync::Arc;

use docdesk_auth::{Action, Caller, Resource};
use docdesk_db::entities::book::Entity as BookEntity;
use docdesk_db::entities::member::{self, Entity as MemberEntity, MemberStatus};
use docdesk_db::entities::relationship::{self, BookRole, Entity as RelationshipEntity};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, error, info};

use crate::config::ControlConfig;
use crate::error::{ControlError, Entity};
use crate::guard::{bounded, require, storage};
use crate::models::Membership;
use crate::validation;

/// The single founder row of `book_id`
///
/// A missing book is `NotFound`; an existing book with zero or several
/// founders is an integrity violation.
pub(crate) async fn founder_of<C>(
    conn: &C,
    book_id: i32,
    operation: &'static str,
) -> Result<relationship::Model, ControlError>
where
    C: ConnectionTrait,
{
    let mut founders = RelationshipEntity::find()
        .filter(relationship::Column::BookId.eq(book_id))
        .filter(relationship::Column::RoleId.eq(BookRole::Founder))
        .all(conn)
        .await
        .map_err(storage(operation))?;

    if founders.len() == 1 {
        return Ok(founders.remove(0));
    }

    let book_exists = BookEntity::find_by_id(book_id)
        .one(conn)
        .await
        .map_err(storage(operation))?
        .is_some();
    if !book_exists {
        return Err(ControlError::NotFound(Entity::Book));
    }

    error!(
        book_id,
        founders = founders.len(),
        operation,
        "Book does not have exactly one founder"
    );
    Err(ControlError::IntegrityViolation {
        book_id,
        founders: founders.len(),
    })
}

/// Recipient must exist and be active
pub(crate) fn check_recipient(recipient: Option<member::Model>) -> Result<member::Model, ControlError> {
    let recipient = recipient.ok_or(ControlError::RecipientNotFound)?;
    if recipient.status != MemberStatus::Active {
        return Err(ControlError::RecipientDisabled);
    }
    Ok(recipient)
}

/// Move the founder role from `from` to `to` inside `txn`
///
/// The current founder is re-read here, so a founder change committed since
/// the caller's own checks surfaces as `NotFounder` instead of a second founder.
pub(crate) async fn reassign_founder(
    txn: &DatabaseTransaction,
    book_id: i32,
    from: i32,
    to: i32,
) -> Result<(), ControlError> {
    const OPERATION: &str = "ledger.transfer";

    let founder = founder_of(txn, book_id, OPERATION).await?;
    if founder.member_id != from {
        return Err(ControlError::NotFounder);
    }

    let demoted = RelationshipEntity::update_many()
        .col_expr(
            relationship::Column::RoleId,
            Expr::value(BookRole::Administrator),
        )
        .filter(relationship::Column::RelationshipId.eq(founder.relationship_id))
        .filter(relationship::Column::RoleId.eq(BookRole::Founder))
        .exec(txn)
        .await
        .map_err(storage(OPERATION))?;
    if demoted.rows_affected != 1 {
        return Err(ControlError::NotFounder);
    }

    let existing = RelationshipEntity::find()
        .filter(relationship::Column::BookId.eq(book_id))
        .filter(relationship::Column::MemberId.eq(to))
        .one(txn)
        .await
        .map_err(storage(OPERATION))?;

    match existing {
        Some(row) => {
            let mut active: relationship::ActiveModel = row.into();
            active.role_id = Set(BookRole::Founder);
            active.update(txn).await.map_err(storage(OPERATION))?;
        }
        None => {
            relationship::ActiveModel {
                book_id: Set(book_id),
                member_id: Set(to),
                role_id: Set(BookRole::Founder),
                ..Default::default()
            }
            .insert(txn)
            .await
            .map_err(storage(OPERATION))?;
        }
    }

    Ok(())
}

#[derive(Clone)]
pub struct MembershipLedger {
    db: DatabaseConnection,
    config: Arc<ControlConfig>,
}

impl MembershipLedger {
    pub fn new(db: DatabaseConnection, config: Arc<ControlConfig>) -> Self {
        Self { db, config }
    }

    pub async fn find_founder(&self, book_id: i32) -> Result<Membership, ControlError> {
        bounded(self.config.storage_timeout, "ledger.find_founder", async {
            let founder = founder_of(&self.db, book_id, "ledger.find_founder").await?;
            debug!(book_id, member_id = founder.member_id, "Resolved book founder");
            Ok(Membership::from(founder))
        })
        .await
    }

    /// All relationship rows of a book, founder first
    pub async fn memberships(&self, book_id: i32) -> Result<Vec<Membership>, ControlError> {
        bounded(self.config.storage_timeout, "ledger.memberships", async {
            let rows = RelationshipEntity::find()
                .filter(relationship::Column::BookId.eq(book_id))
                .order_by_asc(relationship::Column::RoleId)
                .order_by_asc(relationship::Column::RelationshipId)
                .all(&self.db)
                .await
                .map_err(storage("ledger.memberships"))?;

            Ok(rows.into_iter().map(Membership::from).collect())
        })
        .await
    }

    /// Reassign the founder of `book_id` from `from_member_id` to `to_member_id`
    ///
    /// Checks run in order and stop at the first failure: recipient exists,
    /// recipient is active, recipient differs from `from_member_id`, caller is
    /// allowed, `from_member_id` is still the founder. All of it runs in one
    /// transaction; nothing is written unless every check passes.
    pub async fn transfer(
        &self,
        caller: &Caller,
        book_id: i32,
        from_member_id: i32,
        to_member_id: i32,
    ) -> Result<(), ControlError> {
        validation::positive_id(book_id, "book")?;

        bounded(self.config.storage_timeout, "ledger.transfer", async {
            let txn = self.db.begin().await.map_err(storage("ledger.transfer"))?;

            let recipient = MemberEntity::find_by_id(to_member_id)
                .one(&txn)
                .await
                .map_err(storage("ledger.transfer"))?;
            let recipient = check_recipient(recipient)?;

            if recipient.member_id == from_member_id {
                return Err(ControlError::SelfTransfer);
            }

            require(caller, Action::TransferOwnership, Resource::BookId(book_id))?;

            reassign_founder(&txn, book_id, from_member_id, recipient.member_id).await?;

            txn.commit().await.map_err(storage("ledger.transfer"))?;

            info!(
                book_id,
                from = from_member_id,
                to = recipient.member_id,
                by = caller.member_id,
                "Book founder transferred"
            );
            Ok(())
        })
        .await
    }
}
