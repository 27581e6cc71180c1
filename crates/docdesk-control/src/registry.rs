//! Project registry: book records, metadata, visibility and deletion

use std::sync::Arc;

use chrono::Utc;
use docdesk_auth::{Action, Caller, Resource};
use docdesk_db::entities::book::{self, CommentPolicy, Entity as BookEntity, Visibility};
use docdesk_db::entities::comment::{self, Entity as CommentEntity};
use docdesk_db::entities::relationship::{self, BookRole, Entity as RelationshipEntity};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::config::ControlConfig;
use crate::error::{ControlError, Entity, ValidationError};
use crate::guard::{bounded, is_unique_violation, require, storage};
use crate::models::{clamp_page_index, Book, BookMetadata, BookView, NewBook, Page};
use crate::validation;

pub(crate) async fn find_by_identify<C>(
    conn: &C,
    identify: &str,
    operation: &'static str,
) -> Result<book::Model, ControlError>
where
    C: ConnectionTrait,
{
    BookEntity::find()
        .filter(book::Column::Identify.eq(identify))
        .one(conn)
        .await
        .map_err(storage(operation))?
        .ok_or(ControlError::NotFound(Entity::Book))
}

#[derive(Clone)]
pub struct ProjectRegistry {
    db: DatabaseConnection,
    config: Arc<ControlConfig>,
}

impl ProjectRegistry {
    pub fn new(db: DatabaseConnection, config: Arc<ControlConfig>) -> Self {
        Self { db, config }
    }

    /// Create a book with the caller as its founder
    pub async fn create_book(&self, caller: &Caller, new: NewBook) -> Result<Book, ControlError> {
        require(caller, Action::CreateBook, Resource::Book(&new.identify))?;

        let book_name = new.book_name.trim().to_string();
        if book_name.is_empty() {
            return Err(ValidationError::MissingBookName.into());
        }
        let identify = validation::identify(&new.identify)?.to_string();
        let description = new.description.trim().to_string();
        validation::description(&description)?;

        bounded(self.config.storage_timeout, "books.create", async {
            let txn = self.db.begin().await.map_err(storage("books.create"))?;
            let now = Utc::now();

            let record = book::ActiveModel {
                book_name: Set(book_name),
                identify: Set(identify.clone()),
                order_index: Set(0),
                description: Set(description),
                label: Set(String::new()),
                comment_status: Set(CommentPolicy::Closed),
                privately_owned: Set(new.visibility),
                private_token: Set(None),
                member_id: Set(caller.member_id),
                create_time: Set(now),
                modify_time: Set(now),
                ..Default::default()
            };

            let model = match record.insert(&txn).await {
                Ok(model) => model,
                Err(e) if is_unique_violation(&e) => {
                    return Err(ControlError::DuplicateIdentify(identify));
                }
                Err(e) => return Err(storage("books.create")(e)),
            };

            relationship::ActiveModel {
                book_id: Set(model.book_id),
                member_id: Set(caller.member_id),
                role_id: Set(BookRole::Founder),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(storage("books.create"))?;

            txn.commit().await.map_err(storage("books.create"))?;

            info!(
                book_id = model.book_id,
                identify = %model.identify,
                founder = caller.member_id,
                "Book created"
            );
            Ok(Book::from(model))
        })
        .await
    }

    /// Apply a metadata patch; only the edited columns are written
    pub async fn update_metadata(
        &self,
        caller: &Caller,
        identify: &str,
        patch: BookMetadata,
    ) -> Result<Book, ControlError> {
        require(caller, Action::EditBook, Resource::Book(identify))?;

        let identify = validation::identify(identify)?;
        let book_name = patch.book_name.trim().to_string();
        if book_name.is_empty() {
            return Err(ValidationError::MissingBookName.into());
        }
        let description = patch.description.trim().to_string();
        validation::description(&description)?;
        let labels = validation::labels(&patch.labels)?;
        let comment_status = CommentPolicy::parse_or_closed(patch.comment_status.trim());

        bounded(self.config.storage_timeout, "books.update", async {
            let current = find_by_identify(&self.db, identify, "books.update").await?;

            let changes = book::ActiveModel {
                book_id: Unchanged(current.book_id),
                book_name: Set(book_name),
                description: Set(description),
                label: Set(labels.join(";")),
                comment_status: Set(comment_status),
                order_index: Set(patch.order_index),
                modify_time: Set(Utc::now()),
                ..Default::default()
            };

            let model = match changes.update(&self.db).await {
                Ok(model) => model,
                Err(DbErr::RecordNotUpdated) => return Err(ControlError::NotFound(Entity::Book)),
                Err(e) => return Err(storage("books.update")(e)),
            };

            info!(identify, by = caller.member_id, "Book metadata updated");
            Ok(Book::from(model))
        })
        .await
    }

    /// Set a book public (`open`) or private (`close`)
    ///
    /// The stored access token is cleared on a switch to public only when
    /// `revoke_token_on_public` is set.
    pub async fn set_visibility(
        &self,
        caller: &Caller,
        identify: &str,
        status: &str,
    ) -> Result<Book, ControlError> {
        require(caller, Action::SetVisibility, Resource::Book(identify))?;

        let identify = validation::identify(identify)?;
        let visibility = validation::visibility(status)?;
        let revoke = visibility == Visibility::Public && self.config.revoke_token_on_public;

        bounded(self.config.storage_timeout, "books.set_visibility", async {
            let txn = self
                .db
                .begin()
                .await
                .map_err(storage("books.set_visibility"))?;

            let mut update = BookEntity::update_many()
                .col_expr(book::Column::PrivatelyOwned, Expr::value(visibility))
                .col_expr(book::Column::ModifyTime, Expr::value(Utc::now()));
            if revoke {
                update = update.col_expr(
                    book::Column::PrivateToken,
                    Expr::value(Option::<String>::None),
                );
            }

            let result = update
                .filter(book::Column::Identify.eq(identify))
                .exec(&txn)
                .await
                .map_err(storage("books.set_visibility"))?;
            if result.rows_affected == 0 {
                return Err(ControlError::NotFound(Entity::Book));
            }

            let model = find_by_identify(&txn, identify, "books.set_visibility").await?;
            txn.commit()
                .await
                .map_err(storage("books.set_visibility"))?;

            info!(
                identify,
                visibility = ?visibility,
                token_revoked = revoke,
                by = caller.member_id,
                "Book visibility changed"
            );
            Ok(Book::from(model))
        })
        .await
    }

    /// Delete a book together with its relationships and comments
    pub async fn delete(&self, caller: &Caller, book_id: i32) -> Result<(), ControlError> {
        require(caller, Action::DeleteBook, Resource::BookId(book_id))?;
        validation::positive_id(book_id, "book")?;

        bounded(self.config.storage_timeout, "books.delete", async {
            let txn = self.db.begin().await.map_err(storage("books.delete"))?;

            let relationships = RelationshipEntity::delete_many()
                .filter(relationship::Column::BookId.eq(book_id))
                .exec(&txn)
                .await
                .map_err(storage("books.delete"))?;

            let comments = CommentEntity::delete_many()
                .filter(comment::Column::BookId.eq(book_id))
                .exec(&txn)
                .await
                .map_err(storage("books.delete"))?;

            let deleted = BookEntity::delete_by_id(book_id)
                .exec(&txn)
                .await
                .map_err(storage("books.delete"))?;
            if deleted.rows_affected == 0 {
                // dropping the transaction discards the dependent deletes
                return Err(ControlError::NotFound(Entity::Book));
            }

            txn.commit().await.map_err(storage("books.delete"))?;

            info!(
                book_id,
                relationships = relationships.rows_affected,
                comments = comments.rows_affected,
                by = caller.member_id,
                "Book deleted"
            );
            Ok(())
        })
        .await
    }

    /// Book as shown on the edit page, with the reader URL if a token is stored
    pub async fn edit_view(&self, caller: &Caller, identify: &str) -> Result<BookView, ControlError> {
        require(caller, Action::ViewBook, Resource::Book(identify))?;
        let identify = validation::identify(identify)?;

        bounded(self.config.storage_timeout, "books.view", async {
            let model = find_by_identify(&self.db, identify, "books.view").await?;

            let access_url = model
                .private_token
                .as_deref()
                .filter(|token| !token.is_empty())
                .map(|token| self.config.access_url(&model.identify, token));

            Ok(BookView {
                book: Book::from(model),
                access_url,
            })
        })
        .await
    }

    /// Paged book listing ordered by `order_index` then newest first
    pub async fn list(&self, caller: &Caller, page_index: u64) -> Result<Page<Book>, ControlError> {
        require(caller, Action::ListBooks, Resource::Site)?;

        let page_size = self.config.book_page_size.max(1);
        let page_index = clamp_page_index(page_index, page_size);

        bounded(self.config.storage_timeout, "books.list", async {
            let paginator = BookEntity::find()
                .order_by_desc(book::Column::OrderIndex)
                .order_by_desc(book::Column::BookId)
                .paginate(&self.db, page_size);

            let total_count = paginator.num_items().await.map_err(storage("books.list"))?;
            let items = paginator
                .fetch_page(page_index - 1)
                .await
                .map_err(storage("books.list"))?;

            debug!(total_count, page_index, "Listed books");
            Ok(Page {
                items: items.into_iter().map(Book::from).collect(),
                total_count,
                page_size,
                page_index,
            })
        })
        .await
    }
}
