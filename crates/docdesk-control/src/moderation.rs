//! Comment moderation: one-way soft delete

use std::sync::Arc;

use docdesk_auth::{Action, Caller, Resource};
use docdesk_db::entities::comment::{self, Approval, Entity as CommentEntity};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::{debug, info};

use crate::config::ControlConfig;
use crate::error::{ControlError, Entity};
use crate::guard::{bounded, require, storage};
use crate::models::Comment;
use crate::validation;

#[derive(Clone)]
pub struct ModerationGate {
    db: DatabaseConnection,
    config: Arc<ControlConfig>,
}

impl ModerationGate {
    pub fn new(db: DatabaseConnection, config: Arc<ControlConfig>) -> Self {
        Self { db, config }
    }

    /// Flag a comment as deleted; already-deleted comments are returned unchanged
    pub async fn mark_deleted(&self, caller: &Caller, comment_id: i32) -> Result<Comment, ControlError> {
        require(caller, Action::ModerateComment, Resource::Comment(comment_id))?;
        validation::positive_id(comment_id, "comment")?;

        bounded(self.config.storage_timeout, "comments.delete", async {
            let record = CommentEntity::find_by_id(comment_id)
                .one(&self.db)
                .await
                .map_err(storage("comments.delete"))?
                .ok_or(ControlError::NotFound(Entity::Comment))?;

            if record.approved == Approval::Deleted {
                debug!(comment_id, "Comment already deleted");
                return Ok(Comment::from(record));
            }

            let mut active: comment::ActiveModel = record.into();
            active.approved = Set(Approval::Deleted);
            let model = active
                .update(&self.db)
                .await
                .map_err(storage("comments.delete"))?;

            info!(comment_id, by = caller.member_id, "Comment marked deleted");
            Ok(Comment::from(model))
        })
        .await
    }
}
