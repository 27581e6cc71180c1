//! Shared preconditions: policy checks, storage timeouts, storage error mapping

use std::future::Future;
use std::time::Duration;

use docdesk_auth::{authorize, Action, Caller, Decision, Resource};
use sea_orm::{DbErr, SqlErr};
use tracing::{error, warn};

use crate::error::ControlError;

/// Abort with `Forbidden` unless the policy allows `action`
pub(crate) fn require(
    caller: &Caller,
    action: Action,
    resource: Resource<'_>,
) -> Result<(), ControlError> {
    match authorize(caller, action, resource) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            warn!(
                member_id = caller.member_id,
                action = ?action,
                resource = %resource,
                %reason,
                "Request denied"
            );
            Err(ControlError::Forbidden(reason))
        }
    }
}

/// Run `fut` under the storage timeout
///
/// The future is dropped on expiry; an open transaction inside it rolls back.
pub(crate) async fn bounded<T, F>(
    limit: Duration,
    operation: &'static str,
    fut: F,
) -> Result<T, ControlError>
where
    F: Future<Output = Result<T, ControlError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = limit.as_millis() as u64, "Storage operation timed out");
            Err(ControlError::Timeout)
        }
    }
}

/// Log a backend error with its operation and convert it to an opaque failure
pub(crate) fn storage(operation: &'static str) -> impl FnOnce(DbErr) -> ControlError {
    move |err| {
        error!(operation, error = %err, "Storage operation failed");
        ControlError::Storage { operation }
    }
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdesk_auth::{DenyReason, MemberRole, MemberStatus};

    #[test]
    fn test_require_maps_denial() {
        let caller = Caller::new(3, MemberRole::General, MemberStatus::Active);
        let result = require(&caller, Action::DeleteBook, Resource::BookId(1));

        assert!(matches!(
            result,
            Err(ControlError::Forbidden(DenyReason::NotAdministrator))
        ));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result: Result<(), ControlError> =
            bounded(Duration::from_millis(10), "test.sleep", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(ControlError::Timeout)));
    }

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let result = bounded(Duration::from_secs(1), "test.ready", async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn test_storage_error_is_opaque() {
        let err = storage("members.find")(DbErr::Custom("disk I/O error at page 12".into()));

        assert!(matches!(
            err,
            ControlError::Storage {
                operation: "members.find"
            }
        ));
        assert!(!err.to_string().contains("disk"));
    }
}
