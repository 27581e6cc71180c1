//! Racing writers against a file-backed SQLite database
//!
//! `sqlite::memory:` runs on a single pooled connection, so these tests use
//! a database file where transactions really overlap.

use std::time::Duration;

use docdesk_control::{
    BookRole, Caller, ControlConfig, ControlError, ControlPlane, ErrorKind, NewBook, NewMember,
    Visibility,
};
use docdesk_db::entities::{book, relationship};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use tempfile::TempDir;

struct FileBacked {
    // Keeps the database file alive for the test's duration
    _dir: TempDir,
    plane: ControlPlane,
    db: DatabaseConnection,
    admin: Caller,
}

async fn setup_file(config: ControlConfig) -> FileBacked {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("docdesk.db").display());

    let db = docdesk_db::connect(&url)
        .await
        .expect("Failed to open file database");
    docdesk_db::migrate(&db).await.expect("Failed to run migrations");

    let plane = ControlPlane::new(db.clone(), config);
    let admin = plane
        .identity
        .bootstrap_administrator("admin", "adminpass", "admin@example.com")
        .await
        .unwrap()
        .expect("store should be empty");
    let admin = plane.identity.resolve_caller(admin.member_id).await.unwrap();

    FileBacked {
        _dir: dir,
        plane,
        db,
        admin,
    }
}

fn race_config() -> ControlConfig {
    ControlConfig {
        storage_timeout: Duration::from_secs(30),
        revoke_token_on_public: true,
        ..Default::default()
    }
}

async fn create_member(app: &FileBacked, account: &str) -> i32 {
    app.plane
        .identity
        .create_member(
            &app.admin,
            NewMember {
                account: account.to_string(),
                password: "password1".to_string(),
                confirm_password: "password1".to_string(),
                email: format!("{}@example.com", account),
                phone: None,
                role: 2,
                status: 0,
            },
        )
        .await
        .unwrap()
        .member_id
}

async fn create_book(app: &FileBacked, identify: &str, visibility: Visibility) -> i32 {
    app.plane
        .registry
        .create_book(
            &app.admin,
            NewBook {
                book_name: identify.to_string(),
                identify: identify.to_string(),
                description: String::new(),
                visibility,
            },
        )
        .await
        .unwrap()
        .book_id
}

async fn founders(db: &DatabaseConnection, book_id: i32) -> Vec<relationship::Model> {
    relationship::Entity::find()
        .filter(relationship::Column::BookId.eq(book_id))
        .filter(relationship::Column::RoleId.eq(BookRole::Founder))
        .all(db)
        .await
        .unwrap()
}

/// A losing writer fails as a stale founder or as a storage conflict, never silently
fn assert_lost_race(err: &ControlError) {
    assert!(
        matches!(err, ControlError::NotFounder) || err.kind() == ErrorKind::StorageFailure,
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_transfers_from_same_founder() {
    let app = setup_file(race_config()).await;
    let bob = create_member(&app, "bob").await;
    let carol = create_member(&app, "carol").await;
    let book_id = create_book(&app, "handbook", Visibility::Public).await;
    let from = app.admin.member_id;

    let (to_bob, to_carol) = tokio::join!(
        app.plane.ledger.transfer(&app.admin, book_id, from, bob),
        app.plane.ledger.transfer(&app.admin, book_id, from, carol),
    );

    let winner = match (&to_bob, &to_carol) {
        (Ok(()), Err(err)) => {
            assert_lost_race(err);
            bob
        }
        (Err(err), Ok(())) => {
            assert_lost_race(err);
            carol
        }
        other => panic!("exactly one transfer must win, got {:?}", other),
    };

    let founders = founders(&app.db, book_id).await;
    assert_eq!(founders.len(), 1);
    assert_eq!(founders[0].member_id, winner);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stale_founder_cannot_transfer() {
    let app = setup_file(race_config()).await;
    let bob = create_member(&app, "bob").await;
    let carol = create_member(&app, "carol").await;
    let book_id = create_book(&app, "handbook", Visibility::Public).await;
    let from = app.admin.member_id;

    app.plane
        .ledger
        .transfer(&app.admin, book_id, from, bob)
        .await
        .unwrap();

    // `from` was read before the first transfer committed
    let err = app
        .plane
        .ledger
        .transfer(&app.admin, book_id, from, carol)
        .await
        .unwrap_err();
    assert!(matches!(err, ControlError::NotFounder));

    let founders = founders(&app.db, book_id).await;
    assert_eq!(founders.len(), 1);
    assert_eq!(founders[0].member_id, bob);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_issue_races_switch_to_public() {
    let app = setup_file(race_config()).await;
    create_book(&app, "proj-x", Visibility::Private).await;

    let (issued, switched) = tokio::join!(
        app.plane.tokens.issue(&app.admin, "proj-x"),
        app.plane.registry.set_visibility(&app.admin, "proj-x", "open"),
    );

    if let Err(err) = &issued {
        assert!(
            matches!(err, ControlError::PublicBookToken) || err.kind() == ErrorKind::StorageFailure,
            "unexpected error: {:?}",
            err
        );
    }

    let stored = book::Entity::find()
        .filter(book::Column::Identify.eq("proj-x"))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();

    if switched.is_ok() {
        // whichever order the writers ran in, a public book ends without a token
        assert_eq!(stored.privately_owned, Visibility::Public);
        assert_eq!(stored.private_token, None);
        if let Ok(issued) = &issued {
            assert!(!app.plane.tokens.verify("proj-x", &issued.token).await.unwrap());
        }
    } else {
        assert_eq!(stored.privately_owned, Visibility::Private);
    }

    let books = book::Entity::find().count(&app.db).await.unwrap();
    assert_eq!(books, 1);
}
