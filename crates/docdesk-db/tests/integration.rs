//! Integration tests for docdesk-db
//!
//! Tests schema and constraints with a real SQLite in-memory database

use chrono::Utc;
use docdesk_db::{
    connect,
    entities::{
        book::{self, CommentPolicy, Visibility},
        member::{self, MemberRole, MemberStatus},
        relationship::{self, BookRole},
        site_option,
    },
    migrate,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};

/// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    db
}

async fn insert_member(db: &DatabaseConnection, account: &str) -> member::Model {
    member::ActiveModel {
        account: Set(account.to_string()),
        password: Set("$argon2id$placeholder".to_string()),
        email: Set(format!("{}@example.com", account)),
        phone: Set(None),
        avatar: Set("/static/avatar.png".to_string()),
        role: Set(MemberRole::General),
        status: Set(MemberStatus::Active),
        create_at: Set(0),
        create_time: Set(Utc::now()),
        last_login_time: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert member")
}

async fn insert_book(db: &DatabaseConnection, identify: &str, owner: i32) -> book::Model {
    let now = Utc::now();
    book::ActiveModel {
        book_name: Set(format!("Book {}", identify)),
        identify: Set(identify.to_string()),
        order_index: Set(0),
        description: Set(String::new()),
        label: Set(String::new()),
        comment_status: Set(CommentPolicy::Closed),
        privately_owned: Set(Visibility::Public),
        private_token: Set(None),
        member_id: Set(owner),
        create_time: Set(now),
        modify_time: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert book")
}

async fn insert_relationship(
    db: &DatabaseConnection,
    book_id: i32,
    member_id: i32,
    role: BookRole,
) -> Result<relationship::Model, sea_orm::DbErr> {
    relationship::ActiveModel {
        book_id: Set(book_id),
        member_id: Set(member_id),
        role_id: Set(role),
        ..Default::default()
    }
    .insert(db)
    .await
}

#[tokio::test]
async fn test_database_connection() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let backend = db.get_database_backend();
    assert!(matches!(backend, sea_orm::DatabaseBackend::Sqlite));
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let result = migrate(&db).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_default_site_options_are_seeded() {
    let db = setup_test_db().await;

    let token_size = site_option::Entity::find()
        .filter(site_option::Column::OptionName.eq("TOKEN_SIZE"))
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("TOKEN_SIZE option missing");
    assert_eq!(token_size.option_value, "");

    let count = site_option::Entity::find()
        .count(&db)
        .await
        .expect("Failed to count");
    assert_eq!(count, 4);
}

#[tokio::test]
async fn test_member_enums_round_trip() {
    let db = setup_test_db().await;

    let inserted = insert_member(&db, "alice").await;

    let found = member::Entity::find_by_id(inserted.member_id)
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("Member not found");

    assert_eq!(found.role, MemberRole::General);
    assert_eq!(found.status, MemberStatus::Active);
    assert!(found.phone.is_none());
}

#[tokio::test]
async fn test_duplicate_account_rejected() {
    let db = setup_test_db().await;

    insert_member(&db, "alice").await;

    let duplicate = member::ActiveModel {
        account: Set("alice".to_string()),
        password: Set("hash".to_string()),
        email: Set("other@example.com".to_string()),
        phone: Set(None),
        avatar: Set(String::new()),
        role: Set(MemberRole::General),
        status: Set(MemberStatus::Active),
        create_at: Set(0),
        create_time: Set(Utc::now()),
        last_login_time: Set(None),
        ..Default::default()
    }
    .insert(&db)
    .await;

    assert!(duplicate.is_err(), "account must be unique");
}

#[tokio::test]
async fn test_single_founder_index() {
    let db = setup_test_db().await;

    let alice = insert_member(&db, "alice").await;
    let bob = insert_member(&db, "bob").await;
    let book = insert_book(&db, "proj-x", alice.member_id).await;

    insert_relationship(&db, book.book_id, alice.member_id, BookRole::Founder)
        .await
        .expect("First founder should insert");

    let second = insert_relationship(&db, book.book_id, bob.member_id, BookRole::Founder).await;
    assert!(second.is_err(), "a book cannot have two founders");

    insert_relationship(&db, book.book_id, bob.member_id, BookRole::Editor)
        .await
        .expect("Non-founder roles are unrestricted");
}

#[tokio::test]
async fn test_duplicate_relationship_rejected() {
    let db = setup_test_db().await;

    let alice = insert_member(&db, "alice").await;
    let book = insert_book(&db, "proj-y", alice.member_id).await;

    insert_relationship(&db, book.book_id, alice.member_id, BookRole::Founder)
        .await
        .expect("Failed to insert");

    let again = insert_relationship(&db, book.book_id, alice.member_id, BookRole::Editor).await;
    assert!(again.is_err(), "one relationship row per (book, member)");
}

#[tokio::test]
async fn test_private_token_is_optional() {
    let db = setup_test_db().await;

    let alice = insert_member(&db, "alice").await;
    let book = insert_book(&db, "proj-z", alice.member_id).await;
    assert!(book.private_token.is_none());

    let mut active: book::ActiveModel = book.into();
    active.privately_owned = Set(Visibility::Private);
    active.private_token = Set(Some("abc123".to_string()));
    let updated = active.update(&db).await.expect("Failed to update");

    assert_eq!(updated.privately_owned, Visibility::Private);
    assert_eq!(updated.private_token.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_comment_policy_parse() {
    assert_eq!(CommentPolicy::parse_or_closed("open"), CommentPolicy::Open);
    assert_eq!(
        CommentPolicy::parse_or_closed("registered_only"),
        CommentPolicy::RegisteredOnly
    );
    assert_eq!(CommentPolicy::parse_or_closed("whatever"), CommentPolicy::Closed);
}
