//! Persistence layer for the docdesk control plane
//!
//! Supports the backends sea-orm is compiled with:
//! - **PostgreSQL** (production deployments)
//! - **SQLite3** (single-node deployments, `"sqlite://./docdesk.db?mode=rwc"`)
//! - **SQLite3 in-memory** (tests, `"sqlite::memory:"`)

pub mod entities;
pub mod migrator;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

/// Initialize database connection
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    let backend = db.get_database_backend();
    info!("Connected to database backend: {:?}", backend);

    Ok(db)
}

/// Run migrations
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    use sea_orm_migration::MigratorTrait;

    info!("Running database migrations...");
    migrator::Migrator::up(db, None).await?;
    info!("Database migrations completed");

    Ok(())
}
