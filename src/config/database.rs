//! Database configuration module for the local snapshot cache.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity` from the entity
//! definitions, so the schema always matches the Rust structs. Creation is
//! idempotent because the cache is reopened on every session start.

use crate::config::settings::LedgerConfig;
use crate::entities::{ExpenseRecord, LogEntry, Participant, Person, SystemState};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Fallback location of the cache database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/lunch_ledger.sqlite?mode=rwc";

/// Resolves the database URL.
///
/// `DATABASE_URL` from the environment wins, then the configured value, then
/// [`DEFAULT_DATABASE_URL`].
#[must_use]
pub fn get_database_url(config: &LedgerConfig) -> String {
    std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| config.database_url.clone())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Connects to the cache database and makes sure every table exists.
#[instrument(skip(config), fields(group_id = %config.group_id))]
pub async fn create_connection(config: &LedgerConfig) -> Result<DatabaseConnection> {
    let database_url = get_database_url(config);
    ensure_parent_dir(&database_url)?;
    debug!("Connecting to snapshot cache at {}", database_url);
    let db = Database::connect(&database_url).await?;
    create_tables(&db).await?;
    info!("Snapshot cache ready");
    Ok(db)
}

/// Creates the directory holding a file-backed `SQLite` database.
fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

async fn create_table_for<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all cache tables that do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table_for(db, &schema, Person).await?;
    create_table_for(db, &schema, ExpenseRecord).await?;
    create_table_for(db, &schema, Participant).await?;
    create_table_for(db, &schema, LogEntry).await?;
    create_table_for(db, &schema, SystemState).await?;

    Ok(())
}
