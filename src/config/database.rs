//! Database configuration module for the time ledger.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema (including the foreign keys
//! between categories, users, entries and hours) always matches the Rust models.

use crate::entities::{Category, CategoryFollow, TimeEntry, User, WeekdayHours};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/time_ledger.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or returns
/// the default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
#[instrument]
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table that does not exist yet.
///
/// Tables are created parents first so the foreign keys always point at an
/// existing table: users, categories, follow links, time entries, weekday hours.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Category).await?;
    create_table(db, &schema, CategoryFollow).await?;
    create_table(db, &schema, TimeEntry).await?;
    create_table(db, &schema, WeekdayHours).await?;

    info!("Database tables ensured.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CategoryModel, TimeEntryModel, UserModel, WeekdayHoursModel};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<CategoryModel> = Category::find().limit(1).all(&db).await?;
        let _: Vec<TimeEntryModel> = TimeEntry::find().limit(1).all(&db).await?;
        let _: Vec<WeekdayHoursModel> = WeekdayHours::find().limit(1).all(&db).await?;
        let _ = CategoryFollow::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
