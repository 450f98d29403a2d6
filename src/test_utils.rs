//! Shared test utilities for the time ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        category::{self, Category, CreateCategoryInput},
        follow,
        time_entry::{self, RegisterTimeEntryInput},
        user::{self, RegisterUserInput},
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers a test user with the default weekday schedule.
///
/// # Defaults
/// * `email`: the lowercased name at `example.com`
pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> Result<entities::UserModel> {
    user::register(
        db,
        RegisterUserInput {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        },
    )
    .await
}

/// Creates a category, as a root when `parent_id` is None.
pub async fn create_test_category(
    db: &DatabaseConnection,
    title: &str,
    parent_id: Option<i64>,
) -> Result<Category> {
    category::create(
        db,
        CreateCategoryInput {
            title: title.to_string(),
            parent_id,
        },
    )
    .await
}

/// Logs a test entry with a duration given in text form.
///
/// # Defaults
/// * `description`: `"Test entry"`
pub async fn create_test_entry(
    db: &DatabaseConnection,
    user_id: i64,
    category_id: i64,
    date: NaiveDate,
    duration: &str,
) -> Result<entities::TimeEntryModel> {
    time_entry::register(
        db,
        user_id,
        RegisterTimeEntryInput {
            category_id,
            date,
            duration: duration.parse()?,
            description: "Test entry".to_string(),
        },
    )
    .await
}

/// Sets up a user who follows a single root leaf category.
/// Returns (db, user, leaf) for entry and summary tests.
pub async fn setup_with_leaf() -> Result<(DatabaseConnection, entities::UserModel, Category)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "Alice").await?;
    let leaf = create_test_category(&db, "Meetings", None).await?;
    follow::follow(&db, leaf.id, user.id).await?;
    Ok((db, user, leaf))
}
