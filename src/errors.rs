//! Unified error type for the time ledger.
//!
//! Domain failures (missing rows, duplicate links, malformed input) get their own
//! variants so callers can tell them apart; everything else collapses into an
//! opaque internal failure. `Error::kind` gives the boundary layer a coarse class
//! to map onto responses.

use std::time::Duration;
use thiserror::Error;

/// Coarse classification of an [`Error`] for the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested entity or link does not exist (or is not owned by the caller)
    NotFound,
    /// A uniqueness rule was violated
    Conflict,
    /// Input was rejected before reaching storage
    Validation,
    /// Storage, runtime or configuration failure
    Internal,
}

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("{operation} did not finish within {limit:?}")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },

    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Category not found: {id}")]
    CategoryNotFound { id: i64 },

    #[error("Category {id} was not toggled")]
    NotToggled { id: i64 },

    #[error("User {user_id} already follows category {category_id}")]
    AlreadyFollowed { category_id: i64, user_id: i64 },

    #[error("Category {category_id} was not followed by user {user_id}")]
    CategoryNotFollowed { category_id: i64, user_id: i64 },

    #[error("User {user_id} is not following category {category_id}")]
    NotFollowingCategory { category_id: i64, user_id: i64 },

    #[error("Time entry not found: {id}")]
    TimeEntryNotFound { id: i64 },

    #[error("Time entry {id} was not deleted")]
    NotDeleted { id: i64 },

    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("Email is already in use: {email}")]
    DuplicateEmail { email: String },

    #[error("No expected hours for user {user_id} on weekday {weekday}")]
    WeekdayHoursMissing { user_id: i64, weekday: u32 },

    #[error("Invalid category title: {message}")]
    InvalidTitle { message: String },

    #[error("Invalid duration: {value:?}")]
    InvalidDuration { value: String },

    #[error("Invalid {field}: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("From date {from} cannot be after to date {to}")]
    InvalidDateRange {
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    },

    #[error("Invalid category id: {value:?}")]
    InvalidCategoryId { value: String },

    #[error("Invalid user id: {value:?}")]
    InvalidUserId { value: String },

    #[error("Invalid weekday {weekday}, expected 0 (Sunday) to 6 (Saturday)")]
    InvalidWeekday { weekday: u32 },

    #[error("Invalid month {month}/{year}")]
    InvalidMonth { month: u32, year: i32 },

    #[error("Invalid user input: {message}")]
    InvalidUserInput { message: String },
}

impl Error {
    /// Classifies the error for response mapping.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CategoryNotFound { .. }
            | Self::NotToggled { .. }
            | Self::NotFollowingCategory { .. }
            | Self::TimeEntryNotFound { .. }
            | Self::NotDeleted { .. }
            | Self::UserNotFound { .. }
            | Self::WeekdayHoursMissing { .. } => ErrorKind::NotFound,
            Self::AlreadyFollowed { .. } | Self::DuplicateEmail { .. } => ErrorKind::Conflict,
            Self::InvalidTitle { .. }
            | Self::InvalidDuration { .. }
            | Self::InvalidDate { .. }
            | Self::InvalidDateRange { .. }
            | Self::InvalidCategoryId { .. }
            | Self::InvalidUserId { .. }
            | Self::InvalidWeekday { .. }
            | Self::InvalidMonth { .. }
            | Self::InvalidUserInput { .. } => ErrorKind::Validation,
            Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Timeout { .. }
            | Self::TaskJoin(_)
            | Self::CategoryNotFollowed { .. } => ErrorKind::Internal,
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
