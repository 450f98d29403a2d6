/// Database configuration and connection management
pub mod database;

/// Category tree seeding from config.toml
pub mod categories;
