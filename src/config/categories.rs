//! Category tree configuration loading from config.toml
//!
//! The categories defined in config.toml seed an empty database on first start.
//! Children nest under their parent:
//!
//! ```toml
//! [[categories]]
//! title = "Internal"
//!
//! [[categories.children]]
//! title = "Meetings"
//! ```

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Root categories to seed
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

/// One category and the categories below it
#[derive(Debug, Clone, Deserialize)]
pub struct CategorySeed {
    /// Category title
    pub title: String,
    /// Child categories
    #[serde(default)]
    pub children: Vec<CategorySeed>,
}

/// Loads the category configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads category configuration from the default location (./config.toml),
/// returning an empty configuration when the file does not exist.
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config(path)
}
