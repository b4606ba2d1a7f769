//! Job configuration.
//!
//! Every setting can come from a flag or an environment variable; `main`
//! loads an optional `.env` file first so the variables can live there.
//!
//! | Variable            | Default              |
//! |---------------------|----------------------|
//! | `QUIZDB_INPUT`      | `/init-data/db.json` |
//! | `QUIZDB_DATA_DIR`   | `/data/db`           |
//! | `QUIZDB_DATABASE`   | `quizdb`             |
//! | `QUIZDB_COLLECTION` | `quiz_data`          |

use clap::Args;
use std::path::PathBuf;

use crate::error::{ConfigError, StoreResult};
use crate::store::JsonFileStore;

pub const DEFAULT_INPUT: &str = "/init-data/db.json";
pub const DEFAULT_DATA_DIR: &str = "/data/db";
pub const DEFAULT_DATABASE: &str = "quizdb";
pub const DEFAULT_COLLECTION: &str = "quiz_data";

/// Where the categories file is.
#[derive(Debug, Clone, Args)]
pub struct InputConfig {
    /// Categories JSON file
    #[arg(short, long, env = "QUIZDB_INPUT", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,
}

/// Which collection to reconcile.
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// Directory holding the database directories
    #[arg(long, env = "QUIZDB_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Database name
    #[arg(long, env = "QUIZDB_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Collection name
    #[arg(long, env = "QUIZDB_COLLECTION", default_value = DEFAULT_COLLECTION)]
    pub collection: String,
}

/// Everything a full run needs.
#[derive(Debug, Clone, Default, Args)]
pub struct JobConfig {
    #[command(flatten)]
    pub input: InputConfig,

    #[command(flatten)]
    pub store: StoreConfig,
}

impl StoreConfig {
    /// Reject names that are empty or would leave the data directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_name("database", &self.database)?;
        check_name("collection", &self.collection)
    }

    /// Open a session on the configured collection.
    pub async fn open(&self) -> StoreResult<JsonFileStore> {
        JsonFileStore::open(&self.data_dir, &self.database, &self.collection).await
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
        }
    }
}

fn check_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Empty { field });
    }
    if value.contains('/') || value.contains('\\') || value == "." || value == ".." {
        return Err(ConfigError::InvalidName {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
