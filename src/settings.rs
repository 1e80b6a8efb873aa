//! Settings and logging setup.
//!
//! Settings are layered: built-in defaults, then an optional file (any format
//! the `config` crate understands, e.g. `rowsift.toml`), then `ROWSIFT_*`
//! environment variables such as `ROWSIFT_DEFAULT_PAGE_SIZE=50`.

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::criteria::DEFAULT_PAGE_SIZE;
use crate::error::{Result, SiftError};
use crate::persist::PersistenceMode;

pub const DEFAULT_LOG_FILTER: &str = "rowsift=info";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Page size used when search criteria carry no paging.
    pub default_page_size: u32,
    /// `tracing` filter directives, overridden by `RUST_LOG` when set.
    pub log_filter: String,
    /// `":memory:"` or a path to an SQLite file.
    pub database: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            database: None,
        }
    }
}

impl Settings {
    /// Loads settings from `path` (extension optional, file optional) and the environment.
    pub fn load(path: &str) -> Result<Self> {
        let settings: Settings = Config::builder()
            .set_default("default_page_size", i64::from(DEFAULT_PAGE_SIZE))?
            .set_default("log_filter", DEFAULT_LOG_FILTER)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("ROWSIFT"))
            .build()?
            .try_deserialize()?;
        if settings.default_page_size < 1 {
            return Err(SiftError::Config("default_page_size must be at least 1".to_string()));
        }
        Ok(settings)
    }

    pub fn persistence_mode(&self) -> PersistenceMode {
        PersistenceMode::from_setting(self.database.as_deref())
    }
}

/// Installs a global `tracing` subscriber. Returns false when one was
/// already installed, which is not an error.
pub fn init_logging(settings: &Settings) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.log_filter)
            .map_err(|e| SiftError::Config(format!("log filter '{}': {}", settings.log_filter, e)))?,
    };
    Ok(tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok())
}
