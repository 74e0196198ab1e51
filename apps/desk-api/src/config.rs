//! Desk API configuration.
//!
//! Loaded once at startup, in three layers:
//!
//! ```text
//!   defaults ──► TOML file ($RESORT_DESK_CONFIG) ──► RESORT_* environment
//!                (optional)                          (wins)
//! ```
//!
//! The storage backend is always named explicitly. Nothing is inferred from
//! the environment the process happens to run in.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use resort_db::DbConfig;
use serde::{Deserialize, Serialize};

/// Environment variable naming the optional TOML file.
pub const CONFIG_FILE_ENV: &str = "RESORT_DESK_CONFIG";

/// Where bookings and ledger entries are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// A SQLite file that survives restarts.
    #[default]
    Sqlite,
    /// A private in-memory database, gone when the process exits.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::InvalidValue("RESORT_STORAGE".to_string())),
        }
    }
}

/// Desk API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Listen address
    pub bind_addr: SocketAddr,

    pub storage: StorageBackend,

    /// SQLite file; defaults to `desk.db` in the platform data directory
    pub db_path: Option<PathBuf>,

    /// When set, writes need `X-API-Key` or `Authorization: Bearer`
    pub api_key: Option<String>,

    /// Requests allowed per client per window
    pub rate_limit_max: u32,

    pub rate_limit_window_secs: u64,

    /// How often expired rate-limit windows are evicted
    pub rate_limit_sweep_secs: u64,

    /// Resort offset from UTC; 420 is Asia/Bangkok
    pub utc_offset_minutes: i32,
}

impl Default for DeskConfig {
    fn default() -> Self {
        DeskConfig {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            storage: StorageBackend::Sqlite,
            db_path: None,
            api_key: None,
            rate_limit_max: 100,
            rate_limit_window_secs: 60,
            rate_limit_sweep_secs: 300,
            utc_offset_minutes: 420,
        }
    }
}

impl DeskConfig {
    /// Loads configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = env::var_os(CONFIG_FILE_ENV).map(PathBuf::from);
        Self::load_from(file.as_deref(), |key| env::var(key).ok())
    }

    /// Loads configuration from an optional file and an environment lookup.
    pub fn load_from(
        file: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str(&text)?
            }
            None => DeskConfig::default(),
        };

        config.apply_env(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(addr) = parsed(lookup, "RESORT_BIND_ADDR")? {
            self.bind_addr = addr;
        }
        if let Some(storage) = lookup("RESORT_STORAGE") {
            self.storage = storage.parse()?;
        }
        if let Some(path) = lookup("RESORT_DB_PATH") {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(key) = lookup("RESORT_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(max) = parsed(lookup, "RESORT_RATE_LIMIT_MAX")? {
            self.rate_limit_max = max;
        }
        if let Some(secs) = parsed(lookup, "RESORT_RATE_LIMIT_WINDOW_SECS")? {
            self.rate_limit_window_secs = secs;
        }
        if let Some(secs) = parsed(lookup, "RESORT_RATE_LIMIT_SWEEP_SECS")? {
            self.rate_limit_sweep_secs = secs;
        }
        if let Some(minutes) = parsed(lookup, "RESORT_UTC_OFFSET_MINUTES")? {
            self.utc_offset_minutes = minutes;
        }

        // An empty key is the same as no key
        if self.api_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
            self.api_key = None;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit_max == 0 {
            return Err(ConfigError::InvalidValue("rate_limit_max".to_string()));
        }
        if self.rate_limit_window_secs == 0 {
            return Err(ConfigError::InvalidValue("rate_limit_window_secs".to_string()));
        }
        if self.rate_limit_sweep_secs == 0 {
            return Err(ConfigError::InvalidValue("rate_limit_sweep_secs".to_string()));
        }
        // Real offsets run from UTC-12 to UTC+14
        if !(-12 * 60..=14 * 60).contains(&self.utc_offset_minutes) {
            return Err(ConfigError::InvalidValue("utc_offset_minutes".to_string()));
        }
        Ok(())
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn rate_limit_sweep(&self) -> Duration {
        Duration::from_secs(self.rate_limit_sweep_secs)
    }

    /// Database settings for the configured backend.
    pub fn db_config(&self) -> Result<DbConfig, ConfigError> {
        match self.storage {
            StorageBackend::Memory => Ok(DbConfig::in_memory()),
            StorageBackend::Sqlite => {
                let path = match &self.db_path {
                    Some(path) => path.clone(),
                    None => default_db_path()
                        .ok_or_else(|| ConfigError::MissingRequired("db_path".to_string()))?,
                };
                Ok(DbConfig::new(path))
            }
        }
    }
}

/// `desk.db` in the platform data directory, when there is one.
pub fn default_db_path() -> Option<PathBuf> {
    ProjectDirs::from("th", "resort", "desk").map(|dirs| dirs.data_dir().join("desk.db"))
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file: {0}")]
    Parse(#[from] toml::de::Error),
}
