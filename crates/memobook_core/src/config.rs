//! Application configuration.
//!
//! # Responsibility
//! - Load an optional TOML file with per-key defaults.
//! - Resolve default data/log locations under the platform data dir.
//!
//! # Invariants
//! - A missing file yields `AppConfig::default()`.
//! - Unknown keys and out-of-range values are rejected, never ignored.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file for front ends.
pub const CONFIG_ENV_VAR: &str = "MEMOBOOK_CONFIG";

const APP_DIR_NAME: &str = "memobook";
const DB_FILE_NAME: &str = "todos.db";
const LOG_DIR_NAME: &str = "logs";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    InvalidValue { key: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::InvalidValue { key, reason } => write!(f, "invalid `{key}`: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// Top-level configuration file shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub panel: PanelConfig,
    pub input: InputConfig,
}

/// `[panel]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    pub width: i32,
    pub height: i32,
    pub default_x: i32,
    pub default_y: i32,
    pub peek_margin: i32,
    pub edge_tolerance: i32,
    pub restore_tolerance: i32,
    pub edge_poll_ms: u64,
    pub toggle_settle_ms: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 500,
            default_x: 0,
            default_y: 0,
            peek_margin: 10,
            edge_tolerance: 5,
            restore_tolerance: 10,
            edge_poll_ms: 500,
            toggle_settle_ms: 100,
        }
    }
}

/// `[input]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 200,
        }
    }
}

impl AppConfig {
    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str, origin: &Path) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        positive("panel.width", self.panel.width)?;
        positive("panel.height", self.panel.height)?;
        positive("input.width", self.input.width)?;
        positive("input.height", self.input.height)?;
        non_negative("panel.peek_margin", self.panel.peek_margin)?;
        non_negative("panel.edge_tolerance", self.panel.edge_tolerance)?;
        non_negative("panel.restore_tolerance", self.panel.restore_tolerance)?;
        if self.panel.peek_margin > self.panel.height {
            return Err(ConfigError::InvalidValue {
                key: "panel.peek_margin",
                reason: "must not exceed panel.height".to_string(),
            });
        }
        if self.panel.edge_poll_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "panel.edge_poll_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Database file, defaulting under the platform data dir.
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| app_data_dir().join(DB_FILE_NAME))
    }

    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| app_data_dir().join(LOG_DIR_NAME))
    }

    pub fn resolved_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }
}

/// Loads `path`, falling back to defaults when the file does not exist.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => AppConfig::from_toml_str(&text, path),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::debug!(
                "event=config_load module=config status=skip reason=not_found path={}",
                path.display()
            );
            Ok(AppConfig::default())
        }
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads the file named by `MEMOBOOK_CONFIG`, or defaults when unset.
pub fn load_config_from_env() -> ConfigResult<AppConfig> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => load_config(PathBuf::from(path)),
        _ => Ok(AppConfig::default()),
    }
}

fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

fn positive(key: &'static str, value: i32) -> ConfigResult<()> {
    if value <= 0 {
        return Err(ConfigError::InvalidValue {
            key,
            reason: format!("must be positive, got {value}"),
        });
    }
    Ok(())
}

fn non_negative(key: &'static str, value: i32) -> ConfigResult<()> {
    if value < 0 {
        return Err(ConfigError::InvalidValue {
            key,
            reason: format!("must not be negative, got {value}"),
        });
    }
    Ok(())
}
