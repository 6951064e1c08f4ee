//! Configuration for hosts embedding the invitation registry.
//!
//! Loaded from `$INVITE_CONFIG` or `~/.invite/config.toml`:
//!
//! ```toml
//! [registry]
//! owner = "0x1111111111111111111111111111111111111111"
//! max_batch_size = 500
//!
//! [store]
//! path = "${HOME}/.invite/registry.db"
//!
//! [logging]
//! filter = "invite_core=debug,info"
//! file = "/var/log/invite.log"
//! ```

pub mod logging;

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;
use thiserror::Error;

use invite_core::RegistryLimits;
use invite_types::{DecodeError, Identity};

pub use logging::{LoggingConfig, init_tracing};

pub const CONFIG_ENV_VAR: &str = "INVITE_CONFIG";

#[derive(Debug, Default, Deserialize)]
pub struct InviteConfig {
    pub registry: Option<RegistryConfig>,
    pub store: Option<StoreConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegistryConfig {
    /// Identity that creates (and therefore owns) a fresh registry.
    pub owner: Option<String>,
    /// Largest accepted `add_multiple` batch. Default: 10000.
    pub max_batch_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path. Default: `~/.invite/registry.db`.
    pub path: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid registry owner {value:?}: {source}")]
    InvalidOwner { value: String, source: DecodeError },
    #[error("registry.max_batch_size must be at least 1")]
    InvalidBatchSize,
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::InvalidOwner { .. } | ConfigError::InvalidBatchSize => None,
        }
    }
}

impl InviteConfig {
    /// Load from the default location. `Ok(None)` when no config file exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {:?}: {}", path, source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map(Some).map_err(|source| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, source);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// The configured owner identity, with `${VAR}` references expanded.
    pub fn owner(&self) -> Result<Option<Identity>, ConfigError> {
        let Some(raw) = self.registry.as_ref().and_then(|r| r.owner.as_deref()) else {
            return Ok(None);
        };
        let value = expand_env_vars(raw);
        value
            .trim()
            .parse()
            .map(Some)
            .map_err(|source| ConfigError::InvalidOwner { value, source })
    }

    pub fn limits(&self) -> Result<RegistryLimits, ConfigError> {
        let mut limits = RegistryLimits::default();
        if let Some(max) = self.registry.as_ref().and_then(|r| r.max_batch_size) {
            if max == 0 {
                return Err(ConfigError::InvalidBatchSize);
            }
            limits.max_batch_size = max;
        }
        Ok(limits)
    }

    /// Configured store path, falling back to `~/.invite/registry.db`.
    #[must_use]
    pub fn store_path(&self) -> Option<PathBuf> {
        self.store
            .as_ref()
            .and_then(|s| s.path.as_deref())
            .map(|p| PathBuf::from(expand_env_vars(p)))
            .or_else(default_store_path)
    }

    #[must_use]
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }
    invite_dir().map(|dir| dir.join("config.toml"))
}

#[must_use]
pub fn default_store_path() -> Option<PathBuf> {
    invite_dir().map(|dir| dir.join("registry.db"))
}

fn invite_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".invite"))
}

/// Replace `${VAR}` with the variable's value. Missing variables become empty;
/// unterminated or empty references are kept verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                out.push_str(&env::var(&after[..end]).unwrap_or_default());
                rest = &after[end + 1..];
            }
            _ => {
                out.push_str("${");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
