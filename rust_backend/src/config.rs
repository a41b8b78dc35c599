//! Bridge configuration file support.
//!
//! Settings are read from a TOML file and then overridden by environment
//! variables:
//!
//! ```toml
//! [engine]
//! kind = "native"                  # or "builtin"
//! ephe_path = "/usr/share/sweph"   # optional
//! after_close = "reinitialize"     # or "reject"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Explicit configuration file location
pub const CONFIG_ENV: &str = "SWEPH_CONFIG";
/// Ephemeris search path override
pub const EPHE_PATH_ENV: &str = "SE_EPHE_PATH";
pub const ENGINE_ENV: &str = "SWEPH_ENGINE";
pub const AFTER_CLOSE_ENV: &str = "SWEPH_AFTER_CLOSE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Which engine implementation serves the calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Builtin,
    Native,
}

impl Default for EngineKind {
    /// The linked library whenever the crate is built with it.
    fn default() -> Self {
        if cfg!(feature = "native") {
            Self::Native
        } else {
            Self::Builtin
        }
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "builtin" | "analytical" => Ok(Self::Builtin),
            "native" | "swisseph" | "libswe" => Ok(Self::Native),
            other => Err(format!(
                "unknown engine '{}'. Use 'builtin' or 'native'",
                other
            )),
        }
    }
}

/// Behaviour of operations issued after `close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosePolicy {
    /// Reopen transparently and re-apply the configured default path.
    #[default]
    Reinitialize,
    /// Fail with "engine closed" until the path is configured again.
    Reject,
}

impl FromStr for ClosePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reinitialize" | "reinit" => Ok(Self::Reinitialize),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unknown after_close policy '{}'. Use 'reinitialize' or 'reject'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub kind: EngineKind,
    #[serde(default)]
    pub ephe_path: Option<String>,
    #[serde(default)]
    pub after_close: ClosePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub engine: EngineSettings,
}

impl BridgeConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: BridgeConfig = toml::from_str(content)?;
        if config.engine.ephe_path.as_deref().map(str::trim) == Some("") {
            config.engine.ephe_path = None;
        }
        Ok(config)
    }

    /// Load from `SWEPH_CONFIG` or the first `sweph.toml` found in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    ///
    /// Returns the defaults when no file exists.
    pub fn from_default_location() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(path);
        }

        let search_paths = [
            PathBuf::from("sweph.toml"),
            PathBuf::from("rust_backend/sweph.toml"),
            PathBuf::from("../sweph.toml"),
        ];
        for path in search_paths {
            if path.exists() {
                log::debug!("Loading bridge configuration from {}", path.display());
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Default location plus process environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_default_location()?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(EPHE_PATH_ENV) {
            let path = path.trim();
            self.engine.ephe_path = (!path.is_empty()).then(|| path.to_string());
        }
        if let Some(kind) = lookup(ENGINE_ENV) {
            self.engine.kind = kind.parse().map_err(|message| ConfigError::InvalidValue {
                key: ENGINE_ENV.to_string(),
                message,
            })?;
        }
        if let Some(policy) = lookup(AFTER_CLOSE_ENV) {
            self.engine.after_close =
                policy.parse().map_err(|message| ConfigError::InvalidValue {
                    key: AFTER_CLOSE_ENV.to_string(),
                    message,
                })?;
        }
        Ok(())
    }
}
