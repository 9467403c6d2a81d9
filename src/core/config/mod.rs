//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (applied with [`Config::with_overrides`])
//!
//! # Config Locations
//!
//! The first file found wins:
//! 1. An explicit path (`--config`); it must exist
//! 2. `$REFSCOPE_CONFIG` if set
//! 3. `./refscope.toml`
//! 4. `<config dir>/refscope/config.toml` (e.g. `~/.config/refscope/config.toml`)
//!
//! # Example
//!
//! ```no_run
//! use refscope::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! let options = config.to_options(std::env::var("REFSCOPE_TOKEN").ok());
//! println!("Working copy: {}", options.path().display());
//! ```

pub mod schema;

pub use schema::{ConfigFile, RepositoryConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::options::{RepoOptions, DEFAULT_USERNAME};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "REFSCOPE_CONFIG";

/// Config file name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "refscope.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents (defaults if no file was found)
    pub file: ConfigFile,
    /// Path to the loaded config file (if any)
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the explicit path or the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit path cannot be read, or if a config
    /// file exists but cannot be parsed or validated. Missing default
    /// locations are not an error (defaults are used).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for path in Self::search_paths() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Read, parse and validate a single config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Self {
            file,
            loaded_from: Some(path.to_path_buf()),
        })
    }

    /// Default locations, in search order.
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            paths.push(PathBuf::from(path));
        }

        paths.push(PathBuf::from(LOCAL_CONFIG_FILE));

        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("refscope/config.toml"));
        }

        paths
    }

    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(
        mut self,
        path: Option<PathBuf>,
        url: Option<String>,
        username: Option<String>,
    ) -> Self {
        let repo = self.file.repository.get_or_insert_with(Default::default);
        if path.is_some() {
            repo.path = path;
        }
        if url.is_some() {
            repo.url = url;
        }
        if username.is_some() {
            repo.username = username;
        }
        self
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Working copy path.
    ///
    /// Defaults to the current directory if not configured.
    pub fn path(&self) -> PathBuf {
        self.repository()
            .and_then(|r| r.path.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Remote URL, if configured.
    pub fn url(&self) -> Option<&str> {
        self.repository().and_then(|r| r.url.as_deref())
    }

    /// Username placeholder.
    ///
    /// Defaults to "git" if not configured.
    pub fn username(&self) -> &str {
        self.repository()
            .and_then(|r| r.username.as_deref())
            .unwrap_or(DEFAULT_USERNAME)
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }

    /// Build repository options; the token never comes from the file.
    pub fn to_options(&self, token: Option<String>) -> RepoOptions {
        let mut options = RepoOptions::new(self.path()).with_username(self.username());
        if let Some(url) = self.url() {
            options = options.with_url(url);
        }
        if let Some(token) = token {
            options = options.with_token(token);
        }
        options
    }

    fn repository(&self) -> Option<&RepositoryConfig> {
        self.file.repository.as_ref()
    }
}
