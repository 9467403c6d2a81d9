//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing: any value that is present
//! must be non-empty. Missing values fall back to defaults or CLI flags.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// [repository]
/// path = "/work/deploy-repo"
/// url = "https://github.com/acme/deploy-repo.git"
/// username = "git"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// The working copy and its remote
    pub repository: Option<RepositoryConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(repo) = &self.repository {
            repo.validate()?;
        }
        Ok(())
    }
}

/// The `[repository]` section.
///
/// There is no token key: the auth token is only accepted from the
/// command line or the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Local working copy path
    pub path: Option<PathBuf>,

    /// Remote URL (used when the working copy must be cloned)
    pub url: Option<String>,

    /// Username placeholder sent with the token
    pub username: Option<String>,
}

impl RepositoryConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "repository.path cannot be empty".into(),
                ));
            }
        }

        if let Some(url) = &self.url {
            if url.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "repository.url cannot be empty".into(),
                ));
            }
        }

        if let Some(username) = &self.username {
            if username.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "repository.username cannot be empty".into(),
                ));
            }
        }

        Ok(())
    }
}
