//! core::options
//!
//! Repository options: where the working copy lives, where it came from,
//! and how to authenticate against the remote.
//!
//! Options are built once and never mutated after a handle has been
//! created from them.
//!
//! # Example
//!
//! ```
//! use refscope::core::options::RepoOptions;
//!
//! let options = RepoOptions::new("/work/deploy")
//!     .with_url("https://github.com/acme/deploy.git")
//!     .with_token("s3cret");
//!
//! assert_eq!(options.username(), "git");
//! assert!(!format!("{:?}", options).contains("s3cret"));
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

/// Username sent alongside the token when the remote asks for credentials.
///
/// Hosted forges ignore it for token auth but libgit2 requires one.
pub const DEFAULT_USERNAME: &str = "git";

/// Immutable repository configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct RepoOptions {
    path: PathBuf,
    url: Option<String>,
    token: Option<String>,
    username: String,
}

impl RepoOptions {
    /// Options for a working copy at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            url: None,
            token: None,
            username: DEFAULT_USERNAME.to_string(),
        }
    }

    /// Set the remote URL used for cloning.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the auth token used as the basic-auth password.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Override the username placeholder.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for RepoOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoOptions")
            .field("path", &self.path)
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("username", &self.username)
            .finish()
    }
}
