//! engine
//!
//! Reference resolution, checkout and change detection.
//!
//! # Architecture
//!
//! [`RefEngine`] owns one [`RepoBackend`] and exposes the operations a
//! delivery pipeline needs, each in its own module:
//!
//! - [`resolve`]: classify a string as branch, tag or commit (local first,
//!   then `origin`)
//! - [`fetch`]: bulk or narrow fetches from `origin`
//! - [`checkout`]: the branch/tag/commit checkout state machine
//! - [`content`]: file contents at a commit or branch tip
//! - [`changes`]: changed paths between two refs, optionally filtered
//!
//! Data flows top-down on demand: classify, fetch if remote data is needed,
//! then operate on locally resolvable commits.
//!
//! # Invariants
//!
//! - Nothing is cached between calls; every operation re-reads refs
//! - The engine never reads the environment or writes to stdout/stderr
//! - Operations are synchronous and assume a single writer per working copy
//!
//! # Example
//!
//! ```ignore
//! use refscope::core::options::RepoOptions;
//! use refscope::engine::RefEngine;
//!
//! let options = RepoOptions::new("/work/deploy")
//!     .with_url("https://github.com/acme/deploy.git")
//!     .with_token(token);
//! let engine = RefEngine::ensure_local(&options)?;
//!
//! let reference = engine.checkout("release-2024.06")?;
//! let changed = engine.changed_files_for_pr(42)?;
//! ```

pub mod changes;
pub mod checkout;
pub mod content;
pub mod error;
pub mod fetch;
pub mod resolve;

pub use checkout::CheckoutPlan;
pub use error::{EngineError, RepoOperation};
pub use resolve::Classification;

use crate::core::options::RepoOptions;
use crate::git::{Git, RepoBackend};

/// The reference resolution and change-detection engine.
///
/// Generic over its backend so the logic can be exercised against
/// [`MockBackend`](crate::git::mock::MockBackend).
#[derive(Debug)]
pub struct RefEngine<B: RepoBackend = Git> {
    backend: B,
}

impl<B: RepoBackend> RefEngine<B> {
    /// Wrap an existing backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Borrow the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Give the backend back.
    pub fn into_backend(self) -> B {
        self.backend
    }
}

impl RefEngine<Git> {
    /// Open the working copy at `options.path()`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::RepositoryUnavailable`] with [`RepoOperation::Open`]
    pub fn open(options: &RepoOptions) -> Result<Self, EngineError> {
        Git::open(options)
            .map(Self::new)
            .map_err(|source| EngineError::RepositoryUnavailable {
                operation: RepoOperation::Open,
                path: options.path().to_path_buf(),
                source,
            })
    }

    /// Clone `options.url()` into `options.path()`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::RepositoryUnavailable`] with [`RepoOperation::Clone`]
    pub fn clone_remote(options: &RepoOptions) -> Result<Self, EngineError> {
        Git::clone(options)
            .map(Self::new)
            .map_err(|source| EngineError::RepositoryUnavailable {
                operation: RepoOperation::Clone,
                path: options.path().to_path_buf(),
                source,
            })
    }

    /// Clone if `<path>/.git` is absent, otherwise open.
    ///
    /// Idempotent: a second call on a freshly cloned path just opens it.
    pub fn ensure_local(options: &RepoOptions) -> Result<Self, EngineError> {
        if options.path().join(".git").exists() {
            Self::open(options)
        } else {
            tracing::info!(path = %options.path().display(), "no local repository, cloning");
            Self::clone_remote(options)
        }
    }
}
