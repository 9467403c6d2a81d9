//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to the object database and
//! the `origin` remote. All repository reads and writes flow through [`Git`],
//! which normalizes `git2` errors into typed failure categories.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: No repository at the given path
//! - [`GitError::CloneFailed`]: Clone could not complete
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//! - [`GitError::RemoteFailed`] / [`GitError::AuthFailed`]: `origin` unusable
//! - [`GitError::PathNotFound`]: File missing from a commit's tree
//!
//! # Example
//!
//! ```ignore
//! use refscope::core::options::RepoOptions;
//! use refscope::git::{Git, RepoBackend};
//!
//! let git = Git::open(&RepoOptions::new("/work/deploy"))?;
//! let head = git.head()?;
//! println!("HEAD is at {}", head.short(7));
//! ```

use std::cell::Cell;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::backend::{CheckoutTarget, FetchOutcome, RemoteRef, RepoBackend};
use crate::core::changeset::{ChangeStatus, ChangedFile};
use crate::core::options::RepoOptions;
use crate::core::types::{Oid, RefName, RefSpec, TypeError};

/// The only remote the engine talks to.
pub const ORIGIN: &str = "origin";

/// Errors from Git operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitError {
    /// No repository metadata at the path.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Clone could not complete (network, auth, or unusable destination).
    #[error("failed to clone '{url}': {message}")]
    CloneFailed {
        /// The URL being cloned
        url: String,
        /// Description of the failure
        message: String,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Path is not a file in the requested tree.
    #[error("path not found: {path}")]
    PathNotFound {
        /// The repository-relative path
        path: String,
    },

    /// The named remote is not configured.
    #[error("remote not found: {name}")]
    RemoteNotFound {
        /// The remote name
        name: String,
    },

    /// The remote could not be reached or refused the request.
    #[error("remote error: {message}")]
    RemoteFailed {
        /// Description of the failure
        message: String,
    },

    /// The remote rejected our credentials.
    #[error("authentication failed: {message}")]
    AuthFailed {
        /// Description of the failure
        message: String,
    },

    /// Checkout could not update the working copy.
    #[error("checkout of {target} failed: {message}")]
    CheckoutFailed {
        /// The ref or commit being checked out
        target: String,
        /// Description of the failure
        message: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    ///
    /// `context` is the ref name or object id being operated on.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::UnbornBranch => {
                if context.starts_with("refs/") || context == "HEAD" {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    /// Categorize a failure talking to a remote.
    fn from_remote(err: git2::Error) -> Self {
        if err.code() == git2::ErrorCode::Auth || err.message().contains(AUTH_REJECTED) {
            GitError::AuthFailed {
                message: err.message().to_string(),
            }
        } else {
            GitError::RemoteFailed {
                message: err.message().to_string(),
            }
        }
    }

    /// Whether this error means "the thing you asked for is not there".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GitError::RefNotFound { .. }
                | GitError::ObjectNotFound { .. }
                | GitError::PathNotFound { .. }
        )
    }

    /// Whether this error came from talking to the remote.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            GitError::RemoteNotFound { .. }
                | GitError::RemoteFailed { .. }
                | GitError::AuthFailed { .. }
        )
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidRefName(msg) | TypeError::InvalidRefSpec(msg) => {
                GitError::InvalidRefName { message: msg }
            }
        }
    }
}

const AUTH_REJECTED: &str = "credentials rejected by remote";

/// Basic-auth credentials for `origin`.
#[derive(Clone)]
struct Credentials {
    username: String,
    token: Option<String>,
}

impl Credentials {
    fn from_options(options: &RepoOptions) -> Self {
        Self {
            username: options.username().to_string(),
            token: options.token().map(str::to_string),
        }
    }

    /// Remote callbacks that answer one credential request.
    ///
    /// libgit2 re-invokes the callback after a rejection; answering twice
    /// would loop forever against a server that keeps saying no.
    fn callbacks(&self) -> git2::RemoteCallbacks<'_> {
        let mut callbacks = git2::RemoteCallbacks::new();
        let mut attempted = false;
        callbacks.credentials(move |_url, _username_from_url, allowed| {
            if attempted {
                return Err(git2::Error::from_str(AUTH_REJECTED));
            }
            attempted = true;

            match &self.token {
                Some(token) if allowed.contains(git2::CredentialType::USER_PASS_PLAINTEXT) => {
                    git2::Cred::userpass_plaintext(&self.username, token)
                }
                _ if allowed.contains(git2::CredentialType::DEFAULT) => git2::Cred::default(),
                _ => Err(git2::Error::from_str("no credentials available for remote")),
            }
        });
        callbacks
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// The Git interface.
///
/// Owns one working copy and its open repository. A handle assumes it is
/// the only writer; `Git` is `Send` but not `Sync`.
///
/// # Example
///
/// ```ignore
/// use refscope::core::options::RepoOptions;
/// use refscope::git::Git;
///
/// let options = RepoOptions::new("/work/deploy")
///     .with_url("https://github.com/acme/deploy.git")
///     .with_token(token);
/// let git = Git::clone(&options)?;
/// ```
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
    /// Credentials for talking to `origin`
    credentials: Credentials,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening
    // =========================================================================

    /// Open the repository at exactly `options.path()`.
    ///
    /// Unlike discovery, parent directories are not searched.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if there is no repository at the path
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(options: &RepoOptions) -> Result<Self, GitError> {
        let path = options.path();
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        tracing::info!(path = %path.display(), "opened repository");
        Ok(Self {
            repo,
            credentials: Credentials::from_options(options),
        })
    }

    /// Clone `options.url()` into `options.path()`.
    ///
    /// The token, if any, is sent as the basic-auth password with the
    /// configured username.
    ///
    /// # Errors
    ///
    /// - [`GitError::CloneFailed`] if no URL is configured, the remote is
    ///   unreachable, authentication fails, or the destination is unusable
    pub fn clone(options: &RepoOptions) -> Result<Self, GitError> {
        let url = options.url().ok_or_else(|| GitError::CloneFailed {
            url: String::new(),
            message: "no remote URL configured".into(),
        })?;
        let credentials = Credentials::from_options(options);

        tracing::info!(url, path = %options.path().display(), "cloning repository");
        let repo = {
            let mut fetch_options = git2::FetchOptions::new();
            fetch_options.remote_callbacks(credentials.callbacks());
            let mut builder = git2::build::RepoBuilder::new();
            builder.fetch_options(fetch_options);
            builder.clone(url, options.path())
        }
        .map_err(|e| GitError::CloneFailed {
            url: url.to_string(),
            message: e.message().to_string(),
        })?;

        Ok(Self { repo, credentials })
    }

    /// Path to the working directory.
    pub fn work_dir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn origin(&self) -> Result<git2::Remote<'_>, GitError> {
        self.repo.find_remote(ORIGIN).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::RemoteNotFound {
                    name: ORIGIN.to_string(),
                }
            } else {
                GitError::from_remote(e)
            }
        })
    }

    fn find_commit(&self, oid: &Oid) -> Result<git2::Commit<'_>, GitError> {
        let git_oid =
            git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        self.repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))
    }

    fn commit_tree(&self, oid: &Oid) -> Result<git2::Tree<'_>, GitError> {
        self.find_commit(oid)?
            .tree()
            .map_err(|e| GitError::from_git2(e, oid.as_str()))
    }
}

fn to_oid(oid: git2::Oid) -> Result<Oid, GitError> {
    Oid::new(oid.to_string()).map_err(|e| e.into())
}

fn change_status(delta: git2::Delta) -> ChangeStatus {
    match delta {
        git2::Delta::Added | git2::Delta::Untracked | git2::Delta::Copied => ChangeStatus::Added,
        git2::Delta::Deleted => ChangeStatus::Deleted,
        git2::Delta::Typechange => ChangeStatus::TypeChanged,
        _ => ChangeStatus::Modified,
    }
}

impl RepoBackend for Git {
    // =========================================================================
    // Ref Resolution
    // =========================================================================

    fn resolve_ref(&self, refname: &RefName) -> Result<Option<Oid>, GitError> {
        let reference = match self.repo.find_reference(refname.as_str()) {
            Ok(r) => r,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, refname.as_str())),
        };

        let commit = reference
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, refname.as_str()))?;

        to_oid(commit.id()).map(Some)
    }

    fn commit_exists(&self, oid: &Oid) -> Result<bool, GitError> {
        match self.find_commit(oid) {
            Ok(_) => Ok(true),
            Err(GitError::ObjectNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn head(&self) -> Result<Oid, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        let commit = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        to_oid(commit.id())
    }

    // =========================================================================
    // Remote Operations
    // =========================================================================

    fn list_remote_refs(&self) -> Result<Vec<RemoteRef>, GitError> {
        let mut remote = self.origin()?;
        let connection = remote
            .connect_auth(
                git2::Direction::Fetch,
                Some(self.credentials.callbacks()),
                None,
            )
            .map_err(GitError::from_remote)?;

        let heads = connection.list().map_err(GitError::from_remote)?;
        let refs = heads
            .iter()
            .map(|head| {
                Ok(RemoteRef {
                    name: head.name().to_string(),
                    oid: to_oid(head.oid())?,
                })
            })
            .collect::<Result<Vec<_>, GitError>>()?;

        tracing::debug!(count = refs.len(), "listed remote refs");
        Ok(refs)
    }

    fn fetch(&self, refspecs: &[RefSpec]) -> Result<FetchOutcome, GitError> {
        let mut remote = self.origin()?;
        let specs: Vec<String> = refspecs.iter().map(|s| s.to_string()).collect();
        tracing::debug!(refspecs = ?specs, "fetching from origin");

        let updated = Cell::new(0usize);
        {
            let mut callbacks = self.credentials.callbacks();
            callbacks.update_tips(|refname, old, new| {
                tracing::debug!(refname, %old, %new, "ref updated");
                updated.set(updated.get() + 1);
                true
            });

            let mut fetch_options = git2::FetchOptions::new();
            fetch_options.remote_callbacks(callbacks);
            // Narrow fetches must stay narrow
            fetch_options.download_tags(git2::AutotagOption::None);

            remote
                .fetch(&specs, Some(&mut fetch_options), None)
                .map_err(GitError::from_remote)?;
        }

        let outcome = FetchOutcome {
            updated_refs: updated.get(),
        };
        tracing::info!(%outcome, "fetch complete");
        Ok(outcome)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    fn checkout(&self, target: &CheckoutTarget) -> Result<Oid, GitError> {
        let mut builder = git2::build::CheckoutBuilder::new();
        builder.force();

        let checkout_failed = |e: git2::Error| GitError::CheckoutFailed {
            target: target.to_string(),
            message: e.message().to_string(),
        };

        let commit = match target {
            CheckoutTarget::Branch(refname) => {
                let reference = self
                    .repo
                    .find_reference(refname.as_str())
                    .map_err(|e| GitError::from_git2(e, refname.as_str()))?;
                let commit = reference
                    .peel_to_commit()
                    .map_err(|e| GitError::from_git2(e, refname.as_str()))?;

                self.repo
                    .checkout_tree(commit.as_object(), Some(&mut builder))
                    .map_err(checkout_failed)?;
                self.repo
                    .set_head(refname.as_str())
                    .map_err(checkout_failed)?;
                commit
            }
            CheckoutTarget::Detached(oid) => {
                let commit = self.find_commit(oid)?;

                self.repo
                    .checkout_tree(commit.as_object(), Some(&mut builder))
                    .map_err(checkout_failed)?;
                self.repo
                    .set_head_detached(commit.id())
                    .map_err(checkout_failed)?;
                commit
            }
        };

        tracing::info!(%target, commit = %commit.id(), "checked out");
        to_oid(commit.id())
    }

    // =========================================================================
    // Content and Diffs
    // =========================================================================

    fn read_file(&self, commit: &Oid, path: &str) -> Result<Vec<u8>, GitError> {
        let tree = self.commit_tree(commit)?;

        let entry = tree.get_path(Path::new(path)).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::PathNotFound {
                    path: path.to_string(),
                }
            } else {
                GitError::from_git2(e, commit.as_str())
            }
        })?;

        let object = entry
            .to_object(&self.repo)
            .map_err(|e| GitError::from_git2(e, commit.as_str()))?;

        // Directories are not files
        let blob = object.into_blob().map_err(|_| GitError::PathNotFound {
            path: path.to_string(),
        })?;

        Ok(blob.content().to_vec())
    }

    fn diff_trees(&self, base: &Oid, current: &Oid) -> Result<Vec<ChangedFile>, GitError> {
        let base_tree = self.commit_tree(base)?;
        let current_tree = self.commit_tree(current)?;

        let mut options = git2::DiffOptions::new();
        options.include_typechange(true);

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&base_tree), Some(&current_tree), Some(&mut options))
            .map_err(|e| GitError::Internal {
                message: format!("diff {}..{}: {}", base.short(7), current.short(7), e.message()),
            })?;

        let mut files = Vec::with_capacity(diff.deltas().len());
        for (idx, delta) in diff.deltas().enumerate() {
            let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) else {
                continue;
            };

            let (additions, deletions) = match git2::Patch::from_diff(&diff, idx) {
                Ok(Some(patch)) => match patch.line_stats() {
                    Ok((_, additions, deletions)) => (additions, deletions),
                    Err(_) => (0, 0),
                },
                // Binary or otherwise unpatchable
                _ => (0, 0),
            };

            files.push(ChangedFile {
                path: path.to_string_lossy().into_owned(),
                status: change_status(delta.status()),
                additions,
                deletions,
            });
        }

        tracing::debug!(
            base = %base.short(7),
            current = %current.short(7),
            changed = files.len(),
            "diffed trees"
        );
        Ok(files)
    }
}
