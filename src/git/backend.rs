//! git::backend
//!
//! The capability trait the engine is written against.
//!
//! # Architecture
//!
//! [`RepoBackend`] is the one seam between resolution/checkout/diff logic and
//! the object database. [`Git`](super::Git) implements it with `git2`;
//! [`MockBackend`](super::mock::MockBackend) implements it in memory so engine
//! behavior can be tested without touching disk or the network.
//!
//! Implementations report "does not exist" as `Ok(None)` where the
//! signature allows it, and reserve errors for genuine failures.

use std::fmt;

use super::GitError;
use crate::core::changeset::ChangedFile;
use crate::core::types::{Oid, RefName, RefSpec};

/// A ref advertised by `origin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    /// Full ref name as advertised (e.g. `refs/heads/main`, `refs/tags/v1^{}`)
    pub name: String,
    /// The object the ref points at
    pub oid: Oid,
}

/// Result of a fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Number of local refs created or moved
    pub updated_refs: usize,
}

impl FetchOutcome {
    /// True when the fetch changed nothing locally.
    pub fn is_up_to_date(&self) -> bool {
        self.updated_refs == 0
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_up_to_date() {
            write!(f, "up to date")
        } else {
            write!(f, "{} ref(s) updated", self.updated_refs)
        }
    }
}

/// What to point HEAD at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTarget {
    /// Attach HEAD to a local branch
    Branch(RefName),
    /// Detach HEAD at a commit
    Detached(Oid),
}

impl fmt::Display for CheckoutTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutTarget::Branch(name) => write!(f, "{}", name),
            CheckoutTarget::Detached(oid) => write!(f, "{}", oid),
        }
    }
}

/// Repository capabilities used by the engine.
///
/// All checkouts are forced: uncommitted changes in the working copy are
/// discarded.
pub trait RepoBackend {
    /// Resolve a ref to the commit it points at (tags are peeled).
    ///
    /// Returns `Ok(None)` if the ref does not exist locally.
    fn resolve_ref(&self, refname: &RefName) -> Result<Option<Oid>, GitError>;

    /// Whether `oid` names a commit in the local object database.
    fn commit_exists(&self, oid: &Oid) -> Result<bool, GitError>;

    /// The commit HEAD points at.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if HEAD is unborn
    fn head(&self) -> Result<Oid, GitError>;

    /// List the refs advertised by `origin`.
    fn list_remote_refs(&self) -> Result<Vec<RemoteRef>, GitError>;

    /// Fetch from `origin` with exactly the given refspecs.
    fn fetch(&self, refspecs: &[RefSpec]) -> Result<FetchOutcome, GitError>;

    /// Force-checkout the target and move HEAD; returns the new HEAD commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if a branch target does not exist locally
    /// - [`GitError::ObjectNotFound`] if a detached target is not a known commit
    fn checkout(&self, target: &CheckoutTarget) -> Result<Oid, GitError>;

    /// Raw contents of `path` in the tree of `commit`.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit does not exist
    /// - [`GitError::PathNotFound`] if the path is not a file in that tree
    fn read_file(&self, commit: &Oid, path: &str) -> Result<Vec<u8>, GitError>;

    /// Files that differ between the trees of `base` and `current`.
    ///
    /// No rename detection: a move is a deletion plus an addition.
    fn diff_trees(&self, base: &Oid, current: &Oid) -> Result<Vec<ChangedFile>, GitError>;
}
