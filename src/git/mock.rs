//! git::mock
//!
//! In-memory repository backend for deterministic testing.
//!
//! # Design
//!
//! The mock keeps two object stores: the local repository and `origin`.
//! Fetching copies refs (through the refspec mapping) and the commits they
//! point at from `origin` into the local store, so "exists only remotely"
//! scenarios behave the way they do against a real clone. Every call is
//! recorded, and a single operation can be configured to fail.
//!
//! # Example
//!
//! ```
//! use refscope::core::types::{Oid, RefName, RefSpec};
//! use refscope::git::mock::MockBackend;
//! use refscope::git::RepoBackend;
//!
//! let c1 = Oid::new("1".repeat(40)).unwrap();
//! let backend = MockBackend::new()
//!     .with_remote_commit(c1.clone(), &[("README.md", "hello\n")])
//!     .with_remote_ref("refs/heads/main", c1.clone());
//!
//! let main = RefName::remote_tracking("main").unwrap();
//! assert_eq!(backend.resolve_ref(&main).unwrap(), None);
//!
//! backend.fetch(&RefSpec::defaults()).unwrap();
//! assert_eq!(backend.resolve_ref(&main).unwrap(), Some(c1));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::backend::{CheckoutTarget, FetchOutcome, RemoteRef, RepoBackend};
use super::GitError;
use crate::core::changeset::{ChangeStatus, ChangedFile};
use crate::core::types::{Oid, RefName, RefSpec};

/// Mock backend for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockBackendInner>>,
}

type Tree = BTreeMap<String, Vec<u8>>;

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockBackendInner {
    /// Local refs by full name.
    refs: BTreeMap<String, Oid>,
    /// Local commits and their trees.
    commits: HashMap<Oid, Tree>,
    /// Refs advertised by origin.
    remote_refs: BTreeMap<String, Oid>,
    /// Commits only origin has.
    remote_commits: HashMap<Oid, Tree>,
    /// Where HEAD points.
    head: Option<Oid>,
    /// Branch HEAD is attached to, if any.
    head_ref: Option<RefName>,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail list_remote_refs with the given error.
    ListRemoteRefs(GitError),
    /// Fail fetch with the given error.
    Fetch(GitError),
    /// Fail checkout with the given error.
    Checkout(GitError),
    /// Fail read_file with the given error.
    ReadFile(GitError),
    /// Fail diff_trees with the given error.
    DiffTrees(GitError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    ResolveRef { refname: String },
    CommitExists { oid: Oid },
    Head,
    ListRemoteRefs,
    Fetch { refspecs: Vec<String> },
    Checkout { target: CheckoutTarget },
    ReadFile { commit: Oid, path: String },
    DiffTrees { base: Oid, current: Oid },
}

fn to_tree(files: &[(&str, &str)]) -> Tree {
    files
        .iter()
        .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec()))
        .collect()
}

impl MockBackend {
    /// Create an empty mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockBackendInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a commit to the local object store.
    pub fn with_commit(self, oid: Oid, files: &[(&str, &str)]) -> Self {
        self.lock().commits.insert(oid, to_tree(files));
        self
    }

    /// Add a local ref (full name, e.g. `refs/heads/main`).
    pub fn with_ref(self, name: &str, oid: Oid) -> Self {
        self.lock().refs.insert(name.to_string(), oid);
        self
    }

    /// Add a commit only origin has.
    pub fn with_remote_commit(self, oid: Oid, files: &[(&str, &str)]) -> Self {
        self.lock().remote_commits.insert(oid, to_tree(files));
        self
    }

    /// Advertise a ref on origin.
    pub fn with_remote_ref(self, name: &str, oid: Oid) -> Self {
        self.lock().remote_refs.insert(name.to_string(), oid);
        self
    }

    /// Point HEAD at a commit (detached).
    pub fn with_head(self, oid: Oid) -> Self {
        {
            let mut inner = self.lock();
            inner.head = Some(oid);
            inner.head_ref = None;
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use refscope::git::mock::{FailOn, MockBackend};
    /// use refscope::git::GitError;
    ///
    /// let backend = MockBackend::new().fail_on(FailOn::Fetch(GitError::RemoteFailed {
    ///     message: "connection refused".into(),
    /// }));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Look up a local ref without recording an operation.
    pub fn local_ref(&self, name: &str) -> Option<Oid> {
        self.lock().refs.get(name).cloned()
    }

    /// The branch HEAD is attached to, if any.
    pub fn head_ref(&self) -> Option<RefName> {
        self.lock().head_ref.clone()
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Result<(), GitError> {
        let inner = self.lock();
        match &inner.fail_on {
            Some(FailOn::ListRemoteRefs(e)) if expected == "list_remote_refs" => Err(e.clone()),
            Some(FailOn::Fetch(e)) if expected == "fetch" => Err(e.clone()),
            Some(FailOn::Checkout(e)) if expected == "checkout" => Err(e.clone()),
            Some(FailOn::ReadFile(e)) if expected == "read_file" => Err(e.clone()),
            Some(FailOn::DiffTrees(e)) if expected == "diff_trees" => Err(e.clone()),
            _ => Ok(()),
        }
    }
}

/// Map a remote ref name through a refspec, returning the local name.
fn map_through(spec: &RefSpec, remote_name: &str) -> Option<String> {
    match spec.source().split_once('*') {
        Some((prefix, suffix)) => {
            let middle = remote_name
                .strip_prefix(prefix)?
                .strip_suffix(suffix)?;
            Some(spec.destination().replacen('*', middle, 1))
        }
        None if spec.source() == remote_name => Some(spec.destination().to_string()),
        None => None,
    }
}

fn line_count(content: &[u8]) -> usize {
    String::from_utf8_lossy(content).lines().count()
}

impl RepoBackend for MockBackend {
    fn resolve_ref(&self, refname: &RefName) -> Result<Option<Oid>, GitError> {
        self.record(MockOperation::ResolveRef {
            refname: refname.to_string(),
        });
        Ok(self.lock().refs.get(refname.as_str()).cloned())
    }

    fn commit_exists(&self, oid: &Oid) -> Result<bool, GitError> {
        self.record(MockOperation::CommitExists { oid: oid.clone() });
        Ok(self.lock().commits.contains_key(oid))
    }

    fn head(&self) -> Result<Oid, GitError> {
        self.record(MockOperation::Head);
        self.lock().head.clone().ok_or_else(|| GitError::RefNotFound {
            refname: "HEAD".into(),
        })
    }

    fn list_remote_refs(&self) -> Result<Vec<RemoteRef>, GitError> {
        self.record(MockOperation::ListRemoteRefs);
        self.check_fail("list_remote_refs")?;

        Ok(self
            .lock()
            .remote_refs
            .iter()
            .map(|(name, oid)| RemoteRef {
                name: name.clone(),
                oid: oid.clone(),
            })
            .collect())
    }

    fn fetch(&self, refspecs: &[RefSpec]) -> Result<FetchOutcome, GitError> {
        self.record(MockOperation::Fetch {
            refspecs: refspecs.iter().map(|s| s.to_string()).collect(),
        });
        self.check_fail("fetch")?;

        let mut inner = self.lock();
        let mut updates = Vec::new();
        for spec in refspecs {
            for (name, oid) in &inner.remote_refs {
                if let Some(local) = map_through(spec, name) {
                    if inner.refs.get(&local) != Some(oid) {
                        updates.push((local, oid.clone()));
                    }
                }
            }
        }

        for (local, oid) in &updates {
            if let Some(tree) = inner.remote_commits.get(oid).cloned() {
                inner.commits.entry(oid.clone()).or_insert(tree);
            }
            inner.refs.insert(local.clone(), oid.clone());
        }

        Ok(FetchOutcome {
            updated_refs: updates.len(),
        })
    }

    fn checkout(&self, target: &CheckoutTarget) -> Result<Oid, GitError> {
        self.record(MockOperation::Checkout {
            target: target.clone(),
        });
        self.check_fail("checkout")?;

        let mut inner = self.lock();
        match target {
            CheckoutTarget::Branch(name) => {
                let oid = inner
                    .refs
                    .get(name.as_str())
                    .cloned()
                    .ok_or_else(|| GitError::RefNotFound {
                        refname: name.to_string(),
                    })?;
                inner.head = Some(oid.clone());
                inner.head_ref = Some(name.clone());
                Ok(oid)
            }
            CheckoutTarget::Detached(oid) => {
                if !inner.commits.contains_key(oid) {
                    return Err(GitError::ObjectNotFound {
                        oid: oid.to_string(),
                    });
                }
                inner.head = Some(oid.clone());
                inner.head_ref = None;
                Ok(oid.clone())
            }
        }
    }

    fn read_file(&self, commit: &Oid, path: &str) -> Result<Vec<u8>, GitError> {
        self.record(MockOperation::ReadFile {
            commit: commit.clone(),
            path: path.to_string(),
        });
        self.check_fail("read_file")?;

        let inner = self.lock();
        let tree = inner.commits.get(commit).ok_or_else(|| GitError::ObjectNotFound {
            oid: commit.to_string(),
        })?;
        tree.get(path).cloned().ok_or_else(|| GitError::PathNotFound {
            path: path.to_string(),
        })
    }

    fn diff_trees(&self, base: &Oid, current: &Oid) -> Result<Vec<ChangedFile>, GitError> {
        self.record(MockOperation::DiffTrees {
            base: base.clone(),
            current: current.clone(),
        });
        self.check_fail("diff_trees")?;

        let inner = self.lock();
        let tree_of = |oid: &Oid| {
            inner.commits.get(oid).ok_or_else(|| GitError::ObjectNotFound {
                oid: oid.to_string(),
            })
        };
        let old = tree_of(base)?;
        let new = tree_of(current)?;

        let mut paths: Vec<&String> = old.keys().chain(new.keys()).collect();
        paths.sort();
        paths.dedup();

        let files = paths
            .into_iter()
            .filter_map(|path| match (old.get(path), new.get(path)) {
                (None, Some(added)) => Some(ChangedFile {
                    path: path.clone(),
                    status: ChangeStatus::Added,
                    additions: line_count(added),
                    deletions: 0,
                }),
                (Some(removed), None) => Some(ChangedFile {
                    path: path.clone(),
                    status: ChangeStatus::Deleted,
                    additions: 0,
                    deletions: line_count(removed),
                }),
                (Some(before), Some(after)) if before != after => Some(ChangedFile {
                    path: path.clone(),
                    status: ChangeStatus::Modified,
                    additions: line_count(after),
                    deletions: line_count(before),
                }),
                _ => None,
            })
            .collect();

        Ok(files)
    }
}
