//! core::changeset
//!
//! The result of diffing two commits.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a path changed between base and current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Deleted,
    Modified,
    /// Type change (e.g. file became a symlink)
    TypeChanged,
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeStatus::Added => "A",
            ChangeStatus::Deleted => "D",
            ChangeStatus::Modified => "M",
            ChangeStatus::TypeChanged => "T",
        };
        write!(f, "{}", s)
    }
}

/// A single changed path with line statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub status: ChangeStatus,
    /// Lines added (0 for binary files)
    pub additions: usize,
    /// Lines removed (0 for binary files)
    pub deletions: usize,
}

/// Ordered, duplicate-free list of changed files.
///
/// Order follows the tree-diff traversal and is not guaranteed sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    files: Vec<ChangedFile>,
}

impl ChangeSet {
    /// Build a change set, keeping the first entry for each path.
    pub fn new(files: impl IntoIterator<Item = ChangedFile>) -> Self {
        let mut seen = HashSet::new();
        let files = files
            .into_iter()
            .filter(|f| seen.insert(f.path.clone()))
            .collect();
        Self { files }
    }

    pub fn files(&self) -> &[ChangedFile] {
        &self.files
    }

    /// Plain path list in diff order.
    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl IntoIterator for ChangeSet {
    type Item = ChangedFile;
    type IntoIter = std::vec::IntoIter<ChangedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}
