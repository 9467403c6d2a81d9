//! engine::changes
//!
//! Changed paths between two refs.
//!
//! Both refs are resolved to commits (see
//! [`resolve_commit`](RefEngine::resolve_commit)) and their trees diffed
//! base -> current. Added, removed and modified paths are reported once
//! each, in diff order. There is no rename detection: a moved file shows up
//! as its old path (removed) and its new path (added).
//!
//! # Pull requests
//!
//! [`changed_files_for_pr`](RefEngine::changed_files_for_pr) fetches
//! `refs/pull/<n>/head` and diffs it against the local `HEAD`, so the caller
//! is expected to have checked out the PR's base first.

use super::{EngineError, RefEngine};
use crate::core::changeset::ChangeSet;
use crate::core::filter::PathFilter;
use crate::core::types::RefName;
use crate::git::RepoBackend;

/// Base name of the per-environment deployment config.
pub const CONF_FILE_NAME: &str = "conf.yaml";

impl<B: RepoBackend> RefEngine<B> {
    /// Full change set (status and line counts) between two refs.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ReferenceNotFound`] if either ref does not resolve
    /// - [`EngineError::DiffFailed`] if the trees cannot be compared
    pub fn change_set(&self, base: &str, current: &str) -> Result<ChangeSet, EngineError> {
        let base_oid = self.resolve_commit(base)?;
        let current_oid = self.resolve_commit(current)?;

        if base_oid == current_oid {
            tracing::debug!(base, current, "refs resolve to the same commit");
            return Ok(ChangeSet::default());
        }

        let files = self
            .backend
            .diff_trees(&base_oid, &current_oid)
            .map_err(|source| EngineError::DiffFailed {
                base: base.to_string(),
                current: current.to_string(),
                source,
            })?;

        Ok(ChangeSet::new(files))
    }

    /// Paths that differ between two refs.
    pub fn changed_files(&self, base: &str, current: &str) -> Result<Vec<String>, EngineError> {
        Ok(self.change_set(base, current)?.paths())
    }

    /// The subset of [`changed_files`](Self::changed_files) accepted by `filter`.
    pub fn changed_files_filtered(
        &self,
        base: &str,
        current: &str,
        filter: &PathFilter,
    ) -> Result<Vec<String>, EngineError> {
        Ok(filter.apply(self.changed_files(base, current)?))
    }

    /// Changed paths with the given extension (case-insensitive, dot optional).
    pub fn changed_files_by_ext(
        &self,
        base: &str,
        current: &str,
        ext: &str,
    ) -> Result<Vec<String>, EngineError> {
        self.changed_files_filtered(base, current, &PathFilter::extension(ext))
    }

    /// Changed paths whose base name is `name` (case-insensitive).
    pub fn changed_files_by_name(
        &self,
        base: &str,
        current: &str,
        name: &str,
    ) -> Result<Vec<String>, EngineError> {
        self.changed_files_filtered(base, current, &PathFilter::file_name(name))
    }

    /// Changed paths matched by a regular expression.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidFilter`] if `pattern` does not compile; the
    ///   repository is not touched in that case
    pub fn changed_files_by_regex(
        &self,
        base: &str,
        current: &str,
        pattern: &str,
    ) -> Result<Vec<String>, EngineError> {
        let filter = PathFilter::regex(pattern)?;
        self.changed_files_filtered(base, current, &filter)
    }

    /// Paths changed by pull request `number` relative to the local `HEAD`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::RemoteUnreachable`] if the PR head cannot be fetched
    /// - [`EngineError::ReferenceNotFound`] if `origin` has no such PR
    pub fn changed_files_for_pr(&self, number: u64) -> Result<Vec<String>, EngineError> {
        let head = RefName::pull_request_head(number);
        self.fetch_narrow(&head)?;
        self.changed_files("HEAD", head.as_str())
    }

    /// Paths changed by a pull request, filtered.
    pub fn changed_files_for_pr_filtered(
        &self,
        number: u64,
        filter: &PathFilter,
    ) -> Result<Vec<String>, EngineError> {
        Ok(filter.apply(self.changed_files_for_pr(number)?))
    }

    /// Paths with the given extension changed by a pull request.
    pub fn changed_files_for_pr_by_ext(
        &self,
        number: u64,
        ext: &str,
    ) -> Result<Vec<String>, EngineError> {
        self.changed_files_for_pr_filtered(number, &PathFilter::extension(ext))
    }

    /// Deployment config files (`conf.yaml`) changed by a pull request.
    pub fn changed_conf_files_for_pr(&self, number: u64) -> Result<Vec<String>, EngineError> {
        self.changed_files_for_pr_filtered(number, &PathFilter::file_name(CONF_FILE_NAME))
    }
}
