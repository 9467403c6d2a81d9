//! engine::resolve
//!
//! Classify human-supplied identifiers as branch, tag or commit.
//!
//! # Lookup order
//!
//! [`RefEngine::resolve`] checks the local repository first and only asks
//! `origin` when nothing local matched. When several interpretations match,
//! all are reported; [`Classification::kind`] applies the priority
//! branch > tag > commit.

use serde::Serialize;

use super::{EngineError, RefEngine};
use crate::core::types::{Oid, RefKind, RefName};
use crate::git::{GitError, RepoBackend};

/// What an identifier matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub is_branch: bool,
    pub is_tag: bool,
    pub is_commit: bool,
    /// Commit of the highest-priority match, when known
    pub oid: Option<Oid>,
}

impl Classification {
    /// The interpretation checkout uses: branch > tag > commit.
    pub fn kind(&self) -> RefKind {
        if self.is_branch {
            RefKind::Branch
        } else if self.is_tag {
            RefKind::Tag
        } else if self.is_commit {
            RefKind::Commit
        } else {
            RefKind::Unknown
        }
    }

    /// Whether anything matched.
    pub fn is_found(&self) -> bool {
        self.is_branch || self.is_tag || self.is_commit
    }
}

impl<B: RepoBackend> RefEngine<B> {
    /// Classify `reference` against local refs and objects only.
    ///
    /// Checks `refs/heads/<reference>`, then `refs/tags/<reference>`, then
    /// (for 40-character hex strings) the commit with that hash. Strings
    /// that cannot be ref names simply don't match.
    pub fn classify_local(&self, reference: &str) -> Result<Classification, EngineError> {
        let context = || format!("classifying '{}'", reference);
        let mut classification = Classification::default();

        if let Ok(branch) = RefName::branch(reference) {
            if let Some(oid) = self
                .backend
                .resolve_ref(&branch)
                .map_err(|e| EngineError::backend(context(), e))?
            {
                classification.is_branch = true;
                classification.oid.get_or_insert(oid);
            }
        }

        if let Ok(tag) = RefName::tag(reference) {
            if let Some(oid) = self
                .backend
                .resolve_ref(&tag)
                .map_err(|e| EngineError::backend(context(), e))?
            {
                classification.is_tag = true;
                classification.oid.get_or_insert(oid);
            }
        }

        if let Some(oid) = self
            .local_commit(reference)
            .map_err(|e| EngineError::backend(context(), e))?
        {
            classification.is_commit = true;
            classification.oid.get_or_insert(oid);
        }

        tracing::debug!(reference, ?classification, "classified locally");
        Ok(classification)
    }

    /// Classify `reference` against the refs `origin` advertises.
    ///
    /// Branch and tag matches compare short names; commit classification
    /// still requires the commit to exist locally.
    ///
    /// # Errors
    ///
    /// - [`EngineError::RemoteUnreachable`] if `origin` cannot be listed
    pub fn classify_remote(&self, reference: &str) -> Result<Classification, EngineError> {
        let refs = self
            .backend
            .list_remote_refs()
            .map_err(|source| EngineError::RemoteUnreachable {
                action: format!("listing refs to classify '{}'", reference),
                source,
            })?;

        let find = |name: &str| refs.iter().find(|r| r.name == name).map(|r| r.oid.clone());
        // Strings that cannot be ref names never match, peeled entries included
        let branch = RefName::branch(reference)
            .ok()
            .and_then(|branch| find(branch.as_str()));
        // Annotated tags advertise the peeled commit as "<tag>^{}"
        let tag = RefName::tag(reference).ok().and_then(|tag| {
            find(&format!("{}^{{}}", tag)).or_else(|| find(tag.as_str()))
        });
        let commit = self
            .local_commit(reference)
            .map_err(|e| EngineError::backend(format!("classifying '{}'", reference), e))?;

        let classification = Classification {
            is_branch: branch.is_some(),
            is_tag: tag.is_some(),
            is_commit: commit.is_some(),
            oid: branch.or(tag).or(commit),
        };

        tracing::debug!(reference, ?classification, "classified against origin");
        Ok(classification)
    }

    /// Classify locally, falling back to `origin` only if nothing matched.
    pub fn resolve(&self, reference: &str) -> Result<Classification, EngineError> {
        let local = self.classify_local(reference)?;
        if local.is_found() {
            return Ok(local);
        }
        self.classify_remote(reference)
    }

    /// Resolve any local ref to a commit.
    ///
    /// Tries, in order: `HEAD`, a full ref name (`refs/...`), a local
    /// branch, a local tag, a full commit hash, and finally the
    /// remote-tracking branch `refs/remotes/origin/<reference>`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ReferenceNotFound`] if none of those match
    pub fn resolve_commit(&self, reference: &str) -> Result<Oid, EngineError> {
        let not_found = || EngineError::ReferenceNotFound {
            reference: reference.to_string(),
        };
        let backend_err = |e: GitError| EngineError::backend(format!("resolving '{}'", reference), e);

        if reference == "HEAD" {
            return self.backend.head().map_err(|e| {
                if e.is_not_found() {
                    not_found()
                } else {
                    backend_err(e)
                }
            });
        }

        let mut candidates = Vec::with_capacity(3);
        if reference.starts_with("refs/") {
            candidates.extend(RefName::new(reference).ok());
        } else {
            candidates.extend(RefName::branch(reference).ok());
            candidates.extend(RefName::tag(reference).ok());
        }

        for refname in &candidates {
            if let Some(oid) = self.backend.resolve_ref(refname).map_err(backend_err)? {
                return Ok(oid);
            }
        }

        if let Some(oid) = self.local_commit(reference).map_err(backend_err)? {
            return Ok(oid);
        }

        if !reference.starts_with("refs/") {
            if let Ok(tracking) = RefName::remote_tracking(reference) {
                if let Some(oid) = self.backend.resolve_ref(&tracking).map_err(backend_err)? {
                    return Ok(oid);
                }
            }
        }

        Err(not_found())
    }

    /// The commit named by a full hex hash, if it exists locally.
    fn local_commit(&self, candidate: &str) -> Result<Option<Oid>, GitError> {
        if !Oid::looks_like_sha1(candidate) {
            return Ok(None);
        }
        let oid = Oid::new(candidate)?;
        Ok(self.backend.commit_exists(&oid)?.then_some(oid))
    }
}
