//! engine::checkout
//!
//! The checkout state machine.
//!
//! # States
//!
//! ```text
//! Classifying -> { Branch | Tag | Commit | NotFound } -> { Done | Error }
//! ```
//!
//! - **Branch**: check out `refs/heads/<ref>`. If the branch is not present
//!   locally, fetch it narrowly and retry exactly once.
//! - **Tag**: always fetch `refs/tags/<ref>` narrowly first, then detach
//!   HEAD at the tagged commit.
//! - **Commit**: detach HEAD at the hash. No fetch.
//! - **NotFound**: [`EngineError::ReferenceNotFound`].
//!
//! Every variant forces the checkout; uncommitted changes are discarded.

use super::{Classification, EngineError, RefEngine};
use crate::core::types::{Oid, RefKind, RefName, Reference};
use crate::git::{CheckoutTarget, GitError, RepoBackend};

/// The checkout chosen for a classification.
///
/// Planning is pure: it performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutPlan {
    Branch(RefName),
    Tag(RefName),
    Commit(Oid),
    NotFound,
}

impl CheckoutPlan {
    /// Pick a plan with priority branch > tag > commit.
    pub fn from_classification(reference: &str, classification: &Classification) -> Self {
        let plan = match classification.kind() {
            RefKind::Branch => RefName::branch(reference).ok().map(CheckoutPlan::Branch),
            RefKind::Tag => RefName::tag(reference).ok().map(CheckoutPlan::Tag),
            RefKind::Commit => Oid::new(reference).ok().map(CheckoutPlan::Commit),
            RefKind::Unknown => None,
        };
        plan.unwrap_or(CheckoutPlan::NotFound)
    }

    pub fn kind(&self) -> RefKind {
        match self {
            CheckoutPlan::Branch(_) => RefKind::Branch,
            CheckoutPlan::Tag(_) => RefKind::Tag,
            CheckoutPlan::Commit(_) => RefKind::Commit,
            CheckoutPlan::NotFound => RefKind::Unknown,
        }
    }
}

impl<B: RepoBackend> RefEngine<B> {
    /// Check out `reference`, fetching from `origin` when needed.
    ///
    /// Returns the requested name, the interpretation taken and the commit
    /// HEAD points at afterwards.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ReferenceNotFound`] if nothing matches locally or remotely
    /// - [`EngineError::RemoteUnreachable`] if a required fetch fails
    /// - [`EngineError::CheckoutFailed`] if the checkout itself fails
    pub fn checkout(&self, reference: &str) -> Result<Reference, EngineError> {
        let classification = self.resolve(reference)?;
        let plan = CheckoutPlan::from_classification(reference, &classification);
        tracing::debug!(reference, ?plan, "checkout planned");

        let oid = match &plan {
            CheckoutPlan::Branch(name) => self.checkout_branch(reference, name)?,
            CheckoutPlan::Tag(name) => self.checkout_tag(reference, name)?,
            CheckoutPlan::Commit(oid) => self.checkout_commit(reference, oid)?,
            CheckoutPlan::NotFound => {
                return Err(EngineError::ReferenceNotFound {
                    reference: reference.to_string(),
                })
            }
        };

        tracing::info!(reference, kind = %plan.kind(), commit = %oid.short(7), "checkout complete");
        Ok(Reference {
            name: reference.to_string(),
            oid,
            kind: plan.kind(),
        })
    }

    fn checkout_branch(&self, reference: &str, branch: &RefName) -> Result<Oid, EngineError> {
        let target = CheckoutTarget::Branch(branch.clone());
        match self.backend.checkout(&target) {
            Ok(oid) => Ok(oid),
            Err(GitError::RefNotFound { .. }) => {
                tracing::warn!(%branch, "branch not present locally, fetching from origin");
                self.fetch_narrow(branch)?;
                self.backend
                    .checkout(&target)
                    .map_err(|source| checkout_failed(reference, source))
            }
            Err(source) => Err(checkout_failed(reference, source)),
        }
    }

    fn checkout_tag(&self, reference: &str, tag: &RefName) -> Result<Oid, EngineError> {
        self.fetch_narrow(tag)?;

        let oid = self
            .backend
            .resolve_ref(tag)
            .map_err(|source| checkout_failed(reference, source))?
            .ok_or_else(|| {
                checkout_failed(
                    reference,
                    GitError::RefNotFound {
                        refname: tag.to_string(),
                    },
                )
            })?;

        self.checkout_commit(reference, &oid)
    }

    fn checkout_commit(&self, reference: &str, oid: &Oid) -> Result<Oid, EngineError> {
        self.backend
            .checkout(&CheckoutTarget::Detached(oid.clone()))
            .map_err(|source| checkout_failed(reference, source))
    }
}

fn checkout_failed(reference: &str, source: GitError) -> EngineError {
    EngineError::CheckoutFailed {
        reference: reference.to_string(),
        source,
    }
}
