//! engine::error
//!
//! The error taxonomy callers match on.
//!
//! Backend failures ([`GitError`]) are translated at the engine boundary
//! into the variant that says what the caller was trying to do. Every
//! variant names the ref, commit or path that triggered it.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::filter::FilterError;
use crate::git::GitError;

/// Which half of `ensure_local` failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoOperation {
    Clone,
    Open,
}

impl fmt::Display for RepoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoOperation::Clone => write!(f, "clone"),
            RepoOperation::Open => write!(f, "open"),
        }
    }
}

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The working copy could not be cloned or opened.
    #[error("repository at {path} unavailable ({operation} failed): {source}")]
    RepositoryUnavailable {
        operation: RepoOperation,
        path: PathBuf,
        source: GitError,
    },

    /// `origin` could not be reached, or rejected our credentials.
    #[error("remote unreachable while {action}: {source}")]
    RemoteUnreachable { action: String, source: GitError },

    /// The identifier is not a branch, tag or commit, locally or remotely.
    #[error("reference not found: {reference}")]
    ReferenceNotFound { reference: String },

    /// Checkout was attempted and failed.
    #[error("checkout of '{reference}' failed: {source}")]
    CheckoutFailed { reference: String, source: GitError },

    #[error("commit not found: {commit}")]
    CommitNotFound { commit: String },

    #[error("branch not found: {branch}")]
    BranchNotFound { branch: String },

    #[error("file '{path}' not found at {commit}")]
    FileNotFound { path: String, commit: String },

    #[error("file '{path}' at {commit} is not valid UTF-8")]
    InvalidUtf8 { path: String, commit: String },

    /// A filter pattern did not compile.
    #[error(transparent)]
    InvalidFilter(#[from] FilterError),

    /// The trees could not be loaded or compared.
    #[error("diff {base}..{current} failed: {source}")]
    DiffFailed {
        base: String,
        current: String,
        source: GitError,
    },

    /// Any other backend failure.
    #[error("{context}: {source}")]
    Backend { context: String, source: GitError },
}

impl EngineError {
    /// Wrap a backend failure, routing remote failures to `RemoteUnreachable`.
    pub(crate) fn backend(context: impl Into<String>, source: GitError) -> Self {
        let context = context.into();
        if source.is_remote() {
            EngineError::RemoteUnreachable {
                action: context,
                source,
            }
        } else {
            EngineError::Backend { context, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failures_become_unreachable() {
        let err = EngineError::backend(
            "fetching",
            GitError::AuthFailed {
                message: "401".into(),
            },
        );
        assert!(matches!(err, EngineError::RemoteUnreachable { .. }));

        let err = EngineError::backend("reading HEAD", GitError::BareRepo);
        assert!(matches!(err, EngineError::Backend { .. }));
    }

    #[test]
    fn display_names_the_subject() {
        let err = EngineError::RepositoryUnavailable {
            operation: RepoOperation::Clone,
            path: PathBuf::from("/work/repo"),
            source: GitError::CloneFailed {
                url: "https://example.com/r.git".into(),
                message: "404".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("/work/repo"));
        assert!(msg.contains("clone failed"));

        let err = EngineError::FileNotFound {
            path: "conf.yaml".into(),
            commit: "abc".into(),
        };
        assert!(err.to_string().contains("conf.yaml"));
    }

    #[test]
    fn filter_errors_convert() {
        let err: EngineError = FilterError {
            pattern: "[".into(),
            message: "unclosed".into(),
        }
        .into();
        assert!(matches!(err, EngineError::InvalidFilter(_)));
        assert!(err.to_string().contains("'['"));
    }
}
