//! engine::content
//!
//! Read file contents from the object database.
//!
//! Reads never touch the working copy: a file modified on disk still reads
//! back as committed. Nothing is cached.

use super::{EngineError, RefEngine};
use crate::core::types::{Oid, RefName};
use crate::git::{GitError, RepoBackend};

impl<B: RepoBackend> RefEngine<B> {
    /// Raw bytes of `path` at commit `hash`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::CommitNotFound`] if `hash` is not a known commit
    /// - [`EngineError::FileNotFound`] if the path is absent from its tree
    pub fn file_bytes_at_commit(&self, hash: &str, path: &str) -> Result<Vec<u8>, EngineError> {
        let commit_not_found = || EngineError::CommitNotFound {
            commit: hash.to_string(),
        };
        let oid = Oid::new(hash).map_err(|_| commit_not_found())?;

        self.backend.read_file(&oid, path).map_err(|e| match e {
            GitError::ObjectNotFound { .. } | GitError::InvalidOid { .. } => commit_not_found(),
            GitError::PathNotFound { .. } => EngineError::FileNotFound {
                path: path.to_string(),
                commit: hash.to_string(),
            },
            other => EngineError::backend(format!("reading '{}' at {}", path, hash), other),
        })
    }

    /// Text of `path` at commit `hash`.
    ///
    /// # Errors
    ///
    /// As [`file_bytes_at_commit`](Self::file_bytes_at_commit), plus
    /// [`EngineError::InvalidUtf8`] if the file is not text.
    pub fn file_content_at_commit(&self, hash: &str, path: &str) -> Result<String, EngineError> {
        let bytes = self.file_bytes_at_commit(hash, path)?;
        String::from_utf8(bytes).map_err(|_| EngineError::InvalidUtf8 {
            path: path.to_string(),
            commit: hash.to_string(),
        })
    }

    /// Text of `path` at the tip of the local branch `branch`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::BranchNotFound`] if the branch does not exist locally
    /// - otherwise as [`file_content_at_commit`](Self::file_content_at_commit)
    pub fn file_content_at_branch(&self, branch: &str, path: &str) -> Result<String, EngineError> {
        let branch_not_found = || EngineError::BranchNotFound {
            branch: branch.to_string(),
        };
        let refname = RefName::branch(branch).map_err(|_| branch_not_found())?;

        let tip = self
            .backend
            .resolve_ref(&refname)
            .map_err(|e| EngineError::backend(format!("resolving branch '{}'", branch), e))?
            .ok_or_else(branch_not_found)?;

        self.file_content_at_commit(tip.as_str(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::MockBackend;

    fn oid(seed: u32) -> Oid {
        Oid::new(format!("{:040x}", seed)).unwrap()
    }

    fn engine() -> RefEngine<MockBackend> {
        RefEngine::new(
            MockBackend::new()
                .with_commit(oid(1), &[("deploy/conf.yaml", "replicas: 2\n")])
                .with_commit(oid(2), &[("deploy/conf.yaml", "replicas: 3\n")])
                .with_ref("refs/heads/main", oid(2)),
        )
    }

    mod at_commit {
        use super::*;

        #[test]
        fn reads_committed_text() {
            let content = engine()
                .file_content_at_commit(oid(1).as_str(), "deploy/conf.yaml")
                .unwrap();
            assert_eq!(content, "replicas: 2\n");
        }

        #[test]
        fn missing_commit() {
            let engine = engine();
            for hash in ["not-a-hash".to_string(), oid(99).to_string()] {
                assert!(matches!(
                    engine.file_content_at_commit(&hash, "deploy/conf.yaml"),
                    Err(EngineError::CommitNotFound { .. })
                ));
            }
        }

        #[test]
        fn missing_file() {
            assert!(matches!(
                engine().file_content_at_commit(oid(1).as_str(), "deploy/other.yaml"),
                Err(EngineError::FileNotFound { .. })
            ));
        }

        #[test]
        fn binary_content() {
            let engine = RefEngine::new(MockBackend::new().with_commit(oid(1), &[("bin", "ok")]));
            assert_eq!(
                engine.file_bytes_at_commit(oid(1).as_str(), "bin").unwrap(),
                b"ok".to_vec()
            );
        }
    }

    mod at_branch {
        use super::*;

        #[test]
        fn reads_branch_tip() {
            let content = engine()
                .file_content_at_branch("main", "deploy/conf.yaml")
                .unwrap();
            assert_eq!(content, "replicas: 3\n");
        }

        #[test]
        fn missing_branch() {
            let engine = engine();
            for branch in ["feature", "bad..name"] {
                assert!(matches!(
                    engine.file_content_at_branch(branch, "deploy/conf.yaml"),
                    Err(EngineError::BranchNotFound { .. })
                ));
            }
        }
    }
}
