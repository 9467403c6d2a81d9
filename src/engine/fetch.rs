//! engine::fetch
//!
//! Synchronize local refs with `origin`.
//!
//! With no explicit refspec every branch (as remote-tracking refs) and every
//! tag is fetched. A narrow fetch moves exactly one ref, keeping its name.
//! "Already up to date" is a successful [`FetchOutcome`], never an error.

use super::{EngineError, RefEngine};
use crate::core::types::{RefName, RefSpec};
use crate::git::{FetchOutcome, RepoBackend};

impl<B: RepoBackend> RefEngine<B> {
    /// Fetch from `origin` with the given refspec, or the bulk defaults.
    ///
    /// # Errors
    ///
    /// - [`EngineError::RemoteUnreachable`] on network or auth failure
    pub fn fetch(&self, refspec: Option<RefSpec>) -> Result<FetchOutcome, EngineError> {
        let refspecs = match refspec {
            Some(spec) => vec![spec],
            None => RefSpec::defaults(),
        };
        self.fetch_refspecs(&refspecs)
    }

    /// Fetch exactly one ref as `+<ref>:<ref>`.
    pub fn fetch_narrow(&self, remote_ref: &RefName) -> Result<FetchOutcome, EngineError> {
        self.fetch_refspecs(&[RefSpec::narrow(remote_ref)])
    }

    fn fetch_refspecs(&self, refspecs: &[RefSpec]) -> Result<FetchOutcome, EngineError> {
        let described = refspecs
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        let outcome = self
            .backend
            .fetch(refspecs)
            .map_err(|e| EngineError::backend(format!("fetching {}", described), e))?;

        if outcome.is_up_to_date() {
            tracing::debug!(refspecs = %described, "already up to date");
        }
        Ok(outcome)
    }
}
