//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads and
//! writes, and all traffic with `origin`, flow through this interface. No
//! other module should import `git2`; we use it exclusively (no shelling out
//! to the git CLI).
//!
//! The engine depends on the [`RepoBackend`] trait rather than on [`Git`]
//! directly, so its logic can run against [`mock::MockBackend`] in tests.
//!
//! # Responsibilities
//!
//! - Opening and cloning the working copy
//! - Ref and commit lookup
//! - Listing and fetching from `origin`
//! - Forced checkout (attached or detached)
//! - Blob reads and tree diffs
//!
//! # Example
//!
//! ```ignore
//! use refscope::core::options::RepoOptions;
//! use refscope::core::types::RefSpec;
//! use refscope::git::{Git, RepoBackend};
//!
//! let git = Git::open(&RepoOptions::new("."))?;
//! let outcome = git.fetch(&RefSpec::defaults())?;
//! if outcome.is_up_to_date() {
//!     println!("nothing new on origin");
//! }
//! ```

mod backend;
mod interface;
pub mod mock;

pub use backend::{CheckoutTarget, FetchOutcome, RemoteRef, RepoBackend};
pub use interface::{Git, GitError, ORIGIN};
