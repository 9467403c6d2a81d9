//! refscope - reference resolution and change detection for delivery pipelines
//!
//! refscope sits between a continuous-delivery pipeline and a Git
//! repository. Given a working copy and its `origin`, it turns
//! human-supplied identifiers (branch names, tags, commit hashes, pull
//! request numbers) into commits, checks them out, reads files as
//! committed, and lists the paths that differ between two refs.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Resolution, fetch, checkout, content and change detection
//! - [`core`] - Domain types, options, filters and configuration
//! - [`git`] - Single interface for all Git operations, plus an in-memory mock
//!
//! # Example
//!
//! ```ignore
//! use refscope::core::options::RepoOptions;
//! use refscope::engine::RefEngine;
//!
//! let options = RepoOptions::new("/work/deploy")
//!     .with_url("https://github.com/acme/deploy.git")
//!     .with_token(token);
//! let engine = RefEngine::ensure_local(&options)?;
//!
//! engine.checkout("main")?;
//! for path in engine.changed_conf_files_for_pr(42)? {
//!     println!("{}", path);
//! }
//! ```

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
