//! cli
//!
//! Command-line interface layer for refscope.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Merge config file values with flag overrides
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds
//! [`RepoOptions`] and dispatches to handlers that call the
//! [`crate::engine`]. Only this layer prints, reads the environment or
//! converts errors into `anyhow` reports.

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::core::options::RepoOptions;
use crate::engine::RefEngine;

/// Execution context shared by command handlers.
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved repository options
    pub options: RepoOptions,
}

impl Context {
    /// Open the working copy, cloning it first if it is missing.
    pub fn engine(&self) -> Result<RefEngine> {
        RefEngine::ensure_local(&self.options).with_context(|| {
            format!(
                "Failed to prepare repository at {}",
                self.options.path().display()
            )
        })
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = config.loaded_from() {
        tracing::debug!(path = %path.display(), "using config file");
    }

    let options = config
        .with_overrides(cli.path.clone(), cli.url.clone(), cli.username.clone())
        .to_options(cli.token.clone());

    let ctx = Context { options };

    commands::dispatch(cli.command, &ctx)
}
