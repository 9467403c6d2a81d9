//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens (or clones) the working copy through the engine
//! 2. Calls one engine operation
//! 3. Formats and displays output
//!
//! Handlers do NOT call `git2` directly.

mod changed;
mod checkout;
mod fetch;
mod head;
mod resolve;
mod show;

// Re-export command functions for testing and direct invocation
pub use changed::changed;
pub use checkout::checkout;
pub use fetch::fetch;
pub use head::head;
pub use resolve::resolve;
pub use show::show;

use super::args::Command;
use super::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Checkout { reference } => checkout(ctx, &reference),
        Command::Fetch { refspec } => fetch(ctx, refspec),
        Command::Resolve { reference, local } => resolve(ctx, &reference, local),
        Command::Show {
            file,
            commit,
            branch,
        } => show(ctx, &file, commit.as_deref(), branch.as_deref()),
        Command::Changed(args) => changed(ctx, &args),
        Command::Head => head(ctx),
    }
}
