//! show command - Print a file as committed

use crate::cli::Context;
use anyhow::{bail, Context as _, Result};

/// Print `file` at a commit or at a local branch tip.
///
/// Exactly one of `commit` and `branch` is given (enforced by clap).
pub fn show(ctx: &Context, file: &str, commit: Option<&str>, branch: Option<&str>) -> Result<()> {
    let engine = ctx.engine()?;
    let content = match (commit, branch) {
        (Some(hash), None) => engine
            .file_content_at_commit(hash, file)
            .with_context(|| format!("Failed to read '{}' at {}", file, hash))?,
        (None, Some(name)) => engine
            .file_content_at_branch(name, file)
            .with_context(|| format!("Failed to read '{}' on branch '{}'", file, name))?,
        _ => bail!("Specify exactly one of --commit or --branch"),
    };

    print!("{}", content);
    Ok(())
}
