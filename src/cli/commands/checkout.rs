//! checkout command - Check out a branch, tag or commit

use crate::cli::Context;
use anyhow::{Context as _, Result};

/// Check out a reference.
///
/// Prints the interpretation taken and the commit HEAD now points at.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `reference` - Branch name, tag name or full commit hash
pub fn checkout(ctx: &Context, reference: &str) -> Result<()> {
    let engine = ctx.engine()?;
    let checked_out = engine
        .checkout(reference)
        .with_context(|| format!("Failed to check out '{}'", reference))?;

    println!("{} {}", checked_out.kind, checked_out.oid);
    Ok(())
}
