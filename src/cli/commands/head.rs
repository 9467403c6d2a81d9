//! head command - Print the HEAD commit

use crate::cli::Context;
use anyhow::{Context as _, Result};

/// Print the commit HEAD points at.
pub fn head(ctx: &Context) -> Result<()> {
    let engine = ctx.engine()?;
    let oid = engine.resolve_commit("HEAD").context("Failed to read HEAD")?;

    println!("{}", oid);
    Ok(())
}
