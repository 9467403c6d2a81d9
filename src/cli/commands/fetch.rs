//! fetch command - Fetch from origin

use crate::cli::Context;
use crate::core::types::RefSpec;
use anyhow::{Context as _, Result};

/// Fetch all branches and tags, or a single refspec.
pub fn fetch(ctx: &Context, refspec: Option<RefSpec>) -> Result<()> {
    let engine = ctx.engine()?;
    let outcome = engine.fetch(refspec).context("Failed to fetch from origin")?;

    println!("{}", outcome);
    Ok(())
}
