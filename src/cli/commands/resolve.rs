//! resolve command - Classify a reference

use crate::cli::Context;
use anyhow::{Context as _, Result};

/// Print what `reference` matches.
///
/// With `local_only`, origin is never contacted.
pub fn resolve(ctx: &Context, reference: &str, local_only: bool) -> Result<()> {
    let engine = ctx.engine()?;
    let classification = if local_only {
        engine.classify_local(reference)
    } else {
        engine.resolve(reference)
    }
    .with_context(|| format!("Failed to resolve '{}'", reference))?;

    println!("branch: {}", classification.is_branch);
    println!("tag: {}", classification.is_tag);
    println!("commit: {}", classification.is_commit);
    println!("kind: {}", classification.kind());
    if let Some(oid) = &classification.oid {
        println!("oid: {}", oid);
    }
    Ok(())
}
