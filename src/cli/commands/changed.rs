//! changed command - List files changed between refs or by a pull request

use crate::cli::args::ChangedArgs;
use crate::cli::Context;
use crate::core::changeset::ChangeSet;
use crate::core::filter::PathFilter;
use crate::core::types::RefName;
use anyhow::{bail, Context as _, Result};

/// List changed paths.
///
/// Filters are built before the repository is opened, so a bad regex is
/// reported without touching the working copy.
pub fn changed(ctx: &Context, args: &ChangedArgs) -> Result<()> {
    let filter = build_filter(args)?;
    let engine = ctx.engine()?;

    let (base, current) = match (&args.base, &args.current, args.pr) {
        (Some(base), Some(current), None) => (base.clone(), current.clone()),
        (None, None, Some(number)) => {
            let head = RefName::pull_request_head(number);
            engine
                .fetch_narrow(&head)
                .with_context(|| format!("Failed to fetch pull request #{}", number))?;
            ("HEAD".to_string(), head.to_string())
        }
        _ => bail!("Specify either --base and --current, or --pr"),
    };

    let set = engine
        .change_set(&base, &current)
        .with_context(|| format!("Failed to diff {}..{}", base, current))?;
    let set = match &filter {
        Some(filter) => ChangeSet::new(set.into_iter().filter(|f| filter.matches(&f.path))),
        None => set,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&set.paths())?);
    } else if args.stat {
        for file in set.files() {
            println!(
                "{}\t+{}\t-{}\t{}",
                file.status, file.additions, file.deletions, file.path
            );
        }
    } else {
        for path in set.paths() {
            println!("{}", path);
        }
    }
    Ok(())
}

fn build_filter(args: &ChangedArgs) -> Result<Option<PathFilter>> {
    if let Some(ext) = &args.ext {
        return Ok(Some(PathFilter::extension(ext)));
    }
    if let Some(name) = &args.name {
        return Ok(Some(PathFilter::file_name(name)));
    }
    if let Some(pattern) = &args.regex {
        return Ok(Some(PathFilter::regex(pattern)?));
    }
    Ok(None)
}
