//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <file>`: Read repository settings from this file
//! - `--path <dir>`, `--url <url>`, `--username <name>`: Override config values
//! - `--token <token>`: Auth token (also `$REFSCOPE_TOKEN`)
//! - `--debug`: Enable debug logging

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::types::RefSpec;

/// refscope - resolve refs, check them out, and list what changed
#[derive(Parser, Debug)]
#[command(name = "refscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: $REFSCOPE_CONFIG, ./refscope.toml, then the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Working copy path
    #[arg(long, global = true, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Remote URL, used to clone when the working copy is missing
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Auth token sent as the basic-auth password
    #[arg(long, global = true, env = "REFSCOPE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username placeholder sent with the token
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check out a branch, tag or commit, fetching it if needed
    #[command(
        long_about = "Check out a branch, tag or commit, fetching it if needed.\n\n\
            The reference is classified locally first, then against origin. When a \
            name is both a branch and a tag, the branch wins. Uncommitted changes in \
            the working copy are discarded.",
        after_help = "\
EXAMPLES:
    refscope checkout main
    refscope checkout v2.3.0
    refscope checkout 3f2a1c0e9b8d7a6f5e4d3c2b1a0f9e8d7c6b5a49"
    )]
    Checkout {
        /// Branch name, tag name or full commit hash
        reference: String,
    },

    /// Fetch from origin
    Fetch {
        /// Refspec to fetch instead of all branches and tags
        #[arg(long, value_name = "SPEC")]
        refspec: Option<RefSpec>,
    },

    /// Classify a reference as branch, tag and/or commit
    Resolve {
        /// Branch name, tag name or full commit hash
        reference: String,

        /// Do not ask origin when nothing matches locally
        #[arg(long)]
        local: bool,
    },

    /// Print a file as committed
    #[command(group(ArgGroup::new("at").required(true).args(["commit", "branch"])))]
    Show {
        /// Repository-relative file path
        file: String,

        /// Full commit hash
        #[arg(long)]
        commit: Option<String>,

        /// Local branch name
        #[arg(long)]
        branch: Option<String>,
    },

    /// List files changed between two refs or by a pull request
    #[command(after_help = "\
EXAMPLES:
    # Everything that differs between two refs
    refscope changed --base main --current feature/x

    # YAML files touched by pull request 42 (relative to HEAD)
    refscope changed --pr 42 --ext yaml

    # Deployment configs only, as JSON
    refscope changed --pr 42 --name conf.yaml --json")]
    Changed(ChangedArgs),

    /// Print the commit HEAD points at
    Head,
}

/// Arguments for `changed`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("filter").args(["ext", "name", "regex"])))]
pub struct ChangedArgs {
    /// Base ref
    #[arg(long, requires = "current", conflicts_with = "pr")]
    pub base: Option<String>,

    /// Current ref
    #[arg(long, requires = "base", conflicts_with = "pr")]
    pub current: Option<String>,

    /// Pull request number (diffed against HEAD)
    #[arg(long, required_unless_present = "base")]
    pub pr: Option<u64>,

    /// Keep paths with this extension
    #[arg(long)]
    pub ext: Option<String>,

    /// Keep paths with this base name
    #[arg(long)]
    pub name: Option<String>,

    /// Keep paths matching this regular expression
    #[arg(long)]
    pub regex: Option<String>,

    /// Print a JSON array
    #[arg(long, conflicts_with = "stat")]
    pub json: bool,

    /// Show status and line counts per file
    #[arg(long)]
    pub stat: bool,
}
