//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Textor - Track generated files and change them without losing edits
#[derive(Parser, Debug)]
#[command(name = "textor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, env = "TEXTOR_ROOT")]
    pub root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Compare the ledger with the files on disk
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Accept disk changes into the ledger
    ///
    /// Adopts signed untracked files, refreshes hashes of edited files and
    /// drops entries whose file is gone.
    Sync {
        /// Also adopt files without a signature
        #[arg(long)]
        include_all: bool,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove ledger entries for files that no longer exist
    Prune {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Check the ledger for unsafe or inconsistent entries
    Validate {
        /// Repair what can be repaired
        #[arg(long)]
        fix: bool,
    },

    /// Move a tracked file, rewriting imports
    #[command(name = "mv")]
    Move {
        /// Current project-relative path
        from: String,

        /// New project-relative path
        to: String,

        #[command(flatten)]
        safety: SafetyArgs,
    },

    /// Delete a tracked file or directory
    #[command(name = "rm")]
    Remove {
        /// Project-relative path
        path: String,

        #[command(flatten)]
        safety: SafetyArgs,
    },
}

/// Conflict overrides shared by `mv` and `rm`
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SafetyArgs {
    /// Skip every safety check
    #[arg(short, long)]
    pub force: bool,

    /// Proceed even if the content changed since it was generated
    #[arg(long)]
    pub accept_changes: bool,
}
