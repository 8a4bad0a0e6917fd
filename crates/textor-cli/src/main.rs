//! Textor CLI
//!
//! Thin command-line front-end over the Textor ledger and safe file operations.

mod cli;
mod commands;
mod error;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Some(cmd) => execute_command(root, cmd),
        None => {
            // No command provided - show help hint
            println!("{} ledger for generated files", "textor".green().bold());
            println!();
            println!("Run {} for available commands.", "textor --help".cyan());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    if let Err(e) = result {
        eprintln!("{}: cannot install log subscriber: {e}", "warning".yellow());
    }
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(root: PathBuf, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Status { json } => commands::run_status(&root, json),
        Commands::Sync {
            include_all,
            dry_run,
        } => commands::run_sync(&root, include_all, dry_run),
        Commands::Prune { dry_run, yes } => commands::run_prune(&root, dry_run, yes),
        Commands::Validate { fix } => commands::run_validate(&root, fix),
        Commands::Move { from, to, safety } => commands::run_move(&root, &from, &to, &safety),
        Commands::Remove { path, safety } => commands::run_remove(&root, &path, &safety),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_user() {
        let error = crate::error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }

    #[test]
    fn test_cli_error_skipped_pluralizes() {
        assert_eq!(crate::error::CliError::skipped(1).to_string(), "1 item skipped");
        assert_eq!(crate::error::CliError::skipped(3).to_string(), "3 items skipped");
    }

    #[test]
    fn test_status_dispatch_on_empty_project() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = execute_command(dir.path().to_path_buf(), Commands::Status { json: true });
        assert!(result.is_ok());
    }
}
