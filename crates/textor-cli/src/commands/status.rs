//! Status command implementation

use std::path::Path;

use colored::Colorize;
use textor_core::{Project, ProjectStatus};

use crate::error::Result;

/// Run the status command
pub fn run_status(path: &Path, json: bool) -> Result<()> {
    let project = Project::open(path)?;
    let status = project.status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    print_status(&status);
    Ok(())
}

fn print_status(status: &ProjectStatus) {
    println!("{}", "Project Status".bold());
    println!();

    if status.total() == 0 {
        println!("  {} (nothing tracked or found in the managed roots)", "Empty".dimmed());
        return;
    }

    println!("  {}:    {}", "Synced".dimmed(), status.synced.len().to_string().green());

    if !status.modified.is_empty() {
        println!();
        println!("{}:", "Modified".bold());
        for file in &status.modified {
            println!("  {} {}", "~".yellow(), file.path.yellow());
        }
    }

    if !status.missing.is_empty() {
        println!();
        println!("{}:", "Missing".bold());
        for path in &status.missing {
            println!("  {} {}", "-".red(), path.red());
        }
    }

    if !status.untracked.is_empty() {
        println!();
        println!("{}:", "Untracked (generated)".bold());
        for file in &status.untracked {
            println!("  {} {}", "+".cyan(), file.path.cyan());
        }
    }

    if !status.orphaned.is_empty() {
        println!();
        println!("{}:", "Orphaned (hand-authored)".bold());
        for path in &status.orphaned {
            println!("  {} {}", "?".dimmed(), path.dimmed());
        }
    }

    println!();
    if status.is_clean() {
        println!("{}", "Ledger and disk are in sync.".green());
    } else {
        println!("Run {} to accept these changes.", "textor sync".cyan());
    }
}
