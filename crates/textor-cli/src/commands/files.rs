//! `mv` and `rm` command implementations

use std::path::Path;

use colored::Colorize;
use textor_core::{Conflict, DeleteOutcome, DirDeleteOutcome, MoveOutcome, MutationOptions, Project};

use crate::cli::SafetyArgs;
use crate::error::{CliError, Result};

/// Run the mv command
pub fn run_move(path: &Path, from: &str, to: &str, safety: &SafetyArgs) -> Result<()> {
    let project = Project::open(path)?;

    match project.move_tracked(from, to, &options(safety))? {
        MoveOutcome::Moved { .. } => {
            println!("{} {} -> {}", "moved".green(), from, to);
            Ok(())
        }
        MoveOutcome::Skipped(conflict) => {
            print_skip(&conflict);
            Err(CliError::skipped(1))
        }
    }
}

/// Run the rm command
///
/// Directories are removed as a unit: one foreign or edited file inside blocks
/// the whole deletion.
pub fn run_remove(path: &Path, target: &str, safety: &SafetyArgs) -> Result<()> {
    let project = Project::open(path)?;
    let resolved = textor_fs::secure_join(project.root(), [target])?;

    if resolved.is_dir() {
        return match project.delete_tracked_dir(target, &options(safety))? {
            DirDeleteOutcome::Deleted { files } => {
                for file in &files {
                    println!("{} {}", "deleted".green(), file);
                }
                println!("{} {}", "deleted".green(), resolved.relative());
                Ok(())
            }
            DirDeleteOutcome::NotFound => Err(CliError::user(format!("Not found: {target}"))),
            DirDeleteOutcome::Blocked(conflicts) => {
                for conflict in &conflicts {
                    print_skip(conflict);
                }
                Err(CliError::skipped(conflicts.len()))
            }
        };
    }

    match project.delete_tracked(target, &options(safety))? {
        DeleteOutcome::Deleted => {
            println!("{} {}", "deleted".green(), resolved.relative());
            Ok(())
        }
        DeleteOutcome::NotFound => {
            println!("{} {} (nothing to delete)", "skipped".dimmed(), resolved.relative());
            Ok(())
        }
        DeleteOutcome::Skipped(conflict) => {
            print_skip(&conflict);
            Err(CliError::skipped(1))
        }
    }
}

fn options(safety: &SafetyArgs) -> MutationOptions {
    MutationOptions {
        force: safety.force,
        accept_changes: safety.accept_changes,
        owner: None,
    }
}

fn print_skip(conflict: &Conflict) {
    println!(
        "{} {}: {}",
        "skipped".yellow().bold(),
        conflict.path,
        conflict.reason()
    );
}
