//! Sync, prune and validate command implementations

use std::path::Path;

use colored::Colorize;
use dialoguer::Confirm;
use textor_core::{Project, PruneOptions, SyncOptions, ValidateOptions};

use crate::error::{CliError, Result};

/// Run the sync command
pub fn run_sync(path: &Path, include_all: bool, dry_run: bool) -> Result<()> {
    let project = Project::open(path)?;
    let report = project.sync(SyncOptions {
        include_all,
        dry_run,
    })?;

    if dry_run {
        println!("{} Dry run - no changes will be made", "=>".blue().bold());
        println!();
    }

    if !report.has_changes() && report.skipped.is_empty() {
        println!("{} Ledger already matches disk", "OK".green().bold());
        return Ok(());
    }

    for path in &report.added {
        println!("  {} {} {}", "+".green(), "tracked".green(), path);
    }
    for path in &report.updated {
        println!("  {} {} {}", "~".yellow(), "updated".yellow(), path);
    }
    for path in &report.removed {
        println!("  {} {} {}", "-".red(), "dropped".red(), path);
    }
    for path in &report.skipped {
        println!("  {} {} {}: cannot read file", "!".red().bold(), "skipped".red(), path);
    }

    if !report.skipped.is_empty() {
        return Err(CliError::skipped(report.skipped.len()));
    }

    println!();
    let verb = if dry_run { "Would update" } else { "Updated" };
    println!(
        "{} {} ledger ({} added, {} updated, {} dropped)",
        "OK".green().bold(),
        verb,
        report.added.len(),
        report.updated.len(),
        report.removed.len()
    );
    Ok(())
}

/// Run the prune command
pub fn run_prune(path: &Path, dry_run: bool, yes: bool) -> Result<()> {
    let project = Project::open(path)?;
    let preview = project.prune(PruneOptions { dry_run: true })?;

    if preview.removed.is_empty() {
        println!("{} Nothing to prune", "OK".green().bold());
        return Ok(());
    }

    println!("{}:", "Entries without a file on disk".bold());
    for path in &preview.removed {
        println!("  {} {}", "-".red(), path);
    }
    println!();

    if dry_run {
        println!("{} Dry run - no changes will be made", "=>".blue().bold());
        return Ok(());
    }

    if !yes {
        let proceed = Confirm::new()
            .with_prompt(format!("Remove {} ledger entries?", preview.removed.len()))
            .default(false)
            .interact()?;
        if !proceed {
            return Err(CliError::user("Prune cancelled by user."));
        }
    }

    let report = project.prune(PruneOptions { dry_run: false })?;
    println!("{} Pruned {} entries", "OK".green().bold(), report.removed.len());
    Ok(())
}

/// Run the validate command
pub fn run_validate(path: &Path, fix: bool) -> Result<()> {
    let project = Project::open(path)?;
    let report = project.validate(ValidateOptions { fix })?;

    if report.is_valid() {
        println!("{} Ledger is valid", "OK".green().bold());
        return Ok(());
    }

    for issue in &report.issues {
        println!("  {} {}", "!".yellow().bold(), issue);
    }
    println!();

    if report.fixed {
        println!("{} Repaired {} issues", "OK".green().bold(), report.issues.len());
        return Ok(());
    }

    println!("Run {} to repair.", "textor validate --fix".cyan());
    Err(CliError::user(format!("{} ledger issues found", report.issues.len())))
}
