//! State ledger and safe-mutation engine for Textor
//!
//! This crate keeps track of every file Textor generates and refuses to
//! destroy edits it cannot explain:
//!
//! - **Ledger**: [`StateStore`] persists [`State`] (files, sections,
//!   components) as one JSON document with atomic, serialized saves
//! - **Safe mutations**: [`ops`] compares disk content against the recorded
//!   hash and owner before any delete or move
//! - **Reconciliation**: [`reconcile`] classifies the tree as synced,
//!   modified, missing, untracked or orphaned and folds changes back
//! - **Rewriting**: [`rewrite`] keeps import paths valid across moves
//!
//! # Architecture
//!
//! ```text
//!                 textor-cli
//!                     |
//!                textor-core
//!   config  ledger  ops  reconcile  rewrite
//!                     |
//!                 textor-fs
//!   checksum  path  io  scan  config
//! ```
//!
//! # Example
//!
//! ```no_run
//! use textor_core::{FileKind, Project, TrackedFile};
//!
//! fn example() -> textor_core::Result<()> {
//!     let project = Project::open(".")?;
//!     project.write_tracked(
//!         "src/pages/about.astro",
//!         "<h1>About</h1>\n",
//!         TrackedFile::new(FileKind::Route, "page").owned_by("/about"),
//!         false,
//!     )?;
//!     assert!(project.status()?.is_clean());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ledger;
pub mod ops;
pub mod project;
pub mod reconcile;
pub mod rewrite;
pub mod tracked;

pub use config::{HashingConfig, ManagedPaths, ManagedRoot, TextorConfig};
pub use error::{Error, Result};
pub use ledger::{
    Component, FileKind, FileRecord, Section, State, StateStore, reconstruct_components,
    reconstruct_sections,
};
pub use ops::{
    Conflict, ConflictKind, DeleteOutcome, DirDeleteOutcome, MoveOutcome, SafetyOptions,
    safe_delete, safe_delete_dir, safe_move, write_with_signature,
};
pub use project::Project;
pub use reconcile::{
    ProjectStatus, PruneOptions, PruneReport, SyncOptions, SyncReport, ValidateOptions,
    ValidationIssue, ValidationReport, get_project_status,
};
pub use tracked::{MutationOptions, TrackedFile};
