//! Shared test utilities for the Textor workspace.
//!
//! This crate provides standardised project fixtures so crate test suites do
//! not each hand-roll their own temp-dir setup. It is a dev-dependency only,
//! never published, and deliberately knows nothing about the core types.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`](project::TestProject) builder for scratch
//!   Astro-style project trees

pub mod project;

pub use project::{HTML_SIGNATURE, SCRIPT_SIGNATURE, TestProject};
