//! Structural checks on the ledger itself

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use textor_fs::secure_join;

use crate::config::TextorConfig;
use crate::ledger::{State, ledger_key, reconstruct_components, reconstruct_sections};
use crate::Result;

/// Options for [`validate`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Repair what can be repaired
    pub fix: bool,
}

/// A problem found in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum ValidationIssue {
    /// A file key resolves outside the project root
    UnsafePath { path: String },
    /// A file key is not in normalized forward-slash form
    UnnormalizedPath { path: String, normalized: String },
    /// A file record carries no hash
    EmptyHash { path: String },
    /// Two sections share a route
    DuplicateSection { route: String },
    /// Two components share a name
    DuplicateComponent { name: String },
    /// A section's feature directory has no tracked files and is absent on disk
    #[serde(rename_all = "camelCase")]
    MissingFeature { section: String, feature_path: String },
    /// A component's directory is absent on disk
    MissingComponentDir { name: String, path: String },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsafePath { path } => write!(f, "{path}: resolves outside the project root"),
            Self::UnnormalizedPath { path, normalized } => {
                write!(f, "{path}: key is not normalized (expected {normalized})")
            }
            Self::EmptyHash { path } => write!(f, "{path}: record has no hash"),
            Self::DuplicateSection { route } => write!(f, "{route}: section registered more than once"),
            Self::DuplicateComponent { name } => write!(f, "{name}: component registered more than once"),
            Self::MissingFeature { section, feature_path } => {
                write!(f, "{section}: feature directory {feature_path} not found")
            }
            Self::MissingComponentDir { name, path } => {
                write!(f, "{name}: component directory {path} not found")
            }
        }
    }
}

/// Outcome of [`validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    /// Whether repairs were applied to the state
    pub fixed: bool,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check the ledger for entries that cannot be trusted.
///
/// With `fix`, unsafe and hashless records are dropped, unnormalized keys are
/// re-keyed, and sections and components are rebuilt from the remaining files.
pub fn validate(
    root: &Path,
    config: &TextorConfig,
    state: &mut State,
    options: ValidateOptions,
) -> Result<ValidationReport> {
    let mut issues = Vec::new();

    for (key, record) in &state.files {
        let normalized = ledger_key(key);
        if secure_join(root, [key.as_str()]).is_err() || normalized.is_empty() {
            issues.push(ValidationIssue::UnsafePath { path: key.clone() });
            continue;
        }
        if &normalized != key {
            issues.push(ValidationIssue::UnnormalizedPath {
                path: key.clone(),
                normalized,
            });
        }
        if record.hash.trim().is_empty() {
            issues.push(ValidationIssue::EmptyHash { path: key.clone() });
        }
    }

    let mut routes = BTreeSet::new();
    for section in &state.sections {
        if let Some(route) = &section.route
            && !routes.insert(route.as_str())
        {
            issues.push(ValidationIssue::DuplicateSection { route: route.clone() });
        }
        let feature_dir = root.join(&section.feature_path);
        if state.files_under(&section.feature_path).is_empty() && !feature_dir.is_dir() {
            issues.push(ValidationIssue::MissingFeature {
                section: section.name.clone(),
                feature_path: section.feature_path.clone(),
            });
        }
    }

    let mut names = BTreeSet::new();
    for component in &state.components {
        if !names.insert(component.name.as_str()) {
            issues.push(ValidationIssue::DuplicateComponent {
                name: component.name.clone(),
            });
        }
        if !root.join(&component.path).is_dir() {
            issues.push(ValidationIssue::MissingComponentDir {
                name: component.name.clone(),
                path: component.path.clone(),
            });
        }
    }

    for issue in &issues {
        tracing::debug!(%issue, "validation issue");
    }

    let fixed = options.fix && !issues.is_empty();
    if fixed {
        repair(state, config, &issues);
        tracing::info!(issues = issues.len(), "ledger repaired");
    }

    Ok(ValidationReport { issues, fixed })
}

fn repair(state: &mut State, config: &TextorConfig, issues: &[ValidationIssue]) {
    for issue in issues {
        match issue {
            ValidationIssue::UnsafePath { path } | ValidationIssue::EmptyHash { path } => {
                state.files.remove(path);
            }
            ValidationIssue::UnnormalizedPath { path, normalized } => {
                if let Some(record) = state.files.remove(path) {
                    state.files.entry(normalized.clone()).or_insert(record);
                }
            }
            _ => {}
        }
    }

    state.sections = reconstruct_sections(state, config);
    state.components = reconstruct_components(&state.files, config);
}
