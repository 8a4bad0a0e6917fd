//! Ledger record types
//!
//! A [`FileRecord`] remembers how a generated file looked the last time Textor
//! wrote or moved it. [`Section`] and [`Component`] are derived metadata that
//! tie those files together into routes and reusable components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a tracked file was generated as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileKind {
    /// A page under the pages root
    Route,
    /// The entry file of a feature directory
    Feature,
    /// The entry file of a component directory
    Component,
    /// Any other file inside a feature directory
    FeatureFile,
    /// Any other file inside a component directory
    ComponentFile,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Route => "route",
            Self::Feature => "feature",
            Self::Component => "component",
            Self::FeatureFile => "feature-file",
            Self::ComponentFile => "component-file",
        };
        f.write_str(name)
    }
}

/// A tracked file
///
/// `hash` is the digest of the content as of the last write or move recorded
/// by Textor. A different digest on disk means the file drifted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub kind: FileKind,
    /// Template the content was rendered from
    pub template: String,
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    /// Route or component identifier the file is attributed to
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default = "default_true")]
    pub has_signature: bool,
}

fn default_true() -> bool {
    true
}

impl FileRecord {
    /// Create a record stamped with the current time.
    pub fn new(kind: FileKind, template: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            kind,
            template: template.into(),
            hash: hash.into(),
            timestamp: Utc::now(),
            owner: None,
            has_signature: true,
        }
    }

    /// Attribute the record to an owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Mark the file as carrying no signature.
    pub fn without_signature(mut self) -> Self {
        self.has_signature = false;
        self
    }

    /// Whether two records agree on everything except the timestamp.
    pub fn same_content(&self, other: &FileRecord) -> bool {
        self.kind == other.kind
            && self.template == other.template
            && self.hash == other.hash
            && self.owner == other.owner
            && self.has_signature == other.has_signature
    }
}

/// A route and/or feature registered as a unit
///
/// A section without a route is a standalone feature with no page wiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub name: String,
    #[serde(default)]
    pub route: Option<String>,
    /// Project-relative feature directory
    pub feature_path: String,
    pub layout: String,
    /// Page file extension including the dot, e.g. `.astro`
    pub extension: String,
}

impl Section {
    /// The key sections are deduplicated on: the route, or the feature path
    /// for standalone features.
    pub fn key(&self) -> &str {
        self.route.as_deref().unwrap_or(&self.feature_path)
    }

    /// Whether `needle` names this section by route, name or feature path.
    pub fn matches(&self, needle: &str) -> bool {
        self.route.as_deref() == Some(needle) || self.name == needle || self.feature_path == needle
    }
}

/// A registered reusable component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    /// Project-relative component directory
    pub path: String,
}
