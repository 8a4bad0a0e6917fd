//! Project configuration
//!
//! Textor only needs a handful of settings from the project: where the
//! managed roots live, which signature marker goes into which kind of file,
//! and how content is normalized before hashing. Everything is defaulted so a
//! project without a config file behaves like a stock Astro layout.
//!
//! # Example
//!
//! ```json
//! {
//!   "paths": { "pages": "src/pages", "features": "src/features", "components": "src/components" },
//!   "signatures": { "astro": "<!-- @generated by Textor -->" },
//!   "hashing": { "normalization": "normalizeEOL" }
//! }
//! ```

mod paths;

pub use paths::{ManagedPaths, ManagedRoot};

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use textor_fs::{ConfigStore, Normalization, NormalizedPath, TextorPath};

use crate::Result;

const HTML_SIGNATURE: &str = "<!-- @generated by Textor -->";
const SCRIPT_SIGNATURE: &str = "// @generated by Textor";
const CSS_SIGNATURE: &str = "/* @generated by Textor */";

/// Hashing settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HashingConfig {
    /// Normalization applied before every content hash
    pub normalization: Normalization,
}

/// Textor project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextorConfig {
    /// Managed root directories, relative to the project root
    pub paths: ManagedPaths,
    /// Signature marker per file extension
    pub signatures: BTreeMap<String, String>,
    /// Content hashing settings
    pub hashing: HashingConfig,
    /// Layout recorded for sections discovered during reconstruction
    pub default_layout: String,
    /// Directory names the scanner never descends into
    pub ignore: Vec<String>,
}

impl Default for TextorConfig {
    fn default() -> Self {
        let signatures = [
            ("astro", HTML_SIGNATURE),
            ("md", HTML_SIGNATURE),
            ("mdx", HTML_SIGNATURE),
            ("html", HTML_SIGNATURE),
            ("ts", SCRIPT_SIGNATURE),
            ("tsx", SCRIPT_SIGNATURE),
            ("js", SCRIPT_SIGNATURE),
            ("jsx", SCRIPT_SIGNATURE),
            ("css", CSS_SIGNATURE),
        ]
        .into_iter()
        .map(|(ext, sig)| (ext.to_string(), sig.to_string()))
        .collect();

        Self {
            paths: ManagedPaths::default(),
            signatures,
            hashing: HashingConfig::default(),
            default_layout: "Main".to_string(),
            ignore: ["node_modules", ".git", ".textor", "dist"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl TextorConfig {
    /// Load the project config, falling back to defaults when none exists.
    ///
    /// Looks for `.textor/config.json`, then `.toml`, then `.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let store = ConfigStore::new();
        for candidate in TextorPath::config_candidates() {
            let path = root.join(candidate.as_str());
            if path.is_file() {
                tracing::debug!(config = %path.display(), "loading config");
                return Ok(store.load(&path)?);
            }
        }
        tracing::debug!(root = %root.display(), "no config file, using defaults");
        Ok(Self::default())
    }

    /// Normalization mode used for all hashing.
    pub fn normalization(&self) -> Normalization {
        self.hashing.normalization
    }

    /// Signature for a file, chosen by its extension.
    pub fn signature_for(&self, path: &str) -> Option<&str> {
        let ext = NormalizedPath::new(path).extension()?.to_lowercase();
        self.signatures.get(&ext).map(String::as_str)
    }

    /// Every distinct configured signature.
    pub fn all_signatures(&self) -> Vec<String> {
        let mut sigs: Vec<String> = self.signatures.values().cloned().collect();
        sigs.sort();
        sigs.dedup();
        sigs
    }

    /// The managed roots in pages, features, components order.
    pub fn managed_roots(&self) -> [NormalizedPath; 3] {
        [
            self.paths.root(ManagedRoot::Pages),
            self.paths.root(ManagedRoot::Features),
            self.paths.root(ManagedRoot::Components),
        ]
    }
}
