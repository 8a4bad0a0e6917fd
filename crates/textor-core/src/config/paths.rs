//! Managed root directories

use serde::{Deserialize, Serialize};
use textor_fs::NormalizedPath;

/// One of the three directory trees Textor generates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagedRoot {
    Pages,
    Features,
    Components,
}

/// Project-relative locations of the managed roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagedPaths {
    pub pages: String,
    pub features: String,
    pub components: String,
}

impl Default for ManagedPaths {
    fn default() -> Self {
        Self {
            pages: "src/pages".to_string(),
            features: "src/features".to_string(),
            components: "src/components".to_string(),
        }
    }
}

impl ManagedPaths {
    /// The normalized project-relative path of a root.
    pub fn root(&self, which: ManagedRoot) -> NormalizedPath {
        let raw = match which {
            ManagedRoot::Pages => &self.pages,
            ManagedRoot::Features => &self.features,
            ManagedRoot::Components => &self.components,
        };
        NormalizedPath::new(raw)
    }

    /// Which managed root a ledger key lives under, with the remainder below it.
    pub fn classify(&self, key: &str) -> Option<(ManagedRoot, String)> {
        let key_path = NormalizedPath::new(key);
        [ManagedRoot::Pages, ManagedRoot::Features, ManagedRoot::Components]
            .into_iter()
            .find_map(|which| {
                key_path
                    .strip_prefix(&self.root(which))
                    .map(|rest| (which, rest.to_string()))
            })
    }
}
