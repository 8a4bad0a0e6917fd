//! Well-known project paths.

use std::path::Path;

/// Fixed locations Textor keeps inside a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextorPath {
    /// The `.textor` directory holding the ledger and config
    StateDir,
    /// The ledger document, relative to the project root
    StateFile,
    /// The JSON config file, relative to the project root
    ConfigJson,
    /// The TOML config file, relative to the project root
    ConfigToml,
    /// The YAML config file, relative to the project root
    ConfigYaml,
}

impl TextorPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StateDir => ".textor",
            Self::StateFile => ".textor/state.json",
            Self::ConfigJson => ".textor/config.json",
            Self::ConfigToml => ".textor/config.toml",
            Self::ConfigYaml => ".textor/config.yaml",
        }
    }

    /// Config file candidates in lookup order.
    pub fn config_candidates() -> [TextorPath; 3] {
        [Self::ConfigJson, Self::ConfigToml, Self::ConfigYaml]
    }
}

impl AsRef<Path> for TextorPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for TextorPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for TextorPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
