//! [`TestProject`] builder for Textor test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Default signature for `.astro`, `.md` and `.html` files.
pub const HTML_SIGNATURE: &str = "<!-- @generated by Textor -->";

/// Default signature for script files.
pub const SCRIPT_SIGNATURE: &str = "// @generated by Textor";

/// A temporary project directory with helpers for laying out files and
/// asserting on them.
///
/// # Example
///
/// ```rust,no_run
/// use textor_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.write_signed("src/pages/about.astro", "<h1>About</h1>\n");
/// project.write("src/features/blog/notes.md", "hand written");
/// project.assert_file_exists("src/pages/about.astro");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary project.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a project with empty `src/pages`, `src/features` and
    /// `src/components` directories.
    pub fn with_managed_roots() -> Self {
        let project = Self::new();
        for dir in ["src/pages", "src/features", "src/components"] {
            fs::create_dir_all(project.path(dir)).unwrap();
        }
        project
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the project.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("TestProject::write: {}: {e}", path.display()));
        path
    }

    /// Write `content` prefixed with the default signature for its extension.
    pub fn write_signed(&self, relative: &str, content: &str) -> PathBuf {
        let signature = signature_for(relative);
        self.write(relative, &format!("{signature}\n{content}"))
    }

    /// Write `.textor/config.json`.
    pub fn write_config(&self, json: &str) -> PathBuf {
        self.write(".textor/config.json", json)
    }

    /// Read a project file as text.
    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("TestProject::read: {}: {e}", path.display()))
    }

    /// Delete a file behind the tool's back.
    pub fn remove(&self, relative: &str) {
        let path = self.path(relative);
        fs::remove_file(&path)
            .unwrap_or_else(|e| panic!("TestProject::remove: {}: {e}", path.display()));
    }

    /// Raw ledger document, if one has been written.
    pub fn ledger_json(&self) -> Option<String> {
        fs::read_to_string(self.path(".textor/state.json")).ok()
    }

    /// Assert that `relative` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `relative` does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `relative` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, relative: &str, content: &str) {
        let file_content = self.read(relative);
        assert!(
            file_content.contains(content),
            "File {relative} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}

fn signature_for(relative: &str) -> &'static str {
    match relative.rsplit('.').next() {
        Some("ts" | "tsx" | "js" | "jsx") => SCRIPT_SIGNATURE,
        Some("css") => "/* @generated by Textor */",
        _ => HTML_SIGNATURE,
    }
}
