//! The ledger of everything Textor generated
//!
//! [`State`] is a plain value: `files` keyed by project-relative path plus the
//! `sections` and `components` metadata derived from them. [`StateStore`]
//! owns the JSON document on disk. Every mutation loads a fresh copy, changes
//! it and writes it back through a single process-wide write queue, so two
//! callers in the same process can never interleave a read-modify-write.
//! Separate processes are serialized only by an advisory lock; the document is
//! replaced atomically, so a reader always sees a complete old or new ledger.

mod reconstruct;
mod record;

pub use reconstruct::{derive_route, reconstruct_components, reconstruct_sections};
pub use record::{Component, FileKind, FileRecord, Section};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use textor_fs::{FileLock, NormalizedPath, RobustnessConfig, TextorPath, io};

use crate::{Error, Result};

/// The persisted ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub files: BTreeMap<String, FileRecord>,
}

impl State {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file, replacing any existing entry for the same path.
    pub fn insert_file(&mut self, path: &str, record: FileRecord) -> Option<FileRecord> {
        self.files.insert(ledger_key(path), record)
    }

    /// Drop a file entry.
    pub fn remove_file(&mut self, path: &str) -> Option<FileRecord> {
        self.files.remove(&ledger_key(path))
    }

    /// Look up a file entry.
    pub fn file(&self, path: &str) -> Option<&FileRecord> {
        self.files.get(&ledger_key(path))
    }

    /// Tracked paths at or below a directory key.
    pub fn files_under(&self, dir: &str) -> Vec<String> {
        let dir = NormalizedPath::new(dir);
        self.files
            .keys()
            .filter(|key| NormalizedPath::new(key.as_str()).starts_with(&dir))
            .cloned()
            .collect()
    }

    /// Insert a section, replacing one with the same route (or the same
    /// feature path for standalone features).
    pub fn add_section(&mut self, section: Section) {
        match self.sections.iter_mut().find(|s| s.key() == section.key()) {
            Some(existing) => *existing = section,
            None => self.sections.push(section),
        }
    }

    /// Remove the section matching a route, name or feature path.
    pub fn remove_section(&mut self, needle: &str) -> Option<Section> {
        let pos = self.sections.iter().position(|s| s.matches(needle))?;
        Some(self.sections.remove(pos))
    }

    /// Find a section by route, name or feature path.
    pub fn find_section(&self, needle: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.matches(needle))
    }

    /// Insert a component, replacing one with the same name.
    pub fn add_component(&mut self, component: Component) {
        match self.components.iter_mut().find(|c| c.name == component.name) {
            Some(existing) => *existing = component,
            None => self.components.push(component),
        }
    }

    /// Remove a component by name.
    pub fn remove_component(&mut self, name: &str) -> Option<Component> {
        let pos = self.components.iter().position(|c| c.name == name)?;
        Some(self.components.remove(pos))
    }

    /// Find a component by name.
    pub fn find_component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Normalize a path into the form used as a `files` key.
pub fn ledger_key(path: &str) -> String {
    NormalizedPath::new(path).as_str().to_string()
}

/// Owner of the ledger document
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    robustness: RobustnessConfig,
    write_queue: Mutex<()>,
}

impl StateStore {
    /// A store for the ledger of the project at `root`.
    pub fn new(root: &Path) -> Self {
        Self::at(root.join(TextorPath::StateFile.as_str()))
    }

    /// A store for a ledger file at an explicit location.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            robustness: RobustnessConfig::default(),
            write_queue: Mutex::new(()),
        }
    }

    /// Override write and lock settings.
    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    /// Path of the ledger document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger.
    ///
    /// A missing or unparseable document is treated as an empty ledger.
    pub fn load(&self) -> State {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return State::new(),
            Err(e) => {
                tracing::warn!(ledger = %self.path.display(), error = %e, "cannot read ledger, starting empty");
                return State::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(ledger = %self.path.display(), error = %e, "ledger is corrupt, starting empty");
                State::new()
            }
        }
    }

    /// Persist the ledger, replacing the document atomically.
    pub fn save(&self, state: &State) -> Result<()> {
        let _queue = self.enqueue();
        let _lock = FileLock::acquire(&self.path, self.robustness.lock_timeout)?;
        self.write(state)
    }

    /// Load, apply `f` and save, all inside the write queue.
    pub fn update<T>(&self, f: impl FnOnce(&mut State) -> T) -> Result<T> {
        self.try_update(|state| Ok(f(state)))
    }

    /// Like [`update`](Self::update), but nothing is saved if `f` fails.
    pub fn try_update<T>(&self, f: impl FnOnce(&mut State) -> Result<T>) -> Result<T> {
        let _queue = self.enqueue();
        let _lock = FileLock::acquire(&self.path, self.robustness.lock_timeout)?;
        let mut state = self.load();
        let out = f(&mut state)?;
        self.write(&state)?;
        Ok(out)
    }

    /// Record a file, stamping the current time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Ledger`] if `path` normalizes to an empty key.
    pub fn register_file(&self, path: &str, mut record: FileRecord) -> Result<()> {
        record.timestamp = Utc::now();
        let key = ledger_key(path);
        if key.is_empty() {
            return Err(Error::Ledger {
                message: format!("cannot register {path:?}: empty file key"),
            });
        }
        tracing::debug!(path = %key, kind = %record.kind, "registering file");
        self.update(|state| {
            state.files.insert(key, record);
        })
    }

    /// Forget a file. Returns the removed record, if any.
    pub fn unregister_file(&self, path: &str) -> Result<Option<FileRecord>> {
        let key = ledger_key(path);
        tracing::debug!(path = %key, "unregistering file");
        self.update(|state| state.files.remove(&key))
    }

    pub fn add_section(&self, section: Section) -> Result<()> {
        self.update(|state| state.add_section(section))
    }

    pub fn remove_section(&self, needle: &str) -> Result<Option<Section>> {
        self.update(|state| state.remove_section(needle))
    }

    /// Apply `f` to the section matching `needle`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no section matches.
    pub fn update_section(&self, needle: &str, f: impl FnOnce(&mut Section)) -> Result<Section> {
        self.try_update(|state| {
            let section = state
                .sections
                .iter_mut()
                .find(|s| s.matches(needle))
                .ok_or_else(|| Error::NotFound(format!("section {needle}")))?;
            f(section);
            Ok(section.clone())
        })
    }

    pub fn add_component(&self, component: Component) -> Result<()> {
        self.update(|state| state.add_component(component))
    }

    pub fn remove_component(&self, name: &str) -> Result<Option<Component>> {
        self.update(|state| state.remove_component(name))
    }

    /// Look up a section, failing with [`Error::NotFound`].
    pub fn require_section(&self, needle: &str) -> Result<Section> {
        self.load()
            .find_section(needle)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("section {needle}")))
    }

    /// Look up a component, failing with [`Error::NotFound`].
    pub fn require_component(&self, name: &str) -> Result<Component> {
        self.load()
            .find_component(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("component {name}")))
    }

    fn enqueue(&self) -> MutexGuard<'_, ()> {
        // A panic mid-save cannot leave the document half-written, so a
        // poisoned queue is still usable
        self.write_queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self, state: &State) -> Result<()> {
        let content = serde_json::to_string_pretty(state)?;
        io::write_atomic(&self.path, content.as_bytes(), self.robustness)?;
        tracing::debug!(ledger = %self.path.display(), files = state.files.len(), "ledger saved");
        Ok(())
    }
}
