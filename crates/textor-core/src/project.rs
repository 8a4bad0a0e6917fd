//! A Textor project on disk

use std::path::{Path, PathBuf};

use textor_fs::{GuardedPath, secure_join};

use crate::config::TextorConfig;
use crate::ledger::{State, StateStore};
use crate::reconcile::{
    self, ProjectStatus, PruneOptions, PruneReport, SyncOptions, SyncReport, ValidateOptions,
    ValidationReport,
};
use crate::Result;

/// Root directory, configuration and ledger of one project.
///
/// Every ledger-changing method goes through the [`StateStore`] write queue,
/// so a `Project` can be shared between threads behind an `Arc`.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    config: TextorConfig,
    store: StateStore,
}

impl Project {
    /// Open the project at `root`, loading its configuration.
    ///
    /// # Errors
    ///
    /// Fails if a config file exists but cannot be parsed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = absolute_root(root.as_ref())?;
        let config = TextorConfig::load(&root)?;
        Ok(Self::with_config(root, config))
    }

    /// A project with an explicit configuration.
    pub fn with_config(root: impl Into<PathBuf>, config: TextorConfig) -> Self {
        let root = root.into();
        let store = StateStore::new(&root);
        Self { root, config, store }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &TextorConfig {
        &self.config
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// A fresh copy of the ledger.
    pub fn state(&self) -> State {
        self.store.load()
    }

    /// Resolve a project-relative path through the containment check.
    pub fn guard(&self, relative: &str) -> Result<GuardedPath> {
        Ok(secure_join(&self.root, [relative])?)
    }

    /// Classify the tree against the ledger.
    pub fn status(&self) -> Result<ProjectStatus> {
        reconcile::get_project_status(&self.root, &self.config, &self.store.load())
    }

    /// Fold disk changes into the ledger. A dry run never saves.
    pub fn sync(&self, options: SyncOptions) -> Result<SyncReport> {
        if options.dry_run {
            let mut state = self.store.load();
            return reconcile::sync(&self.root, &self.config, &mut state, options);
        }
        self.store
            .try_update(|state| reconcile::sync(&self.root, &self.config, state, options))
    }

    /// Drop entries for files that no longer exist. A dry run never saves.
    pub fn prune(&self, options: PruneOptions) -> Result<PruneReport> {
        if options.dry_run {
            let mut state = self.store.load();
            return reconcile::prune(&self.root, &self.config, &mut state, options);
        }
        self.store
            .try_update(|state| reconcile::prune(&self.root, &self.config, state, options))
    }

    /// Check the ledger. Only saves when `fix` repaired something.
    pub fn validate(&self, options: ValidateOptions) -> Result<ValidationReport> {
        let mut state = self.store.load();
        let report = reconcile::validate(&self.root, &self.config, &mut state, options)?;
        if report.fixed {
            self.store.save(&state)?;
        }
        Ok(report)
    }

    /// The managed root `key` lives under, or the project root.
    pub(crate) fn boundary_for(&self, key: &str) -> PathBuf {
        self.config
            .managed_roots()
            .iter()
            .find(|managed| textor_fs::NormalizedPath::new(key).starts_with(managed))
            .map(|managed| self.root.join(managed.to_native()))
            .unwrap_or_else(|| self.root.clone())
    }
}

fn absolute_root(root: &Path) -> Result<PathBuf> {
    let guarded = secure_join(root, std::iter::empty::<&str>())?;
    Ok(guarded.root().to_path_buf())
}
