//! Derive section and component metadata from tracked files
//!
//! After destructive operations the `sections`/`components` lists can point
//! at things that no longer exist, and bulk adoption can track files whose
//! sections were never registered. Both lists are rebuilt here purely from
//! the `files` map and the configured roots.

use std::collections::{BTreeMap, BTreeSet};

use textor_fs::NormalizedPath;

use super::{Component, FileRecord, Section, State};
use crate::config::{ManagedRoot, TextorConfig};

/// Rebuild the component list from tracked files.
///
/// Every file nested below the components root contributes the first path
/// segment under that root as a component name.
pub fn reconstruct_components(
    files: &BTreeMap<String, FileRecord>,
    config: &TextorConfig,
) -> Vec<Component> {
    let root = config.paths.root(ManagedRoot::Components);
    let names: BTreeSet<String> = files
        .keys()
        .filter_map(|key| {
            let key = NormalizedPath::new(key.as_str());
            let rest = key.strip_prefix(&root)?;
            // Files directly in the root are not component directories
            let (name, _) = rest.split_once('/')?;
            Some(name.to_string())
        })
        .collect();

    names
        .into_iter()
        .map(|name| Component {
            path: root.join(&name).as_str().to_string(),
            name,
        })
        .collect()
}

/// Rebuild the section list from tracked files.
///
/// Existing sections survive while something backs them: a tracked page for
/// their route or tracked files in their feature directory. Tracked pages
/// with no section yet are paired with a feature directory of the same path
/// below the features root and added.
pub fn reconstruct_sections(state: &State, config: &TextorConfig) -> Vec<Section> {
    let features_root = config.paths.root(ManagedRoot::Features);

    // route -> page extension
    let mut pages: BTreeMap<String, String> = BTreeMap::new();
    for key in state.files.keys() {
        if let Some((ManagedRoot::Pages, rest)) = config.paths.classify(key)
            && let Some(route) = derive_route(&rest)
        {
            let ext = NormalizedPath::new(key.as_str())
                .extension()
                .map(|e| format!(".{e}"))
                .unwrap_or_default();
            pages.entry(route).or_insert(ext);
        }
    }

    let has_feature_files = |feature_path: &str| {
        !feature_path.is_empty() && !state.files_under(feature_path).is_empty()
    };

    let mut sections: Vec<Section> = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();

    for section in &state.sections {
        let routed = section
            .route
            .as_ref()
            .is_some_and(|route| pages.contains_key(route));
        if (routed || has_feature_files(&section.feature_path)) && seen.insert(section.key().to_string()) {
            sections.push(section.clone());
        }
    }

    for (route, extension) in &pages {
        if seen.contains(route) {
            continue;
        }
        let relative = route.trim_start_matches('/');
        if relative.is_empty() {
            continue;
        }
        let feature_path = features_root.join(relative);
        if !has_feature_files(feature_path.as_str()) {
            continue;
        }
        let name = feature_path.file_name().unwrap_or(relative).to_string();
        tracing::debug!(%route, feature = %feature_path, "discovered section");
        seen.insert(route.clone());
        sections.push(Section {
            name,
            route: Some(route.clone()),
            feature_path: feature_path.as_str().to_string(),
            layout: config.default_layout.clone(),
            extension: extension.clone(),
        });
    }

    sections
}

/// Route served by a page file, given its path below the pages root.
///
/// `index.astro` maps to `/`, `blog/index.astro` to `/blog` and
/// `blog/[slug].astro` to `/blog/[slug]`.
pub fn derive_route(page_path: &str) -> Option<String> {
    let path = NormalizedPath::new(page_path);
    let file_name = path.file_name()?;
    let stem = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    };

    let mut segments: Vec<&str> = Vec::new();
    let parent = path.parent();
    if let Some(parent) = parent.as_ref() {
        segments.extend(parent.as_str().split('/'));
    }
    if stem != "index" {
        segments.push(stem);
    }

    Some(format!("/{}", segments.join("/")))
}
