//! Tests for status, sync, prune and validate

use pretty_assertions::assert_eq;
use textor_core::ledger::{FileKind, FileRecord, Section};
use textor_core::{
    Project, PruneOptions, SyncOptions, TextorConfig, TrackedFile, ValidateOptions,
    ValidationIssue, get_project_status,
};
use textor_fs::{Normalization, calculate_hash};
use textor_test_utils::TestProject;

fn open(project: &TestProject) -> Project {
    Project::open(project.root()).unwrap()
}

#[test]
fn test_registered_unchanged_file_is_synced() {
    let fixture = TestProject::new();
    fixture.write("src/pages/a.astro", "<h1>A</h1>\n");
    let project = open(&fixture);
    let hash = calculate_hash("<h1>A</h1>\n", project.config().normalization());
    project
        .store()
        .register_file("src/pages/a.astro", FileRecord::new(FileKind::Route, "page", hash))
        .unwrap();

    let status = project.status().unwrap();

    assert_eq!(status.synced, vec!["src/pages/a.astro"]);
    assert!(status.is_clean());
}

#[test]
fn test_modified_file_is_accepted_by_sync() {
    let fixture = TestProject::new();
    let project = open(&fixture);
    project
        .write_tracked("src/pages/a.astro", "<h1>A</h1>\n", TrackedFile::new(FileKind::Route, "page"), false)
        .unwrap();
    fixture.write("src/pages/a.astro", "<h1>A, edited</h1>\n");
    let new_hash = project.hash_on_disk("src/pages/a.astro").unwrap();

    let status = project.status().unwrap();
    assert_eq!(status.modified.len(), 1);
    assert_eq!(status.modified[0].current_hash, new_hash);
    let synced_before = status.synced.len();

    let report = project.sync(SyncOptions::default()).unwrap();
    assert_eq!(report.updated, vec!["src/pages/a.astro"]);

    assert_eq!(project.state().file("src/pages/a.astro").unwrap().hash, new_hash);
    let after = project.status().unwrap();
    assert_eq!(after.synced.len(), synced_before + 1);
    assert!(after.modified.is_empty());
}

#[test]
fn test_prune_drops_missing_entries_and_dependent_metadata() {
    let fixture = TestProject::new();
    let project = open(&fixture);
    let page = TrackedFile::new(FileKind::Route, "page").owned_by("/blog");
    let feature = TrackedFile::new(FileKind::Feature, "feature").owned_by("src/features/blog");
    let component = TrackedFile::new(FileKind::Component, "component").owned_by("Card");
    project.write_tracked("src/pages/blog/index.astro", "page", page, false).unwrap();
    project.write_tracked("src/features/blog/Blog.astro", "feature", feature, false).unwrap();
    project.write_tracked("src/components/Card/Card.astro", "card", component, false).unwrap();
    project
        .write_tracked("src/pages/about.astro", "about", TrackedFile::new(FileKind::Route, "page"), false)
        .unwrap();
    project.sync(SyncOptions::default()).unwrap();

    let state = project.state();
    assert_eq!(state.sections.len(), 1);
    assert_eq!(state.sections[0].route.as_deref(), Some("/blog"));
    assert_eq!(state.components.len(), 1);

    fixture.remove("src/pages/blog/index.astro");
    fixture.remove("src/features/blog/Blog.astro");
    fixture.remove("src/components/Card/Card.astro");

    let report = project.prune(PruneOptions::default()).unwrap();

    assert_eq!(
        report.removed,
        vec![
            "src/components/Card/Card.astro",
            "src/features/blog/Blog.astro",
            "src/pages/blog/index.astro",
        ]
    );
    let state = project.state();
    assert_eq!(state.files.keys().collect::<Vec<_>>(), vec!["src/pages/about.astro"]);
    assert!(state.sections.is_empty(), "the blog section lost every backing file");
    assert!(state.components.is_empty());
}

#[test]
fn test_untracked_signed_file_is_adopted() {
    let fixture = TestProject::new();
    fixture.write_signed("src/components/Card/Card.astro", "<div/>\n");
    fixture.write("src/components/Card/readme.md", "hand written");
    let project = open(&fixture);

    let status = project.status().unwrap();
    assert_eq!(status.untracked.len(), 1);
    assert_eq!(status.untracked[0].path, "src/components/Card/Card.astro");
    assert_eq!(status.orphaned, vec!["src/components/Card/readme.md"]);

    let report = project.sync(SyncOptions::default()).unwrap();
    assert_eq!(report.added, vec!["src/components/Card/Card.astro"]);

    let state = project.state();
    let record = state.file("src/components/Card/Card.astro").unwrap();
    assert_eq!(record.hash, project.hash_on_disk("src/components/Card/Card.astro").unwrap());
    assert_eq!(record.kind, FileKind::Component);
    assert_eq!(record.owner.as_deref(), Some("Card"));
    assert!(state.file("src/components/Card/readme.md").is_none());
    assert_eq!(state.components[0].name, "Card");
}

#[test]
fn test_include_all_adopts_orphans_without_signature() {
    let fixture = TestProject::new();
    fixture.write("src/features/auth/Auth.astro", "mine");
    let project = open(&fixture);

    let options = SyncOptions {
        include_all: true,
        ..SyncOptions::default()
    };
    project.sync(options).unwrap();

    let state = project.state();
    let record = state.file("src/features/auth/Auth.astro").unwrap();
    assert!(!record.has_signature);
    assert_eq!(record.kind, FileKind::Feature);
    assert!(project.status().unwrap().is_clean());
}

#[test]
fn test_dry_runs_do_not_save() {
    let fixture = TestProject::new();
    fixture.write_signed("src/pages/a.astro", "A");
    let project = open(&fixture);

    let sync = project
        .sync(SyncOptions {
            dry_run: true,
            ..SyncOptions::default()
        })
        .unwrap();
    assert_eq!(sync.added.len(), 1);
    assert!(sync.dry_run);
    assert!(fixture.ledger_json().is_none());

    project.sync(SyncOptions::default()).unwrap();
    fixture.remove("src/pages/a.astro");
    let prune = project.prune(PruneOptions { dry_run: true }).unwrap();
    assert_eq!(prune.removed, vec!["src/pages/a.astro"]);
    assert_eq!(project.state().files.len(), 1);
}

#[test]
fn test_status_respects_ignore_list_and_custom_roots() {
    let fixture = TestProject::new();
    fixture.write_config(r#"{ "paths": { "pages": "app/pages" }, "ignore": ["generated"] }"#);
    fixture.write_signed("app/pages/index.astro", "home");
    fixture.write_signed("app/pages/generated/skip.astro", "skip");
    fixture.write_signed("src/pages/old.astro", "not a managed root anymore");
    let project = open(&fixture);

    let status = project.status().unwrap();

    let untracked: Vec<&str> = status.untracked.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(untracked, vec!["app/pages/index.astro"]);
}

#[test]
fn test_whitespace_normalization_ignores_reformatting() {
    let fixture = TestProject::new();
    fixture.write_config(r#"{ "hashing": { "normalization": "ignoreWhitespace" } }"#);
    let project = open(&fixture);
    project
        .write_tracked("src/pages/a.astro", "<div>\n  <p>A</p>\n</div>\n", TrackedFile::new(FileKind::Route, "page"), false)
        .unwrap();

    let reformatted = fixture.read("src/pages/a.astro").replace("  <p>", "\t\t<p>");
    fixture.write("src/pages/a.astro", &reformatted);

    assert!(project.status().unwrap().is_clean());
}

#[test]
fn test_free_function_matches_project_status() {
    let fixture = TestProject::new();
    fixture.write_signed("src/pages/a.astro", "A");
    let project = open(&fixture);
    let config = TextorConfig::default();

    let direct = get_project_status(project.root(), &config, &project.state()).unwrap();

    assert_eq!(direct, project.status().unwrap());
}

#[test]
fn test_validate_fix_repairs_ledger() {
    let fixture = TestProject::new();
    let project = open(&fixture);
    project
        .write_tracked("src/pages/a.astro", "A", TrackedFile::new(FileKind::Route, "page"), false)
        .unwrap();
    project
        .store()
        .update(|state| {
            state.files.insert(
                "../escape.astro".into(),
                FileRecord::new(FileKind::Route, "page", calculate_hash("x", Normalization::None)),
            );
            state.sections.push(Section {
                name: "ghost".into(),
                route: None,
                feature_path: "src/features/ghost".into(),
                layout: "Main".into(),
                extension: ".astro".into(),
            });
        })
        .unwrap();

    let report = project.validate(ValidateOptions::default()).unwrap();
    assert_eq!(
        report.issues,
        vec![
            ValidationIssue::UnsafePath { path: "../escape.astro".into() },
            ValidationIssue::MissingFeature {
                section: "ghost".into(),
                feature_path: "src/features/ghost".into(),
            },
        ]
    );
    assert_eq!(project.state().files.len(), 2, "validate without fix changes nothing");

    let fixed = project.validate(ValidateOptions { fix: true }).unwrap();
    assert!(fixed.fixed);
    let state = project.state();
    assert_eq!(state.files.keys().collect::<Vec<_>>(), vec!["src/pages/a.astro"]);
    assert!(state.sections.is_empty());
    assert!(project.validate(ValidateOptions::default()).unwrap().is_valid());
}

#[test]
fn test_unnormalized_ledger_key_is_not_also_untracked() {
    let fixture = TestProject::new();
    fixture.write_signed("src/pages/a.astro", "A");
    let content = fixture.read("src/pages/a.astro");
    let mut state = textor_core::State::new();
    state.files.insert(
        "./src/pages/a.astro".to_string(),
        FileRecord::new(FileKind::Route, "page", calculate_hash(&content, Normalization::default())),
    );

    let status = get_project_status(fixture.root(), &TextorConfig::default(), &state).unwrap();

    assert_eq!(status.synced, vec!["./src/pages/a.astro"]);
    assert!(status.untracked.is_empty(), "got {:?}", status.untracked);
    assert_eq!(status.total(), 1);
}
