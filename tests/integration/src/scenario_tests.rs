//! End-to-end reconciliation scenarios
//!
//! Each test drives a real project directory through the public `Project`
//! API: register or generate files, change the disk behind Textor's back,
//! then check what status, sync and prune make of it.

use pretty_assertions::assert_eq;
use textor_core::{FileKind, FileRecord, Project, PruneOptions, SyncOptions};
use textor_fs::calculate_hash;
use textor_test_utils::TestProject;

fn register(project: &Project, key: &str, content: &str, kind: FileKind) {
    let hash = calculate_hash(content, project.config().normalization());
    project
        .store()
        .register_file(key, FileRecord::new(kind, "page", hash))
        .unwrap();
}

#[test]
fn registered_file_with_unchanged_content_is_synced() {
    let tp = TestProject::new();
    tp.write("src/pages/a.astro", "<h1>A</h1>\n");
    let project = Project::open(tp.root()).unwrap();
    register(&project, "src/pages/a.astro", "<h1>A</h1>\n", FileKind::Route);

    let status = project.status().unwrap();

    assert_eq!(status.synced, vec!["src/pages/a.astro".to_string()]);
    assert_eq!(status.total(), 1);
    assert!(status.is_clean());
}

#[test]
fn drifted_file_is_modified_until_synced() {
    let tp = TestProject::new();
    tp.write("src/pages/a.astro", "<h1>A</h1>\n");
    let project = Project::open(tp.root()).unwrap();
    register(&project, "src/pages/a.astro", "<h1>A</h1>\n", FileKind::Route);

    tp.write("src/pages/a.astro", "<h1>A, edited</h1>\n");
    let status = project.status().unwrap();
    assert_eq!(status.synced.len(), 0);
    assert_eq!(status.modified.len(), 1);
    let new_hash = project.hash_on_disk("src/pages/a.astro").unwrap();
    assert_eq!(status.modified[0].current_hash, new_hash);

    let report = project.sync(SyncOptions::default()).unwrap();
    assert_eq!(report.updated, vec!["src/pages/a.astro".to_string()]);
    assert_eq!(project.state().files["src/pages/a.astro"].hash, new_hash);

    let status = project.status().unwrap();
    assert_eq!(status.synced.len(), 1);
    assert!(status.modified.is_empty());
}

#[test]
fn prune_forgets_deleted_files_and_their_metadata() {
    let tp = TestProject::new();
    let project = Project::open(tp.root()).unwrap();
    project
        .write_tracked(
            "src/components/Card/Card.tsx",
            "export const Card = () => null;\n",
            textor_core::TrackedFile::new(FileKind::Component, "component"),
            false,
        )
        .unwrap();
    project
        .write_tracked(
            "src/components/Badge/Badge.tsx",
            "export const Badge = () => null;\n",
            textor_core::TrackedFile::new(FileKind::Component, "component"),
            false,
        )
        .unwrap();
    project.sync(SyncOptions::default()).unwrap();
    let before = textor_core::reconstruct_components(&project.state().files, project.config());
    assert_eq!(before.len(), 2);

    tp.remove("src/components/Card/Card.tsx");
    let report = project.prune(PruneOptions::default()).unwrap();

    assert_eq!(report.removed, vec!["src/components/Card/Card.tsx".to_string()]);
    let state = project.state();
    assert!(!state.files.contains_key("src/components/Card/Card.tsx"));
    let names: Vec<String> = textor_core::reconstruct_components(&state.files, project.config())
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Badge".to_string()]);
    assert!(state.find_component("Card").is_none());
}

#[test]
fn signed_untracked_file_is_adopted_by_sync() {
    let tp = TestProject::new();
    tp.write_signed("src/features/blog/Blog.astro", "<section />\n");
    let project = Project::open(tp.root()).unwrap();

    let status = project.status().unwrap();
    assert_eq!(status.untracked.len(), 1);
    assert_eq!(status.untracked[0].path, "src/features/blog/Blog.astro");

    let report = project.sync(SyncOptions::default()).unwrap();
    assert_eq!(report.added, vec!["src/features/blog/Blog.astro".to_string()]);

    let record = project.state().files["src/features/blog/Blog.astro"].clone();
    assert_eq!(record.hash, project.hash_on_disk("src/features/blog/Blog.astro").unwrap());
    assert_eq!(record.kind, FileKind::Feature);
    assert!(project.status().unwrap().is_clean());
}
