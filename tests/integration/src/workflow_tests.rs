//! Multi-step workflows across the filesystem layer, the ledger and the
//! safe operations.

use std::thread;

use pretty_assertions::assert_eq;
use textor_core::{
    DeleteOutcome, DirDeleteOutcome, FileKind, MoveOutcome, MutationOptions, Project, Section,
    TrackedFile, ValidateOptions,
};
use textor_test_utils::{SCRIPT_SIGNATURE, TestProject};

fn generate_blog(project: &Project) {
    project
        .write_tracked(
            "src/pages/blog/index.astro",
            "---\nimport Blog from '../../features/blog/Blog.astro';\n---\n<Blog />\n",
            TrackedFile::new(FileKind::Route, "page").owned_by("/blog"),
            false,
        )
        .unwrap();
    project
        .write_tracked(
            "src/features/blog/Blog.astro",
            "<section class=\"blog\" />\n",
            TrackedFile::new(FileKind::Feature, "feature").owned_by("src/features/blog"),
            false,
        )
        .unwrap();
    project
        .write_tracked(
            "src/features/blog/api.ts",
            "export const posts = [];\n",
            TrackedFile::new(FileKind::FeatureFile, "feature").owned_by("src/features/blog"),
            false,
        )
        .unwrap();
    project
        .store()
        .add_section(Section {
            name: "blog".to_string(),
            route: Some("/blog".to_string()),
            feature_path: "src/features/blog".to_string(),
            layout: "Main".to_string(),
            extension: ".astro".to_string(),
        })
        .unwrap();
}

#[test]
fn generated_section_is_clean_and_signed() {
    let tp = TestProject::new();
    let project = Project::open(tp.root()).unwrap();
    generate_blog(&project);

    let status = project.status().unwrap();
    assert!(status.is_clean());
    assert_eq!(status.synced.len(), 3);

    let api = tp.read("src/features/blog/api.ts");
    assert!(api.starts_with(SCRIPT_SIGNATURE));
    assert!(project.store().require_section("/blog").is_ok());
}

#[test]
fn edited_feature_blocks_directory_delete_until_accepted() {
    let tp = TestProject::new();
    let project = Project::open(tp.root()).unwrap();
    generate_blog(&project);
    tp.write("src/features/blog/api.ts", "export const posts = ['mine'];\n");

    let outcome = project
        .delete_tracked_dir("src/features/blog", &MutationOptions::default())
        .unwrap();
    let DirDeleteOutcome::Blocked(conflicts) = outcome else {
        panic!("expected the delete to be blocked, got {outcome:?}");
    };
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].path, "src/features/blog/api.ts");
    tp.assert_file_exists("src/features/blog/Blog.astro");

    let accept = MutationOptions {
        accept_changes: true,
        ..MutationOptions::default()
    };
    let outcome = project.delete_tracked_dir("src/features/blog", &accept).unwrap();
    assert!(matches!(outcome, DirDeleteOutcome::Deleted { .. }));

    tp.assert_file_not_exists("src/features/blog");
    let state = project.state();
    assert!(state.files_under("src/features/blog").is_empty());
    assert!(state.find_section("/blog").is_none());
    assert!(state.files.contains_key("src/pages/blog/index.astro"));
}

#[test]
fn hand_written_file_in_feature_blocks_even_with_accept_changes() {
    let tp = TestProject::new();
    let project = Project::open(tp.root()).unwrap();
    generate_blog(&project);
    tp.write("src/features/blog/notes.md", "my notes");

    let accept = MutationOptions {
        accept_changes: true,
        ..MutationOptions::default()
    };
    let outcome = project.delete_tracked_dir("src/features/blog", &accept).unwrap();

    assert!(matches!(outcome, DirDeleteOutcome::Blocked(_)));
    tp.assert_file_contains("src/features/blog/notes.md", "my notes");
}

#[test]
fn moving_a_component_retargets_importers_and_keeps_ledger_clean() {
    let tp = TestProject::new();
    let project = Project::open(tp.root()).unwrap();
    project
        .write_tracked(
            "src/components/Button/Button.tsx",
            "import styles from './Button.css';\nexport const Button = () => null;\n",
            TrackedFile::new(FileKind::Component, "component").owned_by("Button"),
            false,
        )
        .unwrap();
    tp.write("src/components/Button/Button.css", ".button {}\n");
    project
        .write_tracked(
            "src/pages/index.astro",
            "---\nimport { Button } from '../components/Button/Button';\n---\n<Button />\n",
            TrackedFile::new(FileKind::Route, "page").owned_by("/"),
            false,
        )
        .unwrap();

    let outcome = project
        .move_tracked(
            "src/components/Button/Button.tsx",
            "src/components/ui/Button.tsx",
            &MutationOptions::default(),
        )
        .unwrap();
    assert!(matches!(outcome, MoveOutcome::Moved { .. }));

    tp.assert_file_contains("src/pages/index.astro", "'../components/ui/Button'");
    tp.assert_file_contains("src/components/ui/Button.tsx", "'../Button/Button.css'");

    let status = project.status().unwrap();
    assert!(status.modified.is_empty(), "unexpected drift: {:?}", status.modified);
    assert!(status.missing.is_empty());
    assert!(project.state().files.contains_key("src/components/ui/Button.tsx"));
}

#[test]
fn delete_honours_owner_then_validate_heals_metadata() {
    let tp = TestProject::new();
    let project = Project::open(tp.root()).unwrap();
    generate_blog(&project);

    let stranger = MutationOptions {
        owner: Some("/docs".to_string()),
        ..MutationOptions::default()
    };
    let outcome = project.delete_tracked("src/pages/blog/index.astro", &stranger).unwrap();
    assert!(matches!(outcome, DeleteOutcome::Skipped(_)));

    let owner = MutationOptions {
        owner: Some("/blog".to_string()),
        ..MutationOptions::default()
    };
    assert!(
        project
            .delete_tracked("src/pages/blog/index.astro", &owner)
            .unwrap()
            .is_deleted()
    );
    tp.assert_file_not_exists("src/pages/blog");

    // The section survives through its feature files
    let report = project.validate(ValidateOptions { fix: true }).unwrap();
    assert!(report.is_valid(), "unexpected issues: {:?}", report.issues);
    assert!(project.state().find_section("/blog").is_some());
}

#[test]
fn concurrent_projects_share_one_ledger() {
    let tp = TestProject::new();
    let root = tp.root().to_path_buf();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let root = root.clone();
            thread::spawn(move || {
                let project = Project::open(&root).unwrap();
                for i in 0..5 {
                    project
                        .write_tracked(
                            &format!("src/components/W{worker}/Item{i}.tsx"),
                            &format!("export const item = {i};\n"),
                            TrackedFile::new(FileKind::ComponentFile, "component"),
                            false,
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let project = Project::open(&root).unwrap();
    assert_eq!(project.state().files.len(), 20);
    assert!(project.status().unwrap().is_clean());

    let ledger: serde_json::Value = serde_json::from_str(&tp.ledger_json().unwrap()).unwrap();
    assert_eq!(ledger["files"].as_object().unwrap().len(), 20);
}
