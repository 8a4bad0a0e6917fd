use rstest::rstest;
use textor_fs::NormalizedPath;

#[test]
fn test_normalize_backslashes_to_forward() {
    let path = NormalizedPath::new("src\\pages\\index.astro");
    assert_eq!(path.as_str(), "src/pages/index.astro");
}

#[rstest]
#[case("a/../b", "b")]
#[case("../a", "a")]
#[case("../../a/b", "a/b")]
#[case("/a/b/../../c", "/c")]
#[case("a\\..\\b", "b")]
#[case("a/./b//c", "a/b/c")]
#[case("./src/pages/", "src/pages")]
fn test_dot_segments_are_resolved(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(input).as_str(), expected);
}

#[test]
fn test_join_resolves_dots() {
    let base = NormalizedPath::new("/a/b");

    assert_eq!(base.join("c").as_str(), "/a/b/c");
    assert_eq!(base.join("./c").as_str(), "/a/b/c");
    assert_eq!(base.join("../c").as_str(), "/a/c");
    assert_eq!(base.join("../../c").as_str(), "/c");
}

#[test]
fn test_parent_and_file_name() {
    let path = NormalizedPath::new("src/components/Button/Button.tsx");
    assert_eq!(path.parent().unwrap().as_str(), "src/components/Button");
    assert_eq!(path.file_name(), Some("Button.tsx"));
    assert_eq!(path.extension(), Some("tsx"));
}

#[test]
fn test_dotfile_has_no_extension() {
    assert_eq!(NormalizedPath::new("src/.env").extension(), None);
}

#[test]
fn test_strip_prefix() {
    let root = NormalizedPath::new("src/features");
    let file = NormalizedPath::new("src/features/blog/post/Post.astro");
    assert_eq!(file.strip_prefix(&root), Some("blog/post/Post.astro"));
    assert_eq!(root.strip_prefix(&root), None);
    assert!(!NormalizedPath::new("src/featuresX/a").starts_with(&root));
}
