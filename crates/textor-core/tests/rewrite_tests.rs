//! Tests for best-effort import and identifier rewriting

use pretty_assertions::assert_eq;
use rstest::rstest;
use textor_core::rewrite::{rename_identifier, retarget_imports, rewrite_alias_imports, rewrite_relative_imports};

#[test]
fn test_relative_imports_follow_the_moved_file() {
    let content = r#"---
import Layout from '../../layouts/Main.astro';
import { Card } from "../../components/Card/Card";
import '@/styles/global.css';
const lazy = import('./Lazy');
const legacy = require('../util');
---
"#;

    let out = rewrite_relative_imports(content, "src/features/blog/Blog.astro", "src/features/news/deep/Blog.astro");

    assert_eq!(
        out,
        r#"---
import Layout from '../../../layouts/Main.astro';
import { Card } from "../../../components/Card/Card";
import '@/styles/global.css';
const lazy = import('../../blog/Lazy');
const legacy = require('../../util');
---
"#
    );
}

#[rstest]
#[case("import A from './A';", "import A from './sub/A';")]
#[case("import A from './A.ts';", "import A from './sub/A.ts';")]
#[case("export * from './A';", "export * from './sub/A';")]
#[case("import B from './B';", "import B from './B';")]
#[case("import A from 'A';", "import A from 'A';")]
fn test_retarget_imports(#[case] input: &str, #[case] expected: &str) {
    let out = retarget_imports(input, "src/features/x/Index.ts", "src/features/x/A.ts", "src/features/x/sub/A.ts");
    assert_eq!(out, expected);
}

#[test]
fn test_alias_prefix_rewrite_matches_whole_segments() {
    let content = "import a from '@/features/blog';\nimport b from '@/features/blog/List';\nimport c from '@/features/blogroll';\n";

    let out = rewrite_alias_imports(content, "@/features/blog", "@/features/news/");

    assert_eq!(
        out,
        "import a from '@/features/news';\nimport b from '@/features/news/List';\nimport c from '@/features/blogroll';\n"
    );
}

#[test]
fn test_component_rename_covers_jsx_tags() {
    let content = "import Card from './Card.astro';\n<Card title=\"x\"></Card>\n<CardList />\n";

    let out = rename_identifier(content, "Card", "Tile").unwrap();

    assert_eq!(out, "import Tile from './Tile.astro';\n<Tile title=\"x\"></Tile>\n<CardList />\n");
}

mod properties {
    use proptest::prelude::*;
    use textor_core::rewrite::relative_specifier;
    use textor_fs::NormalizedPath;

    fn segments() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-z]{1,6}", 1..4)
    }

    proptest! {
        #[test]
        fn relative_specifier_resolves_back_to_target(dir in segments(), target in segments()) {
            let dir = NormalizedPath::new(dir.join("/"));
            let target = NormalizedPath::new(format!("{}.ts", target.join("/")));

            let specifier = relative_specifier(&dir, &target);

            prop_assert!(specifier.starts_with('.'));
            prop_assert_eq!(dir.join(&specifier), target);
        }
    }
}
