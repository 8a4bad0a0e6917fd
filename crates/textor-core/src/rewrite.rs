//! Import and identifier rewriting for moved files
//!
//! Moving a generated file breaks two kinds of references: relative imports
//! inside the moved file itself, and imports in other files that point at it.
//! Both are fixed textually. Only quoted module specifiers in `import`,
//! `export ... from`, dynamic `import()` and `require()` are touched.
//!
//! [`Project::move_tracked`](crate::Project::move_tracked) applies
//! [`rewrite_relative_imports`] and [`retarget_imports`] itself.
//! [`rewrite_alias_imports`] and [`rename_identifier`] are public building
//! blocks for callers renaming whole sections or components; those callers
//! supply the alias prefix and identifier.

use std::sync::LazyLock;

use regex::{Captures, NoExpand, Regex};
use textor_fs::NormalizedPath;

use crate::Result;

/// `from '...'`, `import '...'`, `import('...')`, `require('...')`, `@import '...'`
static SPECIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<lead>\b(?:from|import|require)\s*\(?\s*)(?P<quote>['"])(?P<specifier>[^'"\n]+)['"]"#)
        .unwrap()
});

/// Rewrite relative imports in a file that moved from `old_file` to `new_file`.
///
/// Both paths are project-relative. Each relative specifier is resolved
/// against the old location and re-expressed relative to the new one.
pub fn rewrite_relative_imports(content: &str, old_file: &str, new_file: &str) -> String {
    let old_dir = dir_of(old_file);
    let new_dir = dir_of(new_file);
    if old_dir == new_dir {
        return content.to_string();
    }

    replace_specifiers(content, |specifier| {
        if !is_relative(specifier) {
            return None;
        }
        let target = old_dir.join(specifier);
        Some(relative_specifier(&new_dir, &target))
    })
}

/// Point imports in `importer` that resolve to `old_target` at `new_target`.
///
/// Specifiers that omit the target's extension keep omitting it.
pub fn retarget_imports(content: &str, importer: &str, old_target: &str, new_target: &str) -> String {
    let dir = dir_of(importer);
    let old_target = NormalizedPath::new(old_target);
    let new_target = NormalizedPath::new(new_target);
    let old_stem = strip_extension(&old_target);

    replace_specifiers(content, |specifier| {
        if !is_relative(specifier) {
            return None;
        }
        let resolved = dir.join(specifier);
        if resolved == old_target {
            Some(relative_specifier(&dir, &new_target))
        } else if resolved == old_stem {
            Some(relative_specifier(&dir, &strip_extension(&new_target)))
        } else {
            None
        }
    })
}

/// Replace an aliased import prefix, e.g. `@/features/blog` to `@/features/news`.
///
/// Matches the prefix exactly or followed by `/`.
pub fn rewrite_alias_imports(content: &str, old_prefix: &str, new_prefix: &str) -> String {
    let old_prefix = old_prefix.trim_end_matches('/');
    let new_prefix = new_prefix.trim_end_matches('/');

    replace_specifiers(content, |specifier| {
        let rest = specifier.strip_prefix(old_prefix)?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(format!("{new_prefix}{rest}"))
        } else {
            None
        }
    })
}

/// Rename a whole-word identifier.
pub fn rename_identifier(content: &str, old: &str, new: &str) -> Result<String> {
    if old.is_empty() || old == new {
        return Ok(content.to_string());
    }
    let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(old)))?;
    Ok(pattern.replace_all(content, NoExpand(new)).into_owned())
}

/// Relative specifier from `from_dir` to `target`, always starting with `.`.
pub fn relative_specifier(from_dir: &NormalizedPath, target: &NormalizedPath) -> String {
    let from: Vec<&str> = segments(from_dir);
    let to: Vec<&str> = segments(target);
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend(&to[common..]);

    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}

fn replace_specifiers(content: &str, mut rewrite: impl FnMut(&str) -> Option<String>) -> String {
    SPECIFIER_PATTERN
        .replace_all(content, |caps: &Captures<'_>| {
            let specifier = &caps["specifier"];
            match rewrite(specifier) {
                Some(new_specifier) if new_specifier != specifier => {
                    tracing::trace!(from = specifier, to = %new_specifier, "rewrote import");
                    let quote = &caps["quote"];
                    format!("{}{quote}{new_specifier}{quote}", &caps["lead"])
                }
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

fn dir_of(file: &str) -> NormalizedPath {
    NormalizedPath::new(file)
        .parent()
        .unwrap_or_else(|| NormalizedPath::new(""))
}

fn segments(path: &NormalizedPath) -> Vec<&str> {
    path.as_str().split('/').filter(|s| !s.is_empty()).collect()
}

fn strip_extension(path: &NormalizedPath) -> NormalizedPath {
    match path.extension() {
        Some(ext) => {
            let s = path.as_str();
            NormalizedPath::new(&s[..s.len() - ext.len() - 1])
        }
        None => path.clone(),
    }
}
