//! # Declared Path Normalizer
//!
//! Canonicalizes and validates path strings declared in `city.toml`.
//!
//! Normalized paths are always relative, use `/` as separator, contain no
//! `.` or `..` segments, and keep a trailing `/` when the input was marked as
//! a directory.

use thiserror::Error;

/// Characters that turn a declared path into a glob pattern
pub const GLOB_META: [char; 3] = ['*', '?', '['];

/// Reasons a declared path is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path cannot be empty")]
    Empty,
    #[error("path must be relative")]
    Absolute,
    #[error("path cannot be current directory")]
    CurrentDir,
    #[error("path traversal (..) is not allowed")]
    Traversal,
    #[error("invalid hook path: hook file cannot be a directory path")]
    HookDirectory,
    #[error("invalid hook path: hook file cannot include glob meta")]
    HookGlob,
    #[error("invalid hook path: {0}")]
    Hook(Box<PathError>),
}

/// Whether the value contains any glob metacharacter
pub fn has_glob_meta(value: &str) -> bool {
    value.contains(&GLOB_META[..])
}

/// Normalize a `polis_files` entry
///
/// Rules are applied in order:
/// 1. trim whitespace, convert `\` to `/`
/// 2. reject empty and absolute input
/// 3. remember a trailing `/` (directory marker)
/// 4. collapse redundant separators and `.` segments, resolve `..`
/// 5. reject `.`, `..` and anything escaping upward
/// 6. restore the directory marker
///
/// Traversal is checked on the cleaned form, so `a/../../secret` is caught
/// even though it does not start with `..`. A `..` segment that stays inside
/// the tree (`a/x/../b`) is rejected as well: declared paths never carry one.
pub fn normalize_declared_path(raw: &str) -> Result<String, PathError> {
    let value = raw.trim().replace('\\', "/");
    if value.is_empty() {
        return Err(PathError::Empty);
    }
    if is_absolute(&value) {
        return Err(PathError::Absolute);
    }

    let keep_dir_marker = value.ends_with('/');
    let has_parent_segment = value.split('/').any(|segment| segment == "..");
    let clean = clean_relative(&value);

    if clean == "." {
        return Err(PathError::CurrentDir);
    }
    if clean == ".." || clean.starts_with("../") || has_parent_segment {
        return Err(PathError::Traversal);
    }

    if keep_dir_marker {
        Ok(format!("{}/", clean))
    } else {
        Ok(clean)
    }
}

/// Normalize a `[[hook]].file` entry
///
/// Hooks must name one concrete file: directory markers and glob patterns
/// are rejected on top of the regular declared-path rules.
pub fn normalize_hook_path(raw: &str) -> Result<String, PathError> {
    let clean = normalize_declared_path(raw).map_err(|e| PathError::Hook(Box::new(e)))?;
    if clean.ends_with('/') {
        return Err(PathError::HookDirectory);
    }
    if has_glob_meta(&clean) {
        return Err(PathError::HookGlob);
    }
    Ok(clean)
}

fn is_absolute(value: &str) -> bool {
    if value.starts_with('/') {
        return true;
    }
    // Drive-prefixed paths such as `C:/x` or `C:x`
    let mut chars = value.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic()
    )
}

/// Lexically clean a relative, `/`-separated path
///
/// Leading `..` segments are kept so callers can detect traversal.
fn clean_relative(value: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in value.split('/') {
        match segment {
            "" | "." => {}
            ".." => match stack.last() {
                Some(&last) if last != ".." => {
                    stack.pop();
                }
                _ => stack.push(".."),
            },
            other => stack.push(other),
        }
    }

    if stack.is_empty() {
        ".".to_string()
    } else {
        stack.join("/")
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_accepts_relative_paths() {
        let cases = [
            ("polis.yaml", "polis.yaml"),
            ("config/polis.yaml", "config/polis.yaml"),
            ("memory/", "memory/"),
            (r"config\polis.yaml", "config/polis.yaml"),
            ("  polis.yaml  ", "polis.yaml"),
            ("\t polis.yaml \t", "polis.yaml"),
            ("config/./polis.yaml", "config/polis.yaml"),
            ("config//polis.yaml", "config/polis.yaml"),
            ("a///b///c", "a/b/c"),
            ("memory/**", "memory/**"),
            ("dir/file[0-9].txt", "dir/file[0-9].txt"),
            (r"a\b/c\d.txt", "a/b/c/d.txt"),
            ("config/./", "config/"),
            ("a/./b/", "a/b/"),
            ("~/config", "~/config"),
        ];

        for (input, want) in cases {
            assert_eq!(
                normalize_declared_path(input).unwrap(),
                want,
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_normalize_rejects_unsafe_paths() {
        let cases = [
            ("", PathError::Empty),
            ("   ", PathError::Empty),
            ("/etc/passwd", PathError::Absolute),
            (r"\absolute", PathError::Absolute),
            ("C:/Windows", PathError::Absolute),
            (".", PathError::CurrentDir),
            ("./", PathError::CurrentDir),
            ("a/..", PathError::CurrentDir),
            ("..", PathError::Traversal),
            ("../secret", PathError::Traversal),
            ("a/../../secret", PathError::Traversal),
            ("a/b/../../../secret", PathError::Traversal),
            ("a/x/../b", PathError::Traversal),
        ];

        for (input, want) in cases {
            assert_eq!(
                normalize_declared_path(input).unwrap_err(),
                want,
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_hook_path_rules() {
        assert_eq!(normalize_hook_path(".secrets").unwrap(), ".secrets");
        assert_eq!(normalize_hook_path(r"hooks\run.sh").unwrap(), "hooks/run.sh");
        assert_eq!(
            normalize_hook_path("memory/").unwrap_err(),
            PathError::HookDirectory
        );
        for glob in ["config/*.yaml", "config/**", "file?.txt", "file[0].txt"] {
            assert_eq!(normalize_hook_path(glob).unwrap_err(), PathError::HookGlob);
        }

        let err = normalize_hook_path("../hook.sh").unwrap_err();
        assert!(err.to_string().contains("traversal"));
        assert!(err.to_string().starts_with("invalid hook path"));
    }

    #[test]
    fn test_has_glob_meta() {
        assert!(!has_glob_meta("plain.txt"));
        assert!(!has_glob_meta(""));
        assert!(has_glob_meta("*.txt"));
        assert!(has_glob_meta("dir/**"));
        assert!(has_glob_meta("file?.log"));
        assert!(has_glob_meta("file[0].txt"));
    }

    fn segment() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z0-9_.-]{1,8}".prop_filter("plain segment", |s| s != "." && s != ".."),
            Just(".".to_string()),
            Just(String::new()),
        ]
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(segments in prop::collection::vec(segment(), 1..6)) {
            let raw = segments.join("/");
            if let Ok(once) = normalize_declared_path(&raw) {
                prop_assert_eq!(normalize_declared_path(&once).unwrap(), once);
            }
        }

        #[test]
        fn prop_traversal_always_rejected(
            before in prop::collection::vec("[a-z]{1,4}", 0..3),
            after in prop::collection::vec("[a-z]{1,4}", 0..3),
        ) {
            // One more `..` than preceding segments always escapes the root.
            let ups = vec![".."; before.len() + 1];
            let raw = before
                .iter()
                .map(String::as_str)
                .chain(ups)
                .chain(after.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join("/");
            prop_assert_eq!(normalize_declared_path(&raw), Err(PathError::Traversal));
        }
    }
}
