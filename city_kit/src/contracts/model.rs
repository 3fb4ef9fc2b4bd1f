//! # Contract Model
//!
//! Validated, in-memory form of `city.toml`.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use thiserror::Error;

use super::path::{has_glob_meta, normalize_declared_path, PathError};

/// Environment variable names accepted by `env:NAME` fallbacks
static ENV_FALLBACK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").expect("env fallback regex"));

/// How a declared path is interpreted by every check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A single regular file
    File,
    /// A directory (declared with a trailing `/`)
    Directory,
    /// A wildcard pattern (contains `*`, `?` or `[`)
    Glob,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKind::File => write!(f, "file"),
            PathKind::Directory => write!(f, "directory"),
            PathKind::Glob => write!(f, "glob"),
        }
    }
}

/// One normalized `polis_files` entry
///
/// The kind is derived once at construction; checks read it through
/// [`DeclaredPath::kind`] and never re-derive it from the string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredPath {
    path: String,
    kind: PathKind,
}

impl DeclaredPath {
    /// Normalize a raw entry and derive its kind
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let path = normalize_declared_path(raw)?;
        let kind = if has_glob_meta(&path) {
            PathKind::Glob
        } else if path.ends_with('/') {
            PathKind::Directory
        } else {
            PathKind::File
        };
        Ok(Self { path, kind })
    }

    /// Normalized path, including the directory marker if any
    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }

    /// Path without the trailing directory marker
    pub fn bare(&self) -> &str {
        self.path.strip_suffix('/').unwrap_or(&self.path)
    }
}

impl fmt::Display for DeclaredPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// A declared configuration hook
///
/// `file` is already normalized. `fallback` is kept verbatim (trimmed) so the
/// config-hooks check can report unrecognized values instead of the loader
/// rejecting the whole contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub file: String,
    pub fallback: String,
}

impl Hook {
    pub fn parsed_fallback(&self) -> Result<Fallback, FallbackError> {
        Fallback::parse(&self.fallback)
    }
}

/// What the component does when the hook file is absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// A safe built-in default exists
    Defaults,
    /// The component cannot run without the file
    Fail,
    /// Fall back to the named environment variable
    Env(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FallbackError {
    #[error("invalid env fallback {0:?}")]
    InvalidEnvName(String),
    #[error("invalid fallback {0:?}")]
    Unrecognized(String),
}

impl Fallback {
    pub fn parse(raw: &str) -> Result<Self, FallbackError> {
        match raw {
            "defaults" => Ok(Fallback::Defaults),
            "fail" => Ok(Fallback::Fail),
            _ => match raw.strip_prefix("env:") {
                Some(name) if ENV_FALLBACK_NAME.is_match(name) => {
                    Ok(Fallback::Env(name.to_string()))
                }
                Some(_) => Err(FallbackError::InvalidEnvName(raw.to_string())),
                None => Err(FallbackError::Unrecognized(raw.to_string())),
            },
        }
    }
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::Defaults => write!(f, "defaults"),
            Fallback::Fail => write!(f, "fail"),
            Fallback::Env(name) => write!(f, "env:{}", name),
        }
    }
}

/// Validated contract, immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub schema_version: i64,
    /// Declared host-owned paths in document order (duplicates kept)
    pub polis_files: Vec<DeclaredPath>,
    /// Self-check command; empty means the standalone check is skipped
    pub standalone_check: String,
    pub hooks: Vec<Hook>,
}

impl Contract {
    /// Whether a hook file is covered by a declared file or directory entry
    ///
    /// Comparison ignores the directory marker, so `memory/` covers `memory`.
    pub fn declares_hook_target(&self, file: &str) -> bool {
        self.polis_files
            .iter()
            .filter(|entry| entry.kind() != PathKind::Glob)
            .any(|entry| entry.bare() == file)
    }
}
