//! # File System Collector
//!
//! Symlink-aware probes of an install location. Nothing here follows
//! symlinks: a link is reported as a link, never as what it points to.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::glob::match_path;

/// What occupies a path, observed with `lstat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    /// Sockets, FIFOs, devices
    Other,
    Missing,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::Symlink => "symlink",
            EntryKind::Other => "non-regular",
            EntryKind::Missing => "missing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("failed to read {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Classify `path` without following a final symlink
pub fn probe(path: &Path) -> io::Result<EntryKind> {
    match fs::symlink_metadata(path) {
        Ok(meta) => {
            let file_type = meta.file_type();
            Ok(if file_type.is_symlink() {
                EntryKind::Symlink
            } else if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(EntryKind::Missing),
        Err(e) => Err(e),
    }
}

/// Classify `relative` under `root` without following any link below `root`
///
/// Each component is inspected with `lstat`. The first symlinked component
/// yields [`EntryKind::Symlink`], so a linked parent directory cannot stand
/// in for a real one. A non-directory in the middle of the path means the
/// target is [`EntryKind::Missing`].
pub fn probe_under(root: &Path, relative: &Path) -> io::Result<EntryKind> {
    let mut current = root.to_path_buf();
    let mut components = relative
        .components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .peekable();

    while let Some(component) = components.next() {
        current.push(component);
        let kind = probe(&current)?;
        let last = components.peek().is_none();
        match kind {
            EntryKind::Symlink | EntryKind::Missing => return Ok(kind),
            _ if last => return Ok(kind),
            EntryKind::Directory => {}
            _ => return Ok(EntryKind::Missing),
        }
    }

    probe(&current)
}

/// First path under `root` (relative, `/`-separated) matching `pattern`
///
/// Directories are visited in sorted order so the result is deterministic.
/// Symlinks are neither matched nor descended into.
pub fn find_glob_match(root: &Path, pattern: &str) -> Result<Option<String>, WalkError> {
    walk(root, "", pattern)
}

fn walk(dir: &Path, prefix: &str, pattern: &str) -> Result<Option<String>, WalkError> {
    let read_error = |source| WalkError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(read_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let file_type = entry.file_type().map_err(read_error)?;
        if file_type.is_symlink() {
            log::debug!("Skipping symlink {}", entry.path().display());
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();
        let relative = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", prefix, name)
        };

        if match_path(pattern, &relative) {
            return Ok(Some(relative));
        }
        if file_type.is_dir() {
            if let Some(found) = walk(&entry.path(), &relative, pattern)? {
                return Ok(Some(found));
            }
        }
    }

    Ok(None)
}
