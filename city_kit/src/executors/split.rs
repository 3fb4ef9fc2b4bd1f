//! # Split Executor
//!
//! Every declared path must exist at the install location with the declared
//! kind. Symlinks never satisfy presence, whatever they point to.

use std::path::Path;

use crate::collectors::{find_glob_match, probe_under, EntryKind};
use crate::contracts::{DeclaredPath, PathKind};
use crate::verdict::CheckOutcome;

pub fn check_split(polis_files: &[DeclaredPath], install_at: Option<&Path>) -> CheckOutcome {
    let Some(root) = install_at else {
        return CheckOutcome::skip("skipped: --install-at not provided");
    };

    let problems: Vec<String> = polis_files
        .iter()
        .filter_map(|entry| entry_problem(root, entry))
        .collect();

    if problems.is_empty() {
        CheckOutcome::pass(format!(
            "{} polis files present at install path",
            polis_files.len()
        ))
    } else {
        CheckOutcome::fail(problems.join("; "))
    }
}

fn entry_problem(root: &Path, entry: &DeclaredPath) -> Option<String> {
    let expected = match entry.kind() {
        PathKind::Glob => {
            return match find_glob_match(root, entry.as_str()) {
                Ok(Some(found)) => {
                    log::debug!("{} matched {}", entry, found);
                    None
                }
                Ok(None) => Some(format!("{} missing (glob no matches)", entry)),
                Err(e) => {
                    log::warn!("Glob walk for {} failed: {}", entry, e);
                    Some(format!("{} check failed: {}", entry, e))
                }
            };
        }
        PathKind::Directory => EntryKind::Directory,
        PathKind::File => EntryKind::File,
    };

    let target = root.join(entry.bare());
    match probe_under(root, Path::new(entry.bare())) {
        Ok(found) if found == expected => None,
        Ok(EntryKind::Missing) => Some(format!("{} missing at {}", entry, target.display())),
        Ok(found) => Some(format!(
            "{} expected {} but found {} at {}",
            entry,
            expected,
            found,
            target.display()
        )),
        Err(e) => Some(format!("{} check failed: {}", entry, e)),
    }
}
