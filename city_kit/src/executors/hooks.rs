//! # Config Hooks Executor
//!
//! Every hook must point at a declared path and carry a recognized fallback.
//! A `fail` fallback additionally needs the file present at the install
//! location. Problems from all hooks are collected; zero hooks is a pass.

use std::path::Path;

use crate::collectors::{probe_under, EntryKind};
use crate::contracts::{Contract, Fallback, Hook};
use crate::verdict::CheckOutcome;

pub fn check_hooks(contract: &Contract, install_at: Option<&Path>) -> CheckOutcome {
    if contract.hooks.is_empty() {
        return CheckOutcome::pass("no hooks declared");
    }

    let problems: Vec<String> = contract
        .hooks
        .iter()
        .flat_map(|hook| hook_problems(contract, hook, install_at))
        .collect();

    if problems.is_empty() {
        CheckOutcome::pass(format!("{} hooks sound", contract.hooks.len()))
    } else {
        CheckOutcome::fail(problems.join("; "))
    }
}

fn hook_problems(contract: &Contract, hook: &Hook, install_at: Option<&Path>) -> Vec<String> {
    let mut problems = Vec::new();
    let file = &hook.file;

    if !contract.declares_hook_target(file) {
        problems.push(format!("{} not listed in polis_files", file));
    }

    match hook.parsed_fallback() {
        Ok(Fallback::Defaults) | Ok(Fallback::Env(_)) => {}
        Ok(Fallback::Fail) => {
            if let Some(problem) = fail_fallback_problem(file, install_at) {
                problems.push(problem);
            }
        }
        Err(e) => {
            problems.push(format!("{} has {}", file, e));
        }
    }

    problems
}

/// A `fail` fallback is sound only with a regular file at the install path
fn fail_fallback_problem(file: &str, install_at: Option<&Path>) -> Option<String> {
    let Some(root) = install_at else {
        return Some(format!("{} fallback=fail requires --install-at", file));
    };

    let kind = probe_under(root, Path::new(file)).unwrap_or_else(|e| {
        log::debug!("lstat failed for {}: {}", root.join(file).display(), e);
        EntryKind::Missing
    });

    match kind {
        EntryKind::File => None,
        EntryKind::Missing => Some(format!(
            "{} fallback=fail but file missing at install path",
            file
        )),
        EntryKind::Symlink => Some(format!(
            "{} fallback=fail but install path is symlink",
            file
        )),
        other => Some(format!(
            "{} fallback=fail but found {} at install path",
            file, other
        )),
    }
}
