//! Ledger adapter backed by the `br` ticket CLI
//!
//! Failing verdicts open (or reuse) one ticket per repository; a later
//! non-failing verdict closes it. `br` being absent or erroring only means
//! no id is returned.

use std::time::Duration;

use serde::Deserialize;

use city_kit::commands::SystemCommandExecutor;
use city_kit::ledger::{LedgerRecord, LedgerRecorder};

const BR: &str = "br";

/// Create command executor for the `br` CLI
pub fn create_br_command_executor() -> SystemCommandExecutor {
    let mut executor = SystemCommandExecutor::with_timeout(Duration::from_secs(30));
    executor.allow_commands(&[BR]);
    executor
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: String,
}

pub struct BeadLedger {
    executor: SystemCommandExecutor,
}

impl Default for BeadLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl BeadLedger {
    pub fn new() -> Self {
        Self {
            executor: create_br_command_executor(),
        }
    }

    /// Run `br`; `None` unless it started and exited 0
    fn br(&self, args: &[&str]) -> Option<String> {
        match self.executor.execute(BR, args, None) {
            Ok(out) if out.success() => Some(out.output),
            Ok(out) => {
                log::warn!("br {} exited {}", args.first().unwrap_or(&""), out.exit_code);
                None
            }
            Err(e) => {
                log::debug!("br unavailable: {}", e);
                None
            }
        }
    }

    fn find_open_failure(&self, repo: &str) -> Option<String> {
        let repo_label = format!("repo:{}", repo);
        let output = self.br(&[
            "search",
            "gate",
            "--label",
            "tool:gate",
            "--label",
            &repo_label,
            "--label",
            "status:fail",
            "--status",
            "open",
            "--json",
            "--label",
            "kind:city",
        ])?;
        parse_first_id(&output)
    }

    fn create(&self, record: &LedgerRecord) -> Option<String> {
        let labels = record.labels_csv();
        let mut args = vec![
            "create",
            record.title.as_str(),
            "-t",
            "chore",
            "-l",
            labels.as_str(),
            "-d",
            record.description.as_str(),
            "--silent",
        ];
        if let Some(assignee) = &record.assignee {
            args.extend(["-a", assignee.as_str()]);
        }

        let output = self.br(&args)?;
        output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .map(str::to_string)
    }

    fn resolve(&self, record: &LedgerRecord) {
        if let Some(id) = self.find_open_failure(&record.repo) {
            let reason = format!("Gate now passing: {}", record.title);
            if self.br(&["close", &id, "--reason", &reason]).is_some() {
                log::info!("Closed ledger ticket {}", id);
            }
        }
    }
}

impl LedgerRecorder for BeadLedger {
    fn record(&self, record: &LedgerRecord) -> Option<String> {
        if !record.failing {
            self.resolve(record);
            return None;
        }
        self.find_open_failure(&record.repo)
            .or_else(|| self.create(record))
    }
}

/// First `id` from a `br search --json` array
///
/// Tolerates diagnostics printed around the JSON array.
fn parse_first_id(output: &str) -> Option<String> {
    let start = output.find('[')?;
    let end = output.rfind(']')?;
    let hits: Vec<SearchHit> = serde_json::from_str(output.get(start..=end)?).ok()?;
    hits.into_iter().next().map(|hit| hit.id)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_id() {
        assert_eq!(
            parse_first_id(r#"[{"id":"bd-1","title":"x"},{"id":"bd-2"}]"#).as_deref(),
            Some("bd-1")
        );
        assert_eq!(
            parse_first_id("warning: stale index\n[{\"id\":\"bd-9\"}]\n").as_deref(),
            Some("bd-9")
        );
        assert_eq!(parse_first_id("[]"), None);
        assert_eq!(parse_first_id("not json"), None);
    }

    #[test]
    fn test_missing_br_yields_no_id() {
        let ledger = BeadLedger {
            executor: SystemCommandExecutor::new(),
        };
        let verdict = city_kit::verdict::Verdict::invalid("demo", "boom");
        let record = LedgerRecord::from_verdict(&verdict, "ada");
        assert_eq!(ledger.record(&record), None);
    }
}
