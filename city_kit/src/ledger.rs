//! # Ledger
//!
//! Interface for durably recording verdicts as dedupable tickets. The engine
//! only builds the record; a [`LedgerRecorder`] decides where it goes. A
//! recorder that is unavailable returns no id, which never affects the
//! verdict.

use chrono::{SecondsFormat, Utc};

use crate::verdict::{Verdict, VerdictStatus};

/// Citizen value meaning "no known actor"
pub const UNKNOWN_CITIZEN: &str = "unknown";

/// Ticket-shaped view of a verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub title: String,
    pub labels: Vec<String>,
    pub description: String,
    /// Assignee, absent when the citizen is unknown
    pub assignee: Option<String>,
    /// Whether an open ticket should exist for this repo
    pub failing: bool,
    pub repo: String,
}

impl LedgerRecord {
    pub fn from_verdict(verdict: &Verdict, citizen: &str) -> Self {
        let failing = verdict.is_failure();
        // Invalid contracts share the open-failure ticket with failed runs
        let status_label = if failing {
            VerdictStatus::Fail
        } else {
            verdict.status
        };

        let citizen = citizen.trim();
        let assignee = (!citizen.is_empty() && citizen != UNKNOWN_CITIZEN)
            .then(|| citizen.to_string());

        Self {
            title: format!("gate city: {} ({})", verdict.repo, verdict.status),
            labels: vec![
                "tool:gate".to_string(),
                "kind:city".to_string(),
                format!("status:{}", status_label),
                format!("repo:{}", verdict.repo),
            ],
            description: describe(verdict),
            assignee,
            failing,
            repo: verdict.repo.clone(),
        }
    }

    /// Labels in the comma-separated form ticket tools accept
    pub fn labels_csv(&self) -> String {
        self.labels.join(",")
    }
}

fn describe(verdict: &Verdict) -> String {
    let mut lines = vec![
        format!("gate city verdict: {}", verdict.status),
        format!("repo: {}", verdict.repo),
        format!("exit_code: {}", verdict.exit_code),
        format!(
            "summary: pass={} fail={} skip={}",
            verdict.summary.pass, verdict.summary.fail, verdict.summary.skip
        ),
        format!(
            "recorded_at: {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        String::new(),
        "checks:".to_string(),
    ];
    lines.extend(verdict.checks.iter().map(|check| {
        format!(
            "- {}: {} ({}ms) {}",
            check.name, check.status, check.duration_ms, check.detail
        )
    }));
    lines.join("\n")
}

/// Destination for verdict records
pub trait LedgerRecorder {
    /// Record a verdict; returns the durable id of the open ticket, if any
    fn record(&self, record: &LedgerRecord) -> Option<String>;
}

/// Recorder that keeps nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLedger;

impl LedgerRecorder for NoopLedger {
    fn record(&self, _record: &LedgerRecord) -> Option<String> {
        None
    }
}

/// Hand the verdict to `recorder` and attach the returned id
pub fn record_verdict(recorder: &dyn LedgerRecorder, verdict: &mut Verdict, citizen: &str) {
    let record = LedgerRecord::from_verdict(verdict, citizen);
    verdict.ledger_id = recorder.record(&record);
    match &verdict.ledger_id {
        Some(id) => log::info!("Recorded verdict for {} as {}", verdict.repo, id),
        None => log::debug!("No ledger id for {}", verdict.repo),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::{CheckResult, CheckStatus};

    fn verdict(statuses: &[CheckStatus]) -> Verdict {
        let checks = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| CheckResult {
                name: format!("check{}", i),
                status: *status,
                detail: "detail".to_string(),
                duration_ms: 7,
            })
            .collect();
        Verdict::aggregate("demo", checks)
    }

    #[test]
    fn test_failing_record() {
        let v = verdict(&[CheckStatus::Pass, CheckStatus::Fail]);
        let record = LedgerRecord::from_verdict(&v, "ada");

        assert!(record.failing);
        assert_eq!(record.title, "gate city: demo (fail)");
        assert_eq!(
            record.labels_csv(),
            "tool:gate,kind:city,status:fail,repo:demo"
        );
        assert_eq!(record.assignee.as_deref(), Some("ada"));
        assert!(record.description.starts_with(
            "gate city verdict: fail\nrepo: demo\nexit_code: 1\nsummary: pass=1 fail=1 skip=0\n"
        ));
        assert!(record.description.contains("recorded_at: "));
        assert!(record.description.ends_with(
            "checks:\n- check0: pass (7ms) detail\n- check1: fail (7ms) detail"
        ));
    }

    #[test]
    fn test_invalid_shares_fail_label() {
        let v = Verdict::invalid("demo", "invalid city.toml: boom");
        let record = LedgerRecord::from_verdict(&v, UNKNOWN_CITIZEN);
        assert!(record.failing);
        assert_eq!(record.title, "gate city: demo (invalid)");
        assert!(record.labels.contains(&"status:fail".to_string()));
        assert_eq!(record.assignee, None);
    }

    #[test]
    fn test_warn_is_not_failing() {
        let v = verdict(&[CheckStatus::Pass, CheckStatus::Skip]);
        let record = LedgerRecord::from_verdict(&v, "");
        assert!(!record.failing);
        assert!(record.labels.contains(&"status:warn".to_string()));
        assert_eq!(record.assignee, None);
    }

    #[test]
    fn test_record_verdict_attaches_id() {
        struct Fixed;
        impl LedgerRecorder for Fixed {
            fn record(&self, record: &LedgerRecord) -> Option<String> {
                record.failing.then(|| "bd-42".to_string())
            }
        }

        let mut failing = verdict(&[CheckStatus::Fail]);
        record_verdict(&Fixed, &mut failing, "ada");
        assert_eq!(failing.ledger_id.as_deref(), Some("bd-42"));

        let mut passing = verdict(&[CheckStatus::Pass]);
        record_verdict(&NoopLedger, &mut passing, "ada");
        assert_eq!(passing.ledger_id, None);
    }
}
