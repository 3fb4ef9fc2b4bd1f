//! Console output formatting
//!
//! Provides the colored, human-readable verdict report.

use city_kit::execution_api::{CheckResult, CheckStatus, Verdict, VerdictStatus};

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Print the verdict report to stdout
pub fn print_verdict(verdict: &Verdict) {
    print!("{}", render_verdict(verdict));
}

fn render_verdict(verdict: &Verdict) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n{}  {} (city)\n\n",
        banner(verdict.status),
        verdict.repo
    ));

    for check in &verdict.checks {
        out.push_str(&check_line(check));
        out.push('\n');
    }

    out.push_str(&format!(
        "\nsummary: pass={} fail={} skip={}\n",
        verdict.summary.pass, verdict.summary.fail, verdict.summary.skip
    ));
    if let Some(id) = &verdict.ledger_id {
        out.push_str(&format!("ledger: {}\n", id));
    }
    out.push('\n');
    out
}

fn banner(status: VerdictStatus) -> String {
    let (color, text) = match status {
        VerdictStatus::Pass => (GREEN, "✓ PASS"),
        VerdictStatus::Warn => (YELLOW, "! WARN"),
        VerdictStatus::Fail => (RED, "✗ FAIL"),
        VerdictStatus::Invalid => (RED, "✗ INVALID"),
    };
    format!("{}{}{}", color, text, RESET)
}

fn check_line(check: &CheckResult) -> String {
    let (color, icon) = match check.status {
        CheckStatus::Pass => (GREEN, "✓"),
        CheckStatus::Skip => (YELLOW, "-"),
        CheckStatus::Fail => (RED, "✗"),
    };
    format!(
        "  {}{}{} {:<12} {}ms  {}",
        color, icon, RESET, check.name, check.duration_ms, check.detail
    )
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_warn_verdict() {
        let verdict = Verdict::aggregate(
            "demo",
            vec![
                CheckResult {
                    name: "boundary".to_string(),
                    status: CheckStatus::Pass,
                    detail: "no polis_files declared".to_string(),
                    duration_ms: 3,
                },
                CheckResult {
                    name: "split".to_string(),
                    status: CheckStatus::Skip,
                    detail: "skipped: --install-at not provided".to_string(),
                    duration_ms: 0,
                },
            ],
        );
        let text = render_verdict(&verdict);

        assert!(text.contains("! WARN"));
        assert!(text.contains("demo (city)"));
        assert!(text.contains("boundary     3ms  no polis_files declared"));
        assert!(text.contains("summary: pass=1 fail=0 skip=1"));
        assert!(!text.contains("ledger:"));
    }

    #[test]
    fn test_render_invalid_with_ledger_id() {
        let mut verdict = Verdict::invalid("demo", "invalid repo input: not a git repository");
        verdict.ledger_id = Some("bd-7".to_string());
        let text = render_verdict(&verdict);
        assert!(text.contains("✗ INVALID"));
        assert!(text.contains("ledger: bd-7"));
    }
}
