use crate::config::RunConfig;
use crate::engine::ValidationOutcome;
use crate::error::Result;
use crate::issue::{CheckStats, ValidationIssue};
use crate::types::Severity;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

pub const REPORT_HEADERS: [&str; 6] = [
    "Action ID",
    "Проверка",
    "Результат",
    "Ожидаемое",
    "Фактическое",
    "Детали",
];

// ---------------------------------------------------------------------------
// CSV report
// ---------------------------------------------------------------------------

pub fn render_csv(issues: &[ValidationIssue]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(REPORT_HEADERS)?;
    for issue in issues {
        wtr.write_record([
            issue.subject().as_str(),
            issue.check_name.as_str(),
            issue.severity.report_label(),
            issue.expected.as_str(),
            issue.actual.as_str(),
            issue.details.as_str(),
        ])?;
    }
    wtr.into_inner().map_err(|e| e.into_error().into())
}

pub fn write_csv_report(path: &Path, issues: &[ValidationIssue]) -> Result<()> {
    let data = render_csv(issues)?;
    crate::io::atomic_write(path, &data)?;
    tracing::info!(path = %path.display(), rows = issues.len(), "wrote report");
    Ok(())
}

// ---------------------------------------------------------------------------
// Detailed log
// ---------------------------------------------------------------------------

const RULE: &str = "================================================================================";

/// Render the plain-text run log. `at` stamps every line so two runs can be
/// told apart; everything else is a pure function of the outcome.
pub fn render_log(cfg: &RunConfig, outcome: &ValidationOutcome, at: DateTime<Utc>) -> String {
    let ts = at.format("%Y-%m-%d %H:%M:%S").to_string();
    let info = |msg: String| format!("[INFO] {ts} - {msg}");
    let mut lines: Vec<String> = Vec::new();

    lines.extend(banner("SEASON PASS REWARD VALIDATION"));
    lines.push(info(format!("promo: {}", cfg.promo_path.display())));
    lines.push(info(format!("requirements: {}", cfg.requirements_path.display())));
    lines.push(info(format!("actions: {}", cfg.actions_path.display())));

    lines.extend(banner("ISSUES"));
    if outcome.issues.is_empty() {
        lines.push(info("no issues found".to_string()));
    }
    lines.extend(outcome.issues.iter().map(|issue| issue_line(issue, &ts)));

    lines.extend(banner("SUMMARY"));
    let CheckStats {
        total,
        passed,
        failed,
        warnings,
    } = outcome.stats;
    lines.push(info(format!("checks: {total}")));
    lines.push(info(format!("passed: {passed}")));
    lines.push(info(format!("failed: {failed}")));
    lines.push(info(format!("warnings: {warnings}")));
    let verdict = if outcome.has_errors() { "FAILED" } else { "PASSED" };
    lines.push(info(format!("result: {verdict}")));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn banner(title: &str) -> [String; 3] {
    [RULE.to_string(), title.to_string(), RULE.to_string()]
}

fn issue_line(issue: &ValidationIssue, ts: &str) -> String {
    let tag = match issue.severity {
        Severity::Error => "CHECK:FAIL",
        Severity::Warning => "WARNING",
    };
    let mut line = format!("[{tag}] {ts} - Action {}: {}", issue.subject(), issue.check_name);
    if let Some(side) = issue.side {
        line.push_str(&format!(" [{side}]"));
    }
    if !issue.expected.is_empty() || !issue.actual.is_empty() {
        line.push_str(&format!(
            " (expected: {}, actual: {})",
            issue.expected, issue.actual
        ));
    }
    if !issue.details.is_empty() {
        line.push_str(&format!(" - {}", issue.details));
    }
    line
}

pub fn write_log(path: &Path, cfg: &RunConfig, outcome: &ValidationOutcome) -> Result<()> {
    let text = render_log(cfg, outcome, Utc::now());
    crate::io::atomic_write(path, text.as_bytes())?;
    tracing::info!(path = %path.display(), "wrote detailed log");
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON document
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub ok: bool,
    pub stats: CheckStats,
    pub issues: &'a [ValidationIssue],
}

impl<'a> From<&'a ValidationOutcome> for JsonReport<'a> {
    fn from(outcome: &'a ValidationOutcome) -> Self {
        Self {
            ok: !outcome.has_errors(),
            stats: outcome.stats,
            issues: &outcome.issues,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
