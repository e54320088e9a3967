use crate::model::ActionId;
use crate::types::{CheckKind, Severity, Side};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ValidationIssue
// ---------------------------------------------------------------------------

/// One detected discrepancy. Issues are never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<ActionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    pub check_name: CheckKind,
    pub severity: Severity,
    pub expected: String,
    pub actual: String,
    pub details: String,
}

impl ValidationIssue {
    pub fn new(check_name: CheckKind, severity: Severity) -> Self {
        Self {
            action_id: None,
            row_number: None,
            side: None,
            check_name,
            severity,
            expected: String::new(),
            actual: String::new(),
            details: String::new(),
        }
    }

    pub fn error(check_name: CheckKind) -> Self {
        Self::new(check_name, Severity::Error)
    }

    pub fn warning(check_name: CheckKind) -> Self {
        Self::new(check_name, Severity::Warning)
    }

    pub fn for_action(mut self, id: &ActionId) -> Self {
        self.action_id = Some(id.clone());
        self
    }

    pub fn at_row(mut self, row_number: usize) -> Self {
        self.row_number = Some(row_number);
        self
    }

    pub fn on_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    pub fn expected(mut self, value: impl ToString) -> Self {
        self.expected = value.to_string();
        self
    }

    pub fn actual(mut self, value: impl ToString) -> Self {
        self.actual = value.to_string();
        self
    }

    pub fn details(mut self, text: impl Into<String>) -> Self {
        self.details = text.into();
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Value for the report's "Action ID" column: the action id, or the
    /// row reference when no single action applies.
    pub fn subject(&self) -> String {
        match (&self.action_id, self.row_number) {
            (Some(id), _) => id.to_string(),
            (None, Some(row)) => format!("row {row}"),
            (None, None) => String::new(),
        }
    }
}

/// True iff any issue has `Error` severity. Callers use it to pick the exit
/// status.
pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(ValidationIssue::is_error)
}

// ---------------------------------------------------------------------------
// CheckStats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
}

// ---------------------------------------------------------------------------
// IssueCollector
// ---------------------------------------------------------------------------

/// Append-only, discovery-ordered issue sink shared by both phases.
#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Vec<ValidationIssue>,
    stats: CheckStats,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, issue: ValidationIssue) {
        self.stats.total += 1;
        match issue.severity {
            Severity::Error => self.stats.failed += 1,
            Severity::Warning => self.stats.warnings += 1,
        }
        tracing::debug!(
            check = %issue.check_name,
            subject = %issue.subject(),
            expected = %issue.expected,
            actual = %issue.actual,
            "check failed"
        );
        self.issues.push(issue);
    }

    /// Count a check that found nothing to report.
    pub fn pass(&mut self) {
        self.stats.total += 1;
        self.stats.passed += 1;
    }

    /// Record `issue()` when `ok` is false, otherwise count a pass.
    pub fn check(&mut self, ok: bool, issue: impl FnOnce() -> ValidationIssue) {
        if ok {
            self.pass();
        } else {
            self.record(issue());
        }
    }

    pub fn all_issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn has_errors(&self) -> bool {
        has_errors(&self.issues)
    }

    pub fn stats(&self) -> CheckStats {
        self.stats
    }

    pub fn into_parts(self) -> (Vec<ValidationIssue>, CheckStats) {
        (self.issues, self.stats)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_keeps_discovery_order_and_duplicates() {
        let mut c = IssueCollector::new();
        let id = ActionId::new("A1");
        c.record(ValidationIssue::error(CheckKind::MissingInPromo).for_action(&id));
        c.record(ValidationIssue::error(CheckKind::MissingInCatalog).for_action(&id));
        c.record(ValidationIssue::error(CheckKind::MissingInPromo).for_action(&id));

        let kinds: Vec<CheckKind> = c.all_issues().iter().map(|i| i.check_name).collect();
        assert_eq!(
            kinds,
            [
                CheckKind::MissingInPromo,
                CheckKind::MissingInCatalog,
                CheckKind::MissingInPromo
            ]
        );
    }

    #[test]
    fn warnings_alone_are_not_errors() {
        let mut c = IssueCollector::new();
        assert!(!c.has_errors());
        c.record(ValidationIssue::warning(CheckKind::RewardMissing));
        assert!(!c.has_errors());
        c.record(ValidationIssue::error(CheckKind::RewardMissing));
        assert!(c.has_errors());
    }

    #[test]
    fn stats_count_passes_and_failures() {
        let mut c = IssueCollector::new();
        c.check(true, || ValidationIssue::error(CheckKind::RewardMissing));
        c.check(false, || ValidationIssue::error(CheckKind::RewardMissing));
        c.record(ValidationIssue::warning(CheckKind::RewardMissing));
        assert_eq!(
            c.stats(),
            CheckStats {
                total: 3,
                passed: 1,
                failed: 1,
                warnings: 1
            }
        );
    }

    #[test]
    fn subject_falls_back_to_row() {
        let issue = ValidationIssue::error(CheckKind::MalformedRow).at_row(7);
        assert_eq!(issue.subject(), "row 7");
        let issue = issue.for_action(&ActionId::new("42"));
        assert_eq!(issue.subject(), "42");
    }

    #[test]
    fn issue_json_omits_absent_fields() {
        let issue = ValidationIssue::error(CheckKind::OrphanInPromo).for_action(&ActionId::new("9"));
        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("\"check_name\":\"orphan_in_promo\""));
        assert!(!json.contains("row_number"));
        assert!(!json.contains("side"));
    }
}
