use crate::issue::{CheckStats, IssueCollector, ValidationIssue};
use crate::model::{Catalog, GatingConfig, PromoActionRef, RequirementRow};
use crate::{content, existence, reconcile};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ValidationOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub issues: Vec<ValidationIssue>,
    pub stats: CheckStats,
}

impl ValidationOutcome {
    pub fn has_errors(&self) -> bool {
        crate::issue::has_errors(&self.issues)
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// One validation pass over fully loaded inputs.
pub struct Validator<'a> {
    rows: &'a [RequirementRow],
    catalog: &'a Catalog,
    promo: &'a [PromoActionRef],
    gating: &'a GatingConfig,
    input_issues: Vec<ValidationIssue>,
}

impl<'a> Validator<'a> {
    pub fn new(
        rows: &'a [RequirementRow],
        catalog: &'a Catalog,
        promo: &'a [PromoActionRef],
        gating: &'a GatingConfig,
    ) -> Self {
        Self {
            rows,
            catalog,
            promo,
            gating,
            input_issues: Vec::new(),
        }
    }

    /// Issues found while loading (malformed rows). They lead the outcome.
    pub fn with_input_issues(mut self, issues: Vec<ValidationIssue>) -> Self {
        self.input_issues = issues;
        self
    }

    pub fn validate(self) -> ValidationOutcome {
        let mut issues = IssueCollector::new();
        for issue in self.input_issues {
            issues.record(issue);
        }

        let rec = reconcile::reconcile(self.rows, self.catalog, self.promo);
        let passed = existence::check(&rec, &mut issues);
        content::check(&passed, self.gating, &mut issues);

        let (issues, stats) = issues.into_parts();
        tracing::info!(
            total = stats.total,
            passed = stats.passed,
            failed = stats.failed,
            "validation complete"
        );
        ValidationOutcome { issues, stats }
    }
}

/// Cross-validate the three sources and return every discrepancy in
/// discovery order.
pub fn run(
    rows: &[RequirementRow],
    catalog: &Catalog,
    promo: &[PromoActionRef],
    gating: &GatingConfig,
) -> Vec<ValidationIssue> {
    Validator::new(rows, catalog, promo, gating).validate().issues
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
