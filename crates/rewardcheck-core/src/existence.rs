//! Phase 1: every referenced action must exist on both sides, and every promo
//! action must be referenced exactly once by the promo.

use crate::issue::{IssueCollector, ValidationIssue};
use crate::reconcile::{ReconciledSide, Reconciliation};
use crate::types::CheckKind;

const PRESENT: &str = "present";
const ABSENT: &str = "absent";

/// Run the existence checks and return the sides that may proceed to
/// content checking.
pub fn check<'a>(
    rec: &Reconciliation<'a>,
    issues: &mut IssueCollector,
) -> Vec<ReconciledSide<'a>> {
    tracing::info!(sides = rec.sides.len(), "phase 1: existence checks");

    for s in &rec.sides {
        issues.check(s.in_promo, || {
            ValidationIssue::error(CheckKind::MissingInPromo)
                .for_action(s.action_id)
                .at_row(s.row.row_number)
                .on_side(s.side)
                .expected(PRESENT)
                .actual(ABSENT)
                .details(format!(
                    "{} action must be listed in the promo awards",
                    s.side.column()
                ))
        });
        issues.check(s.in_catalog, || {
            ValidationIssue::error(CheckKind::MissingInCatalog)
                .for_action(s.action_id)
                .at_row(s.row.row_number)
                .on_side(s.side)
                .expected(PRESENT)
                .actual(ABSENT)
                .details(format!(
                    "{} action must be defined in the action catalog",
                    s.side.column()
                ))
        });
    }

    for entry in &rec.unreferenced {
        issues.record(
            ValidationIssue::error(CheckKind::OrphanInPromo)
                .for_action(&entry.action_id)
                .expected("referenced by a requirement row")
                .actual("unreferenced")
                .details(format!(
                    "promo award #{} has no row in the requirements table",
                    entry.position + 1
                )),
        );
    }

    for entry in &rec.duplicates {
        issues.record(
            ValidationIssue::error(CheckKind::DuplicateInPromo)
                .for_action(&entry.action_id)
                .expected("listed once")
                .actual(format!("repeated at position {}", entry.position + 1))
                .details("promo awards must not list the same action twice"),
        );
    }

    let passed: Vec<ReconciledSide<'a>> =
        rec.sides.iter().filter(|s| s.exists()).copied().collect();
    tracing::info!(
        passed = passed.len(),
        skipped = rec.sides.len() - passed.len(),
        "phase 1 complete"
    );
    passed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActionId, ActionRecord, Catalog, PromoActionRef, RequirementRow};
    use crate::reconcile::reconcile;
    use crate::types::Side;

    fn catalog_of(ids: &[&str]) -> Catalog {
        ids.iter()
            .map(|id| (ActionId::new(*id), ActionRecord::new(*id)))
            .collect()
    }

    #[test]
    fn all_present_yields_no_issues() {
        let rows = vec![RequirementRow::new(1).with_free("A1", None)];
        let catalog = catalog_of(&["A1"]);
        let promo = PromoActionRef::from_ids(["A1"]);
        let rec = reconcile(&rows, &catalog, &promo);

        let mut issues = IssueCollector::new();
        let passed = check(&rec, &mut issues);
        assert!(issues.all_issues().is_empty());
        assert_eq!(passed.len(), 1);
        assert_eq!(issues.stats().passed, 2);
    }

    #[test]
    fn missing_paid_action_reports_both_sources() {
        let rows = vec![RequirementRow::new(1).with_paid("P1", None)];
        let catalog = Catalog::new();
        let rec = reconcile(&rows, &catalog, &[]);

        let mut issues = IssueCollector::new();
        let passed = check(&rec, &mut issues);
        assert!(passed.is_empty());

        let got: Vec<(CheckKind, Option<Side>)> = issues
            .all_issues()
            .iter()
            .map(|i| (i.check_name, i.side))
            .collect();
        assert_eq!(
            got,
            [
                (CheckKind::MissingInPromo, Some(Side::Paid)),
                (CheckKind::MissingInCatalog, Some(Side::Paid))
            ]
        );
        assert_eq!(issues.all_issues()[0].row_number, Some(1));
    }

    #[test]
    fn side_missing_only_from_promo_is_gated() {
        let rows = vec![RequirementRow::new(1).with_free("A1", None)];
        let catalog = catalog_of(&["A1"]);
        let rec = reconcile(&rows, &catalog, &[]);

        let mut issues = IssueCollector::new();
        let passed = check(&rec, &mut issues);
        assert!(passed.is_empty());
        assert_eq!(issues.all_issues().len(), 1);
        assert_eq!(issues.all_issues()[0].check_name, CheckKind::MissingInPromo);
    }

    #[test]
    fn orphans_and_duplicates_follow_row_issues() {
        let rows = vec![RequirementRow::new(1).with_free("A1", None)];
        let catalog = catalog_of(&["A1"]);
        let promo = PromoActionRef::from_ids(["X", "X", "Y"]);
        let rec = reconcile(&rows, &catalog, &promo);

        let mut issues = IssueCollector::new();
        check(&rec, &mut issues);
        let got: Vec<(CheckKind, String)> = issues
            .all_issues()
            .iter()
            .map(|i| (i.check_name, i.subject()))
            .collect();
        assert_eq!(
            got,
            [
                (CheckKind::MissingInPromo, "A1".to_string()),
                (CheckKind::OrphanInPromo, "X".to_string()),
                (CheckKind::OrphanInPromo, "Y".to_string()),
                (CheckKind::DuplicateInPromo, "X".to_string()),
            ]
        );
    }
}
