//! Phase 2: compare each matched action against what its requirement row
//! expects. Only sides that passed the existence checks reach this phase.

use crate::issue::{IssueCollector, ValidationIssue};
use crate::model::{ActionId, ActionRecord, GatingConfig, Quantity, RequirementRow, RewardSpec};
use crate::reconcile::ReconciledSide;
use crate::types::{CheckKind, Side};

pub fn check(sides: &[ReconciledSide<'_>], gating: &GatingConfig, issues: &mut IssueCollector) {
    tracing::info!(sides = sides.len(), "phase 2: content checks");
    for s in sides {
        // Phase 1 only lets through sides with a catalog record.
        let Some(action) = s.action else {
            continue;
        };
        let ctx = SideContext {
            row: s.row,
            side: s.side,
            action_id: s.action_id,
        };
        if s.side == Side::Free {
            check_need_resources(&ctx, action, issues);
        }
        if let Some(expected) = s.row.reward(s.side) {
            check_reward(&ctx, action, expected, issues);
        }
        if s.side == Side::Paid {
            check_gating(&ctx, action, gating, issues);
        }
    }
}

struct SideContext<'a> {
    row: &'a RequirementRow,
    side: Side,
    action_id: &'a ActionId,
}

impl SideContext<'_> {
    fn issue(&self, kind: CheckKind) -> ValidationIssue {
        ValidationIssue::error(kind)
            .for_action(self.action_id)
            .at_row(self.row.row_number)
            .on_side(self.side)
    }
}

fn check_need_resources(ctx: &SideContext<'_>, action: &ActionRecord, issues: &mut IssueCollector) {
    // Blank or zero in the table means no threshold is expected.
    let expected = match ctx.row.need_resources {
        Some(n) if n > 0 => n,
        _ => return,
    };
    let actual = action.need_resources.as_ref();
    issues.check(actual.and_then(Quantity::count) == Some(expected), || {
        ctx.issue(CheckKind::NeedResourcesMismatch)
            .expected(expected)
            .actual(
                actual
                    .map(Quantity::to_string)
                    .unwrap_or_else(|| "absent".to_string()),
            )
            .details("needResources on the action must match the requirements table")
    });
}

fn check_reward(
    ctx: &SideContext<'_>,
    action: &ActionRecord,
    expected: &RewardSpec,
    issues: &mut IssueCollector,
) {
    let Some(granted) = action.find_reward(expected) else {
        issues.record(
            ctx.issue(CheckKind::RewardMissing)
                .expected(format!("{}:{}", expected.reward_type, expected.id))
                .actual(granted_summary(action))
                .details(format!(
                    "action must grant a {} reward with id {}",
                    expected.reward_type, expected.id
                )),
        );
        return;
    };
    issues.pass();
    issues.check(granted.quantity.count() == Some(expected.quantity), || {
        ctx.issue(CheckKind::RewardQuantityMismatch)
            .expected(expected.quantity)
            .actual(&granted.quantity)
            .details(format!(
                "count of {} reward {} must match the requirements table",
                expected.reward_type, expected.id
            ))
    });
}

fn check_gating(
    ctx: &SideContext<'_>,
    action: &ActionRecord,
    gating: &GatingConfig,
    issues: &mut IssueCollector,
) {
    let Some(need_action) = &action.need_action else {
        issues.record(
            ctx.issue(CheckKind::PaidGatingMissing)
                .expected("present")
                .actual("absent")
                .details("paid reward actions must set needAction"),
        );
        return;
    };
    issues.pass();
    issues.check(need_action.iter().any(|id| gating.accepts(id)), || {
        ctx.issue(CheckKind::PaidGatingInvalid)
            .expected(gating.describe())
            .actual(join_ids(need_action))
            .details("needAction must reference the battlepass or a season pass action")
    });
}

fn granted_summary(action: &ActionRecord) -> String {
    if action.rewards.is_empty() {
        return "no rewards".to_string();
    }
    action
        .rewards
        .iter()
        .map(|r| match &r.id {
            Some(id) => format!("{}:{}", r.reward_type, id),
            None => r.reward_type.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_ids(ids: &[ActionId]) -> String {
    ids.iter()
        .map(ActionId::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
