use crate::model::{ActionId, ActionRecord, Catalog, PromoActionRef, RequirementRow};
use crate::types::Side;
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// ReconciledSide
// ---------------------------------------------------------------------------

/// One (row, side) pair with its action id resolved against the promo and
/// the catalog.
#[derive(Debug, Clone, Copy)]
pub struct ReconciledSide<'a> {
    pub row: &'a RequirementRow,
    pub side: Side,
    pub action_id: &'a ActionId,
    pub in_promo: bool,
    pub in_catalog: bool,
    /// Present exactly when `in_catalog` is true.
    pub action: Option<&'a ActionRecord>,
}

impl ReconciledSide<'_> {
    /// Whether the side passes both existence checks.
    pub fn exists(&self) -> bool {
        self.in_promo && self.in_catalog
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Reconciliation<'a> {
    /// Row order, free before paid.
    pub sides: Vec<ReconciledSide<'a>>,
    /// Promo actions no requirement row references, first occurrence only,
    /// in promo order.
    pub unreferenced: Vec<&'a PromoActionRef>,
    /// Every repeated promo listing after the first, in promo order.
    pub duplicates: Vec<&'a PromoActionRef>,
}

/// Index all three sources by action id and resolve every requirement side.
///
/// Pure function of its inputs; output order is deterministic.
pub fn reconcile<'a>(
    rows: &'a [RequirementRow],
    catalog: &'a Catalog,
    promo: &'a [PromoActionRef],
) -> Reconciliation<'a> {
    let promo_ids: BTreeSet<&ActionId> = promo.iter().map(|p| &p.action_id).collect();
    let referenced: BTreeSet<&ActionId> = rows.iter().flat_map(|r| r.action_ids()).collect();

    let mut sides = Vec::new();
    for row in rows {
        for &side in Side::all() {
            let Some(action_id) = row.action_id(side) else {
                continue;
            };
            let action = catalog.get(action_id);
            sides.push(ReconciledSide {
                row,
                side,
                action_id,
                in_promo: promo_ids.contains(action_id),
                in_catalog: action.is_some(),
                action,
            });
        }
    }

    let mut seen: BTreeSet<&ActionId> = BTreeSet::new();
    let mut unreferenced = Vec::new();
    let mut duplicates = Vec::new();
    for entry in promo {
        if !seen.insert(&entry.action_id) {
            duplicates.push(entry);
            continue;
        }
        if !referenced.contains(&entry.action_id) {
            unreferenced.push(entry);
        }
    }

    Reconciliation {
        sides,
        unreferenced,
        duplicates,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_of(ids: &[&str]) -> Catalog {
        ids.iter()
            .map(|id| (ActionId::new(*id), ActionRecord::new(*id)))
            .collect()
    }

    #[test]
    fn sides_follow_row_order_free_before_paid() {
        let rows = vec![
            RequirementRow::new(1).with_free("F1", None).with_paid("P1", None),
            RequirementRow::new(2).with_paid("P2", None),
        ];
        let catalog = catalog_of(&["F1", "P1", "P2"]);
        let promo = PromoActionRef::from_ids(["F1", "P1", "P2"]);

        let rec = reconcile(&rows, &catalog, &promo);
        let got: Vec<(usize, Side, &str)> = rec
            .sides
            .iter()
            .map(|s| (s.row.row_number, s.side, s.action_id.as_str()))
            .collect();
        assert_eq!(
            got,
            [
                (1, Side::Free, "F1"),
                (1, Side::Paid, "P1"),
                (2, Side::Paid, "P2")
            ]
        );
        assert!(rec.sides.iter().all(|s| s.exists()));
        assert!(rec.unreferenced.is_empty());
    }

    #[test]
    fn resolves_presence_independently() {
        let rows = vec![RequirementRow::new(1).with_free("A", None).with_paid("B", None)];
        let catalog = catalog_of(&["A"]);
        let promo = PromoActionRef::from_ids(["B"]);

        let rec = reconcile(&rows, &catalog, &promo);
        let a = &rec.sides[0];
        assert!(!a.in_promo);
        assert!(a.in_catalog);
        assert!(a.action.is_some());
        let b = &rec.sides[1];
        assert!(b.in_promo);
        assert!(!b.in_catalog);
        assert!(b.action.is_none());
    }

    #[test]
    fn unreferenced_promo_ids_in_promo_order() {
        let rows = vec![RequirementRow::new(1).with_free("A", None)];
        let catalog = catalog_of(&["A"]);
        let promo = PromoActionRef::from_ids(["Z", "A", "Y", "Z"]);

        let rec = reconcile(&rows, &catalog, &promo);
        let orphans: Vec<&str> = rec.unreferenced.iter().map(|p| p.action_id.as_str()).collect();
        assert_eq!(orphans, ["Z", "Y"]);
        assert_eq!(rec.duplicates.len(), 1);
        assert_eq!(rec.duplicates[0].position, 3);
    }

    #[test]
    fn empty_inputs_reconcile_to_nothing() {
        let catalog = Catalog::new();
        let rec = reconcile(&[], &catalog, &[]);
        assert!(rec.sides.is_empty());
        assert!(rec.unreferenced.is_empty());
        assert!(rec.duplicates.is_empty());
    }
}
