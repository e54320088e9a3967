use crate::config::RunConfig;
use crate::error::{CheckError, Result};
use crate::issue::ValidationIssue;
use crate::model::{
    ActionId, ActionRecord, Catalog, GatingConfig, PromoActionRef, Quantity, RequirementRow,
    Reward, RewardSpec,
};
use crate::types::{CheckKind, RewardType, Side};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

// ---------------------------------------------------------------------------
// JSON value helpers
// ---------------------------------------------------------------------------

/// Text of an id-like JSON value written either as a number or as a string.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a count the way the catalog wrote it. Whole numbers, including
/// `3.0`, are counts; anything else is kept verbatim.
fn quantity_of(value: Option<&Value>) -> Quantity {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Quantity::Missing;
    };
    if let Some(n) = value.as_u64() {
        return Quantity::Count(n);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            Quantity::Count(f as u64)
        }
        _ => Quantity::Raw(value.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Promo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct PromoDefinition {
    /// Award actions in promo-declared order.
    pub actions: Vec<PromoActionRef>,
    /// Gating ids from `parameters`.
    pub gating: GatingConfig,
}

#[derive(Deserialize)]
struct RawPromo {
    awards: Option<Vec<ActionId>>,
    #[serde(default)]
    parameters: RawPromoParameters,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawPromoParameters {
    #[serde(default)]
    season_pass_actions: Vec<ActionId>,
    #[serde(default)]
    battlepass_action: Option<ActionId>,
}

pub fn load_promo(path: &Path) -> Result<PromoDefinition> {
    let data = crate::io::read_input(path).map_err(|e| invalid("promo", path, e))?;
    parse_promo(&data).map_err(|e| invalid("promo", path, e))
}

pub fn parse_promo(data: &str) -> Result<PromoDefinition> {
    let raw: RawPromo = serde_json::from_str(data)?;
    let awards = raw.awards.unwrap_or_else(|| {
        tracing::warn!("promo has no 'awards' list; treating it as empty");
        Vec::new()
    });
    let promo = PromoDefinition {
        actions: PromoActionRef::from_ids(awards),
        gating: GatingConfig::new(
            raw.parameters.battlepass_action,
            raw.parameters.season_pass_actions,
        ),
    };
    tracing::info!(
        awards = promo.actions.len(),
        gating = %promo.gating.describe(),
        "loaded promo"
    );
    Ok(promo)
}

// ---------------------------------------------------------------------------
// Action catalog
// ---------------------------------------------------------------------------

fn need_action_ids(action_id: &ActionId, value: &Value) -> Vec<ActionId> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        Value::Number(n) => vec![n.to_string()],
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(%action_id, value = %other, "unreadable needAction ignored");
            Vec::new()
        }
    };
    raw.iter().filter_map(|s| ActionId::parse_optional(s)).collect()
}

pub fn load_catalog(path: &Path, resource_item_id: u64) -> Result<Catalog> {
    let data = crate::io::read_input(path).map_err(|e| invalid("actions", path, e))?;
    parse_catalog(&data, resource_item_id).map_err(|e| invalid("actions", path, e))
}

/// Parse the action array. Only the fields the checks compare are read;
/// entries and awards of any other shape are passed over, not rejected.
pub fn parse_catalog(data: &str, resource_item_id: u64) -> Result<Catalog> {
    let raw: Vec<Value> = serde_json::from_str(data)?;
    let resource_key = resource_item_id.to_string();

    let mut catalog = Catalog::new();
    for (index, entry) in raw.iter().enumerate() {
        let Some(action_id) = entry
            .get("@id")
            .and_then(scalar_text)
            .map(ActionId::new)
        else {
            tracing::warn!(index, "action entry without '@id' skipped");
            continue;
        };
        if catalog.contains_key(&action_id) {
            return Err(CheckError::DuplicateCatalogAction(action_id.to_string()));
        }

        let need_resources = array_field(entry, "needResources")
            .find(|r| {
                r.get("type").and_then(Value::as_str) == Some("item")
                    && r.get("itemId").and_then(scalar_text).as_deref()
                        == Some(resource_key.as_str())
            })
            .map(|r| quantity_of(r.get("count")));

        let rewards = array_field(entry, "awards")
            .filter_map(|a| convert_award(&action_id, a))
            .collect();

        let need_action = entry
            .get("needAction")
            .map(|v| need_action_ids(&action_id, v))
            .unwrap_or_default();

        let record = ActionRecord {
            action_id: action_id.clone(),
            need_resources,
            rewards,
            need_action: None,
        }
        .with_need_action(need_action);
        catalog.insert(action_id, record);
    }
    tracing::info!(actions = catalog.len(), "loaded action catalog");
    Ok(catalog)
}

/// Elements of an array-valued field; a missing or non-array field is empty.
fn array_field<'a>(entry: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    entry
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn convert_award(action_id: &ActionId, award: &Value) -> Option<Reward> {
    let kind = award.get("type").and_then(Value::as_str).unwrap_or_default();
    let Ok(reward_type) = kind.parse::<RewardType>() else {
        tracing::debug!(%action_id, kind = %kind, "ignoring award of unchecked type");
        return None;
    };
    let id = match reward_type {
        RewardType::Item => award.get("itemId").and_then(scalar_text),
        RewardType::Buff => award.get("id").and_then(scalar_text),
        RewardType::Cash | RewardType::SeasonCurrency => None,
    };
    Some(Reward {
        reward_type,
        id,
        quantity: quantity_of(award.get("count")),
    })
}

// ---------------------------------------------------------------------------
// Requirements table
// ---------------------------------------------------------------------------

/// Parsed requirement rows plus an issue for every row that could not be
/// turned into a `RequirementRow`.
#[derive(Debug, Clone, Default)]
pub struct RequirementsTable {
    pub rows: Vec<RequirementRow>,
    pub issues: Vec<ValidationIssue>,
}

const NEED_RESOURCES_PREFIX: &str = "needResources";

struct Columns {
    free: Option<usize>,
    paid: Option<usize>,
    need_resources: Option<usize>,
    free_reward: [Option<usize>; 3],
    paid_reward: [Option<usize>; 3],
}

impl Columns {
    fn locate(headers: &csv::StringRecord, resource_item_id: u64) -> Result<Self> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let find = |name: &str| names.iter().position(|h| h == name);

        let exact = format!("{NEED_RESOURCES_PREFIX} ({resource_item_id})");
        let need_resources = find(&exact).or_else(|| {
            names
                .iter()
                .position(|h| h.starts_with(NEED_RESOURCES_PREFIX))
        });

        let columns = Columns {
            free: find(Side::Free.column()),
            paid: find(Side::Paid.column()),
            need_resources,
            free_reward: [find("award_1_type"), find("award_1_id"), find("award_1_qty")],
            paid_reward: [find("award_2_type"), find("award_2_id"), find("award_2_qty")],
        };
        if columns.free.is_none() && columns.paid.is_none() {
            return Err(CheckError::MissingColumn(Side::Free.column().to_string()));
        }
        Ok(columns)
    }
}

/// Why a row was rejected.
struct RowError {
    column: String,
    value: String,
    reason: String,
}

impl RowError {
    fn new(column: &str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub fn load_requirements(path: &Path, resource_item_id: u64) -> Result<RequirementsTable> {
    let data = crate::io::read_input(path).map_err(|e| invalid("requirements", path, e))?;
    parse_requirements(&data, resource_item_id).map_err(|e| invalid("requirements", path, e))
}

pub fn parse_requirements(data: &str, resource_item_id: u64) -> Result<RequirementsTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data.as_bytes());
    let columns = Columns::locate(reader.headers()?, resource_item_id)?;

    let mut table = RequirementsTable::default();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // Empty lines never reach us as records; the reader's line number
        // keeps row numbers aligned with the spreadsheet (header is line 1).
        let row_number = record
            .position()
            .map(|p| p.line().saturating_sub(1) as usize)
            .unwrap_or(index + 1);
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        match parse_row(&record, &columns, row_number) {
            Ok(row) => table.rows.push(row),
            Err(e) => {
                tracing::warn!(row_number, column = %e.column, reason = %e.reason, "malformed requirement row");
                table.issues.push(
                    ValidationIssue::error(CheckKind::MalformedRow)
                        .at_row(row_number)
                        .expected(format!("valid {}", e.column))
                        .actual(if e.value.is_empty() { "blank" } else { e.value.as_str() })
                        .details(e.reason),
                );
            }
        }
    }
    tracing::info!(
        rows = table.rows.len(),
        malformed = table.issues.len(),
        "loaded requirements table"
    );
    Ok(table)
}

fn cell<'r>(record: &'r csv::StringRecord, idx: Option<usize>) -> &'r str {
    idx.and_then(|i| record.get(i)).unwrap_or("").trim()
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &Columns,
    row_number: usize,
) -> std::result::Result<RequirementRow, RowError> {
    let free_action_id = ActionId::parse_optional(cell(record, columns.free));
    let paid_action_id = ActionId::parse_optional(cell(record, columns.paid));
    if free_action_id.is_none() && paid_action_id.is_none() {
        return Err(RowError::new(
            "action_free/action_paid",
            "",
            "row must reference a free or a paid action",
        ));
    }

    let raw_need = cell(record, columns.need_resources);
    let need_resources = if raw_need.is_empty() {
        None
    } else {
        Some(raw_need.parse::<u64>().map_err(|_| {
            RowError::new(
                NEED_RESOURCES_PREFIX,
                raw_need,
                "needResources must be a non-negative integer",
            )
        })?)
    };

    let free_reward = match free_action_id {
        Some(_) => parse_reward(record, &columns.free_reward, 1)?,
        None => None,
    };
    let paid_reward = match paid_action_id {
        Some(_) => parse_reward(record, &columns.paid_reward, 2)?,
        None => None,
    };

    Ok(RequirementRow {
        row_number,
        free_action_id,
        paid_action_id,
        need_resources,
        free_reward,
        paid_reward,
    })
}

/// Parse one `award_N_*` triple. A completely blank triple means the row has
/// no reward expectation for that side.
fn parse_reward(
    record: &csv::StringRecord,
    idx: &[Option<usize>; 3],
    n: u8,
) -> std::result::Result<Option<RewardSpec>, RowError> {
    let kind = cell(record, idx[0]);
    let id = cell(record, idx[1]);
    let qty = cell(record, idx[2]);
    if kind.is_empty() && id.is_empty() && qty.is_empty() {
        return Ok(None);
    }

    let type_col = format!("award_{n}_type");
    let id_col = format!("award_{n}_id");
    let qty_col = format!("award_{n}_qty");

    let reward_type = kind.parse::<RewardType>().map_err(|_| {
        RowError::new(
            &type_col,
            kind,
            "reward type must be one of item, buff, cash, season_currency",
        )
    })?;
    if id.is_empty() {
        return Err(RowError::new(&id_col, id, "reward id is required"));
    }
    let quantity = qty
        .parse::<u64>()
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| RowError::new(&qty_col, qty, "reward quantity must be a positive integer"))?;

    Ok(Some(RewardSpec::new(reward_type, id, quantity)))
}

// ---------------------------------------------------------------------------
// All inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Inputs {
    pub promo: PromoDefinition,
    pub catalog: Catalog,
    pub requirements: RequirementsTable,
}

/// Load the three sources named by `cfg`. Any unreadable source is fatal.
pub fn load_inputs(cfg: &RunConfig) -> Result<Inputs> {
    let resource = cfg.checks.resource_item_id;
    Ok(Inputs {
        promo: load_promo(&cfg.promo_path)?,
        catalog: load_catalog(&cfg.actions_path, resource)?,
        requirements: load_requirements(&cfg.requirements_path, resource)?,
    })
}

fn invalid(kind: &'static str, path: &Path, err: CheckError) -> CheckError {
    match err {
        CheckError::Io(_)
        | CheckError::Json(_)
        | CheckError::Csv(_)
        | CheckError::MissingColumn(_) => {
            CheckError::InvalidInput {
                kind,
                path: path.display().to_string(),
                reason: err.to_string(),
            }
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "action_free,action_paid,needResources (17886),award_1_type,award_1_id,award_1_qty,award_2_type,award_2_id,award_2_qty";

    #[test]
    fn promo_awards_and_gating() {
        let promo = parse_promo(
            r#"{"awards": [101, 102, "103"], "parameters": {"seasonPassActions": [900, 901], "battlepassAction": 800}}"#,
        )
        .unwrap();
        let ids: Vec<&str> = promo.actions.iter().map(|p| p.action_id.as_str()).collect();
        assert_eq!(ids, ["101", "102", "103"]);
        assert_eq!(promo.actions[2].position, 2);
        assert_eq!(promo.gating.battlepass_action_id, Some(ActionId::new("800")));
        assert!(promo.gating.accepts(&ActionId::new("901")));
    }

    #[test]
    fn promo_without_awards_is_empty() {
        let promo = parse_promo("{}").unwrap();
        assert!(promo.actions.is_empty());
        assert!(promo.gating.is_empty());
    }

    #[test]
    fn catalog_extracts_threshold_rewards_and_gating() {
        let data = r#"[
            {"@id": 101,
             "needResources": [{"type": "item", "itemId": 1, "count": 7},
                               {"type": "item", "itemId": 17886, "count": 100}],
             "awards": [{"type": "item", "itemId": 55, "count": 3},
                        {"type": "buff", "id": "speed", "count": 1},
                        {"type": "cash", "count": 500},
                        {"type": "chest", "id": 4, "count": 1}]},
            {"@id": "102", "needAction": "900, 901"},
            {"@id": 103, "needAction": [800]},
            {"@id": 104, "needAction": ""},
            {"name": "no id"}
        ]"#;
        let catalog = parse_catalog(data, 17886).unwrap();
        assert_eq!(catalog.len(), 4);

        let a = &catalog[&ActionId::new("101")];
        assert_eq!(a.need_resources, Some(Quantity::Count(100)));
        assert_eq!(
            a.rewards,
            vec![
                Reward::new(RewardType::Item, Some("55"), 3),
                Reward::new(RewardType::Buff, Some("speed"), 1),
                Reward::new(RewardType::Cash, None, 500),
            ]
        );
        assert_eq!(a.need_action, None);

        assert_eq!(
            catalog[&ActionId::new("102")].need_action,
            Some(vec![ActionId::new("900"), ActionId::new("901")])
        );
        assert_eq!(
            catalog[&ActionId::new("103")].need_action,
            Some(vec![ActionId::new("800")])
        );
        assert_eq!(catalog[&ActionId::new("104")].need_action, None);
        assert_eq!(catalog[&ActionId::new("102")].need_resources, None);
    }

    #[test]
    fn catalog_tolerates_odd_award_shapes() {
        let data = r#"[
            {"@id": 101,
             "awards": [{"type": "item", "itemId": 55, "count": 3.0},
                        {"type": "chest", "id": {"k": 1}, "count": "1"},
                        {"type": "buff", "id": "speed", "count": "2"},
                        {"type": "cash"},
                        "not an award"]},
            {"@id": 102,
             "needResources": [{"type": "item", "itemId": "17886", "count": 1.5}],
             "needAction": {"weird": true}},
            42
        ]"#;
        let catalog = parse_catalog(data, 17886).unwrap();
        assert_eq!(catalog.len(), 2);

        let rewards = &catalog[&ActionId::new("101")].rewards;
        assert_eq!(
            rewards,
            &vec![
                Reward::new(RewardType::Item, Some("55"), 3),
                Reward::new(RewardType::Buff, Some("speed"), 0)
                    .with_quantity(Quantity::Raw("\"2\"".to_string())),
                Reward::new(RewardType::Cash, None, 0).with_quantity(Quantity::Missing),
            ]
        );

        let b = &catalog[&ActionId::new("102")];
        assert_eq!(b.need_resources, Some(Quantity::Raw("1.5".to_string())));
        assert_eq!(b.need_action, None);
    }

    #[test]
    fn catalog_duplicate_id_is_fatal() {
        let err = parse_catalog(r#"[{"@id": 1}, {"@id": "1"}]"#, 17886).unwrap_err();
        assert!(matches!(err, CheckError::DuplicateCatalogAction(id) if id == "1"));
    }

    #[test]
    fn requirements_parse_both_sides() {
        let data = format!(
            "{HEADER}\n101,201,100,item,55,3,cash,cash,500\n102,,0,season_currency,sc,10,,,\n"
        );
        let table = parse_requirements(&data, 17886).unwrap();
        assert!(table.issues.is_empty());
        assert_eq!(table.rows.len(), 2);

        let first = &table.rows[0];
        assert_eq!(first.row_number, 1);
        assert_eq!(first.need_resources, Some(100));
        assert_eq!(first.free_reward, Some(RewardSpec::new(RewardType::Item, "55", 3)));
        assert_eq!(first.paid_reward, Some(RewardSpec::new(RewardType::Cash, "cash", 500)));

        let second = &table.rows[1];
        assert_eq!(second.paid_action_id, None);
        assert_eq!(second.need_resources, Some(0));
    }

    #[test]
    fn blank_reward_triple_means_no_expectation() {
        let data = format!("{HEADER}\n101,,,,,,,,\n");
        let table = parse_requirements(&data, 17886).unwrap();
        assert_eq!(table.rows[0].free_reward, None);
        assert_eq!(table.rows[0].need_resources, None);
    }

    #[test]
    fn malformed_rows_become_issues() {
        let data = format!(
            "{HEADER}\n,,100,item,1,1,,,\n101,,abc,,,,,,\n102,,,gem,1,1,,,\n103,,,item,1,0,,,\n104,,,item,,2,,,\n105,,,item,9,2,,,\n"
        );
        let table = parse_requirements(&data, 17886).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].row_number, 6);

        let rows: Vec<Option<usize>> = table.issues.iter().map(|i| i.row_number).collect();
        assert_eq!(rows, [Some(1), Some(2), Some(3), Some(4), Some(5)]);
        assert!(table
            .issues
            .iter()
            .all(|i| i.check_name == CheckKind::MalformedRow && i.is_error()));
        assert_eq!(table.issues[1].actual, "abc");
        assert_eq!(table.issues[3].expected, "valid award_1_qty");
    }

    #[test]
    fn blank_lines_are_skipped_but_counted() {
        let data = format!("{HEADER}\n,,,,,,,,\n101,,,,,,,,\n");
        let table = parse_requirements(&data, 17886).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].row_number, 2);
    }

    #[test]
    fn empty_lines_keep_row_numbers_aligned() {
        let data = format!("{HEADER}\n101,,,item,1,1,,,\n\n102,,,item,1,0,,,\n\n\n103,,,,,,,,\n");
        let table = parse_requirements(&data, 17886).unwrap();

        let issues: Vec<Option<usize>> = table.issues.iter().map(|i| i.row_number).collect();
        assert_eq!(issues, [Some(3)]);
        let rows: Vec<usize> = table.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(rows, [1, 6]);
    }

    #[test]
    fn plain_need_resources_header_accepted() {
        let data = "action_free,needResources\n101,40\n";
        let table = parse_requirements(data, 17886).unwrap();
        assert_eq!(table.rows[0].need_resources, Some(40));
    }

    #[test]
    fn table_without_action_columns_is_fatal() {
        let err = parse_requirements("foo,bar\n1,2\n", 17886).unwrap_err();
        assert!(matches!(err, CheckError::MissingColumn(_)));
    }

    #[test]
    fn load_inputs_reads_all_three_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("promo.json"), r#"{"awards": [101]}"#).unwrap();
        std::fs::write(dir.path().join("actions.json"), r#"[{"@id": 101}]"#).unwrap();
        std::fs::write(dir.path().join("requirements.csv"), format!("{HEADER}\n101,,,,,,,,\n")).unwrap();

        let cfg = RunConfig::default().rebase(dir.path());
        let inputs = load_inputs(&cfg).unwrap();
        assert_eq!(inputs.promo.actions.len(), 1);
        assert_eq!(inputs.catalog.len(), 1);
        assert_eq!(inputs.requirements.rows.len(), 1);
    }

    #[test]
    fn unparsable_json_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("promo.json");
        std::fs::write(&path, "not json").unwrap();
        let err = load_promo(&path).unwrap_err();
        assert!(matches!(err, CheckError::InvalidInput { kind: "promo", .. }));
        assert!(err.to_string().contains("promo.json"));
    }

    #[test]
    fn unreadable_text_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("requirements.csv");
        // "Награда" in cp1251
        std::fs::write(&path, [0xCD, 0xE0, 0xE3, 0xF0, 0xE0, 0xE4, 0xE0, b'\n']).unwrap();
        let err = load_requirements(&path, 17886).unwrap_err();
        assert!(matches!(err, CheckError::InvalidInput { kind: "requirements", .. }));
        assert!(err.to_string().contains("requirements.csv"));
    }
}
