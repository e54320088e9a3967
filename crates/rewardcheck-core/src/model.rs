use crate::types::{RewardType, Side};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// ActionId
// ---------------------------------------------------------------------------

/// Action identifier, compared by exact string value.
///
/// Numeric ids from JSON and textual ids from the requirements table end up
/// in the same representation, so `123` and `"123"` are the same action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl<'de> Deserialize<'de> for ActionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => ActionId::new(s),
            Raw::Unsigned(n) => ActionId(n.to_string()),
            Raw::Signed(n) => ActionId(n.to_string()),
        })
    }
}

impl ActionId {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.len() == raw.len() {
            Self(raw)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Parse a possibly blank cell; blank means "not present".
    pub fn parse_optional(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        ActionId::new(s)
    }
}

impl From<u64> for ActionId {
    fn from(n: u64) -> Self {
        ActionId(n.to_string())
    }
}

// ---------------------------------------------------------------------------
// RewardSpec (expected reward, from the requirements table)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSpec {
    pub reward_type: RewardType,
    pub id: String,
    pub quantity: u64,
}

impl RewardSpec {
    pub fn new(reward_type: RewardType, id: impl Into<String>, quantity: u64) -> Self {
        Self {
            reward_type,
            id: id.into(),
            quantity,
        }
    }
}

impl fmt::Display for RewardSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} x{}", self.reward_type, self.id, self.quantity)
    }
}

// ---------------------------------------------------------------------------
// RequirementRow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementRow {
    /// 1-based position in the table, first data row is 1.
    pub row_number: usize,
    pub free_action_id: Option<ActionId>,
    pub paid_action_id: Option<ActionId>,
    /// `None` when the table leaves the threshold blank.
    pub need_resources: Option<u64>,
    pub free_reward: Option<RewardSpec>,
    pub paid_reward: Option<RewardSpec>,
}

impl RequirementRow {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            free_action_id: None,
            paid_action_id: None,
            need_resources: None,
            free_reward: None,
            paid_reward: None,
        }
    }

    pub fn with_free(mut self, id: impl Into<ActionId>, reward: Option<RewardSpec>) -> Self {
        self.free_action_id = Some(id.into());
        self.free_reward = reward;
        self
    }

    pub fn with_paid(mut self, id: impl Into<ActionId>, reward: Option<RewardSpec>) -> Self {
        self.paid_action_id = Some(id.into());
        self.paid_reward = reward;
        self
    }

    pub fn with_need_resources(mut self, need: u64) -> Self {
        self.need_resources = Some(need);
        self
    }

    pub fn action_id(&self, side: Side) -> Option<&ActionId> {
        match side {
            Side::Free => self.free_action_id.as_ref(),
            Side::Paid => self.paid_action_id.as_ref(),
        }
    }

    pub fn reward(&self, side: Side) -> Option<&RewardSpec> {
        match side {
            Side::Free => self.free_reward.as_ref(),
            Side::Paid => self.paid_reward.as_ref(),
        }
    }

    /// Ids referenced by this row, free before paid.
    pub fn action_ids(&self) -> impl Iterator<Item = &ActionId> {
        self.free_action_id.iter().chain(self.paid_action_id.iter())
    }
}

// ---------------------------------------------------------------------------
// Quantity
// ---------------------------------------------------------------------------

/// A count as the action catalog states it. Anything that is not a whole,
/// non-negative number is kept verbatim so a failed comparison can show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Count(u64),
    Raw(String),
    Missing,
}

impl Quantity {
    pub fn count(&self) -> Option<u64> {
        match self {
            Quantity::Count(n) => Some(*n),
            Quantity::Raw(_) | Quantity::Missing => None,
        }
    }
}

impl From<u64> for Quantity {
    fn from(n: u64) -> Self {
        Quantity::Count(n)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Count(n) => write!(f, "{n}"),
            Quantity::Raw(raw) => f.write_str(raw),
            Quantity::Missing => f.write_str("absent"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reward (granted reward, from the action catalog)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub reward_type: RewardType,
    /// `itemId` for items, `id` for buffs, absent for currencies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub quantity: Quantity,
}

impl Reward {
    pub fn new(reward_type: RewardType, id: Option<&str>, quantity: u64) -> Self {
        Self {
            reward_type,
            id: id.map(str::to_string),
            quantity: Quantity::Count(quantity),
        }
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    /// Whether this granted reward is the one `expected` describes,
    /// ignoring quantity.
    pub fn matches(&self, expected: &RewardSpec) -> bool {
        if self.reward_type != expected.reward_type {
            return false;
        }
        match expected.reward_type {
            RewardType::Item | RewardType::Buff => {
                self.id.as_deref().map(str::trim) == Some(expected.id.trim())
            }
            RewardType::Cash => expected.id.trim() == "cash",
            RewardType::SeasonCurrency => true,
        }
    }
}

// ---------------------------------------------------------------------------
// ActionRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action_id: ActionId,
    /// Resource threshold configured on the action, if any.
    pub need_resources: Option<Quantity>,
    pub rewards: Vec<Reward>,
    /// Gating references; never `Some` with an empty list.
    pub need_action: Option<Vec<ActionId>>,
}

impl ActionRecord {
    pub fn new(action_id: impl Into<ActionId>) -> Self {
        Self {
            action_id: action_id.into(),
            need_resources: None,
            rewards: Vec::new(),
            need_action: None,
        }
    }

    pub fn with_need_resources(mut self, need: u64) -> Self {
        self.need_resources = Some(Quantity::Count(need));
        self
    }

    pub fn with_reward(mut self, reward: Reward) -> Self {
        self.rewards.push(reward);
        self
    }

    pub fn with_need_action(mut self, ids: Vec<ActionId>) -> Self {
        self.need_action = if ids.is_empty() { None } else { Some(ids) };
        self
    }

    /// First granted reward matching `expected` by type and id.
    pub fn find_reward(&self, expected: &RewardSpec) -> Option<&Reward> {
        self.rewards.iter().find(|r| r.matches(expected))
    }
}

/// The action catalog, keyed by action id.
pub type Catalog = BTreeMap<ActionId, ActionRecord>;

// ---------------------------------------------------------------------------
// PromoActionRef
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoActionRef {
    pub action_id: ActionId,
    /// 0-based position in the promo's award list.
    pub position: usize,
}

impl PromoActionRef {
    /// Build refs from ids in promo-declared order.
    pub fn from_ids<I, T>(ids: I) -> Vec<PromoActionRef>
    where
        I: IntoIterator<Item = T>,
        T: Into<ActionId>,
    {
        ids.into_iter()
            .enumerate()
            .map(|(position, id)| PromoActionRef {
                action_id: id.into(),
                position,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// GatingConfig
// ---------------------------------------------------------------------------

/// Action ids a paid action may reference through `needAction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatingConfig {
    #[serde(default)]
    pub battlepass_action_id: Option<ActionId>,
    #[serde(default)]
    pub season_pass_action_ids: BTreeSet<ActionId>,
}

impl GatingConfig {
    pub fn new(
        battlepass_action_id: Option<ActionId>,
        season_pass_action_ids: impl IntoIterator<Item = ActionId>,
    ) -> Self {
        Self {
            battlepass_action_id,
            season_pass_action_ids: season_pass_action_ids.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.battlepass_action_id.is_none() && self.season_pass_action_ids.is_empty()
    }

    pub fn accepts(&self, id: &ActionId) -> bool {
        self.battlepass_action_id.as_ref() == Some(id) || self.season_pass_action_ids.contains(id)
    }

    /// Human-readable list of accepted ids, battlepass first.
    pub fn describe(&self) -> String {
        let ids: Vec<&str> = self
            .battlepass_action_id
            .iter()
            .chain(self.season_pass_action_ids.iter())
            .map(ActionId::as_str)
            .collect();
        if ids.is_empty() {
            "(none configured)".to_string()
        } else {
            ids.join(",")
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
