use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which half of a requirement row an action id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Free,
    Paid,
}

impl Side {
    pub fn all() -> &'static [Side] {
        &[Side::Free, Side::Paid]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Free => "free",
            Side::Paid => "paid",
        }
    }

    /// Column name the requirements table uses for this side's action id.
    pub fn column(self) -> &'static str {
        match self {
            Side::Free => "action_free",
            Side::Paid => "action_paid",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RewardType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    Item,
    Buff,
    Cash,
    SeasonCurrency,
}

impl RewardType {
    pub fn as_str(self) -> &'static str {
        match self {
            RewardType::Item => "item",
            RewardType::Buff => "buff",
            RewardType::Cash => "cash",
            RewardType::SeasonCurrency => "season_currency",
        }
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RewardType {
    type Err = crate::error::CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "item" => Ok(RewardType::Item),
            "buff" => Ok(RewardType::Buff),
            "cash" => Ok(RewardType::Cash),
            "season_currency" => Ok(RewardType::SeasonCurrency),
            _ => Err(crate::error::CheckError::InvalidRewardType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }

    /// Value of the report's result column.
    pub fn report_label(self) -> &'static str {
        match self {
            Severity::Error => "Ошибка",
            Severity::Warning => "Предупреждение",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IssueCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    InputError,
    ExistenceError,
    ContentError,
    GatingError,
}

impl IssueCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCategory::InputError => "input",
            IssueCategory::ExistenceError => "existence",
            IssueCategory::ContentError => "content",
            IssueCategory::GatingError => "gating",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CheckKind
// ---------------------------------------------------------------------------

/// Every check the validator can fail, in phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    MalformedRow,
    MissingInPromo,
    MissingInCatalog,
    OrphanInPromo,
    DuplicateInPromo,
    NeedResourcesMismatch,
    RewardMissing,
    RewardQuantityMismatch,
    PaidGatingMissing,
    PaidGatingInvalid,
}

impl CheckKind {
    pub fn all() -> &'static [CheckKind] {
        &[
            CheckKind::MalformedRow,
            CheckKind::MissingInPromo,
            CheckKind::MissingInCatalog,
            CheckKind::OrphanInPromo,
            CheckKind::DuplicateInPromo,
            CheckKind::NeedResourcesMismatch,
            CheckKind::RewardMissing,
            CheckKind::RewardQuantityMismatch,
            CheckKind::PaidGatingMissing,
            CheckKind::PaidGatingInvalid,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckKind::MalformedRow => "malformed_row",
            CheckKind::MissingInPromo => "missing_in_promo",
            CheckKind::MissingInCatalog => "missing_in_catalog",
            CheckKind::OrphanInPromo => "orphan_in_promo",
            CheckKind::DuplicateInPromo => "duplicate_in_promo",
            CheckKind::NeedResourcesMismatch => "need_resources_mismatch",
            CheckKind::RewardMissing => "reward_missing",
            CheckKind::RewardQuantityMismatch => "reward_quantity_mismatch",
            CheckKind::PaidGatingMissing => "paid_gating_missing",
            CheckKind::PaidGatingInvalid => "paid_gating_invalid",
        }
    }

    pub fn category(self) -> IssueCategory {
        match self {
            CheckKind::MalformedRow => IssueCategory::InputError,
            CheckKind::MissingInPromo
            | CheckKind::MissingInCatalog
            | CheckKind::OrphanInPromo
            | CheckKind::DuplicateInPromo => IssueCategory::ExistenceError,
            CheckKind::NeedResourcesMismatch
            | CheckKind::RewardMissing
            | CheckKind::RewardQuantityMismatch => IssueCategory::ContentError,
            CheckKind::PaidGatingMissing | CheckKind::PaidGatingInvalid => {
                IssueCategory::GatingError
            }
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CheckKind {
    type Err = crate::error::CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| crate::error::CheckError::InvalidCheck(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
