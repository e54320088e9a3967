use crate::error::{CheckError, Result};
use crate::model::{ActionId, GatingConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_PROMO: &str = "promo.json";
pub const DEFAULT_REQUIREMENTS: &str = "requirements.csv";
pub const DEFAULT_ACTIONS: &str = "actions.json";
pub const DEFAULT_REPORT: &str = "validation_report.csv";
pub const DEFAULT_LOG: &str = "validation_detailed.log";

/// Item id of the seasonal resource whose count unlocks a reward line.
pub const DEFAULT_RESOURCE_ITEM_ID: u64 = 17886;

fn default_promo() -> PathBuf {
    PathBuf::from(DEFAULT_PROMO)
}

fn default_requirements() -> PathBuf {
    PathBuf::from(DEFAULT_REQUIREMENTS)
}

fn default_actions() -> PathBuf {
    PathBuf::from(DEFAULT_ACTIONS)
}

fn default_report() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT)
}

fn default_log() -> PathBuf {
    PathBuf::from(DEFAULT_LOG)
}

fn default_resource_item_id() -> u64 {
    DEFAULT_RESOURCE_ITEM_ID
}

// ---------------------------------------------------------------------------
// CheckConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    #[serde(default = "default_resource_item_id")]
    pub resource_item_id: u64,
    /// Overrides the promo's `parameters.battlepassAction`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battlepass_action_id: Option<ActionId>,
    /// Overrides the promo's `parameters.seasonPassActions` when non-empty.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub season_pass_action_ids: BTreeSet<ActionId>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            resource_item_id: default_resource_item_id(),
            battlepass_action_id: None,
            season_pass_action_ids: BTreeSet::new(),
        }
    }
}

impl CheckConfig {
    /// Gating ids to validate against: configured values win, the promo's
    /// parameters fill whatever is left unset.
    pub fn gating(&self, from_promo: &GatingConfig) -> GatingConfig {
        GatingConfig {
            battlepass_action_id: self
                .battlepass_action_id
                .clone()
                .or_else(|| from_promo.battlepass_action_id.clone()),
            season_pass_action_ids: if self.season_pass_action_ids.is_empty() {
                from_promo.season_pass_action_ids.clone()
            } else {
                self.season_pass_action_ids.clone()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// RunConfig
// ---------------------------------------------------------------------------

/// Everything one validation run needs to locate its inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_promo")]
    pub promo_path: PathBuf,
    #[serde(default = "default_requirements")]
    pub requirements_path: PathBuf,
    #[serde(default = "default_actions")]
    pub actions_path: PathBuf,
    #[serde(default = "default_report")]
    pub report_path: PathBuf,
    #[serde(default = "default_log")]
    pub log_path: PathBuf,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub checks: CheckConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            promo_path: default_promo(),
            requirements_path: default_requirements(),
            actions_path: default_actions(),
            report_path: default_report(),
            log_path: default_log(),
            verbose: false,
            checks: CheckConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CheckError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: RunConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        crate::io::atomic_write(path, self.to_yaml()?.as_bytes())
    }

    /// Resolve relative input/output paths against `base` (the directory of
    /// the config file).
    pub fn rebase(mut self, base: &Path) -> Self {
        for p in [
            &mut self.promo_path,
            &mut self.requirements_path,
            &mut self.actions_path,
            &mut self.report_path,
            &mut self.log_path,
        ] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
