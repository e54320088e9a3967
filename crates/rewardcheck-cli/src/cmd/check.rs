use crate::output::{print_header, print_json, print_table};
use anyhow::Context;
use clap::Args;
use rewardcheck_core::config::RunConfig;
use rewardcheck_core::load::load_inputs;
use rewardcheck_core::model::ActionId;
use rewardcheck_core::report::{write_csv_report, write_log, JsonReport};
use rewardcheck_core::types::IssueCategory;
use rewardcheck_core::{ValidationOutcome, Validator};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Promo definition (JSON)
    #[arg(long)]
    pub promo: Option<PathBuf>,

    /// Requirements table (CSV)
    #[arg(long)]
    pub requirements: Option<PathBuf>,

    /// Action catalog (JSON)
    #[arg(long)]
    pub actions: Option<PathBuf>,

    /// Where to write the CSV report
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Where to write the detailed run log
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Show progress and the full issue table
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Battle pass purchase action id (overrides the promo)
    #[arg(long, value_name = "ID")]
    pub battlepass_action: Option<String>,

    /// Season pass purchase action id, repeatable (overrides the promo)
    #[arg(long = "season-pass-action", value_name = "ID")]
    pub season_pass_actions: Vec<String>,
}

impl CheckArgs {
    /// Command-line values win over the config file.
    fn apply(self, mut cfg: RunConfig) -> RunConfig {
        if let Some(p) = self.promo {
            cfg.promo_path = p;
        }
        if let Some(p) = self.requirements {
            cfg.requirements_path = p;
        }
        if let Some(p) = self.actions {
            cfg.actions_path = p;
        }
        if let Some(p) = self.report {
            cfg.report_path = p;
        }
        if let Some(p) = self.log {
            cfg.log_path = p;
        }
        cfg.verbose |= self.verbose;
        if let Some(id) = self.battlepass_action.as_deref().and_then(ActionId::parse_optional) {
            cfg.checks.battlepass_action_id = Some(id);
        }
        let season: Vec<ActionId> = self
            .season_pass_actions
            .iter()
            .filter_map(|s| ActionId::parse_optional(s))
            .collect();
        if !season.is_empty() {
            cfg.checks.season_pass_action_ids = season.into_iter().collect();
        }
        cfg
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Returns `Ok(true)` when no error-severity issue was found.
pub fn run(config: Option<&Path>, args: CheckArgs, json: bool) -> anyhow::Result<bool> {
    let cfg = args.apply(super::load_config(config)?);

    let inputs = load_inputs(&cfg).context("failed to load inputs")?;
    tracing::info!(
        rows = inputs.requirements.rows.len(),
        actions = inputs.catalog.len(),
        promo = inputs.promo.actions.len(),
        "inputs loaded"
    );

    let gating = cfg.checks.gating(&inputs.promo.gating);
    if gating.is_empty() {
        tracing::warn!("no battle pass or season pass action configured; paid gating cannot pass");
    }

    let outcome = Validator::new(
        &inputs.requirements.rows,
        &inputs.catalog,
        &inputs.promo.actions,
        &gating,
    )
    .with_input_issues(inputs.requirements.issues)
    .validate();

    write_csv_report(&cfg.report_path, &outcome.issues)
        .with_context(|| format!("failed to write report {}", cfg.report_path.display()))?;
    write_log(&cfg.log_path, &cfg, &outcome)
        .with_context(|| format!("failed to write log {}", cfg.log_path.display()))?;

    if json {
        print_json(&JsonReport::from(&outcome))?;
    } else {
        print_outcome(&cfg, &outcome);
    }

    Ok(!outcome.has_errors())
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

fn print_outcome(cfg: &RunConfig, outcome: &ValidationOutcome) {
    print_header("SEASON PASS REWARD VALIDATION");
    if cfg.verbose {
        println!("promo:        {}", cfg.promo_path.display());
        println!("requirements: {}", cfg.requirements_path.display());
        println!("actions:      {}", cfg.actions_path.display());
    }

    if !outcome.issues.is_empty() {
        print_header("ISSUES");
        if cfg.verbose {
            let rows = outcome
                .issues
                .iter()
                .map(|i| {
                    vec![
                        i.subject(),
                        i.check_name.to_string(),
                        i.side.map(|s| s.to_string()).unwrap_or_default(),
                        i.severity.to_string(),
                        i.expected.clone(),
                        i.actual.clone(),
                        i.details.clone(),
                    ]
                })
                .collect();
            print_table(
                &["ACTION", "CHECK", "SIDE", "SEVERITY", "EXPECTED", "ACTUAL", "DETAILS"],
                rows,
            );
        } else {
            for (n, i) in outcome.issues.iter().enumerate() {
                println!("{:>3}. [{}] {}: {}", n + 1, i.severity, i.subject(), i.check_name);
            }
        }
    }

    let stats = outcome.stats;
    print_header("SUMMARY");
    println!("checks:   {}", stats.total);
    println!("passed:   {}", stats.passed);
    println!("failed:   {}", stats.failed);
    println!("warnings: {}", stats.warnings);
    let mut by_category: BTreeMap<IssueCategory, usize> = BTreeMap::new();
    for issue in &outcome.issues {
        *by_category.entry(issue.check_name.category()).or_default() += 1;
    }
    for (category, n) in by_category {
        println!("  {category}: {n}");
    }
    println!("report:   {}", cfg.report_path.display());
    println!("log:      {}", cfg.log_path.display());
    println!();
    if outcome.has_errors() {
        println!("FAILED: {} issue(s) found", outcome.issues.len());
    } else {
        println!("PASSED");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = CheckArgs {
            promo: Some(PathBuf::from("s12/promo.json")),
            verbose: true,
            battlepass_action: Some(" 800 ".to_string()),
            season_pass_actions: vec!["900".to_string(), " ".to_string()],
            ..CheckArgs::default()
        };
        let cfg = args.apply(RunConfig::default());
        assert_eq!(cfg.promo_path, PathBuf::from("s12/promo.json"));
        assert_eq!(cfg.actions_path, PathBuf::from("actions.json"));
        assert!(cfg.verbose);
        assert_eq!(cfg.checks.battlepass_action_id, Some(ActionId::new("800")));
        assert_eq!(cfg.checks.season_pass_action_ids.len(), 1);
    }

    #[test]
    fn blank_flags_keep_config_values() {
        let mut base = RunConfig::default();
        base.checks.battlepass_action_id = Some(ActionId::new("1"));
        let args = CheckArgs {
            battlepass_action: Some("".to_string()),
            ..CheckArgs::default()
        };
        let cfg = args.apply(base);
        assert_eq!(cfg.checks.battlepass_action_id, Some(ActionId::new("1")));
    }
}
