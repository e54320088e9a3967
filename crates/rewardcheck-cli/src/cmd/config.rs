use crate::output::print_json;
use crate::root::CONFIG_FILE;
use anyhow::Context;
use clap::Subcommand;
use rewardcheck_core::config::RunConfig;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration (file values over defaults)
    Show,

    /// Write a config file with every default spelled out
    Init {
        /// Destination (default: ./rewardcheck.yaml)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(config: Option<&Path>, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(config, json),
        ConfigSubcommand::Init { path, force } => init(path, force, json),
    }
}

fn show(config: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let cfg = super::load_config(config)?;
    if json {
        let value = serde_json::json!({
            "source": config.map(|p| p.display().to_string()),
            "config": cfg,
        });
        return print_json(&value);
    }

    match config {
        Some(p) => println!("# source: {}", p.display()),
        None => println!("# source: built-in defaults"),
    }
    print!("{}", cfg.to_yaml().context("failed to render config")?);
    Ok(())
}

fn init(path: Option<PathBuf>, force: bool, json: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to replace it)", path.display());
    }
    RunConfig::default()
        .save(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        print_json(&serde_json::json!({ "written": path.display().to_string() }))?;
    } else {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
