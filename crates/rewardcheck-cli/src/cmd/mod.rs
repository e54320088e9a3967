pub mod check;
pub mod config;

use anyhow::Context;
use rewardcheck_core::config::RunConfig;
use std::path::Path;

/// Load the run configuration, or fall back to defaults when no file was
/// found. Relative paths in a file are taken relative to that file.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let cfg = RunConfig::load(path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    let base = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(cfg),
    };
    tracing::info!(path = %path.display(), "using config file");
    Ok(cfg.rebase(base))
}
