mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{check::CheckArgs, config::ConfigSubcommand};
use std::path::PathBuf;

/// Exit status when validation ran to completion and found errors.
const EXIT_VALIDATION_FAILED: i32 = 1;
/// Exit status when a run could not complete (unreadable input, bad config).
const EXIT_FATAL: i32 = 2;

#[derive(Parser)]
#[command(
    name = "rewardcheck",
    about = "Cross-check a season pass promo, its requirements table and the action catalog",
    version,
    propagate_version = true
)]
struct Cli {
    /// Run configuration file (default: rewardcheck.yaml in this or a parent directory)
    #[arg(long, global = true, env = "REWARDCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the promo against the requirements table and the catalog
    Check(CheckArgs),

    /// Inspect the effective run configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Check(args) if args.verbose => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = root::resolve_config(cli.config.as_deref());

    let result = match cli.command {
        Commands::Check(args) => cmd::check::run(config_path.as_deref(), args, cli.json),
        Commands::Config { subcommand } => {
            cmd::config::run(config_path.as_deref(), subcommand, cli.json).map(|()| true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_VALIDATION_FAILED),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(EXIT_FATAL);
        }
    }
}
