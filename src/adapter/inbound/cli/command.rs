//! Command-line interface definitions.
//!
//! Defines the CLI structure for kyute using `clap`: a long-running
//! scheduler, a single evaluation pass, audit history, and diagnostics.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG: &str = "kyute.toml";

/// Yield-spread hedging decision engine
#[derive(Parser, Debug)]
#[command(name = "kyute")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate configured assets on a fixed interval until interrupted
    Run(RunArgs),

    /// Show recorded hedge attempts
    History(HistoryArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `kyute check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file syntax and semantics.
    Config(ConfigPathArg),
    /// Probe venues, the vault, and the audit store.
    Health(ConfigPathArg),
}

/// Config file argument shared by the `check` subcommands.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Arguments of `kyute run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Evaluate every asset once and exit
    #[arg(long)]
    pub once: bool,

    /// Simulate the vault regardless of configuration
    #[arg(long)]
    pub dry_run: bool,

    /// Override the configured assets (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub assets: Option<Vec<String>>,

    /// Override the scheduler interval in seconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Override the audit database path
    #[arg(long)]
    pub database: Option<PathBuf>,
}

/// Arguments of `kyute history`.
#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Read this database instead of the configured one
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Maximum number of events to show
    #[arg(short, long, default_value_t = 20)]
    pub limit: i64,

    /// Only show events for this asset
    #[arg(long)]
    pub asset: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_parses_overrides() {
        let cli = Cli::parse_from([
            "kyute", "run", "--once", "--dry-run", "--assets", "eth,btc", "--interval", "5",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.once);
        assert!(args.dry_run);
        assert_eq!(args.assets, Some(vec!["eth".to_string(), "btc".to_string()]));
        assert_eq!(args.interval, Some(5));
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG));
    }

    #[test]
    fn history_defaults_to_twenty_rows() {
        let cli = Cli::parse_from(["kyute", "--json", "history"]);
        assert!(cli.json);
        let Commands::History(args) = cli.command else {
            panic!("expected history");
        };
        assert_eq!(args.limit, 20);
        assert!(args.asset.is_none());
    }
}
