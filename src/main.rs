use std::process::ExitCode;

use clap::Parser;
use kyute::adapter::inbound::cli::command::{CheckCommand, Cli, ColorChoice, Commands};
use kyute::adapter::inbound::cli::output::{self, OutputConfig};
use kyute::adapter::inbound::cli::{check, history, run};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    match dispatch(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run(args) => run::execute(&args).await?,
        Commands::History(args) => history::execute(&args)?,
        Commands::Check(CheckCommand::Config(args)) => check::execute_config(&args.config)?,
        Commands::Check(CheckCommand::Health(args)) => check::execute_health(&args.config).await?,
    }
    Ok(())
}
