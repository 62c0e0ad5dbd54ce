//! Handler for the `run` command.

use tokio::sync::watch;
use tracing::info;

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::output;
use crate::application::SlotOutcome;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let config = load_config(args)?;

    let logging = if output::is_quiet() {
        config.logging.with_level("warn")
    } else {
        config.logging.clone()
    };
    logging.init();

    print_startup_config(&config);

    let components = bootstrap::build(&config)?;
    let scheduler = components.scheduler;
    let (tx, rx) = watch::channel(false);

    if args.once {
        output::section("Cycle");
        for (asset, outcome) in scheduler.run_once(&config.assets, &rx).await {
            match outcome {
                SlotOutcome::Decided(snapshot) => output::cycle(&snapshot),
                SlotOutcome::Skipped => output::warning(&format!("{asset}: previous cycle still running")),
                SlotOutcome::Cancelled => output::warning(&format!("{asset}: cancelled")),
            }
        }
        return Ok(());
    }

    let handle = tokio::spawn(scheduler.run(config.assets.clone(), rx));

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    // Receivers may already be gone if the scheduler exited on its own.
    let _ = tx.send(true);

    if let Err(e) = handle.await {
        output::error(&format!("scheduler task failed: {e}"));
    }
    output::success("Stopped");
    Ok(())
}

/// Load the config file and apply command-line overrides.
fn load_config(args: &RunArgs) -> Result<Config> {
    let mut config = Config::load(&args.config)?;

    if args.dry_run {
        config.dry_run = true;
    }
    if let Some(assets) = &args.assets {
        config.assets.clone_from(assets);
    }
    if let Some(interval) = args.interval {
        config.interval_secs = interval;
    }
    if let Some(database) = &args.database {
        config.database = database.to_string_lossy().to_string();
    }

    config.normalize();
    config.validate()?;
    Ok(config)
}

fn print_startup_config(config: &Config) {
    let mode = if config.dry_run {
        output::positive("dry run (paper vault)")
    } else {
        output::negative("live")
    };

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Mode", mode);
    output::field("Assets", config.assets.join(", "));
    output::field("Interval", format!("{}s", config.interval_secs));
    output::field(
        "Threshold",
        format!(
            "trigger {} bps, composite {}",
            config.engine.trigger_bps, config.engine.hedge_threshold
        ),
    );
    output::field("Notional", config.hedge.notional);
    output::field("Assessor", format!("{:?}", config.llm.provider).to_lowercase());
    output::field("Database", &config.database);
}
