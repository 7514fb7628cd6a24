mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use healthcheck::{Config, Orchestrator, Scheduler};
use tracing::{debug, info};

use cli::{Cli, Mode};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Invalid arguments exit here, before any configuration or network access
    let cli = Cli::parse_args();
    logger::init();

    let config = Arc::new(Config::from_env().context("Failed to load configuration")?);
    debug!("{config}");

    let orchestrator =
        Arc::new(Orchestrator::from_config(&config).context("Failed to build check pipeline")?);

    match cli.mode {
        Mode::Cli => run_cli(&cli, config, orchestrator).await,
        Mode::Web => run_web(&cli, config, orchestrator).await,
    }
}

async fn run_cli(cli: &Cli, config: Arc<Config>, orchestrator: Arc<Orchestrator>) -> Result<()> {
    let Some(seconds) = cli.interval else {
        orchestrator.run_checks(&config.endpoints).await;
        return Ok(());
    };

    info!(interval_secs = seconds, "running checks until interrupted");
    let handle =
        Scheduler::new(orchestrator, config.endpoints.clone(), Duration::from_secs(seconds)).spawn();

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    info!("Shutdown signal received");
    handle.abort();

    Ok(())
}

#[cfg(feature = "web")]
async fn run_web(cli: &Cli, config: Arc<Config>, orchestrator: Arc<Orchestrator>) -> Result<()> {
    use healthcheck_server::{AppState, serve, socket_addr};

    let addr = socket_addr(&cli.bind, cli.port).context("Invalid listen address")?;
    serve(AppState::new(config, orchestrator), addr).await.context("Web server failed")?;

    Ok(())
}

#[cfg(not(feature = "web"))]
async fn run_web(
    _cli: &Cli,
    _config: Arc<Config>,
    _orchestrator: Arc<Orchestrator>,
) -> Result<()> {
    // Rejected by `Cli::parse_args`
    anyhow::bail!("web mode is not available in this build")
}
