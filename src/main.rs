use clap::Parser;

mod cli;
mod config;
mod error;
mod export;
mod logging;
mod persist;
mod retry;

use cli::Cli;
use config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    let _guard = logging::init_logging(&config.logging, cli.verbose)?;
    tracing::debug!(command = ?cli.command, "starting msgscope");

    cli::dispatch(cli, config).await
}
