use clap::Parser;

use chatree_console::{app, logging, Cli, ConsoleConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    logging::init(&log_path)?;

    let config = ConsoleConfig::load(cli.config.as_deref())?;
    if let Err(e) = app::run(cli, config).await {
        tracing::error!(error = %e, "console failed");
        return Err(e);
    }
    Ok(())
}
