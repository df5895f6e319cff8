//! fakedm - fake package-management server
//!
//! Starts the packages API on the configured address, prints the base URL
//! as the first line on stdout, and serves until killed.

mod cli;
mod error;
mod logging;

use crate::cli::Cli;
use crate::error::CliError;
use clap::Parser;
use fakedm_config::Config;
use fakedm_server::FakeServer;
use std::io::Write;
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_format, cli.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting fakedm v{}", env!("CARGO_PKG_VERSION"));

    // Precedence: file (or defaults), then environment, then CLI flags
    let mut config = Config::load_or_default(cli.config.as_ref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli);

    let server = FakeServer::bind(&config).await?;
    let url = server.url();

    {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{url}")?;
        stdout.flush()?;
    }
    info!(url = %url, "serving packages API");

    tokio::select! {
        () = server.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("interrupted, shutting down");
        }
    }

    Ok(())
}

fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if let Some(bind) = &cli.bind {
        config.server.bind.clone_from(bind);
    }
    if cli.ignore_requests {
        config.server.ignore_requests = true;
    }
    if let Some(step) = cli.progress_step {
        config.server.progress_step = step;
    }
}
