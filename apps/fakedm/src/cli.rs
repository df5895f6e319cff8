//! Command line interface definition

use clap::Parser;
use fakedm_types::LogFormat;
use std::path::PathBuf;

/// fakedm - fake package-management server for store scope tests
#[derive(Parser, Debug)]
#[command(name = "fakedm")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fake package-management server for store scope tests")]
#[command(long_about = None)]
pub struct Cli {
    /// Address to listen on (port 0 picks a free port)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Accept install/uninstall requests without ever acting on them
    #[arg(long)]
    pub ignore_requests: bool,

    /// Progress added per poll of an installing or uninstalling package
    #[arg(long, value_name = "N")]
    pub progress_step: Option<u32>,

    /// Load server settings and the package catalog from a TOML file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,
}
