//! Tracing subscriber setup
//!
//! Logs always go to stderr: stdout carries the URL handoff to whoever
//! spawned the server.

use fakedm_types::LogFormat;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,fakedm=info,fakedm_server=info,fakedm_catalog=info";
const DEBUG_FILTER: &str = "info,fakedm=debug,fakedm_server=debug,fakedm_catalog=debug";

pub fn init_tracing(format: LogFormat, debug_enabled: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug_enabled {
            DEBUG_FILTER
        } else {
            DEFAULT_FILTER
        })
    });

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init(),
    }
}
