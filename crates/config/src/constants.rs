//! Defaults and environment variable names for the server configuration

/// Loopback with an ephemeral port; the bound URL is reported at startup
pub const DEFAULT_BIND: &str = "127.0.0.1:0";

/// Progress added per poll of a transitioning package
pub const DEFAULT_PROGRESS_STEP: u32 = 50;

pub const MAX_PROGRESS: u32 = 100;

pub const ENV_BIND: &str = "FAKEDM_BIND";
pub const ENV_IGNORE_REQUESTS: &str = "FAKEDM_IGNORE_REQUESTS";
pub const ENV_PROGRESS_STEP: &str = "FAKEDM_PROGRESS_STEP";
