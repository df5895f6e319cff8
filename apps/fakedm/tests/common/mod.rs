//! Subprocess fixture for the fakedm binary
//!
//! Spawns the server as a child process, waits for the one-line URL
//! handoff on its stdout, and kills the child when dropped.

use fakedm_types::PACKAGE_LIST_PATH;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ServerFixture {
    child: Child,
    pub url: String,
}

impl ServerFixture {
    /// Start the server on an ephemeral port with extra CLI arguments
    pub async fn start(args: &[&str]) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_fakedm"))
            .args(["--bind", "127.0.0.1:0"])
            .args(args)
            .env_remove("FAKEDM_BIND")
            .env_remove("FAKEDM_IGNORE_REQUESTS")
            .env_remove("FAKEDM_PROGRESS_STEP")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("Failed to spawn fakedm");

        let stdout = child.stdout.take().expect("stdout is piped");
        let mut lines = BufReader::new(stdout).lines();
        let url = tokio::time::timeout(STARTUP_TIMEOUT, lines.next_line())
            .await
            .expect("fakedm did not report its URL in time")
            .expect("Failed to read fakedm stdout")
            .expect("fakedm exited before reporting its URL");

        Self { child, url }
    }

    /// Start the server with default settings
    pub async fn with_defaults() -> Self {
        Self::start(&[]).await
    }

    pub fn packages_url(&self, id: &str) -> String {
        format!("{}{PACKAGE_LIST_PATH}{id}", self.url)
    }

    /// Force-terminate the server and wait for it to exit
    pub async fn stop(mut self) {
        self.child.kill().await.expect("Failed to kill fakedm");
    }
}
