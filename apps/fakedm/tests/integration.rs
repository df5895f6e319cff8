//! Integration tests for the fakedm binary

mod common;

use common::ServerFixture;
use fakedm_client::PackageClient;
use fakedm_types::{Package, PackageStatus};
use reqwest::StatusCode;
use std::io::Write;
use std::process::Command;

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_fakedm"))
        .arg("--version")
        .output()
        .expect("Failed to execute fakedm");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fakedm"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_fakedm"))
        .arg("--help")
        .output()
        .expect("Failed to execute fakedm");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--ignore-requests"));
    assert!(stdout.contains("--bind"));
    assert!(stdout.contains("--config"));
}

#[test]
fn test_invalid_progress_step_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_fakedm"))
        .args(["--bind", "127.0.0.1:0", "--progress-step", "0"])
        .env_remove("FAKEDM_PROGRESS_STEP")
        .output()
        .expect("Failed to execute fakedm");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("progress_step"));
    assert!(stderr.contains("config.invalid_value"));
}

#[test]
fn test_missing_config_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_fakedm"))
        .args(["--config", "/nonexistent/fakedm.toml"])
        .output()
        .expect("Failed to execute fakedm");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file not found"));
}

#[tokio::test]
async fn test_reports_url_and_lists_packages() {
    let server = ServerFixture::with_defaults().await;
    assert!(server.url.starts_with("http://127.0.0.1:"));

    let packages: Vec<Package> = reqwest::get(server.packages_url(""))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(packages.len(), 2);
}

#[tokio::test]
async fn test_install_scenario_out_of_process() {
    let server = ServerFixture::with_defaults().await;
    let client = PackageClient::with_defaults(&server.url).unwrap();

    client.install("package2.canonical").await.unwrap();

    let first = client.query("package2.canonical").await.unwrap();
    assert_eq!(first.status, PackageStatus::Installing);
    assert_eq!(first.progress, 50);

    let second = client.query("package2.canonical").await.unwrap();
    assert_eq!(second.status, PackageStatus::Installed);
    assert_eq!(second.progress, 0);
    assert_eq!(second.installed_size, 123_456);
    assert_eq!(second.download_size, 0);
}

#[tokio::test]
async fn test_state_persists_across_requests() {
    let server = ServerFixture::with_defaults().await;
    let client = PackageClient::with_defaults(&server.url).unwrap();

    client.uninstall("package1.canonical").await.unwrap();
    client
        .poll_until("package1.canonical", PackageStatus::Uninstalled)
        .await
        .unwrap();

    assert!(client.installed_packages().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ignore_requests_flag() {
    let server = ServerFixture::start(&["--ignore-requests"]).await;

    let response = reqwest::Client::new()
        .delete(server.packages_url("package1.canonical"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let package: Package = reqwest::get(server.packages_url("package1.canonical"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(package.status, PackageStatus::Installed);
}

#[tokio::test]
async fn test_progress_step_flag() {
    let server = ServerFixture::start(&["--progress-step", "25"]).await;
    let client = PackageClient::with_defaults(&server.url).unwrap();

    client.install("package2.canonical").await.unwrap();
    for expected in [25, 50, 75] {
        assert_eq!(
            client.query("package2.canonical").await.unwrap().progress,
            expected
        );
    }
    assert!(client
        .query("package2.canonical")
        .await
        .unwrap()
        .is_installed());
}

#[tokio::test]
async fn test_config_file_catalog() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[[packages]]
id = "hello.vendor"
name = "hello"
type = "app"
status = "uninstalled"
download_size = 2048
        "#
    )
    .unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let server = ServerFixture::start(&["--config", &path]).await;
    let client = PackageClient::with_defaults(&server.url).unwrap();

    let packages = client.store_packages().await.unwrap();
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].id, "hello.vendor");

    let raw: serde_json::Value = reqwest::get(server.packages_url("hello.vendor"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(raw["vendor"], "");
    assert_eq!(raw["installed_size"], 0);
    assert_eq!(raw["progress"], 0);
}

#[tokio::test]
async fn test_stop_terminates_server() {
    let server = ServerFixture::with_defaults().await;
    let url = server.packages_url("");
    server.stop().await;

    assert!(reqwest::get(url).await.is_err());
}
