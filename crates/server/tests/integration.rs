//! End-to-end tests of the package server over real sockets

use fakedm_config::Config;
use fakedm_server::{FakeServer, ServerHandle};
use fakedm_types::{Package, PackageStatus, PACKAGE_LIST_PATH};
use reqwest::{Client, StatusCode};
use serde_json::Value;

async fn start(ignore_requests: bool) -> ServerHandle {
    let mut config = Config::default();
    config.server.ignore_requests = ignore_requests;
    FakeServer::bind(&config).await.unwrap().spawn()
}

fn packages_url(server: &ServerHandle, id: &str) -> String {
    format!("{}{PACKAGE_LIST_PATH}{id}", server.url())
}

async fn get_package(client: &Client, server: &ServerHandle, id: &str) -> Package {
    let response = client.get(packages_url(server, id)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.unwrap()
}

/// Poll until `target`, checking progress rises on every intermediate poll
async fn drive_to(client: &Client, server: &ServerHandle, id: &str, target: PackageStatus) {
    let mut progress = 0;
    for _ in 0..10 {
        let package = get_package(client, server, id).await;
        if package.status == target {
            assert_eq!(package.progress, 0);
            return;
        }
        assert!(
            package.progress > progress,
            "progress was {}, last call it was {progress}",
            package.progress
        );
        progress = package.progress;
    }
    panic!("{id} never reached {target}");
}

#[tokio::test]
async fn test_list_store_packages() {
    let server = start(false).await;
    let response = reqwest::get(packages_url(&server, "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let results: Vec<Value> = response.json().await.unwrap();
    assert_eq!(results.len(), 2);

    let mut ids: Vec<&str> = results.iter().map(|p| p["id"].as_str().unwrap()).collect();
    ids.sort_unstable();
    assert_eq!(ids, ["package1.canonical", "package2.canonical"]);

    for package in &results {
        assert_eq!(package.as_object().unwrap().len(), 11);
    }
}

#[tokio::test]
async fn test_listing_is_idempotent() {
    let server = start(false).await;
    let client = Client::new();

    let mut first: Vec<Package> = client
        .get(packages_url(&server, ""))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let mut second: Vec<Package> = client
        .get(packages_url(&server, ""))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    first.sort_by(|a, b| a.id.cmp(&b.id));
    second.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_list_installed_packages() {
    let server = start(false).await;
    let results: Vec<Package> = Client::new()
        .get(packages_url(&server, ""))
        .query(&[("installed_only", "true")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "package1.canonical");
}

#[tokio::test]
async fn test_query_installed_and_not_installed() {
    let server = start(false).await;
    let client = Client::new();

    let installed = get_package(&client, &server, "package1.canonical").await;
    assert_eq!(installed.status, PackageStatus::Installed);

    let available = get_package(&client, &server, "package2.canonical").await;
    assert_eq!(available.status, PackageStatus::Uninstalled);
}

#[tokio::test]
async fn test_query_installed_only() {
    let server = start(false).await;
    let client = Client::new();

    let response = client
        .get(packages_url(&server, "package1.canonical"))
        .query(&[("installed_only", "true")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(packages_url(&server, "package2.canonical"))
        .query(&[("installed_only", "true")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_query_nonexistent() {
    let server = start(false).await;
    let response = reqwest::get(packages_url(&server, "nonexistent"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.text().await.unwrap().contains("nonexistent"));
}

#[tokio::test]
async fn test_package_installation() {
    let server = start(false).await;
    let client = Client::new();

    let response = client
        .put(packages_url(&server, "package2.canonical"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(response.json::<String>().await.unwrap(), "Accepted");

    let first = get_package(&client, &server, "package2.canonical").await;
    assert_eq!(first.status, PackageStatus::Installing);
    assert_eq!(first.progress, 50);

    let second = get_package(&client, &server, "package2.canonical").await;
    assert_eq!(second.status, PackageStatus::Installed);
    assert_eq!(second.progress, 0);
    assert_eq!(second.installed_size, 123_456);
    assert_eq!(second.download_size, 0);
}

#[tokio::test]
async fn test_package_uninstallation() {
    let server = start(false).await;
    let client = Client::new();

    let response = client
        .delete(packages_url(&server, "package1.canonical"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    drive_to(&client, &server, "package1.canonical", PackageStatus::Uninstalled).await;

    let package = get_package(&client, &server, "package1.canonical").await;
    assert_eq!(package.download_size, 123_456);
    assert_eq!(package.installed_size, 0);
}

#[tokio::test]
async fn test_install_uninstall_reinstall() {
    let server = start(false).await;
    let client = Client::new();
    let id = "package2.canonical";

    client.put(packages_url(&server, id)).send().await.unwrap();
    drive_to(&client, &server, id, PackageStatus::Installed).await;

    client.delete(packages_url(&server, id)).send().await.unwrap();
    drive_to(&client, &server, id, PackageStatus::Uninstalled).await;

    client.put(packages_url(&server, id)).send().await.unwrap();
    drive_to(&client, &server, id, PackageStatus::Installed).await;
}

#[tokio::test]
async fn test_empty_id_mutations_fail() {
    let server = start(false).await;
    let client = Client::new();

    let response = client.put(packages_url(&server, "")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = client
        .delete(packages_url(&server, ""))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_ignore_requests() {
    let server = start(true).await;
    let client = Client::new();

    let response = client
        .delete(packages_url(&server, "package1.canonical"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    for _ in 0..3 {
        let package = get_package(&client, &server, "package1.canonical").await;
        assert_eq!(package.status, PackageStatus::Installed);
        assert_eq!(package.progress, 0);
    }
}

#[tokio::test]
async fn test_unrouted_path() {
    let server = start(false).await;
    let response = reqwest::get(format!("{}/api/v1/other", server.url()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_handle_shares_catalog() {
    let server = start(false).await;
    Client::new()
        .put(packages_url(&server, "package2.canonical"))
        .send()
        .await
        .unwrap();

    let snapshot = server.catalog().snapshot().unwrap();
    let package = snapshot
        .iter()
        .find(|p| p.id == "package2.canonical")
        .unwrap();
    assert_eq!(package.status, PackageStatus::Installing);
    assert_eq!(package.progress, 0);
}

#[tokio::test]
async fn test_abort_stops_serving() {
    let server = start(false).await;
    let url = packages_url(&server, "");
    server.abort();
    tokio::task::yield_now().await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert!(reqwest::get(url).await.is_err());
}
