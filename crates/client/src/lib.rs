#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Typed client for the packages API
//!
//! Speaks to the fake server (or anything serving the same API) the way a
//! package-management daemon would: list, query, request install/uninstall,
//! then poll for progress.

use fakedm_errors::ClientError;
use fakedm_types::{Package, PackageStatus, INSTALLED_ONLY_PARAM, PACKAGE_LIST_PATH};
use reqwest::{Client, Method, RequestBuilder, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    /// Delay between polls in [`PackageClient::poll_until`]
    pub poll_interval: Duration,
    /// Polls before [`PackageClient::poll_until`] gives up
    pub max_polls: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("fakedm-client/{}", env!("CARGO_PKG_VERSION")),
            poll_interval: Duration::from_millis(10),
            max_polls: 20,
        }
    }
}

/// HTTP client for one server
#[derive(Debug, Clone)]
pub struct PackageClient {
    client: Client,
    base_url: Url,
    config: ClientConfig,
}

impl PackageClient {
    /// Create a client for the server at `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or the HTTP client cannot
    /// be built.
    pub fn new(base_url: &str, config: ClientConfig) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ClientError::RequestFailed {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse.
    pub fn with_defaults(base_url: &str) -> Result<Self, ClientError> {
        Self::new(base_url, ClientConfig::default())
    }

    fn package_url(&self, id: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(&format!("{PACKAGE_LIST_PATH}{id}"))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    async fn send(&self, builder: RequestBuilder, url: &Url) -> Result<Response, ClientError> {
        let response = builder.send().await.map_err(|e| ClientError::RequestFailed {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T>(&self, id: &str, installed_only: bool) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = self.package_url(id)?;
        let mut builder = self.client.get(url.clone());
        if installed_only {
            builder = builder.query(&[(INSTALLED_ONLY_PARAM, "true")]);
        }

        self.send(builder, &url)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Decode {
                message: e.to_string(),
            })
    }

    /// Every package the server knows about
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn store_packages(&self) -> Result<Vec<Package>, ClientError> {
        self.get_json("", false).await
    }

    /// Only installed packages
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn installed_packages(&self) -> Result<Vec<Package>, ClientError> {
        self.get_json("", true).await
    }

    /// Fetch one package; against the fake this also advances its progress
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` with status 404 for an unknown id.
    pub async fn query(&self, id: &str) -> Result<Package, ClientError> {
        self.get_json(id, false).await
    }

    /// Fetch one package only if it is installed
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` with status 404 if the package is unknown
    /// or not installed.
    pub async fn query_installed(&self, id: &str) -> Result<Package, ClientError> {
        self.get_json(id, true).await
    }

    /// Request installation
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers with a 2xx status.
    pub async fn install(&self, id: &str) -> Result<(), ClientError> {
        self.mutate(Method::PUT, id).await
    }

    /// Request uninstallation
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers with a 2xx status.
    pub async fn uninstall(&self, id: &str) -> Result<(), ClientError> {
        self.mutate(Method::DELETE, id).await
    }

    async fn mutate(&self, method: Method, id: &str) -> Result<(), ClientError> {
        let url = self.package_url(id)?;
        let builder = self.client.request(method.clone(), url.clone());
        let response = self.send(builder, &url).await?;
        debug!(method = %method, package = %id, status = response.status().as_u16(), "request sent");
        Ok(())
    }

    /// Poll a package until it reaches `target`
    ///
    /// Gives up after the configured number of polls, which is how an
    /// accepted-but-ignored request shows up.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NoProgress` when the budget runs out, or any
    /// error from the underlying query.
    pub async fn poll_until(&self, id: &str, target: PackageStatus) -> Result<Package, ClientError> {
        for attempt in 1..=self.config.max_polls {
            let package = self.query(id).await?;
            debug!(
                package = %id,
                attempt,
                status = %package.status,
                progress = package.progress,
                "polled package"
            );
            if package.status == target {
                return Ok(package);
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }

        Err(ClientError::NoProgress {
            id: id.to_string(),
            expected: target.to_string(),
            attempts: self.config.max_polls,
        })
    }
}
