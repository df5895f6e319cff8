#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Fake package-management HTTP server
//!
//! Serves the packages API over a lock-guarded [`Catalog`]. Each accepted
//! connection carries exactly one request and is handled on its own task.
//! Shutdown is forced: abort the serving task or kill the process.

pub mod api;
pub mod http;

pub use api::PackageApi;
pub use http::{Method, Request, Response, StatusCode};

use fakedm_catalog::Catalog;
use fakedm_config::Config;
use fakedm_errors::{Error, ServerError};
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A bound, not yet serving, package server
pub struct FakeServer {
    listener: TcpListener,
    addr: SocketAddr,
    api: PackageApi,
}

impl FakeServer {
    /// Validate the configuration, seed the catalog and bind the listener
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the address
    /// cannot be bound.
    pub async fn bind(config: &Config) -> Result<Self, Error> {
        config.validate()?;
        let catalog = Catalog::from_config(config)?;
        Self::bind_with(config.bind_addr()?, catalog).await
    }

    /// Bind the listener around an existing catalog
    ///
    /// # Errors
    ///
    /// Returns `ServerError::BindFailed` if the address cannot be bound.
    pub async fn bind_with(addr: SocketAddr, catalog: Catalog) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindFailed {
                address: addr.to_string(),
                message: e.to_string(),
            })?;
        let addr = listener.local_addr()?;

        info!(
            address = %addr,
            ignore_requests = catalog.policy().ignore_requests,
            progress_step = catalog.policy().progress_step,
            "package server bound"
        );

        Ok(Self {
            listener,
            addr,
            api: PackageApi::new(catalog),
        })
    }

    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL clients should use
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.api.catalog()
    }

    /// Serve until the task is aborted or the process ends
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let api = self.api.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(stream, &api).await {
                            debug!(peer = %peer, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "failed to accept connection"),
            }
        }
    }

    /// Serve on a background task
    #[must_use]
    pub fn spawn(self) -> ServerHandle {
        let addr = self.addr;
        let catalog = self.catalog().clone();
        let task = tokio::spawn(self.run());
        ServerHandle {
            addr,
            catalog,
            task,
        }
    }
}

async fn serve_connection(mut stream: TcpStream, api: &PackageApi) -> Result<(), Error> {
    let response = match Request::read_with_timeout(&mut stream, http::READ_TIMEOUT).await {
        Ok(request) => {
            let response = api.handle(&request);
            info!(
                method = %request.method,
                path = %request.path,
                status = response.status.as_u16(),
                "handled request"
            );
            response
        }
        Err(ServerError::ConnectionClosed) => return Ok(()),
        Err(e @ ServerError::ReadTimeout { .. }) => {
            debug!(error = %e, "dropping stalled connection");
            return Ok(());
        }
        Err(e) => {
            warn!(error = %e, "rejecting request");
            Response::error(StatusCode::BadRequest, e.to_string())
        }
    };

    stream.write_all(&response.to_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await?;
    Ok(())
}

/// Handle to a server running on a background task
///
/// Dropping the handle aborts the server.
pub struct ServerHandle {
    addr: SocketAddr,
    catalog: Catalog,
    task: JoinHandle<()>,
}

impl ServerHandle {
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The catalog the server is serving, shared with its handlers
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Stop serving immediately
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
