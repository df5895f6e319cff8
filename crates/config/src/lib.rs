#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for fakedm
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (passed with `--config`)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;

use constants::{
    DEFAULT_BIND, DEFAULT_PROGRESS_STEP, ENV_BIND, ENV_IGNORE_REQUESTS, ENV_PROGRESS_STEP,
    MAX_PROGRESS,
};
use fakedm_errors::{ConfigError, Error};
use fakedm_types::{default_seed, Package, PackageStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Catalog seed; the built-in two-package seed is used when empty
    #[serde(default)]
    pub packages: Vec<Package>,
}

/// Server construction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Accept install/uninstall requests without ever acting on them
    #[serde(default)]
    pub ignore_requests: bool,
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            ignore_requests: false,
            progress_step: DEFAULT_PROGRESS_STEP,
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_progress_step() -> u32 {
    DEFAULT_PROGRESS_STEP
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file does not exist, an I/O
    /// error carrying the path if it cannot be read, or a parse error if the
    /// contents are not valid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::from(ConfigError::NotFound {
                    path: path.display().to_string(),
                })
            } else {
                Error::io_with_path(&e, path)
            }
        })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;

        tracing::debug!(
            path = %path.display(),
            packages = config.packages.len(),
            "loaded configuration file"
        );
        Ok(config)
    }

    /// Load configuration from an optional path or use defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&PathBuf>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Ok(Self::default()),
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_vars(|name| std::env::var(name).ok())
    }

    /// Merge values from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value of the wrong shape.
    pub fn merge_vars<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        // FAKEDM_BIND
        if let Some(bind) = lookup(ENV_BIND) {
            self.server.bind = bind;
        }

        // FAKEDM_IGNORE_REQUESTS
        if let Some(ignore) = lookup(ENV_IGNORE_REQUESTS) {
            self.server.ignore_requests = match ignore.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: ENV_IGNORE_REQUESTS.to_string(),
                        value: ignore,
                    }
                    .into())
                }
            };
        }

        // FAKEDM_PROGRESS_STEP
        if let Some(step) = lookup(ENV_PROGRESS_STEP) {
            self.server.progress_step = step.parse().map_err(|_| ConfigError::InvalidValue {
                field: ENV_PROGRESS_STEP.to_string(),
                value: step,
            })?;
        }

        Ok(())
    }

    /// Check value ranges that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable bind address, a progress step
    /// outside `1..=100`, duplicate package ids, or a seed package whose
    /// progress or sizes do not fit its status.
    pub fn validate(&self) -> Result<(), Error> {
        self.bind_addr()?;

        if self.server.progress_step == 0 || self.server.progress_step > MAX_PROGRESS {
            return Err(ConfigError::InvalidValue {
                field: "progress_step".to_string(),
                value: self.server.progress_step.to_string(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        for package in &self.packages {
            if package.id.is_empty() {
                return Err(ConfigError::Invalid {
                    message: "package id must not be empty".to_string(),
                }
                .into());
            }
            if !seen.insert(package.id.as_str()) {
                return Err(ConfigError::DuplicatePackage {
                    id: package.id.clone(),
                }
                .into());
            }
            validate_seed_package(package)?;
        }

        Ok(())
    }

    /// Parsed bind address
    ///
    /// # Errors
    ///
    /// Returns an error if `bind` is not a `host:port` socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, Error> {
        self.server.bind.parse().map_err(|_| {
            ConfigError::InvalidValue {
                field: "bind".to_string(),
                value: self.server.bind.clone(),
            }
            .into()
        })
    }

    /// Packages the catalog starts with
    #[must_use]
    pub fn seed(&self) -> Vec<Package> {
        if self.packages.is_empty() {
            default_seed()
        } else {
            self.packages.clone()
        }
    }
}

/// A seed package must look like the catalog could have produced it
///
/// Settled packages carry no progress and keep their size in the field that
/// matches their status; in-flight ones have exactly one nonzero size.
fn validate_seed_package(package: &Package) -> Result<(), ConfigError> {
    let invalid = |field: &str, value: String| ConfigError::InvalidValue {
        field: format!("packages.{}.{field}", package.id),
        value,
    };

    if package.progress > MAX_PROGRESS {
        return Err(invalid("progress", package.progress.to_string()));
    }

    match package.status {
        PackageStatus::Installed | PackageStatus::Uninstalled if package.progress != 0 => {
            Err(invalid("progress", package.progress.to_string()))
        }
        PackageStatus::Installed if package.installed_size == 0 || package.download_size != 0 => {
            Err(invalid("installed_size", sizes(package)))
        }
        PackageStatus::Uninstalled if package.download_size == 0 || package.installed_size != 0 => {
            Err(invalid("download_size", sizes(package)))
        }
        PackageStatus::Installing | PackageStatus::Uninstalling
            if (package.installed_size > 0) == (package.download_size > 0) =>
        {
            Err(invalid("installed_size", sizes(package)))
        }
        _ => Ok(()),
    }
}

fn sizes(package: &Package) -> String {
    format!(
        "installed_size={} download_size={}",
        package.installed_size, package.download_size
    )
}
