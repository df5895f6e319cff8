#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package catalog for the fakedm server
//!
//! The catalog is a single lock-guarded list shared by every request
//! handler. Reads of a single package drive the simulated lifecycle forward;
//! listing never mutates.

pub mod lifecycle;

use fakedm_config::constants::DEFAULT_PROGRESS_STEP;
use fakedm_config::Config;
use fakedm_errors::CatalogError;
use fakedm_types::{Package, PackageStatus};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// How the catalog reacts to requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogPolicy {
    /// Progress added per single-package poll
    pub progress_step: u32,
    /// Accept install/uninstall requests but never start them
    pub ignore_requests: bool,
}

impl Default for CatalogPolicy {
    fn default() -> Self {
        Self {
            progress_step: DEFAULT_PROGRESS_STEP,
            ignore_requests: false,
        }
    }
}

impl From<&Config> for CatalogPolicy {
    fn from(config: &Config) -> Self {
        Self {
            progress_step: config.server.progress_step,
            ignore_requests: config.server.ignore_requests,
        }
    }
}

/// Shared handle to the package list
///
/// Cloning the handle shares the underlying list.
#[derive(Debug, Clone)]
pub struct Catalog {
    packages: Arc<Mutex<Vec<Package>>>,
    policy: CatalogPolicy,
}

impl Catalog {
    /// Build a catalog from its seed
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two seed packages share an id.
    pub fn new(seed: Vec<Package>, policy: CatalogPolicy) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for package in &seed {
            if !seen.insert(package.id.clone()) {
                return Err(CatalogError::DuplicateId {
                    id: package.id.clone(),
                });
            }
        }

        Ok(Self {
            packages: Arc::new(Mutex::new(seed)),
            policy,
        })
    }

    /// Build a catalog from a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured seed contains duplicate ids.
    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        Self::new(config.seed(), CatalogPolicy::from(config))
    }

    #[must_use]
    pub fn policy(&self) -> CatalogPolicy {
        self.policy
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Package>>, CatalogError> {
        self.packages.lock().map_err(|_| CatalogError::Poisoned)
    }

    /// List packages, optionally only the installed ones
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Poisoned` if a handler panicked while holding
    /// the catalog.
    pub fn list(&self, installed_only: bool) -> Result<Vec<Package>, CatalogError> {
        let packages = self.lock()?;
        Ok(packages
            .iter()
            .filter(|p| !installed_only || p.is_installed())
            .cloned()
            .collect())
    }

    /// Fetch one package, advancing it first if it is mid-transition
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown id, and also when
    /// `installed_only` is set and the package is not installed after the
    /// advance.
    pub fn query(&self, id: &str, installed_only: bool) -> Result<Package, CatalogError> {
        let mut packages = self.lock()?;
        let package = packages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound { id: id.to_string() })?;

        if package.is_transitioning() {
            let from = package.status;
            lifecycle::advance(package, self.policy.progress_step);
            debug!(
                package = %package.id,
                status = %package.status,
                progress = package.progress,
                "advanced package"
            );
            if !package.is_transitioning() {
                info!(package = %package.id, from = %from, to = %package.status, "transition finished");
            }
        }

        if installed_only && !package.is_installed() {
            return Err(CatalogError::NotFound { id: id.to_string() });
        }

        Ok(package.clone())
    }

    /// Ask for a package to be installed
    ///
    /// Returns whether the catalog changed. Unknown ids and ignore mode both
    /// leave the catalog alone without failing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Poisoned` if the catalog lock is poisoned.
    pub fn request_install(&self, id: &str) -> Result<bool, CatalogError> {
        self.begin(id, PackageStatus::Installing)
    }

    /// Ask for a package to be uninstalled
    ///
    /// Same contract as [`Catalog::request_install`].
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Poisoned` if the catalog lock is poisoned.
    pub fn request_uninstall(&self, id: &str) -> Result<bool, CatalogError> {
        self.begin(id, PackageStatus::Uninstalling)
    }

    fn begin(&self, id: &str, status: PackageStatus) -> Result<bool, CatalogError> {
        if self.policy.ignore_requests {
            info!(package = %id, requested = %status, "ignoring request");
            return Ok(false);
        }

        let mut packages = self.lock()?;
        match packages.iter_mut().find(|p| p.id == id) {
            Some(package) => {
                package.status = status;
                info!(package = %id, status = %status, "request accepted");
                Ok(true)
            }
            None => {
                debug!(package = %id, requested = %status, "request for unknown package");
                Ok(false)
            }
        }
    }

    /// Copy of the current package list, without any side effects
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Poisoned` if the catalog lock is poisoned.
    pub fn snapshot(&self) -> Result<Vec<Package>, CatalogError> {
        self.list(false)
    }
}
