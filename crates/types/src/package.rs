//! Package-related type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    Installed,
    Uninstalled,
    Installing,
    Uninstalling,
}

impl PackageStatus {
    /// Whether the package is in the middle of an install or uninstall
    #[must_use]
    pub fn is_transitioning(self) -> bool {
        matches!(self, Self::Installing | Self::Uninstalling)
    }

    /// The status an in-flight transition settles into
    ///
    /// Stable statuses map to themselves.
    #[must_use]
    pub fn settled(self) -> Self {
        match self {
            Self::Installing => Self::Installed,
            Self::Uninstalling => Self::Uninstalled,
            other => other,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Uninstalled => "uninstalled",
            Self::Installing => "installing",
            Self::Uninstalling => "uninstalling",
        }
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for PackageStatus {
    fn default() -> Self {
        Self::Uninstalled
    }
}

/// A package record as served by the packages API
///
/// Every field is always serialized, including zero sizes and empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Package {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: PackageStatus,
    #[serde(default)]
    pub installed_size: u64,
    #[serde(default)]
    pub download_size: u64,
    #[serde(default)]
    pub progress: u32,
}

impl Package {
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.status == PackageStatus::Installed
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.status.is_transitioning()
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.id, self.version, self.status)
    }
}

/// The catalog the server starts with when no packages are configured
#[must_use]
pub fn default_seed() -> Vec<Package> {
    vec![
        Package {
            id: "package1.canonical".to_string(),
            name: "package1".to_string(),
            vendor: "Canonical".to_string(),
            version: "0.1".to_string(),
            description: "description1".to_string(),
            icon: "http://icon1".to_string(),
            kind: "app".to_string(),
            status: PackageStatus::Installed,
            installed_size: 123_456,
            download_size: 0,
            progress: 0,
        },
        Package {
            id: "package2.canonical".to_string(),
            name: "package2".to_string(),
            vendor: "Canonical".to_string(),
            version: "0.2".to_string(),
            description: "description2".to_string(),
            icon: "http://icon2".to_string(),
            kind: "app".to_string(),
            status: PackageStatus::Uninstalled,
            installed_size: 0,
            download_size: 123_456,
            progress: 0,
        },
    ]
}
