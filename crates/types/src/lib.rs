#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the fakedm package server
//!
//! This crate provides the package record shared by the catalog, the HTTP
//! server and the client, together with the wire-level constants of the
//! packages API.

pub mod api;
pub mod package;

// Re-export commonly used types
pub use api::{ACCEPTED_BODY, INSTALLED_ONLY_PARAM, PACKAGE_LIST_PATH};
pub use package::{default_seed, Package, PackageStatus};

use serde::{Deserialize, Serialize};

/// Log output format for the server binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

// Implement clap::ValueEnum for LogFormat
impl clap::ValueEnum for LogFormat {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Text, Self::Json]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Text => clap::builder::PossibleValue::new("text"),
            Self::Json => clap::builder::PossibleValue::new("json"),
        })
    }
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Text
    }
}
