//! Catalog error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("snappy package not found {id}")]
    NotFound { id: String },

    #[error("duplicate package id: {id}")]
    DuplicateId { id: String },

    #[error("catalog lock poisoned")]
    Poisoned,
}

impl UserFacingError for CatalogError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::NotFound { .. } => "catalog.not_found",
            Self::DuplicateId { .. } => "catalog.duplicate_id",
            Self::Poisoned => "catalog.poisoned",
        })
    }
}
