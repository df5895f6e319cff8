//! API client error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request to {url} failed: {message}")]
    RequestFailed { url: String, message: String },

    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("failed to decode response: {message}")]
    Decode { message: String },

    #[error("package {id} did not reach {expected} after {attempts} polls")]
    NoProgress {
        id: String,
        expected: String,
        attempts: u32,
    },
}

impl ClientError {
    /// HTTP status code when the server answered with a non-2xx response
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl UserFacingError for ClientError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::RequestFailed { .. } => Some("Check that the package server is running."),
            Self::NoProgress { .. } => {
                Some("The server accepted the request but never acted on it.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::RequestFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::InvalidUrl(_) => "client.invalid_url",
            Self::RequestFailed { .. } => "client.request_failed",
            Self::Http { .. } => "client.http",
            Self::Decode { .. } => "client.decode",
            Self::NoProgress { .. } => "client.no_progress",
        })
    }
}
