//! HTTP server error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("malformed request: {message}")]
    MalformedRequest { message: String },

    #[error("request headers exceed {limit} bytes")]
    HeadersTooLarge { limit: usize },

    #[error("connection closed before the request was complete")]
    ConnectionClosed,

    #[error("request not received within {timeout:?}")]
    ReadTimeout { timeout: std::time::Duration },

    #[error("failed to serialize response: {message}")]
    Serialization { message: String },
}

impl UserFacingError for ServerError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::BindFailed { .. } => {
                Some("Pick a free address with --bind, or use port 0 for an ephemeral port.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionClosed | Self::ReadTimeout { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::BindFailed { .. } => "server.bind_failed",
            Self::MalformedRequest { .. } => "server.malformed_request",
            Self::HeadersTooLarge { .. } => "server.headers_too_large",
            Self::ConnectionClosed => "server.connection_closed",
            Self::ReadTimeout { .. } => "server.read_timeout",
            Self::Serialization { .. } => "server.serialization",
        })
    }
}
