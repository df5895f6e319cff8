//! Minimal HTTP/1.1 request parsing and response encoding
//!
//! Only what the packages API needs: a request line, the `Content-Length`
//! header (so a body can be drained), and one response per connection.

use fakedm_errors::ServerError;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use url::Url;

/// Upper bound on the request head
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

/// How long a peer gets to deliver a whole request, body included
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Request method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
    Other(String),
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Self::Get,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Put => f.write_str("PUT"),
            Self::Delete => f.write_str("DELETE"),
            Self::Other(method) => f.write_str(method),
        }
    }
}

/// A parsed request head
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    query: Vec<(String, String)>,
    content_length: usize,
}

impl Request {
    /// Parse the request line and headers (everything before the blank line)
    ///
    /// # Errors
    ///
    /// Returns `ServerError::MalformedRequest` for a missing or invalid
    /// request line, or an unparsable `Content-Length`.
    pub fn parse_head(head: &str) -> Result<Self, ServerError> {
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default();

        let mut parts = request_line.split_whitespace();
        let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed(format!("bad request line: {request_line:?}")));
        };
        if !version.starts_with("HTTP/") {
            return Err(malformed(format!("bad protocol version: {version:?}")));
        }

        let url = Url::parse("http://localhost")
            .and_then(|base| base.join(target))
            .map_err(|e| malformed(format!("bad request target {target:?}: {e}")))?;

        let mut content_length = 0;
        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value
                    .trim()
                    .parse()
                    .map_err(|_| malformed(format!("bad content-length: {value:?}")))?;
            }
        }

        Ok(Self {
            method: Method::parse(method),
            path: url.path().to_string(),
            query: url.query_pairs().into_owned().collect(),
            content_length,
        })
    }

    /// Read one request from a stream, draining any body
    ///
    /// # Errors
    ///
    /// Returns an error if the peer closes early, the head is too large, or
    /// the head does not parse.
    pub async fn read_from<R>(stream: &mut R) -> Result<Self, ServerError>
    where
        R: AsyncRead + Unpin,
    {
        let mut buffer = Vec::with_capacity(1024);
        let mut chunk = [0u8; 1024];

        let head_end = loop {
            if let Some(pos) = find_head_end(&buffer) {
                break pos;
            }
            if buffer.len() > MAX_HEAD_BYTES {
                return Err(ServerError::HeadersTooLarge {
                    limit: MAX_HEAD_BYTES,
                });
            }
            let n = stream
                .read(&mut chunk)
                .await
                .map_err(|_| ServerError::ConnectionClosed)?;
            if n == 0 {
                return Err(ServerError::ConnectionClosed);
            }
            buffer.extend_from_slice(&chunk[..n]);
        };

        let head = std::str::from_utf8(&buffer[..head_end])
            .map_err(|_| malformed("request head is not UTF-8".to_string()))?;
        let request = Self::parse_head(head)?;

        // The API takes no bodies; read and discard whatever was announced.
        let mut remaining = request
            .content_length
            .saturating_sub(buffer.len() - head_end - 4);
        while remaining > 0 {
            let n = stream
                .read(&mut chunk)
                .await
                .map_err(|_| ServerError::ConnectionClosed)?;
            if n == 0 {
                break;
            }
            remaining = remaining.saturating_sub(n);
        }

        Ok(request)
    }

    /// [`Request::read_from`] bounded by `limit`
    ///
    /// # Errors
    ///
    /// Returns `ServerError::ReadTimeout` if the request (including any
    /// announced body) has not arrived within `limit`, or any error from
    /// [`Request::read_from`].
    pub async fn read_with_timeout<R>(stream: &mut R, limit: Duration) -> Result<Self, ServerError>
    where
        R: AsyncRead + Unpin,
    {
        tokio::time::timeout(limit, Self::read_from(stream))
            .await
            .map_err(|_| ServerError::ReadTimeout { timeout: limit })?
    }

    /// First value of a query parameter
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

fn malformed(message: String) -> ServerError {
    ServerError::MalformedRequest { message }
}

/// Response status codes used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    Accepted,
    BadRequest,
    NotFound,
    InternalServerError,
    NotImplemented,
}

impl StatusCode {
    #[must_use]
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Accepted => 202,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::InternalServerError => 500,
            Self::NotImplemented => 501,
        }
    }

    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Accepted => "Accepted",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::InternalServerError => "Internal Server Error",
            Self::NotImplemented => "Not Implemented",
        }
    }
}

/// A complete response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    /// JSON response with the given status
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Serialization` if the value cannot be encoded.
    pub fn json<T>(status: StatusCode, value: &T) -> Result<Self, ServerError>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(value).map_err(|e| ServerError::Serialization {
            message: e.to_string(),
        })?;
        Ok(Self {
            status,
            content_type: "application/json",
            body,
        })
    }

    /// Plain-text error response
    #[must_use]
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let mut body = message.into();
        body.push('\n');
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into_bytes(),
        }
    }

    /// Serialize status line, headers and body
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status.as_u16(),
            self.status.reason(),
            self.content_type,
            self.body.len()
        );
        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}
