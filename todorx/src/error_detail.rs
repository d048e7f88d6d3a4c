use std::fmt::{Display, Formatter};
use thiserror::Error;

/// The kind of failure that happened before any response was received.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TransportFailure {
    /// The call did not complete before its deadline.
    Timeout,
    /// The connection could not be established.
    Connect,
    /// A response arrived but could not be decoded.
    MalformedResponse,
    /// Any other transport-level problem (request building, redirects, I/O).
    Other,
}

impl Display for TransportFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransportFailure::Timeout => "timeout",
            TransportFailure::Connect => "connection failed",
            TransportFailure::MalformedResponse => "malformed response",
            TransportFailure::Other => "transport error",
        };
        f.write_str(name)
    }
}

/// Structured failure payload carried by [`Resource::Error`](crate::Resource::Error).
///
/// Network-layer and application-layer failures are both represented here,
/// so that a single `Error` variant is enough for every pipeline run while
/// the distinction stays available to the presentation layer. `Internal`
/// covers calls that broke on the client side without reaching a result.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ErrorDetail {
    /// No response was received.
    #[error("{kind}: {message}")]
    Transport {
        kind: TransportFailure,
        message: String,
    },

    /// A response was received with an error status.
    #[error("HTTP {status}{}", fmt_body(.body))]
    Protocol { status: u16, body: Option<String> },

    /// The call itself failed, e.g. it panicked or produced no result.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ErrorDetail {
    pub fn transport(kind: TransportFailure, message: impl Into<String>) -> Self {
        ErrorDetail::Transport {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout() -> Self {
        Self::transport(TransportFailure::Timeout, "deadline has elapsed")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ErrorDetail::Internal {
            message: message.into(),
        }
    }

    /// Builds a protocol failure. An empty body is stored as `None`.
    pub fn protocol(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        ErrorDetail::Protocol {
            status,
            body: if body.is_empty() { None } else { Some(body) },
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ErrorDetail::Transport { .. })
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, ErrorDetail::Protocol { .. })
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ErrorDetail::Internal { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ErrorDetail::Transport {
                kind: TransportFailure::Timeout,
                ..
            }
        )
    }

    /// HTTP status of a protocol failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ErrorDetail::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body of a protocol failure. Other failures never carry one.
    pub fn body(&self) -> Option<&str> {
        match self {
            ErrorDetail::Protocol { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    pub fn transport_kind(&self) -> Option<TransportFailure> {
        match self {
            ErrorDetail::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ErrorDetail {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return ErrorDetail::Protocol {
                status: status.as_u16(),
                body: None,
            };
        }
        let kind = if error.is_timeout() {
            TransportFailure::Timeout
        } else if error.is_connect() {
            TransportFailure::Connect
        } else if error.is_decode() {
            TransportFailure::MalformedResponse
        } else {
            TransportFailure::Other
        };
        ErrorDetail::transport(kind, error.to_string())
    }
}

impl From<serde_json::Error> for ErrorDetail {
    fn from(error: serde_json::Error) -> Self {
        ErrorDetail::transport(TransportFailure::MalformedResponse, error.to_string())
    }
}

fn fmt_body(body: &Option<String>) -> String {
    match body {
        Some(body) => format!(": {body}"),
        None => String::new(),
    }
}

/// Client-side input failure, reported before any remote call is made.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("unknown task status: {0}")]
    UnknownStatus(String),

    #[error("no user is logged in")]
    NotLoggedIn,
}
