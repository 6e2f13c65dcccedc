//! Error types for the provider.

use std::fmt;

/// Transport-level failure cause, as far as it can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCause {
    /// Host name could not be resolved.
    Dns,
    /// Remote refused the connection.
    ConnectionRefused,
    /// Request or connect deadline exceeded.
    Timeout,
    /// Socket-level failure (reset, broken pipe, TLS).
    Socket,
    /// Anything else reqwest reports before a response exists.
    Other,
}

impl fmt::Display for TransportCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Dns => "DNS resolution failed",
            Self::ConnectionRefused => "connection refused",
            Self::Timeout => "deadline exceeded",
            Self::Socket => "socket error",
            Self::Other => "transport error",
        };
        f.write_str(text)
    }
}

/// Provider errors.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No response was received from the server.
    #[error("{cause}: {message}")]
    Transport {
        cause: TransportCause,
        message: String,
    },

    /// The server answered with a status the operation does not accept.
    #[error("unexpected response status {status}: {body}")]
    ServerProtocol { status: u16, body: String },

    /// Object does not exist on the server (HTTP 404).
    #[error("not found: {what}")]
    NotFound { what: String },

    /// Declared configuration is invalid. Raised before any network call.
    #[error("invalid value for {attribute}: {message}")]
    Validation { attribute: String, message: String },

    /// Internal contract violation (wrong handler, unknown property, bad type).
    #[error("internal error: {message}")]
    Programming { message: String },

    /// Provider configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Response body could not be decoded.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// The call context was cancelled while the request was in flight.
    #[error("operation cancelled")]
    Cancelled,
}

impl ProviderError {
    pub(crate) fn validation(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    pub(crate) fn programming(message: impl Into<String>) -> Self {
        Self::Programming {
            message: message.into(),
        }
    }

    /// Whether this is a 404 from the server.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the failure happened before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Cancelled)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let cause = classify_transport(&err);
        Self::Transport {
            cause,
            message: err.to_string(),
        }
    }
}

fn classify_transport(err: &reqwest::Error) -> TransportCause {
    if err.is_timeout() {
        return TransportCause::Timeout;
    }

    // reqwest hides hyper/io errors behind its source chain
    let mut source: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(err);
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            return match io.kind() {
                std::io::ErrorKind::ConnectionRefused => TransportCause::ConnectionRefused,
                std::io::ErrorKind::TimedOut => TransportCause::Timeout,
                _ => TransportCause::Socket,
            };
        }
        let text = inner.to_string().to_ascii_lowercase();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return TransportCause::Dns;
        }
        source = inner.source();
    }

    if err.is_connect() {
        TransportCause::Socket
    } else {
        TransportCause::Other
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
