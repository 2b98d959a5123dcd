/// Errors raised below the session layer while opening or reading the
/// streaming HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent (DNS, connect, TLS, serialization).
    #[error("request failed: {message}")]
    Request { message: String },
    /// The backend answered with a non-success HTTP status.
    #[error("backend returned status {status}: {message}")]
    Http { status: u16, message: String },
    /// Reading the response body stream failed mid-flight.
    #[error("stream read failed: {message}")]
    Read { message: String },
}

impl TransportError {
    /// Creates a request-level error.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Creates an HTTP status error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a stream read error.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }
}

/// Top-level error type for the public session API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatStreamError {
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid caller input (for example an empty query).
    #[error("validation error: {0}")]
    Validation(String),
    /// Network or HTTP failure surfaced by the transport.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The backend signalled failure inside the stream itself.
    #[error("backend error: {message}")]
    Backend { message: String },
    /// The attempt was cancelled by the caller.
    ///
    /// Cancellation is not a failure: callers are expected to match on this
    /// variant and swallow it rather than report it.
    #[error("stream cancelled")]
    Cancelled,
}

impl ChatStreamError {
    /// Returns true for caller-initiated cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
