//! Transport error type.

use std::fmt;

/// Failure setting up or driving upload transfers. Per-task outcomes (HTTP
/// status, server `error` text) are not errors here; they arrive as
/// `TransportEvent::Failed`.
#[derive(Debug)]
pub enum TransportError {
    /// Curl rejected an option on an easy handle.
    Curl(curl::Error),
    /// The multi handle failed (perform, wait, add or remove).
    Multi(curl::MultiError),
    /// Building the multipart form failed.
    Form(curl::FormError),
    /// The local file could not be opened for reading.
    Io(std::io::Error),
    /// Endpoint URL could not be built from the server base.
    Url(url::ParseError),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Curl(e) => write!(f, "{}", e),
            TransportError::Multi(e) => write!(f, "curl multi: {}", e),
            TransportError::Form(e) => write!(f, "multipart form: {}", e),
            TransportError::Io(e) => write!(f, "{}", e),
            TransportError::Url(e) => write!(f, "upload URL: {}", e),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Curl(e) => Some(e),
            TransportError::Multi(e) => Some(e),
            TransportError::Form(e) => Some(e),
            TransportError::Io(e) => Some(e),
            TransportError::Url(e) => Some(e),
        }
    }
}

impl From<curl::Error> for TransportError {
    fn from(e: curl::Error) -> Self {
        TransportError::Curl(e)
    }
}

impl From<curl::MultiError> for TransportError {
    fn from(e: curl::MultiError) -> Self {
        TransportError::Multi(e)
    }
}

impl From<curl::FormError> for TransportError {
    fn from(e: curl::FormError) -> Self {
        TransportError::Form(e)
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io(e)
    }
}

impl From<url::ParseError> for TransportError {
    fn from(e: url::ParseError) -> Self {
        TransportError::Url(e)
    }
}
