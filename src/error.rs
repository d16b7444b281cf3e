use serde::Serialize;
use thiserror::Error;

/// Errors raised while building, sending or reading activity queries.
#[derive(Debug, Error)]
pub enum Error {
    /// A query or aggregation was set up with invalid input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A response did not have the shape the query asked for.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// The provider or the network failed the request.
    #[error("provider error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Provider {
        status: Option<u16>,
        message: String,
    },

    /// No credential was available for the provider host.
    #[error("authentication error: {0}")]
    Authentication(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Error::Extraction(message.into())
    }

    pub fn provider(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Provider {
            status,
            message: message.into(),
        }
    }

    /// Short name of the error family, used in serialized reports.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Extraction(_) => ErrorKind::Extraction,
            Error::Provider { .. } => ErrorKind::Provider,
            Error::Authentication(_) => ErrorKind::Authentication,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Extraction,
    Provider,
    Authentication,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_includes_status() {
        let err = Error::provider(Some(502), "bad gateway");
        assert_eq!(err.to_string(), "provider error (HTTP 502): bad gateway");
    }

    #[test]
    fn test_provider_message_without_status() {
        let err = Error::provider(None, "connection reset");
        assert_eq!(err.to_string(), "provider error: connection reset");
    }
}
