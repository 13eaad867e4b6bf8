//! Error types for the EchoMind client.

/// Top-level error type for the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure: connection refused, timeout, TLS, DNS.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    ///
    /// `message` carries the server's `{error}` string when one was sent.
    #[error(
        "API error (HTTP {status}): {}",
        message.as_deref().unwrap_or("no error message")
    )]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// Response body was not the JSON we expected.
    #[error("parse error: {0}")]
    Parse(String),

    /// Local key-value storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Speech synthesis error.
    #[error("speech error: {0}")]
    Speech(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// Host command with a missing or malformed payload.
    #[error("invalid command: {0}")]
    Command(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// The server-provided message, if this is an application error that
    /// carried one. Shells show it verbatim instead of a generic fallback.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Whether the failure happened before any response arrived.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status_and_message() {
        let err = ClientError::Api {
            status: 400,
            message: Some("Message is required".to_owned()),
        };
        assert_eq!(
            err.to_string(),
            "API error (HTTP 400): Message is required"
        );
        assert_eq!(err.server_message(), Some("Message is required"));
    }

    #[test]
    fn api_error_without_message_has_no_server_message() {
        let err = ClientError::Api {
            status: 502,
            message: None,
        };
        assert!(err.to_string().contains("502"));
        assert!(err.server_message().is_none());
        assert!(!err.is_transport());
    }

    #[test]
    fn network_error_is_transport() {
        assert!(ClientError::Network("refused".into()).is_transport());
    }
}
