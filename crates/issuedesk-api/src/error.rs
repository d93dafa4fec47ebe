use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `issuedesk-api` crate.
///
/// Keeps the three failure classes the server can produce apart:
/// no response at all (transport), an authentication rejection (`401`),
/// and any other error status. `issuedesk-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The server answered `401`. The session has already been evicted.
    #[error("Unauthorized: {}", message.as_deref().unwrap_or("session expired or invalid credentials"))]
    Unauthorized { message: Option<String> },

    /// A request that needs a token was attempted without one.
    #[error("Not logged in")]
    NoSession,

    // ── Transport ───────────────────────────────────────────────────
    /// No response received (connection refused, DNS failure, TLS, ...).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {}s", .timeout.as_secs_f64())]
    Timeout { timeout: Duration },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server ──────────────────────────────────────────────────────
    /// The server received the request and rejected it.
    ///
    /// `message` is the server-provided `message` (or `detail`) field,
    /// verbatim, when the body carried one.
    #[error("Server error (HTTP {status}): {}", message.as_deref().unwrap_or("no details"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A response parsed, but lacked a field the caller depends on.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl Error {
    /// Returns `true` if no response was received from the server.
    ///
    /// Network failures never imply the credentials were wrong and must
    /// not evict the session.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout { .. } | Self::Tls(_))
    }

    /// Returns `true` if the server rejected the session (`401`).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a "not found" response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// HTTP status of a server rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }

    /// The server-provided message, verbatim, when the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } | Self::Unauthorized { message } => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_server_message() {
        let err = Error::Api {
            status: 409,
            message: Some("Сотруднику уже выдан видеорегистратор".into()),
        };
        assert_eq!(
            err.server_message(),
            Some("Сотруднику уже выдан видеорегистратор")
        );
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_network());
    }

    #[test]
    fn timeout_is_network_not_auth() {
        let err = Error::Timeout {
            timeout: Duration::from_secs(15),
        };
        assert!(err.is_network());
        assert!(!err.is_unauthorized());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn unauthorized_display_falls_back() {
        let err = Error::Unauthorized { message: None };
        assert!(err.to_string().contains("session expired"));
    }
}
