// ── Core error types ──
//
// User-facing errors from issuedesk-core. Consumers never see raw HTTP
// machinery; the `From<issuedesk_api::Error>` impl sorts transport
// failures into "no response" (connection, timeout), "session rejected",
// and "server said no", keeping the server's own wording for the last.

use std::time::Duration;

use thiserror::Error;

use crate::gate::GateRejection;

const REJECTED_FALLBACK: &str = "The server rejected the request";

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Gate ─────────────────────────────────────────────────────────
    /// Refused locally; nothing was sent to the server.
    #[error(transparent)]
    Gate(#[from] GateRejection),

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Server did not respond within {}s", .timeout.as_secs_f64())]
    Timeout { timeout: Duration },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The server answered `401`; the stored session is gone.
    #[error("Session expired: {}", .message.as_deref().unwrap_or("log in again"))]
    SessionExpired { message: Option<String> },

    #[error("Not logged in")]
    NotLoggedIn,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    /// The server received the request and refused it. Displays the
    /// server's message verbatim when there was one.
    #[error("{}", .message.as_deref().unwrap_or(REJECTED_FALLBACK))]
    Rejected { status: u16, message: Option<String> },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// No response was received. The session is untouched.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }

    /// The user has to log in (again) before retrying.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::SessionExpired { .. } | Self::NotLoggedIn | Self::AuthenticationFailed { .. }
        )
    }

    /// Turn a `404` rejection into a typed `NotFound` for a known entity.
    pub(crate) fn or_not_found(self, entity_type: &str, identifier: &str) -> Self {
        match self {
            Self::Rejected { status: 404, .. } => Self::NotFound {
                entity_type: entity_type.to_owned(),
                identifier: identifier.to_owned(),
            },
            other => other,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<issuedesk_api::Error> for CoreError {
    fn from(err: issuedesk_api::Error) -> Self {
        use issuedesk_api::Error as Api;
        match err {
            Api::Unauthorized { message } => CoreError::SessionExpired { message },
            Api::NoSession => CoreError::NotLoggedIn,
            Api::Transport(ref e) => CoreError::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: e.to_string(),
            },
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Timeout { timeout } => CoreError::Timeout { timeout },
            Api::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            Api::Api { status, message } => CoreError::Rejected { status, message },
            Api::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unreadable server response: {message}"))
            }
            Api::UnexpectedShape(msg) => CoreError::Internal(msg),
        }
    }
}
