//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use issuedesk_config::ConfigError;
use issuedesk_core::{CoreError, GateRejection};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the server at {url}")]
    #[diagnostic(
        code(issuedesk::connection_failed),
        help(
            "Check the server address and your network.\n\
             Reason: {reason}\n\
             The stored session was kept; retry when the server is back."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {}s", .timeout.as_secs_f64())]
    #[diagnostic(
        code(issuedesk::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout { timeout: Duration },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(issuedesk::auth_failed),
        help("Check the username and password, then run: issuedesk login")
    )]
    AuthFailed { message: String },

    #[error("Session expired")]
    #[diagnostic(
        code(issuedesk::session_expired),
        help(
            "The server no longer accepts the stored session.\n\
             Run: issuedesk login"
        )
    )]
    SessionExpired,

    #[error("Not logged in")]
    #[diagnostic(
        code(issuedesk::not_logged_in),
        help(
            "Run: issuedesk login\n\
             Or store a password with: issuedesk config set-password"
        )
    )]
    NotLoggedIn,

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(issuedesk::no_credentials),
        help(
            "Pass --username or configure one with: issuedesk config init\n\
             The password is read from ISSUEDESK_PASSWORD, the keyring or a prompt."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(issuedesk::not_found),
        help("Run: issuedesk {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Issuance rules ───────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(issuedesk::refused),
        help("Nothing was sent to the server. Run: issuedesk active")
    )]
    Refused(#[from] GateRejection),

    // ── Server ───────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(issuedesk::rejected))]
    Rejected { status: u16, message: String },

    #[error("{failed} of {total} deletions failed")]
    #[diagnostic(
        code(issuedesk::partial_failure),
        help("The other records were deleted. See the report above for each failure.")
    )]
    PartialFailure { failed: usize, total: usize },

    #[error("{0}")]
    #[diagnostic(code(issuedesk::internal))]
    Internal(String),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(issuedesk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(issuedesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: issuedesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(issuedesk::no_config),
        help(
            "Create a profile with: issuedesk config init\n\
             Or pass --server. Config file: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(issuedesk::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(issuedesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. }
            | Self::SessionExpired
            | Self::NotLoggedIn
            | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Refused(_) | Self::Rejected { status: 409, .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

fn list_command(entity_type: &str) -> String {
    match entity_type.to_ascii_lowercase().as_str() {
        "employee" => "employees list".into(),
        "recorder" => "recorders list".into(),
        _ => "history list".into(),
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Gate(rejection) => CliError::Refused(rejection),

            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout { timeout } => CliError::Timeout { timeout },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::SessionExpired { .. } => CliError::SessionExpired,

            CoreError::NotLoggedIn => CliError::NotLoggedIn,

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command(&entity_type),
                resource_type: entity_type,
                identifier,
            },

            // Display already falls back to a generic message.
            err @ CoreError::Rejected { status, .. } => CliError::Rejected {
                status,
                message: err.to_string(),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "server".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use issuedesk_core::EntityId;

    #[test]
    fn gate_rejection_is_a_conflict() {
        let err = CliError::from(CoreError::Gate(GateRejection::EmployeeAlreadyHolding {
            employee_id: EntityId::from(1),
            device_id: None,
        }));
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
    }

    #[test]
    fn server_message_is_kept() {
        let err = CliError::from(CoreError::Rejected {
            status: 400,
            message: Some("Видеорегистратор уже выдан".into()),
        });
        assert_eq!(err.to_string(), "Видеорегистратор уже выдан");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn not_found_points_at_list_command() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "Recorder".into(),
            identifier: "7".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(matches!(
            err,
            CliError::NotFound { ref list_command, .. } if list_command == "recorders list"
        ));
    }

    #[test]
    fn network_failures_have_their_own_codes() {
        let conn = CliError::from(CoreError::ConnectionFailed {
            url: "http://x".into(),
            reason: "refused".into(),
        });
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);
        let timeout = CliError::from(CoreError::Timeout {
            timeout: Duration::from_secs(15),
        });
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
        assert_eq!(timeout.to_string(), "Request timed out after 15s");
    }
}
