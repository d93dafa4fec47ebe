// ── Runtime connection configuration ──
//
// Describes how to reach the issuance server and who to log in as.
// Carries credential data but never touches disk; the CLI builds a
// `ControllerConfig` from its profile and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use issuedesk_api::transport::DEFAULT_TIMEOUT;

/// How to authenticate with the server.
#[derive(Debug, Clone, Default)]
pub enum AuthCredentials {
    /// Resume a stored bearer token.
    Token(SecretString),
    /// Log in with username and password.
    Credentials {
        username: String,
        password: SecretString,
    },
    /// Try the stored token; if the server rejects it, log in again.
    TokenOrCredentials {
        token: SecretString,
        username: String,
        password: SecretString,
    },
    /// No credentials. Only `login` and `register` are usable.
    #[default]
    Anonymous,
}

impl AuthCredentials {
    pub fn token(&self) -> Option<&SecretString> {
        match self {
            Self::Token(token) | Self::TokenOrCredentials { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn login(&self) -> Option<(&str, &SecretString)> {
        match self {
            Self::Credentials { username, password }
            | Self::TokenOrCredentials {
                username, password, ..
            } => Some((username, password)),
            _ => None,
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for talking to one issuance server.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// API base URL, e.g. `http://158.160.9.21:5000/api`.
    pub url: Url,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    /// Per-request timeout. There are no retries.
    pub timeout: Duration,
}

impl ControllerConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            auth: AuthCredentials::default(),
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
