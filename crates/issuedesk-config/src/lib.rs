//! Shared configuration for issuedesk.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! session token storage in the system keyring, and the auth and TLS
//! parts of `issuedesk_core::ControllerConfig`. The CLI assembles the
//! full config with its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use issuedesk_core::{AuthCredentials, TlsVerification};

/// Keyring service name; entries are `{profile}/password` and `{profile}/token`.
pub const KEYRING_SERVICE: &str = "issuedesk";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "ISSUEDESK_CONFIG";

/// Server the client was originally deployed against.
pub const DEFAULT_SERVER: &str = "http://158.160.9.21:5000/api";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    15
}

/// A named server profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL (e.g., "http://10.0.0.5:5000/api").
    pub server: String,

    /// Operator username.
    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

impl Profile {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn url(&self) -> Result<url::Url, ConfigError> {
        self.server.parse().map_err(|_| ConfigError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {}", self.server),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$ISSUEDESK_CONFIG`, else the
/// platform config dir.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "issuedesk", "issuedesk").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("issuedesk");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file, then `ISSUEDESK_*` env vars.
///
/// Nested keys use a double underscore: `ISSUEDESK_DEFAULTS__TIMEOUT=30`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ISSUEDESK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Keyring ─────────────────────────────────────────────────────────

fn entry(profile_name: &str, item: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/{item}"),
    )?)
}

fn read_entry(profile_name: &str, item: &str) -> Option<SecretString> {
    let secret = entry(profile_name, item).ok()?.get_password();
    match secret {
        Ok(value) => Some(SecretString::from(value)),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            debug!(profile = profile_name, item, error = %e, "keyring read failed");
            None
        }
    }
}

fn delete_entry(profile_name: &str, item: &str) -> Result<(), ConfigError> {
    match entry(profile_name, item)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    entry(profile_name, "password")?.set_password(password.expose_secret())?;
    Ok(())
}

/// The session token saved by the last login, if any.
pub fn load_token(profile_name: &str) -> Option<SecretString> {
    read_entry(profile_name, "token")
}

/// Persist the session token. This is the only state kept between runs.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    entry(profile_name, "token")?.set_password(token.expose_secret())?;
    Ok(())
}

/// Forget the session token (logout, or after the server rejected it).
pub fn clear_token(profile_name: &str) -> Result<(), ConfigError> {
    delete_entry(profile_name, "token")
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the password from the credential chain (no CLI flag step).
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Well-known env var
    if let Ok(pw) = std::env::var("ISSUEDESK_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    // 3. System keyring
    if let Some(pw) = read_entry(profile_name, "password") {
        return Ok(pw);
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve username + password without CLI flags.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("ISSUEDESK_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    let password = resolve_password(profile, profile_name)?;
    Ok((username, password))
}

/// Combine a stored token and resolvable credentials.
///
/// Neither is required: with nothing configured only `login` works.
pub fn resolve_auth(
    token: Option<SecretString>,
    credentials: Option<(String, SecretString)>,
) -> AuthCredentials {
    match (token, credentials) {
        (Some(token), Some((username, password))) => AuthCredentials::TokenOrCredentials {
            token,
            username,
            password,
        },
        (Some(token), None) => AuthCredentials::Token(token),
        (None, Some((username, password))) => AuthCredentials::Credentials { username, password },
        (None, None) => AuthCredentials::Anonymous,
    }
}

/// TLS strategy for a profile. Unlike LAN appliances, the issuance
/// server is expected to have a valid certificate, so strict is default.
pub fn tls_for(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(cfg.active_profile_name(), "default");
        assert_eq!(cfg.defaults.timeout, 15);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        let mut profile = Profile::new("http://10.0.0.5:5000/api");
        profile.username = Some("operator".into());
        profile.timeout = Some(30);
        cfg.profiles.insert("office".into(), profile);
        cfg.default_profile = Some("office".into());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.active_profile_name(), "office");
        let office = &loaded.profiles["office"];
        assert_eq!(office.server, "http://10.0.0.5:5000/api");
        assert_eq!(office.username.as_deref(), Some("operator"));
        assert_eq!(office.timeout, Some(30));
    }

    #[test]
    fn profile_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "field"

[defaults]
output = "json"

[profiles.field]
server = "https://issue.example.org/api"
password_env = "FIELD_PW"
insecure = true
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");
        let field = &cfg.profiles["field"];
        assert_eq!(field.password_env.as_deref(), Some("FIELD_PW"));
        assert_eq!(
            tls_for(field, &cfg.defaults),
            TlsVerification::DangerAcceptInvalid
        );
    }

    #[test]
    fn strict_tls_by_default() {
        let profile = Profile::new(DEFAULT_SERVER);
        assert_eq!(
            tls_for(&profile, &Defaults::default()),
            TlsVerification::SystemDefaults
        );
    }

    #[test]
    fn invalid_server_url() {
        let profile = Profile::new("not a url");
        assert!(matches!(
            profile.url(),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn auth_combinations() {
        let token = || Some(SecretString::from("t".to_owned()));
        let creds = || Some(("op".to_owned(), SecretString::from("pw".to_owned())));

        assert!(matches!(
            resolve_auth(token(), creds()),
            AuthCredentials::TokenOrCredentials { .. }
        ));
        assert!(matches!(resolve_auth(token(), None), AuthCredentials::Token(_)));
        assert!(matches!(
            resolve_auth(None, creds()),
            AuthCredentials::Credentials { .. }
        ));
        assert!(matches!(resolve_auth(None, None), AuthCredentials::Anonymous));
    }
}
