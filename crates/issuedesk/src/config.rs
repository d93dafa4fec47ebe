//! CLI configuration: thin wrapper around `issuedesk_config`.
//!
//! Adds the resolution steps that respect `GlobalOpts` flag overrides
//! (--server, --username, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use issuedesk_config::ConfigError;
use issuedesk_core::{AuthCredentials, ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use issuedesk_config::{
    Config, Defaults, Profile, clear_token, config_path, load_config_or_default, save_config,
    store_password, store_token,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// The profile to talk to, plus its name (the keyring namespace).
///
/// Without a stored profile `--server` alone is enough.
pub fn resolve_target(global: &GlobalOpts) -> Result<(String, ControllerConfig), CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match (cfg.profiles.get(&profile_name), &global.server) {
        (Some(profile), _) => profile.clone(),
        (None, Some(server)) => Profile::new(server.clone()),
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    let auth = issuedesk_config::resolve_auth(
        issuedesk_config::load_token(&profile_name),
        resolve_credentials(&profile, &profile_name, global).ok(),
    );
    let config = build_controller_config(&profile, &cfg.defaults, global, auth)?;
    Ok((profile_name, config))
}

/// Username from `--username` or the profile; password from the chain.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<(String, SecretString), ConfigError> {
    match global.username {
        Some(ref username) => Ok((
            username.clone(),
            issuedesk_config::resolve_password(profile, profile_name)?,
        )),
        None => issuedesk_config::resolve_credentials(profile, profile_name),
    }
}

/// Translate a `Profile` + global flags into a `ControllerConfig`.
///
/// Flags take priority over profile values, which take priority over
/// the `[defaults]` table.
pub fn build_controller_config(
    profile: &Profile,
    defaults: &Defaults,
    global: &GlobalOpts,
    auth: AuthCredentials,
) -> Result<ControllerConfig, CliError> {
    let server = global.server.as_deref().unwrap_or(&profile.server);
    let url: url::Url = server.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {server}"),
    })?;

    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        issuedesk_config::tls_for(profile, defaults)
    };

    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(defaults.timeout);

    Ok(ControllerConfig {
        url,
        auth,
        tls,
        timeout: Duration::from_secs(timeout),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["issuedesk"];
        argv.extend_from_slice(args);
        argv.push("active");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn profile_values_apply_without_flags() {
        let mut profile = Profile::new("http://10.0.0.5:5000/api");
        profile.timeout = Some(40);
        let cfg = build_controller_config(
            &profile,
            &Defaults::default(),
            &global(&[]),
            AuthCredentials::Anonymous,
        )
        .unwrap();
        assert_eq!(cfg.url.as_str(), "http://10.0.0.5:5000/api");
        assert_eq!(cfg.timeout, Duration::from_secs(40));
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn flags_override_profile() {
        let mut profile = Profile::new("http://10.0.0.5:5000/api");
        profile.timeout = Some(40);
        let cfg = build_controller_config(
            &profile,
            &Defaults::default(),
            &global(&["--server", "https://other.example/api", "--timeout", "5", "-k"]),
            AuthCredentials::Anonymous,
        )
        .unwrap();
        assert_eq!(cfg.url.host_str(), Some("other.example"));
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn profile_tls_settings_apply() {
        let mut profile = Profile::new("https://issue.example/api");
        profile.ca_cert = Some("/etc/issuedesk/ca.pem".into());
        let cfg = build_controller_config(
            &profile,
            &Defaults::default(),
            &global(&[]),
            AuthCredentials::Anonymous,
        )
        .unwrap();
        assert_eq!(
            cfg.tls,
            TlsVerification::CustomCa("/etc/issuedesk/ca.pem".into())
        );

        profile.insecure = Some(true);
        let cfg = build_controller_config(
            &profile,
            &Defaults::default(),
            &global(&[]),
            AuthCredentials::Anonymous,
        )
        .unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn defaults_fill_the_gaps() {
        let cfg = build_controller_config(
            &Profile::new("http://10.0.0.5:5000/api"),
            &Defaults::default(),
            &global(&[]),
            AuthCredentials::Anonymous,
        )
        .unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(15));
    }

    #[test]
    fn bad_server_url_is_a_usage_error() {
        let err = build_controller_config(
            &Profile::new("not a url"),
            &Defaults::default(),
            &global(&[]),
            AuthCredentials::Anonymous,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
