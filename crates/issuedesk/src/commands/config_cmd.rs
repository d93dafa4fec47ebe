//! Config subcommand handlers. None of these talk to the server.

use std::fmt::Write as _;

use dialoguer::{Input, Select};
use secrecy::{ExposeSecret, SecretString};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking the plaintext password.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

fn redacted(cfg: Config) -> Config {
    let mut cfg = cfg;
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("****".into());
        }
    }
    cfg
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Store the password in the keyring, or hand it back for the config file.
fn choose_password_storage(
    profile_name: &str,
    password: &SecretString,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
        "Don't store; ask at login",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(util::prompt_err)?;

    match selection {
        0 => {
            config::store_password(profile_name, password)?;
            eprintln!("   ✓ Password stored in system keyring");
            Ok(None)
        }
        1 => Ok(Some(password.expose_secret().to_owned())),
        _ => Ok(None),
    }
}

fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    let invalid = |field: &str, reason: &str| CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    };
    match key {
        "server" => {
            value
                .parse::<url::Url>()
                .map_err(|_| invalid("server", "must be a URL like http://host:5000/api"))?;
            profile.server = value;
        }
        "username" => profile.username = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "insecure" => {
            profile.insecure = Some(
                value
                    .parse()
                    .map_err(|_| invalid("insecure", "must be 'true' or 'false'"))?,
            );
        }
        "timeout" => {
            profile.timeout = Some(
                value
                    .parse()
                    .map_err(|_| invalid("timeout", "must be a number (seconds)"))?,
            );
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: server, username, \
                     password_env, insecure, timeout, ca_cert"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("issuedesk configuration");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(util::prompt_err)?;

            let server: String = Input::new()
                .with_prompt("API base URL")
                .default(issuedesk_config::DEFAULT_SERVER.into())
                .interact_text()
                .map_err(util::prompt_err)?;

            let username: String = Input::new()
                .with_prompt("Username (empty to ask at login)")
                .allow_empty(true)
                .interact_text()
                .map_err(util::prompt_err)?;

            let mut profile = Profile::new(server);
            profile.url()?;
            if !username.is_empty() {
                profile.username = Some(username);
                let password = util::prompt_password("Password: ")?;
                profile.password = choose_password_storage(&profile_name, &password)?;
            }

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Next: issuedesk login");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |c| {
                c.active_profile_name().to_owned()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile::new(issuedesk_config::DEFAULT_SERVER));
            set_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            output::notice(
                &format!("✓ Set {key} on profile '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.active_profile_name();
            if cfg.profiles.is_empty() {
                output::notice("No profiles configured. Run: issuedesk config init", global.quiet);
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, profile_name));
            }

            let password = util::prompt_password("Password: ")?;
            config::store_password(&profile_name, &password)?;
            output::notice(
                &format!("✓ Password stored in system keyring for profile '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }
    }
}
