//! Shared helpers for command handlers.

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use issuedesk_core::{Controller, EntityId, Snapshot, User};

use crate::config;
use crate::error::CliError;

// ── Session ─────────────────────────────────────────────────────────

/// Validate the stored session, logging in from configured credentials
/// if the server rejected it.
pub async fn establish(controller: &Controller) -> Result<User, CliError> {
    Ok(controller.connect().await?)
}

/// Mirror the controller's session into the keyring: store a new token,
/// drop one the server evicted or the user logged out of.
pub fn sync_stored_token(controller: &Controller, profile: &str, stored: Option<&SecretString>) {
    let current = controller.session().token();
    let result = match (stored, current) {
        (stored, Some(current))
            if stored.is_none_or(|s| s.expose_secret() != current.expose_secret()) =>
        {
            debug!(profile, "storing session token");
            config::store_token(profile, &current)
        }
        (Some(_), None) => {
            debug!(profile, "removing stored session token");
            config::clear_token(profile)
        }
        _ => Ok(()),
    };
    if let Err(e) = result {
        warn!(profile, error = %e, "could not update stored session");
    }
}

// ── Identifier resolution ───────────────────────────────────────────

/// An employee id or personnel number. Unknown values pass through as ids.
pub fn resolve_employee(snapshot: &Snapshot, identifier: &str) -> EntityId {
    let id = EntityId::from(identifier);
    if snapshot.employee(&id).is_some() {
        return id;
    }
    snapshot
        .employee_by_number(identifier)
        .map_or(id, |e| e.id.clone())
}

/// A recorder id or number. Unknown values pass through as ids.
pub fn resolve_recorder(snapshot: &Snapshot, identifier: &str) -> EntityId {
    let id = EntityId::from(identifier);
    if snapshot.device(&id).is_some() {
        return id;
    }
    snapshot
        .device_by_number(identifier)
        .map_or(id, |d| d.id.clone())
}

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("expected YYYY-MM-DD, got '{value}'"),
    })
}

// ── Prompts ─────────────────────────────────────────────────────────

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|_| CliError::NonInteractiveRequiresYes {
            action: message.into(),
        })
}

/// Map a dialoguer / terminal failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn prompt_password(label: &str) -> Result<SecretString, CliError> {
    let password = rpassword::prompt_password(label).map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use issuedesk_core::{Device, Employee};

    fn snapshot() -> Snapshot {
        let mut employee = Employee::new(7);
        employee.employee_number = Some("A001".into());
        let mut device = Device::new(3);
        device.number = Some("VR-010".into());
        Snapshot::new(vec![employee], vec![device], Vec::new(), Utc::now())
    }

    #[test]
    fn ids_and_numbers_both_resolve() {
        let snap = snapshot();
        assert_eq!(resolve_employee(&snap, "7"), EntityId::from(7));
        assert_eq!(resolve_employee(&snap, "A001"), EntityId::from(7));
        assert_eq!(resolve_recorder(&snap, "VR-010"), EntityId::from(3));
        assert_eq!(resolve_recorder(&snap, "3"), EntityId::from(3));
    }

    #[test]
    fn unknown_identifiers_pass_through() {
        let snap = snapshot();
        assert_eq!(resolve_recorder(&snap, "99"), EntityId::from(99));
    }

    #[test]
    fn dates_are_iso() {
        assert_eq!(
            parse_date("from", "2024-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(parse_date("from", "01.03.2024").is_err());
    }
}
