// ── Typed request payloads ──
//
// Serialized straight into the snake_case bodies the server expects.
// Update requests carry only the fields being changed.

use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};

use crate::error::CoreError;
use crate::model::{DeviceStatus, EntityId};

/// Personnel numbers longer than this are refused before submission.
pub const EMPLOYEE_NUMBER_MAX_CHARS: usize = 6;

/// Role assigned to accounts registered without an explicit role.
pub const DEFAULT_ROLE_ID: i64 = 2;

fn required(value: &str, what: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(format!("{what} is required")));
    }
    Ok(())
}

fn check_employee_number(number: &str) -> Result<(), CoreError> {
    required(number, "Employee number")?;
    if number.trim().chars().count() > EMPLOYEE_NUMBER_MAX_CHARS {
        return Err(CoreError::validation(format!(
            "Employee number must be at most {EMPLOYEE_NUMBER_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

// ── Employees ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateEmployeeRequest {
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub employee_number: String,
}

impl CreateEmployeeRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        required(&self.full_name, "Full name")?;
        check_employee_number(&self.employee_number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateEmployeeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<String>,
}

impl UpdateEmployeeRequest {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.is_empty() {
            return Err(CoreError::validation("Nothing to update"));
        }
        if let Some(name) = &self.full_name {
            required(name, "Full name")?;
        }
        if let Some(number) = &self.employee_number {
            check_employee_number(number)?;
        }
        Ok(())
    }
}

// ── Video recorders ────────────────────────────────────────────────

/// New recorders always start out available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRecorderRequest {
    pub number: String,
    pub status: DeviceStatus,
}

impl CreateRecorderRequest {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            status: DeviceStatus::Available,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        required(&self.number, "Recorder number")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateRecorderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
}

impl UpdateRecorderRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self == &Self::default() {
            return Err(CoreError::validation("Nothing to update"));
        }
        if let Some(number) = &self.number {
            required(number, "Recorder number")?;
        }
        Ok(())
    }
}

// ── Accounts ───────────────────────────────────────────────────────

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Operator account registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub role_id: EntityId,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        required(&self.username, "Username")?;
        required(self.password.expose_secret(), "Password")?;
        required(&self.last_name, "Last name")?;
        required(&self.first_name, "First name")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn create_employee_payload_is_snake_case() {
        let req = CreateEmployeeRequest {
            full_name: "Иванов Иван".into(),
            position: None,
            employee_number: "A001".into(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"full_name": "Иванов Иван", "employee_number": "A001"})
        );
    }

    #[test]
    fn employee_number_length_counts_chars() {
        let mut req = CreateEmployeeRequest {
            full_name: "X".into(),
            position: None,
            employee_number: "АБВГДЕ".into(),
        };
        assert!(req.validate().is_ok());
        req.employee_number = "1234567".into();
        assert!(matches!(req.validate(), Err(CoreError::ValidationFailed { .. })));
    }

    #[test]
    fn blank_full_name_is_refused() {
        let req = CreateEmployeeRequest {
            full_name: "  ".into(),
            position: None,
            employee_number: "1".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_carries_only_set_fields() {
        let req = UpdateEmployeeRequest {
            position: Some("Driver".into()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"position": "Driver"}));
        assert!(UpdateEmployeeRequest::default().validate().is_err());
    }

    #[test]
    fn new_recorder_is_available() {
        let req = CreateRecorderRequest::new("VR-9");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"number": "VR-9", "status": "available"})
        );
        assert!(CreateRecorderRequest::new(" ").validate().is_err());
    }

    #[test]
    fn register_payload_exposes_password() {
        let req = RegisterRequest {
            username: "op".into(),
            password: SecretString::from("pw".to_owned()),
            last_name: "Иванов".into(),
            first_name: "Иван".into(),
            middle_name: String::new(),
            role_id: EntityId::from(DEFAULT_ROLE_ID),
        };
        assert!(req.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "username": "op",
                "password": "pw",
                "last_name": "Иванов",
                "first_name": "Иван",
                "middle_name": "",
                "role_id": 2
            })
        );
    }
}
