// ── Issuance records ──

use serde::Serialize;

use super::common::WireOrigin;
use super::entity_id::EntityId;
use super::timestamp::Timestamp;

/// One hand-over of a recorder to an employee.
///
/// The record is open while `return_date` is absent. Names and numbers
/// are denormalized copies made by the server at issue time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceRecord {
    pub id: EntityId,
    pub employee_id: Option<EntityId>,
    pub employee_name: Option<String>,
    #[serde(rename = "videoRecorderId")]
    pub device_id: Option<EntityId>,
    #[serde(rename = "videoRecorderNumber")]
    pub device_number: Option<String>,
    pub issue_date: Option<Timestamp>,
    pub return_date: Option<Timestamp>,
    pub issued_by_user_id: Option<EntityId>,
    pub issued_by_username: Option<String>,
    pub returned_by_user_id: Option<EntityId>,
    pub returned_by_username: Option<String>,

    #[serde(skip)]
    pub(crate) origin: WireOrigin,
}

impl IssuanceRecord {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            employee_id: None,
            employee_name: None,
            device_id: None,
            device_number: None,
            issue_date: None,
            return_date: None,
            issued_by_user_id: None,
            issued_by_username: None,
            returned_by_user_id: None,
            returned_by_username: None,
            origin: WireOrigin::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    pub fn involves_employee(&self, employee_id: &EntityId) -> bool {
        self.employee_id.as_ref() == Some(employee_id)
    }

    pub fn involves_device(&self, device_id: &EntityId) -> bool {
        self.device_id.as_ref() == Some(device_id)
    }

    /// Recorder label for display, falling back to `#<recorder id>`.
    pub fn device_label(&self) -> String {
        match (&self.device_number, &self.device_id) {
            (Some(number), _) => number.clone(),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => "-".to_owned(),
        }
    }

    pub fn origin(&self) -> &WireOrigin {
        &self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_until_returned() {
        let mut record = IssuanceRecord::new(1);
        assert!(record.is_open());
        record.return_date = Some(Timestamp::parse("2024-01-02T00:00:00Z"));
        assert!(!record.is_open());
    }

    #[test]
    fn device_label_falls_back_to_id() {
        let mut record = IssuanceRecord::new(1);
        record.device_id = Some(EntityId::from(7));
        assert_eq!(record.device_label(), "#7");
        record.device_number = Some("VR-7".into());
        assert_eq!(record.device_label(), "VR-7");
    }
}
