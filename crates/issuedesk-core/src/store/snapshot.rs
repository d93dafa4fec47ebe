// ── Immutable view of server state ──

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::model::{Device, Employee, EntityId, IssuanceRecord};

/// Employees, recorders and open issuance records fetched together.
///
/// Snapshots are never mutated; a refresh builds a new one. All gate
/// decisions are made against a single snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub employees: Vec<Employee>,
    pub devices: Vec<Device>,
    pub open_records: Vec<IssuanceRecord>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build a snapshot, keeping only records that are actually open.
    pub fn new(
        employees: Vec<Employee>,
        devices: Vec<Device>,
        active: Vec<IssuanceRecord>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let total = active.len();
        let open_records: Vec<IssuanceRecord> =
            active.into_iter().filter(IssuanceRecord::is_open).collect();
        if open_records.len() != total {
            debug!(
                dropped = total - open_records.len(),
                "active list contained returned records"
            );
        }
        Self {
            employees,
            devices,
            open_records,
            fetched_at,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), Utc::now())
    }

    pub fn employee(&self, id: &EntityId) -> Option<&Employee> {
        self.employees.iter().find(|e| &e.id == id)
    }

    pub fn device(&self, id: &EntityId) -> Option<&Device> {
        self.devices.iter().find(|d| &d.id == id)
    }

    /// First open record held by the employee.
    pub fn open_record_for_employee(&self, id: &EntityId) -> Option<&IssuanceRecord> {
        self.open_records.iter().find(|r| r.involves_employee(id))
    }

    /// First open record covering the recorder.
    pub fn open_record_for_device(&self, id: &EntityId) -> Option<&IssuanceRecord> {
        self.open_records.iter().find(|r| r.involves_device(id))
    }

    /// Look up a recorder by its human number (case-insensitive).
    pub fn device_by_number(&self, number: &str) -> Option<&Device> {
        self.devices.iter().find(|d| {
            d.number
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(number))
        })
    }

    /// Look up an employee by personnel number (case-insensitive).
    pub fn employee_by_number(&self, number: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| {
            e.employee_number
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(number))
        })
    }
}
