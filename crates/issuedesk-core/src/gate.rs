// ── Issuance consistency rules ──
//
// Pure functions over a snapshot. They decide whether an issue or return
// is locally known to be invalid; they never change state. The server
// re-validates everything, so an `Ok` here is necessary, not sufficient.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use issuedesk_api::HistoryQuery;

use crate::model::{Device, DeviceStatus, Employee, EntityId, IssuanceRecord};
use crate::store::Snapshot;

// ── Gate rejections ────────────────────────────────────────────────

/// Why a recorder cannot be handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailability {
    /// The recorder is not in the snapshot.
    Unknown,
    /// The recorder's status is not `available` (or is missing).
    Status(Option<DeviceStatus>),
    /// An open record already covers the recorder.
    Held { employee_id: Option<EntityId> },
}

impl fmt::Display for Unavailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("not found"),
            Self::Status(Some(status)) => write!(f, "status is {status}"),
            Self::Status(None) => f.write_str("status is unknown"),
            Self::Held {
                employee_id: Some(id),
            } => write!(f, "held by employee {id}"),
            Self::Held { employee_id: None } => f.write_str("already issued"),
        }
    }
}

/// A typed reason an issue or return was refused before reaching the server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateRejection {
    #[error("Employee {employee_id} already holds a recorder{}", held_suffix(.device_id.as_ref()))]
    EmployeeAlreadyHolding {
        employee_id: EntityId,
        device_id: Option<EntityId>,
    },

    #[error("Recorder {device_id} is unavailable: {reason}")]
    DeviceUnavailable {
        device_id: EntityId,
        reason: Unavailability,
    },

    #[error("Employee {employee_id} has no open issuance of recorder {device_id}")]
    NoOpenIssuance {
        employee_id: EntityId,
        device_id: EntityId,
    },
}

fn held_suffix(device_id: Option<&EntityId>) -> String {
    device_id.map_or_else(String::new, |id| format!(" ({id})"))
}

// ── Gates ──────────────────────────────────────────────────────────

/// Check whether `device_id` may be issued to `employee_id`.
///
/// The employee check runs first: an employee already holding a recorder
/// is reported as such even when the recorder is also unavailable.
pub fn can_issue(
    snapshot: &Snapshot,
    employee_id: &EntityId,
    device_id: &EntityId,
) -> Result<(), GateRejection> {
    if let Some(open) = snapshot.open_record_for_employee(employee_id) {
        return Err(GateRejection::EmployeeAlreadyHolding {
            employee_id: employee_id.clone(),
            device_id: open.device_id.clone(),
        });
    }

    let unavailable = |reason| GateRejection::DeviceUnavailable {
        device_id: device_id.clone(),
        reason,
    };

    let Some(device) = snapshot.device(device_id) else {
        return Err(unavailable(Unavailability::Unknown));
    };
    if !device.is_available() {
        return Err(unavailable(Unavailability::Status(device.status.clone())));
    }
    if let Some(open) = snapshot.open_record_for_device(device_id) {
        return Err(unavailable(Unavailability::Held {
            employee_id: open.employee_id.clone(),
        }));
    }
    Ok(())
}

/// Check whether `employee_id` can hand `device_id` back.
pub fn can_return(
    snapshot: &Snapshot,
    employee_id: &EntityId,
    device_id: &EntityId,
) -> Result<(), GateRejection> {
    let matched = snapshot
        .open_records
        .iter()
        .any(|r| r.involves_employee(employee_id) && r.involves_device(device_id));
    if matched {
        Ok(())
    } else {
        Err(GateRejection::NoOpenIssuance {
            employee_id: employee_id.clone(),
            device_id: device_id.clone(),
        })
    }
}

// ── Derivations ────────────────────────────────────────────────────

/// Recorders not referenced by any open record, in snapshot order.
pub fn available_devices(snapshot: &Snapshot) -> Vec<&Device> {
    snapshot
        .devices
        .iter()
        .filter(|d| snapshot.open_record_for_device(&d.id).is_none())
        .collect()
}

/// Employees not referenced by any open record, in snapshot order.
pub fn unencumbered_employees(snapshot: &Snapshot) -> Vec<&Employee> {
    snapshot
        .employees
        .iter()
        .filter(|e| snapshot.open_record_for_employee(&e.id).is_none())
        .collect()
}

// ── History ────────────────────────────────────────────────────────

/// Filters over issuance history. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub employee_id: Option<EntityId>,
    pub device_id: Option<EntityId>,
    /// Inclusive lower bound on the issue date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the issue date.
    pub date_to: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn has_date_bounds(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }

    pub fn matches(&self, record: &IssuanceRecord) -> bool {
        if let Some(id) = &self.employee_id {
            if !record.involves_employee(id) {
                return false;
            }
        }
        if let Some(id) = &self.device_id {
            if !record.involves_device(id) {
                return false;
            }
        }
        if !self.has_date_bounds() {
            return true;
        }
        // With a date bound set, records without a usable issue date cannot
        // be placed in the range.
        let Some(day) = record.issue_date.as_ref().and_then(|ts| ts.date()) else {
            return false;
        };
        self.date_from.is_none_or(|from| day >= from) && self.date_to.is_none_or(|to| day <= to)
    }

    /// Server-side query parameters for the same filter.
    pub fn to_query(&self) -> HistoryQuery {
        HistoryQuery {
            employee_id: self.employee_id.as_ref().map(ToString::to_string),
            video_recorder_id: self.device_id.as_ref().map(ToString::to_string),
            date_from: self.date_from.map(|d| d.format("%Y-%m-%d").to_string()),
            date_to: self.date_to.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Apply `filter` to `records`, preserving the given order.
pub fn partition_history(records: &[IssuanceRecord], filter: &HistoryFilter) -> Vec<IssuanceRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

// ── Audit ──────────────────────────────────────────────────────────

/// A server snapshot that breaks one of the issuance invariants.
///
/// These are never repaired locally; they are reported so an operator
/// can take them up with whoever runs the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvariantViolation {
    #[error("employee {employee_id} has {} open records", .record_ids.len())]
    EmployeeHoldsMultiple {
        employee_id: EntityId,
        record_ids: Vec<EntityId>,
    },

    #[error("recorder {device_id} has {} open records", .record_ids.len())]
    DeviceInMultipleRecords {
        device_id: EntityId,
        record_ids: Vec<EntityId>,
    },

    #[error("recorder {device_id} is marked issued but has no open record")]
    IssuedWithoutRecord { device_id: EntityId },

    #[error("recorder {device_id} is not marked issued but open record {record_id} covers it")]
    OpenRecordNotIssued {
        device_id: EntityId,
        record_id: EntityId,
    },

    #[error("record {record_id} was returned before it was issued")]
    ReturnBeforeIssue { record_id: EntityId },
}

impl InvariantViolation {
    /// The serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmployeeHoldsMultiple { .. } => "employee_holds_multiple",
            Self::DeviceInMultipleRecords { .. } => "device_in_multiple_records",
            Self::IssuedWithoutRecord { .. } => "issued_without_record",
            Self::OpenRecordNotIssued { .. } => "open_record_not_issued",
            Self::ReturnBeforeIssue { .. } => "return_before_issue",
        }
    }
}

/// Check a snapshot against the issuance invariants.
pub fn audit(snapshot: &Snapshot) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    violations.extend(
        duplicates(&snapshot.open_records, |r| r.employee_id.as_ref()).into_iter().map(
            |(employee_id, record_ids)| InvariantViolation::EmployeeHoldsMultiple {
                employee_id,
                record_ids,
            },
        ),
    );
    violations.extend(
        duplicates(&snapshot.open_records, |r| r.device_id.as_ref()).into_iter().map(
            |(device_id, record_ids)| InvariantViolation::DeviceInMultipleRecords {
                device_id,
                record_ids,
            },
        ),
    );

    for device in &snapshot.devices {
        let open = snapshot.open_record_for_device(&device.id);
        let issued = matches!(device.status, Some(DeviceStatus::Issued));
        match (issued, open) {
            (true, None) => violations.push(InvariantViolation::IssuedWithoutRecord {
                device_id: device.id.clone(),
            }),
            (false, Some(record)) => violations.push(InvariantViolation::OpenRecordNotIssued {
                device_id: device.id.clone(),
                record_id: record.id.clone(),
            }),
            _ => {}
        }
    }

    violations.extend(audit_records(&snapshot.open_records));
    violations
}

/// Per-record checks, usable on history as well as open records.
pub fn audit_records(records: &[IssuanceRecord]) -> Vec<InvariantViolation> {
    records
        .iter()
        .filter(|r| {
            matches!(
                (&r.issue_date, &r.return_date),
                (Some(issued), Some(returned))
                    if issued.cmp_instant(returned) == Some(std::cmp::Ordering::Greater)
            )
        })
        .map(|r| InvariantViolation::ReturnBeforeIssue {
            record_id: r.id.clone(),
        })
        .collect()
}

/// Keys referenced by more than one record, in first-seen order.
fn duplicates<'a>(
    records: &'a [IssuanceRecord],
    key: impl Fn(&'a IssuanceRecord) -> Option<&'a EntityId>,
) -> Vec<(EntityId, Vec<EntityId>)> {
    let mut order: Vec<&EntityId> = Vec::new();
    let mut groups: HashMap<&EntityId, Vec<EntityId>> = HashMap::new();
    for record in records {
        if let Some(k) = key(record) {
            let group = groups.entry(k).or_default();
            if group.is_empty() {
                order.push(k);
            }
            group.push(record.id.clone());
        }
    }
    order
        .into_iter()
        .filter_map(|k| {
            let ids = groups.remove(k)?;
            (ids.len() > 1).then(|| (k.clone(), ids))
        })
        .collect()
}
