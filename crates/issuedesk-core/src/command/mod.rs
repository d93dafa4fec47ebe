// ── Mutating operations ──
//
// Every write goes through `Controller::execute`, which gates it against
// the current snapshot, sends it, and refreshes afterwards.

pub mod requests;

use serde::Serialize;

use crate::model::{Device, Employee, EntityId};

pub use requests::{
    CreateEmployeeRequest, CreateRecorderRequest, RegisterRequest, UpdateEmployeeRequest,
    UpdateRecorderRequest,
};

#[derive(Debug, Clone)]
pub enum Command {
    // ── Issuance ─────────────────────────────────────────────────────
    Issue {
        employee_id: EntityId,
        device_id: EntityId,
    },
    Return {
        employee_id: EntityId,
        device_id: EntityId,
    },
    DeleteIssue {
        id: EntityId,
    },
    /// Delete several history records, one at a time.
    DeleteIssues {
        ids: Vec<EntityId>,
    },

    // ── Employees ────────────────────────────────────────────────────
    CreateEmployee(CreateEmployeeRequest),
    UpdateEmployee {
        id: EntityId,
        update: UpdateEmployeeRequest,
    },
    DeleteEmployee {
        id: EntityId,
    },

    // ── Video recorders ──────────────────────────────────────────────
    CreateRecorder(CreateRecorderRequest),
    UpdateRecorder {
        id: EntityId,
        update: UpdateRecorderRequest,
    },
    DeleteRecorder {
        id: EntityId,
    },
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Issue { .. } => "issue",
            Self::Return { .. } => "return",
            Self::DeleteIssue { .. } => "delete_issue",
            Self::DeleteIssues { .. } => "delete_issues",
            Self::CreateEmployee(_) => "create_employee",
            Self::UpdateEmployee { .. } => "update_employee",
            Self::DeleteEmployee { .. } => "delete_employee",
            Self::CreateRecorder(_) => "create_recorder",
            Self::UpdateRecorder { .. } => "update_recorder",
            Self::DeleteRecorder { .. } => "delete_recorder",
        }
    }
}

#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    Employee(Option<Employee>),
    Recorder(Option<Device>),
    Deleted(Vec<DeleteOutcome>),
}

/// Result of one item in a bulk history delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub id: EntityId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteOutcome {
    pub fn succeeded(id: EntityId) -> Self {
        Self {
            id,
            success: true,
            error: None,
        }
    }

    pub fn failed(id: EntityId, error: impl Into<String>) -> Self {
        Self {
            id,
            success: false,
            error: Some(error.into()),
        }
    }
}
