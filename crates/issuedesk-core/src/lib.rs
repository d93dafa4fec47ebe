//! Domain layer between `issuedesk-api` and the CLI.
//!
//! This crate owns the domain model, the rules that keep recorder
//! issuance consistent, and the snapshot the rules run against:
//!
//! - **[`Controller`]**: Facade over one server. [`connect()`](Controller::connect)
//!   validates or re-establishes the session, [`refresh()`](Controller::refresh)
//!   fetches employees, recorders and open records into a new [`Snapshot`], and
//!   [`execute()`](Controller::execute) runs a [`Command`]: gate, send, refresh.
//!
//! - **[`gate`]**: Pure checks over a snapshot: [`gate::can_issue`],
//!   [`gate::can_return`], availability derivations, history filtering and an
//!   invariant [`gate::audit`].
//!
//! - **[`convert`]**: Field tables that map the server's mixed snake_case /
//!   camelCase payloads to canonical records and back, preserving the spelling
//!   each field arrived with.
//!
//! - **[`query`]**: Case-insensitive free-text search over snapshot lists.
//!
//! - **Domain model** ([`model`]): `Employee`, `Device`, `IssuanceRecord`,
//!   `User`, with [`EntityId`] accepting both numeric and string ids.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod gate;
pub mod model;
pub mod query;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::requests::{
    CreateEmployeeRequest, CreateRecorderRequest, DEFAULT_ROLE_ID, EMPLOYEE_NUMBER_MAX_CHARS,
    RegisterRequest, UpdateEmployeeRequest, UpdateRecorderRequest,
};
pub use command::{Command, CommandResult, DeleteOutcome};
pub use config::{AuthCredentials, ControllerConfig, TlsVerification};
pub use controller::Controller;
pub use convert::{CanonicalRecord, Normalizer, RecordKind};
pub use error::CoreError;
pub use gate::{GateRejection, HistoryFilter, InvariantViolation, Unavailability};
pub use store::Snapshot;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Device, DeviceStatus, Employee, EntityId, IssuanceRecord, Timestamp, User, WireOrigin,
};
