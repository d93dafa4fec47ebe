// ── Domain model ──

pub mod common;
pub mod device;
pub mod employee;
pub mod entity_id;
pub mod issuance;
pub mod timestamp;
pub mod user;

pub use common::WireOrigin;
pub use device::{Device, DeviceStatus};
pub use employee::Employee;
pub use entity_id::EntityId;
pub use issuance::IssuanceRecord;
pub use timestamp::Timestamp;
pub use user::User;
