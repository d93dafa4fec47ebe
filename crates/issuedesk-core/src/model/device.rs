// ── Video recorder domain types ──

use serde::Serialize;
use std::fmt;

use super::common::WireOrigin;
use super::entity_id::EntityId;
use super::timestamp::Timestamp;

/// Recorder status as reported by the server.
///
/// Only `available` and `issued` carry meaning here; anything else is
/// kept verbatim so it survives a round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum DeviceStatus {
    Available,
    Issued,
    Other(String),
}

impl DeviceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Available => "available",
            Self::Issued => "issued",
            Self::Other(s) => s,
        }
    }

    /// Parse a wire status. Matching is case-insensitive; unknown values
    /// keep their original spelling.
    pub fn from_wire(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Self::Available,
            "issued" => Self::Issued,
            _ => Self::Other(s.to_owned()),
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DeviceStatus> for String {
    fn from(status: DeviceStatus) -> Self {
        status.as_str().to_owned()
    }
}

impl std::str::FromStr for DeviceStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_wire(s))
    }
}

/// A video recorder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: EntityId,
    /// Human-readable number; may arrive as `number`, `serialNumber` or `name`.
    pub number: Option<String>,
    pub status: Option<DeviceStatus>,
    pub created_at: Option<Timestamp>,

    #[serde(skip)]
    pub(crate) origin: WireOrigin,
}

impl Device {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            number: None,
            status: None,
            created_at: None,
            origin: WireOrigin::default(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.status, Some(DeviceStatus::Available))
    }

    /// The recorder number, or `#id` when the server sent none.
    pub fn label(&self) -> String {
        self.number
            .clone()
            .unwrap_or_else(|| format!("#{}", self.id))
    }

    pub fn origin(&self) -> &WireOrigin {
        &self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(DeviceStatus::from_wire("Available"), DeviceStatus::Available);
        assert_eq!(DeviceStatus::from_wire("ISSUED"), DeviceStatus::Issued);
    }

    #[test]
    fn unknown_status_keeps_spelling() {
        let status = DeviceStatus::from_wire("In Repair");
        assert_eq!(status.as_str(), "In Repair");
    }

    #[test]
    fn label_falls_back_to_id() {
        let device = Device::new(12);
        assert_eq!(device.label(), "#12");
    }
}
