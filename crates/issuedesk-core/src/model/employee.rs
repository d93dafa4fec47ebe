// ── Employee domain types ──

use serde::Serialize;

use super::common::WireOrigin;
use super::entity_id::EntityId;
use super::timestamp::Timestamp;

/// A person who may hold at most one recorder at a time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EntityId,
    pub full_name: Option<String>,
    pub position: Option<String>,
    pub employee_number: Option<String>,
    /// Photo URL as the server stored it. See
    /// [`Normalizer::photo_url`](crate::convert::Normalizer::photo_url)
    /// for the derived fallback.
    pub photo_url: Option<String>,
    pub created_at: Option<Timestamp>,

    #[serde(skip)]
    pub(crate) origin: WireOrigin,
}

impl Employee {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            full_name: None,
            position: None,
            employee_number: None,
            photo_url: None,
            created_at: None,
            origin: WireOrigin::default(),
        }
    }

    /// Display name, falling back to the employee number and then the id.
    pub fn label(&self) -> String {
        self.full_name
            .clone()
            .or_else(|| self.employee_number.clone())
            .unwrap_or_else(|| format!("#{}", self.id))
    }

    pub fn origin(&self) -> &WireOrigin {
        &self.origin
    }
}
