// ── Operator accounts ──

use serde::Serialize;

use super::entity_id::EntityId;
use super::timestamp::Timestamp;

/// The authenticated operator, as reported by `auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub role_id: Option<EntityId>,
    pub created_at: Option<Timestamp>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role_is("admin")
    }

    pub fn is_operator(&self) -> bool {
        self.role_is("operator")
    }

    fn role_is(&self, name: &str) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(name))
    }

    pub fn display_name(&self) -> String {
        self.full_name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}
