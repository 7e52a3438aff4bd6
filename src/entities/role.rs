//! User role entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl Role {
    pub const ENTITY: &'static str = "roles";

    pub fn new(name: &str, description: &str, is_admin: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            is_admin,
            created_at: Utc::now(),
        }
    }

    /// Serialize to a storage record
    pub fn record(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("role serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_role() {
        let role = Role::new("Administrator", "Full system access", true);
        assert!(role.is_admin);
        assert!(!role.id.is_empty());
    }

    #[test]
    fn test_record_round_trip() {
        let role = Role::new("Viewer", "Read-only", false);
        let record = role.record();
        let parsed: Role = serde_json::from_value(record).unwrap();
        assert_eq!(parsed.id, role.id);
        assert!(!parsed.is_admin);
    }
}
