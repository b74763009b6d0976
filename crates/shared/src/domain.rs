use std::fmt;

use serde::{Deserialize, Serialize};

/// Route identifier that means "no existing record, create a new one".
pub const NEW_EMPLOYEE_SENTINEL: &str = "-1";

/// Employee record as exchanged with the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub email: String,
    pub designation: String,
}

impl Employee {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        designation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            designation: designation.into(),
        }
    }

    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self::new(self.name.trim(), self.email.trim(), self.designation.trim())
    }
}

/// Backend key of an existing employee. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a form bound to a route identifier is editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeTarget {
    New,
    Existing(EmployeeId),
}

impl EmployeeTarget {
    /// Parses a navigation identifier. Returns `None` for a blank identifier.
    pub fn from_route_id(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw == NEW_EMPLOYEE_SENTINEL {
            return Some(Self::New);
        }
        Some(Self::Existing(EmployeeId(raw.to_string())))
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::New)
    }

    pub fn existing_id(&self) -> Option<&EmployeeId> {
        match self {
            Self::New => None,
            Self::Existing(id) => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_route_id_targets_new_record() {
        assert_eq!(EmployeeTarget::from_route_id("-1"), Some(EmployeeTarget::New));
        assert_eq!(EmployeeTarget::from_route_id(" -1 "), Some(EmployeeTarget::New));
    }

    #[test]
    fn other_route_ids_target_existing_records() {
        let target = EmployeeTarget::from_route_id("42").expect("target");
        assert_eq!(target.existing_id(), Some(&EmployeeId("42".into())));
        assert!(!target.is_new());
    }

    #[test]
    fn blank_route_id_is_rejected() {
        assert_eq!(EmployeeTarget::from_route_id(""), None);
        assert_eq!(EmployeeTarget::from_route_id("   "), None);
    }

    #[test]
    fn employee_wire_shape_uses_plain_field_names() {
        let json = serde_json::to_value(Employee::new("Ann", "ann@x.com", "Eng")).expect("json");
        assert_eq!(
            json,
            serde_json::json!({"name": "Ann", "email": "ann@x.com", "designation": "Eng"})
        );
    }
}
