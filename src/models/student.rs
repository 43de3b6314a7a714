use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque student identifier. Numeric and alphanumeric ids keep their JSON
/// type so they go back to the backend exactly as they came in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudentId {
    Number(i64),
    Text(String),
}

impl StudentId {
    /// Matches a user-typed token against this id, ignoring the JSON type.
    pub fn matches(&self, token: &str) -> bool {
        match self {
            StudentId::Number(n) => token.trim().parse::<i64>().is_ok_and(|t| t == *n),
            StudentId::Text(s) => s == token.trim(),
        }
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudentId::Number(n) => f.pad(&n.to_string()),
            StudentId::Text(s) => f.pad(s),
        }
    }
}

impl From<i64> for StudentId {
    fn from(value: i64) -> Self {
        StudentId::Number(value)
    }
}

impl From<&str> for StudentId {
    fn from(value: &str) -> Self {
        StudentId::Text(value.to_string())
    }
}

/// A student as the roster endpoint returns it. `presente` may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: StudentId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "matricula", default, skip_serializing_if = "Option::is_none")]
    pub enrollment_code: Option<String>,
    #[serde(rename = "turma_id", default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(rename = "presente", default, skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub enrollment_code: Option<String>,
    pub present: bool,
}

impl Student {
    pub const DEFAULT_PRESENT: bool = true;
}

impl From<RosterEntry> for Student {
    fn from(entry: RosterEntry) -> Self {
        Student {
            id: entry.id,
            name: entry.name,
            enrollment_code: entry.enrollment_code,
            present: entry.present.unwrap_or(Student::DEFAULT_PRESENT),
        }
    }
}
