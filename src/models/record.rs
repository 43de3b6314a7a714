use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Student, StudentId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    #[serde(rename = "aluno_id")]
    pub student_id: StudentId,
    #[serde(rename = "presente")]
    pub present: bool,
}

/// Outbound payload for one class on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "turma_id")]
    pub class_id: i64,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "presencas")]
    pub entries: Vec<AttendanceEntry>,
}

impl AttendanceRecord {
    pub fn from_roster(class_id: i64, date: NaiveDate, roster: &[Student]) -> Self {
        let entries = roster
            .iter()
            .map(|s| AttendanceEntry {
                student_id: s.id.clone(),
                present: s.present,
            })
            .collect();

        Self {
            class_id,
            date,
            entries,
        }
    }
}
