use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::AttendanceEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

/// An attendance record as the backend stored it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(rename = "turma_id")]
    pub class_id: i64,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "presencas")]
    pub entries: Vec<AttendanceEntry>,
}

impl StoredRecord {
    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|e| e.present).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentStatistics {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "matricula")]
    pub enrollment_code: String,
    #[serde(rename = "presencas")]
    pub presences: u32,
    #[serde(rename = "faltas")]
    pub absences: u32,
    #[serde(rename = "taxa_presenca", default)]
    pub presence_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStatistics {
    #[serde(rename = "turma_id")]
    pub class_id: i64,
    #[serde(rename = "total_alunos")]
    pub total_students: u32,
    #[serde(rename = "total_aulas")]
    pub total_lessons: u32,
    #[serde(rename = "taxa_presenca_media")]
    pub mean_presence_rate: f64,
    #[serde(rename = "alunos_estatisticas", default)]
    pub students: Vec<StudentStatistics>,
}
