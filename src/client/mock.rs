use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::StatusCode;

use crate::client::{AttendanceReports, AttendanceSubmitter, ClassDirectoryClient, RosterClient};
use crate::error::ApiError;
use crate::models::{
    AttendanceRecord, ClassStatistics, ClassSummary, HealthStatus, RosterEntry, StoredRecord,
    StudentId, StudentStatistics,
};

/// In-memory backend used for demos and offline runs.
pub struct MockAttendanceClient {
    data: Mutex<MockData>,
}

struct MockData {
    classes: Vec<ClassSummary>,
    students: Vec<RosterEntry>,
    records: Vec<StoredRecord>,
}

impl MockAttendanceClient {
    pub fn new(classes: Vec<ClassSummary>, students: Vec<RosterEntry>) -> Self {
        Self {
            data: Mutex::new(MockData {
                classes,
                students,
                records: Vec::new(),
            }),
        }
    }

    /// Two classes of four students each.
    pub fn seeded() -> Self {
        let names = [
            ("2024001", 1, "Ana Silva"),
            ("2024002", 1, "Bruno Costa"),
            ("2024003", 1, "Carlos Santos"),
            ("2024004", 1, "Diana Oliveira"),
            ("2024005", 2, "Eduardo Lima"),
            ("2024006", 2, "Fernanda Souza"),
            ("2024007", 2, "Gabriel Pereira"),
            ("2024008", 2, "Helena Rodrigues"),
        ];
        let students = names
            .iter()
            .map(|(code, class_id, name)| RosterEntry {
                id: StudentId::Text(code.to_string()),
                name: name.to_string(),
                enrollment_code: Some(code.to_string()),
                class_id: Some(*class_id),
                present: None,
            })
            .collect();
        let classes = vec![
            ClassSummary {
                id: 1,
                name: "1st Year A - Mathematics".to_string(),
                student_count: Some(4),
            },
            ClassSummary {
                id: 2,
                name: "1st Year B - Mathematics".to_string(),
                student_count: Some(4),
            },
        ];

        Self::new(classes, students)
    }

    fn data(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockAttendanceClient {
    fn default() -> Self {
        Self::seeded()
    }
}

impl MockData {
    fn roster(&self, class_id: i64) -> Vec<&RosterEntry> {
        self.students
            .iter()
            .filter(|s| s.class_id == Some(class_id))
            .collect()
    }
}

#[async_trait]
impl ClassDirectoryClient for MockAttendanceClient {
    async fn fetch_classes(&self) -> Result<Vec<ClassSummary>, ApiError> {
        Ok(self.data().classes.clone())
    }
}

#[async_trait]
impl RosterClient for MockAttendanceClient {
    async fn fetch_roster(&self, class_id: i64) -> Result<Vec<RosterEntry>, ApiError> {
        let data = self.data();
        let roster = data.roster(class_id);
        if roster.is_empty() {
            return Err(ApiError::not_found(format!(
                "No students found in class {}",
                class_id
            )));
        }

        Ok(roster
            .into_iter()
            .map(|s| RosterEntry {
                present: Some(true),
                ..s.clone()
            })
            .collect())
    }
}

#[async_trait]
impl AttendanceSubmitter for MockAttendanceClient {
    async fn submit_attendance(&self, record: &AttendanceRecord) -> Result<Option<String>, ApiError> {
        let mut data = self.data();
        data.records
            .retain(|r| !(r.class_id == record.class_id && r.date == record.date));
        data.records.push(StoredRecord {
            class_id: record.class_id,
            date: record.date,
            timestamp: Some(Utc::now().to_rfc3339()),
            entries: record.entries.clone(),
        });
        tracing::debug!(
            "mock stored {} entries for class {} on {}",
            record.entries.len(),
            record.class_id,
            record.date
        );
        Ok(Some("Attendance saved successfully".to_string()))
    }
}

#[async_trait]
impl AttendanceReports for MockAttendanceClient {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        Ok(HealthStatus {
            status: "online".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        })
    }

    async fn fetch_records(
        &self,
        class_id: Option<i64>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<StoredRecord>, ApiError> {
        Ok(self
            .data()
            .records
            .iter()
            .filter(|r| class_id.is_none_or(|id| r.class_id == id))
            .filter(|r| date.is_none_or(|d| r.date == d))
            .cloned()
            .collect())
    }

    async fn fetch_statistics(&self, class_id: i64) -> Result<ClassStatistics, ApiError> {
        let data = self.data();
        let roster = data.roster(class_id);
        let lessons: Vec<&StoredRecord> = data
            .records
            .iter()
            .filter(|r| r.class_id == class_id)
            .collect();

        let mut students: Vec<StudentStatistics> = roster
            .iter()
            .map(|s| {
                let mut stats = StudentStatistics {
                    name: s.name.clone(),
                    enrollment_code: s.id.to_string(),
                    presences: 0,
                    absences: 0,
                    presence_rate: 0.0,
                };
                for entry in lessons.iter().flat_map(|r| r.entries.iter()) {
                    if entry.student_id == s.id {
                        if entry.present {
                            stats.presences += 1;
                        } else {
                            stats.absences += 1;
                        }
                    }
                }
                let total = stats.presences + stats.absences;
                if total > 0 {
                    stats.presence_rate = f64::from(stats.presences) / f64::from(total) * 100.0;
                }
                stats
            })
            .collect();

        if lessons.is_empty() {
            students.clear();
        }

        let mean = if students.is_empty() {
            0.0
        } else {
            let sum: f64 = students.iter().map(|s| s.presence_rate).sum();
            (sum / students.len() as f64 * 100.0).round() / 100.0
        };

        Ok(ClassStatistics {
            class_id,
            total_students: roster.len() as u32,
            total_lessons: lessons.len() as u32,
            mean_presence_rate: mean,
            students,
        })
    }

    async fn search_students(&self, query: &str) -> Result<Vec<RosterEntry>, ApiError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(ApiError::server(
                StatusCode::BAD_REQUEST,
                Some("Validation error: parameter \"q\" is required".to_string()),
            ));
        }

        Ok(self
            .data()
            .students
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
