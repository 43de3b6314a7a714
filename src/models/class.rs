use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "quantidade_alunos", default, skip_serializing_if = "Option::is_none")]
    pub student_count: Option<u32>,
}

impl ClassSummary {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            student_count: None,
        }
    }

    /// Placeholder directory shown when the backend cannot be reached.
    pub fn placeholders() -> Vec<ClassSummary> {
        vec![
            ClassSummary {
                id: 1,
                name: "1st Year A - Mathematics (Mock)".to_string(),
                student_count: Some(0),
            },
            ClassSummary {
                id: 2,
                name: "1st Year B - Mathematics (Mock)".to_string(),
                student_count: Some(0),
            },
        ]
    }
}
