pub mod dto;
pub mod mock;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::models::{
    AttendanceRecord, ClassStatistics, ClassSummary, HealthStatus, RosterEntry, StoredRecord,
};

pub use mock::MockAttendanceClient;

#[async_trait]
pub trait ClassDirectoryClient: Send + Sync {
    async fn fetch_classes(&self) -> Result<Vec<ClassSummary>, ApiError>;
}

#[async_trait]
pub trait RosterClient: Send + Sync {
    async fn fetch_roster(&self, class_id: i64) -> Result<Vec<RosterEntry>, ApiError>;
}

#[async_trait]
pub trait AttendanceSubmitter: Send + Sync {
    /// Returns the server's confirmation message, if it sent one.
    async fn submit_attendance(&self, record: &AttendanceRecord) -> Result<Option<String>, ApiError>;
}

#[async_trait]
pub trait AttendanceReports: Send + Sync {
    async fn health(&self) -> Result<HealthStatus, ApiError>;
    async fn fetch_records(
        &self,
        class_id: Option<i64>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<StoredRecord>, ApiError>;
    async fn fetch_statistics(&self, class_id: i64) -> Result<ClassStatistics, ApiError>;
    /// Case-insensitive name search across every class. `query` must not be empty.
    async fn search_students(&self, query: &str) -> Result<Vec<RosterEntry>, ApiError>;
}

pub struct HttpAttendanceClient {
    client: Client,
    base_url: String,
}

impl HttpAttendanceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::Request(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ApiError::Request(format!("Invalid URL {}: {}", raw, e)))
    }

    async fn get_data<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        read_envelope::<T>(response).await?.into_data()
    }
}

/// Turns a response into its envelope. Non-2xx statuses and `success: false`
/// both come back as `ApiError::Server` with whatever message the body had.
async fn read_envelope<T: DeserializeOwned>(
    response: Response,
) -> Result<dto::Envelope<T>, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<dto::ErrorBody>(&body)
            .unwrap_or_default()
            .message;
        tracing::warn!("backend returned {}: {}", status, body);
        return Err(ApiError::server(status, message));
    }

    let envelope: dto::Envelope<T> = serde_json::from_str(&body).map_err(|e| {
        tracing::error!("Failed to parse: {}", e);
        ApiError::Decode(format!("Failed to parse response: {}", e))
    })?;

    if !envelope.success {
        return Err(ApiError::server(status, envelope.message));
    }

    Ok(envelope)
}

#[async_trait]
impl ClassDirectoryClient for HttpAttendanceClient {
    async fn fetch_classes(&self) -> Result<Vec<ClassSummary>, ApiError> {
        self.get_data(self.url("/turmas")?).await
    }
}

#[async_trait]
impl RosterClient for HttpAttendanceClient {
    async fn fetch_roster(&self, class_id: i64) -> Result<Vec<RosterEntry>, ApiError> {
        self.get_data(self.url(&format!("/turmas/{}/alunos", class_id))?)
            .await
    }
}

#[async_trait]
impl AttendanceSubmitter for HttpAttendanceClient {
    async fn submit_attendance(&self, record: &AttendanceRecord) -> Result<Option<String>, ApiError> {
        let url = self.url("/presencas")?;
        tracing::debug!("POST {} ({} entries)", url, record.entries.len());

        let response = self.client.post(url).json(record).send().await?;
        let envelope = read_envelope::<serde_json::Value>(response).await?;
        Ok(envelope.message)
    }
}

#[async_trait]
impl AttendanceReports for HttpAttendanceClient {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_data(self.url("/health")?).await
    }

    async fn fetch_records(
        &self,
        class_id: Option<i64>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<StoredRecord>, ApiError> {
        let mut url = self.url("/presencas")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(class_id) = class_id {
                query.append_pair("turma_id", &class_id.to_string());
            }
            if let Some(date) = date {
                query.append_pair("data", &date.format("%Y-%m-%d").to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        self.get_data(url).await
    }

    async fn fetch_statistics(&self, class_id: i64) -> Result<ClassStatistics, ApiError> {
        self.get_data(self.url(&format!("/turmas/{}/estatisticas", class_id))?)
            .await
    }

    async fn search_students(&self, query: &str) -> Result<Vec<RosterEntry>, ApiError> {
        let mut url = self.url("/alunos/buscar")?;
        url.query_pairs_mut().append_pair("q", query);
        self.get_data(url).await
    }
}
