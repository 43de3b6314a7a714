use std::sync::Arc;

use crate::client::{
    AttendanceReports, AttendanceSubmitter, ClassDirectoryClient, HttpAttendanceClient,
    MockAttendanceClient, RosterClient,
};
use crate::config::BoardConfig;
use crate::error::ApiError;
use crate::services::AttendanceBoard;

/// The three collaborators the board talks to.
#[derive(Clone)]
pub struct Clients {
    pub directory: Arc<dyn ClassDirectoryClient>,
    pub roster: Arc<dyn RosterClient>,
    pub submitter: Arc<dyn AttendanceSubmitter>,
}

impl Clients {
    /// Uses one client for every boundary.
    pub fn from_shared<C>(client: Arc<C>) -> Self
    where
        C: ClassDirectoryClient + RosterClient + AttendanceSubmitter + 'static,
    {
        Self {
            directory: client.clone(),
            roster: client.clone(),
            submitter: client,
        }
    }
}

pub struct AppState {
    pub board: AttendanceBoard,
    pub reports: Arc<dyn AttendanceReports>,
}

impl AppState {
    /// Picks the http or in-memory backend and mounts the board on it.
    pub async fn from_config(config: &BoardConfig) -> Result<Self, ApiError> {
        if config.use_mock {
            tracing::info!("Using in-memory mock backend");
            let client = Arc::new(MockAttendanceClient::seeded());
            return Ok(Self::mount(client).await);
        }

        let client = Arc::new(HttpAttendanceClient::new(config.api_url.clone())?);
        tracing::info!("Backend URL: {}", client.base_url());
        Ok(Self::mount(client).await)
    }

    pub async fn mount<C>(client: Arc<C>) -> Self
    where
        C: ClassDirectoryClient + RosterClient + AttendanceSubmitter + AttendanceReports + 'static,
    {
        match client.health().await {
            Ok(health) => tracing::debug!("Backend status: {} at {}", health.status, health.timestamp),
            Err(e) => tracing::warn!("Backend health check failed: {}", e),
        }

        let board = AttendanceBoard::mount(Clients::from_shared(client.clone())).await;
        Self {
            board,
            reports: client,
        }
    }
}
