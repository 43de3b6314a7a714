use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request went out but no response came back.
    #[error("No response from server: {0}")]
    Transport(String),

    /// The request could not be built or sent at all.
    #[error("Failed to build request: {0}")]
    Request(String),

    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn server(status: StatusCode, message: Option<String>) -> Self {
        ApiError::Server {
            status: status.as_u16(),
            message,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::Server {
            status: StatusCode::NOT_FOUND.as_u16(),
            message: Some(message.into()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Server { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
    }

    /// Message the backend put in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Server { message, .. } => message.as_deref().filter(|m| !m.is_empty()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            ApiError::Request(e.to_string())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::server(status, None)
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}
