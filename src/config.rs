use std::env;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub api_url: String,
    pub use_mock: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            use_mock: false,
        }
    }
}

impl BoardConfig {
    /// Reads `ATTENDANCE_API_URL` and `ATTENDANCE_MOCK`.
    pub fn new_from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            env::var("ATTENDANCE_API_URL").ok().as_deref(),
            env::var("ATTENDANCE_MOCK").ok().as_deref(),
        )
    }

    pub fn from_values(api_url: Option<&str>, mock: Option<&str>) -> Result<Self, ConfigError> {
        let api_url = match api_url.map(str::trim).filter(|v| !v.is_empty()) {
            Some(url) => parse_api_url(url)?,
            None => DEFAULT_API_URL.to_string(),
        };
        let use_mock = match mock.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => parse_flag(v)?,
            None => false,
        };

        Ok(Self { api_url, use_mock })
    }
}

fn parse_api_url(raw: &str) -> Result<String, ConfigError> {
    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            var: "ATTENDANCE_API_URL",
            reason: format!("expected an http(s) URL, got {:?}", raw),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn parse_flag(raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            var: "ATTENDANCE_MOCK",
            reason: format!("expected a boolean, got {:?}", other),
        }),
    }
}
