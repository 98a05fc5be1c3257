use crate::prelude::*;
use std::time::Duration;

/// Directory API configuration from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Default directory API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://api-blue-archive.vercel.app";

    /// Path of the record endpoint below the base URL
    pub const RECORDS_PATH: &'static str = "/api/characters";

    /// Default per-request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

    /// Load configuration from environment variables
    /// Uses ROSTERDEX_API_BASE with default fallback
    /// Uses ROSTERDEX_TIMEOUT_SECS with default fallback
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("ROSTERDEX_API_BASE")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string());

        let timeout_secs = match std::env::var("ROSTERDEX_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => Self::DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(mut self, base_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(secs) = timeout_secs {
            self.timeout = Duration::from_secs(secs.max(1));
        }
        self
    }

    /// Full URL of the record endpoint
    pub fn records_url(&self) -> String {
        // Handle base_url that may or may not have trailing slash
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            Self::RECORDS_PATH
        )
    }
}

fn parse_timeout(raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(Error::Config(format!(
            "ROSTERDEX_TIMEOUT_SECS must be a positive number of seconds, got {raw:?}"
        ))
        .into()),
    }
}
