use anyhow::{Context, Result};

/// Default remaining-validity window below which the access token is refreshed
pub const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 60;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the Blogline API, e.g. `https://api.blogline.app`
    pub base_url: String,

    /// Refresh the access token once its remaining validity drops below this
    pub refresh_threshold_secs: i64,

    /// HTTP connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Create a configuration with default timeouts and threshold
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            refresh_threshold_secs: DEFAULT_REFRESH_THRESHOLD_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Load configuration from the environment, with defaults for everything
    /// except the base URL
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Self {
            base_url: std::env::var("BLOGLINE_API_BASE_URL")
                .context("BLOGLINE_API_BASE_URL is required")?,

            refresh_threshold_secs: std::env::var("BLOGLINE_REFRESH_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_REFRESH_THRESHOLD_SECS),

            connect_timeout_secs: std::env::var("BLOGLINE_HTTP_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),

            request_timeout_secs: std::env::var("BLOGLINE_HTTP_REQUEST_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            anyhow::bail!("API base URL must not be empty");
        }
        Ok(())
    }

    /// Full URL of the token refresh endpoint
    pub fn refresh_url(&self) -> String {
        format!("{}/api/auth/refresh", self.base_url.trim_end_matches('/'))
    }
}
