// SuccessFactors connection settings, read once at startup
use std::env;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Clone)]
pub struct PlatformConfig {
    // never ends with '/'
    pub base_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl PlatformConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        Ok(PlatformConfig {
            base_url,
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let base_url = env::var("SUCCESSFACTORS_BASE_URL").map_err(|_| ConfigError::MissingBaseUrl)?;
        let api_key = env::var("SUCCESSFACTORS_API_KEY").map_err(|_| ConfigError::MissingApiKey)?;

        let timeout_seconds = match env::var("SUCCESSFACTORS_TIMEOUT_SECONDS") {
            Ok(value) => parse_timeout_seconds(&value)?,
            Err(_) => DEFAULT_TIMEOUT_SECONDS,
        };

        let mut config = PlatformConfig::new(base_url, api_key)?;
        config.request_timeout = Duration::from_secs(timeout_seconds);
        Ok(config)
    }
}

fn parse_timeout_seconds(value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(seconds),
        _ => Err(ConfigError::InvalidTimeout(value.to_string())),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SUCCESSFACTORS_BASE_URL environment variable not set")]
    MissingBaseUrl,

    #[error("SUCCESSFACTORS_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("SUCCESSFACTORS_BASE_URL must not be empty")]
    EmptyBaseUrl,

    #[error("Invalid SUCCESSFACTORS_TIMEOUT_SECONDS value: {0}")]
    InvalidTimeout(String),
}
