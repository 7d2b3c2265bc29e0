use thiserror::Error;

use crate::config_env::{
    ensure_http_url, optional_trimmed_env, parse_http_url_env, parse_u32_env, parse_u64_env,
    parse_usize_env,
};
use crate::timezone::{DEFAULT_TIME_ZONE, normalize_time_zone};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_RECENT_LIMIT: u32 = 20;
const DEFAULT_SEARCH_LIMIT: u32 = 10;
const DEFAULT_MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;
const DEFAULT_MAX_PHOTOS: usize = 5;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub recent_limit: u32,
    pub search_limit: u32,
    pub time_zone: String,
    pub max_photo_bytes: u64,
    pub max_photos: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to build backend http client: {0}")]
    HttpClient(String),
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            recent_limit: DEFAULT_RECENT_LIMIT,
            search_limit: DEFAULT_SEARCH_LIMIT,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            max_photos: DEFAULT_MAX_PHOTOS,
        }
    }
}

impl ClientConfig {
    /// Reads a `.env` file when one exists, then the process environment.
    /// A `.env` that exists but cannot be read or parsed is an error.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv_outcome(dotenvy::dotenv())?;
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let time_zone = match optional_trimmed_env("PALACE_TIME_ZONE") {
            Some(raw) => normalize_time_zone(&raw).ok_or_else(|| {
                ConfigError::InvalidConfiguration(format!(
                    "PALACE_TIME_ZONE is not a known IANA time zone: {raw}"
                ))
            })?,
            None => DEFAULT_TIME_ZONE.to_string(),
        };

        let config = Self {
            api_base_url: parse_http_url_env("PALACE_API_BASE_URL", DEFAULT_API_BASE_URL)?,
            request_timeout_ms: parse_u64_env(
                "PALACE_REQUEST_TIMEOUT_MS",
                DEFAULT_REQUEST_TIMEOUT_MS,
            )?,
            recent_limit: parse_u32_env("PALACE_RECENT_LIMIT", DEFAULT_RECENT_LIMIT)?,
            search_limit: parse_u32_env("PALACE_SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT)?,
            time_zone,
            max_photo_bytes: parse_u64_env("PALACE_MAX_PHOTO_BYTES", DEFAULT_MAX_PHOTO_BYTES)?,
            max_photos: parse_usize_env("PALACE_MAX_PHOTOS", DEFAULT_MAX_PHOTOS)?,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_http_url("PALACE_API_BASE_URL", &self.api_base_url)?;

        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "PALACE_REQUEST_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }
        if self.recent_limit == 0 || self.search_limit == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "PALACE_RECENT_LIMIT and PALACE_SEARCH_LIMIT must be greater than zero"
                    .to_string(),
            ));
        }
        if normalize_time_zone(&self.time_zone).is_none() {
            return Err(ConfigError::InvalidConfiguration(format!(
                "time zone '{}' is not a known IANA time zone",
                self.time_zone
            )));
        }

        Ok(())
    }
}

fn dotenv_outcome<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::InvalidConfiguration(format!(
            "failed to load .env file: {err}"
        ))),
    }
}
