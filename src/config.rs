use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub frontend_origin: Option<String>,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub geocoder_timeout_ms: u64,
    pub geocode_cache_ttl_secs: u64,
    pub geocode_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 5000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            frontend_origin: env::var("FRONTEND_ORIGIN").ok(),
            geocoder_url: env::var("GEOCODER_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            // Nominatim's usage policy requires a client-identifying agent.
            geocoder_user_agent: env::var("GEOCODER_USER_AGENT")
                .unwrap_or_else(|_| "rideshare-matcher/0.1".to_string()),
            geocoder_timeout_ms: parse_or_default("GEOCODER_TIMEOUT_MS", 3000)?,
            geocode_cache_ttl_secs: parse_or_default("GEOCODE_CACHE_TTL_SECS", 600)?,
            geocode_concurrency: parse_or_default("GEOCODE_CONCURRENCY", 4)?,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
