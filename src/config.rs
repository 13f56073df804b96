// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// Process-local store for development and tests. Data is lost on exit.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        }
    }
}

/// Expiry scanner schedule and delivery settings.
#[derive(Debug, Clone)]
pub struct ExpiryScanConfig {
    pub enabled: bool,
    /// Time between scans
    pub interval: Duration,
    /// Lookahead window in days
    pub window_days: u32,
    /// Maximum concurrent notification deliveries per scan
    pub concurrency: usize,
}

impl Default for ExpiryScanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(24 * 60 * 60),
            window_days: 7,
            concurrency: 4,
        }
    }
}

const MAX_WINDOW_DAYS: u32 = 366;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub store_backend: StoreBackend,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Push gateway endpoint; notifications are only logged when unset
    pub push_gateway_url: Option<String>,
    /// Bearer token for the push gateway
    pub push_gateway_token: Option<String>,
    /// Per-request timeout for push deliveries
    pub push_timeout: Duration,
    pub expiry_scan: ExpiryScanConfig,
}

impl Config {
    /// Config for tests: in-memory store, no push gateway, scanner disabled.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            push_gateway_url: None,
            push_gateway_token: None,
            push_timeout: Duration::from_secs(10),
            expiry_scan: ExpiryScanConfig {
                enabled: false,
                ..Default::default()
            },
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = ExpiryScanConfig::default();

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parse_var("PORT", 8080)?,
            store_backend: env::var("STORE_BACKEND")
                .ok()
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(StoreBackend::Firestore),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            push_gateway_url: optional_var("PUSH_GATEWAY_URL"),
            push_gateway_token: optional_var("PUSH_GATEWAY_TOKEN"),
            push_timeout: Duration::from_secs(parse_var("PUSH_TIMEOUT_SECS", 10)?),
            expiry_scan: ExpiryScanConfig {
                enabled: parse_var("EXPIRY_SCAN_ENABLED", defaults.enabled)?,
                interval: Duration::from_secs(parse_var(
                    "EXPIRY_SCAN_INTERVAL_SECS",
                    defaults.interval.as_secs(),
                )?),
                window_days: parse_window_days(defaults.window_days)?,
                concurrency: parse_var("EXPIRY_SCAN_CONCURRENCY", defaults.concurrency)?.max(1),
            },
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid(name, raw)),
        None => Ok(default),
    }
}

/// Lookahead for the expiry scan, limited to one year.
fn parse_window_days(default: u32) -> Result<u32, ConfigError> {
    let days = parse_var("EXPIRY_WINDOW_DAYS", default)?;
    if !(1..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(ConfigError::Invalid("EXPIRY_WINDOW_DAYS", days.to_string()));
    }
    Ok(days)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test touching the process environment to avoid races between tests.
    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("STORE_BACKEND", "memory");
        env::set_var("EXPIRY_WINDOW_DAYS", "3");
        env::set_var("EXPIRY_SCAN_CONCURRENCY", "0");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.expiry_scan.window_days, 3);
        assert_eq!(config.expiry_scan.concurrency, 1);
        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");

        for bad in ["soon", "0", "367", "4294967295"] {
            env::set_var("EXPIRY_WINDOW_DAYS", bad);
            let err = Config::from_env().unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid("EXPIRY_WINDOW_DAYS", _)),
                "{bad} should be rejected"
            );
        }

        env::set_var("EXPIRY_WINDOW_DAYS", "366");
        assert_eq!(Config::from_env().unwrap().expiry_scan.window_days, 366);

        env::remove_var("EXPIRY_WINDOW_DAYS");
        env::remove_var("EXPIRY_SCAN_CONCURRENCY");
        env::remove_var("STORE_BACKEND");
    }

    #[test]
    fn store_backend_parses_case_insensitively() {
        assert_eq!("Memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!(
            "FIRESTORE".parse::<StoreBackend>().unwrap(),
            StoreBackend::Firestore
        );
        assert!("postgres".parse::<StoreBackend>().is_err());
    }
}
