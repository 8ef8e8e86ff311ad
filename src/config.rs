//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development.

use crate::services::password::DEFAULT_ITERATIONS;
use std::env;
use std::str::FromStr;

/// Default lifetime of a session token.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 12;
/// Default heartbeat recency window for presence.
pub const DEFAULT_PRESENCE_THRESHOLD_SECS: i64 = 120;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// HS256 signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// How long an issued token stays valid
    pub session_ttl_hours: i64,
    /// Heartbeats older than this mark an account offline
    pub presence_threshold_secs: i64,
    /// PBKDF2 work factor for newly hashed passwords
    pub password_iterations: u32,
    /// Optional JSON file with demo accounts and tasks
    pub seed_path: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            presence_threshold_secs: DEFAULT_PRESENCE_THRESHOLD_SECS,
            // Keep hashing cheap in tests
            password_iterations: 1_000,
            seed_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: parse_or("PORT", 8080)?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            session_ttl_hours: parse_or("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?,
            presence_threshold_secs: parse_or(
                "PRESENCE_THRESHOLD_SECS",
                DEFAULT_PRESENCE_THRESHOLD_SECS,
            )?,
            password_iterations: parse_or("PASSWORD_ITERATIONS", DEFAULT_ITERATIONS)?,
            seed_path: env::var("SEED_PATH").ok().filter(|p| !p.trim().is_empty()),
        })
    }
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so env mutations don't race across threads.
    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::remove_var("SESSION_TTL_HOURS");
        env::set_var("PRESENCE_THRESHOLD_SECS", "90");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.session_ttl_hours, 12);
        assert_eq!(config.presence_threshold_secs, 90);

        env::set_var("PRESENCE_THRESHOLD_SECS", "soon");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("PRESENCE_THRESHOLD_SECS"))
        ));
        env::remove_var("PRESENCE_THRESHOLD_SECS");
    }
}
