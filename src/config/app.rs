use anyhow::Result;
use std::env;
use std::time::Duration;

use crate::services::session_registry::DEFAULT_IDLE_TIMEOUT;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub jwt_secret: String,
    pub reminder_poll_interval: Duration,
    pub session_idle_timeout: Duration,
    pub seed_database: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string());
        let reminder_poll_seconds = env::var("REMINDER_POLL_SECONDS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .unwrap_or(60)
            .max(1);
        let session_idle_timeout = env::var("SESSION_IDLE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs.max(60)))
            .unwrap_or(DEFAULT_IDLE_TIMEOUT);
        let seed_database = env::var("SEED_DATABASE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(AppConfig {
            host,
            port,
            environment,
            log_level,
            jwt_secret,
            reminder_poll_interval: Duration::from_secs(reminder_poll_seconds),
            session_idle_timeout,
            seed_database,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
