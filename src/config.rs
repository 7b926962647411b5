//! Environment-driven configuration
//!
//! Loaded and validated once in `main`, then handed to the services that
//! need it; there is no process-wide static.

use std::env;

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_EXPIRY_MINUTES, DEFAULT_DATABASE_MAX_CONNECTIONS,
    DEFAULT_NOTIFICATION_RETENTION_DAYS, DEFAULT_REFRESH_TOKEN_EXPIRY_DAYS,
    DEFAULT_RESET_TOKEN_EXPIRY_MINUTES, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SWEEP_SCHEDULE, DEFAULT_VERIFICATION_TOKEN_EXPIRY_HOURS,
};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub email: EmailConfig,
    pub collaborators: CollaboratorConfig,
    pub schedules: ScheduleConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// Token issuing configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_minutes: i64,
    pub refresh_token_expiry_days: i64,
    pub verification_token_expiry_hours: i64,
    pub reset_token_expiry_minutes: i64,
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins; empty means allow any (development)
    pub allowed_origins: Vec<String>,
}

/// SMTP transport configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: Option<String>,
    pub from_name: String,
}

impl EmailConfig {
    /// Whether enough is configured to actually send mail
    pub fn is_configured(&self) -> bool {
        self.smtp_host.is_some() && self.from_address.is_some()
    }
}

/// Base URLs of the external collaborator services
#[derive(Debug, Clone)]
pub struct CollaboratorConfig {
    pub execution_base_url: String,
    pub analysis_base_url: String,
    pub request_timeout_secs: u64,
}

/// Scheduled job configuration
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Cron expression for the expired-session/token sweep
    pub sweep_schedule: String,
    /// Read notifications older than this many days are removed by the sweep
    pub notification_retention_days: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            cors: CorsConfig::from_env()?,
            email: EmailConfig::from_env()?,
            collaborators: CollaboratorConfig::from_env()?,
            schedules: ScheduleConfig::from_env()?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.access_token_expiry_minutes <= 0 {
            return Err(ConfigError::InvalidValue(
                "ACCESS_TOKEN_EXPIRY_MINUTES".to_string(),
            ));
        }
        if self.jwt.refresh_token_expiry_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "REFRESH_TOKEN_EXPIRY_DAYS".to_string(),
            ));
        }
        Ok(())
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DEFAULT_DATABASE_MAX_CONNECTIONS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,
        })
    }
}

impl RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        })
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: env::var("JWT_SECRET")
                .map_err(|_| ConfigError::Missing("JWT_SECRET".to_string()))?,
            access_token_expiry_minutes: env::var("ACCESS_TOKEN_EXPIRY_MINUTES")
                .unwrap_or_else(|_| DEFAULT_ACCESS_TOKEN_EXPIRY_MINUTES.to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("ACCESS_TOKEN_EXPIRY_MINUTES".to_string())
                })?,
            refresh_token_expiry_days: env::var("REFRESH_TOKEN_EXPIRY_DAYS")
                .unwrap_or_else(|_| DEFAULT_REFRESH_TOKEN_EXPIRY_DAYS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("REFRESH_TOKEN_EXPIRY_DAYS".to_string()))?,
            verification_token_expiry_hours: env::var("VERIFICATION_TOKEN_EXPIRY_HOURS")
                .unwrap_or_else(|_| DEFAULT_VERIFICATION_TOKEN_EXPIRY_HOURS.to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("VERIFICATION_TOKEN_EXPIRY_HOURS".to_string())
                })?,
            reset_token_expiry_minutes: env::var("RESET_TOKEN_EXPIRY_MINUTES")
                .unwrap_or_else(|_| DEFAULT_RESET_TOKEN_EXPIRY_MINUTES.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RESET_TOKEN_EXPIRY_MINUTES".to_string()))?,
        })
    }
}

impl CorsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { allowed_origins })
    }
}

impl EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SMTP_PORT".to_string()))?,
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            from_address: env::var("EMAIL_FROM_ADDRESS").ok(),
            from_name: env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "CodeArena".to_string()),
        })
    }
}

impl CollaboratorConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            execution_base_url: env::var("EXECUTION_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            analysis_base_url: env::var("ANALYSIS_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8002".to_string()),
            request_timeout_secs: env::var("COLLABORATOR_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("COLLABORATOR_TIMEOUT_SECS".to_string()))?,
        })
    }
}

impl ScheduleConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            sweep_schedule: env::var("SWEEP_SCHEDULE")
                .unwrap_or_else(|_| DEFAULT_SWEEP_SCHEDULE.to_string()),
            notification_retention_days: env::var("NOTIFICATION_RETENTION_DAYS")
                .unwrap_or_else(|_| DEFAULT_NOTIFICATION_RETENTION_DAYS.to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("NOTIFICATION_RETENTION_DAYS".to_string())
                })?,
        })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_config_requires_host_and_from() {
        let mut email = EmailConfig {
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from_address: None,
            from_name: "CodeArena".to_string(),
        };
        assert!(!email.is_configured());

        email.smtp_host = Some("smtp.example.com".to_string());
        assert!(!email.is_configured());

        email.from_address = Some("noreply@example.com".to_string());
        assert!(email.is_configured());
    }

    #[test]
    fn test_default_values() {
        let server = ServerConfig {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: "info".to_string(),
        };
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
    }
}
