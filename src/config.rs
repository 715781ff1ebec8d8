use std::net::IpAddr;

use chrono::Duration;

use crate::auth::reset_token::DEFAULT_TTL_MINUTES;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("Reset token secret must not be empty")]
    EmptySecret,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub reset_token_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub reset_ttl_minutes: i64,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env_required("DATABASE_URL")?;
        let reset_token_secret = env_required("RESET_TOKEN_SECRET")?;
        if reset_token_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        let host: IpAddr = parse_env("BULLPEN_HOST", "0.0.0.0")?;
        let port: u16 = parse_env("BULLPEN_PORT", "3000")?;
        let base_url = env_or("BULLPEN_BASE_URL", &format!("http://{host}:{port}"));

        let reset_ttl_minutes: i64 =
            parse_env("BULLPEN_RESET_TTL_MINUTES", &DEFAULT_TTL_MINUTES.to_string())?;
        if reset_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                var: "BULLPEN_RESET_TTL_MINUTES",
                reason: "must be a positive number of minutes".to_string(),
            });
        }

        let log_level = env_or("BULLPEN_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("BULLPEN_SMTP_HOST").ok(),
            std::env::var("BULLPEN_SMTP_PORT").ok(),
            std::env::var("BULLPEN_SMTP_USER").ok(),
            std::env::var("BULLPEN_SMTP_PASS").ok(),
            std::env::var("BULLPEN_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port.parse().map_err(|e| ConfigError::Invalid {
                    var: "BULLPEN_SMTP_PORT",
                    reason: format!("{e}"),
                })?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            reset_token_secret,
            host,
            port,
            base_url,
            reset_ttl_minutes,
            log_level,
            smtp,
        })
    }

    pub fn reset_ttl(&self) -> Duration {
        Duration::minutes(self.reset_ttl_minutes)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("reset_ttl_minutes", &self.reset_ttl_minutes)
            .field("log_level", &self.log_level)
            .field("smtp", &self.smtp.as_ref().map(|s| &s.host))
            .finish_non_exhaustive()
    }
}

fn env_required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_or(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            var: key,
            reason: e.to_string(),
        })
}
