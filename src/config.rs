use std::env;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8000;
const DEFAULT_DATABASE_URL: &str = "sqlite://pelada.db?mode=rwc";
const DEFAULT_LOG_FILE_PATH: &str = "logs/pelada.log";
const DEFAULT_LOG_ARCHIVE_PATTERN: &str = "logs/pelada.{}.log.gz";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not a valid port: {value}")]
    InvalidPort { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub log_file_path: String,
    pub log_archive_pattern: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let or_default =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let http_port = match lookup("PELADA_HTTP_PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                name: "PELADA_HTTP_PORT",
                value,
            })?,
            None => DEFAULT_HTTP_PORT,
        };

        let jwt_secret = lookup("PELADA_JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("PELADA_JWT_SECRET"))?;

        Ok(Self {
            host: or_default("PELADA_HOST", DEFAULT_HOST),
            http_port,
            database_url: or_default("PELADA_DATABASE_URL", DEFAULT_DATABASE_URL),
            jwt_secret,
            log_file_path: or_default("LOG_FILE_PATH", DEFAULT_LOG_FILE_PATH),
            log_archive_pattern: or_default("LOG_ARCHIVE_PATTERN", DEFAULT_LOG_ARCHIVE_PATTERN),
        })
    }
}
