//! Environment-driven configuration, loaded once at process start.

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::domain::ConfigError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub log: LogConfig,
    pub request_timeout: Duration,
    pub rate_limit: RateLimitSettings,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub addr: String,
    pub port: u16,
}

impl HttpConfig {
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub driver: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub name: String,
    pub sslmode: String,
    /// Full connection URL; takes precedence over the discrete fields.
    pub url: Option<SecretString>,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    /// Builds sqlx connect options without ever formatting the password into a string.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url.expose_secret()).map_err(|e| {
                ConfigError::InvalidValue {
                    key: "DATABASE_URL".to_string(),
                    message: e.to_string(),
                }
            });
        }

        let ssl_mode = PgSslMode::from_str(&self.sslmode).map_err(|e| ConfigError::InvalidValue {
            key: "DB_SSLMODE".to_string(),
            message: e.to_string(),
        })?;

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
            .database(&self.name)
            .ssl_mode(ssl_mode))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// An `EnvFilter` directive such as `info` or `product_service=debug,sqlx=warn`.
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub rps: u32,
    pub burst: u32,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let string = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let driver = string("DB_DRIVER", "postgres");
        if !matches!(driver.as_str(), "postgres" | "postgresql") {
            return Err(ConfigError::InvalidValue {
                key: "DB_DRIVER".to_string(),
                message: format!("unsupported driver '{driver}'"),
            });
        }

        let format = match string("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
            "text" | "pretty" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "LOG_FORMAT".to_string(),
                    message: format!("expected 'text' or 'json', got '{other}'"),
                });
            }
        };

        Ok(Self {
            app_name: string("APP_NAME", "product-service"),
            app_env: string("APP_ENV", "development"),
            http: HttpConfig {
                addr: string("HTTP_ADDR", "0.0.0.0"),
                port: parse(&get, "HTTP_PORT", 8080)?,
            },
            database: DatabaseConfig {
                driver,
                host: string("DB_HOST", "localhost"),
                port: parse(&get, "DB_PORT", 5432)?,
                user: string("DB_USER", "app_user"),
                password: SecretString::from(string("DB_PASSWORD", "app_password")),
                name: string("DB_NAME", "product_db"),
                sslmode: string("DB_SSLMODE", "disable"),
                url: get("DATABASE_URL").map(SecretString::from),
                max_connections: parse_nonzero(&get, "DB_MAX_CONNECTIONS", 25)?,
                min_connections: parse(&get, "DB_MIN_CONNECTIONS", 2)?,
            },
            log: LogConfig {
                level: string("LOG_LEVEL", "info"),
                format,
            },
            request_timeout: Duration::from_secs(parse_nonzero(&get, "REQUEST_TIMEOUT_SECS", 30)?),
            rate_limit: RateLimitSettings {
                enabled: parse(&get, "RATE_LIMIT_ENABLED", false)?,
                rps: parse(&get, "RATE_LIMIT_RPS", 10)?,
                burst: parse(&get, "RATE_LIMIT_BURST", 20)?,
            },
        })
    }
}

fn parse<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

fn parse_nonzero<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    let value = parse(get, key, default)?;
    if value == T::default() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
