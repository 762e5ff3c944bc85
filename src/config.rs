use std::net::SocketAddr;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, read once at startup
#[derive(Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub polka_key: String,
    pub database_url: Option<String>,
    pub bind_addr: String,
}

impl AppConfig {
    /// Reads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary lookup, blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        if bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid {
                name: "BIND_ADDR",
                value: bind_addr,
            });
        }

        Ok(Self {
            jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            polka_key: get("POLKA_KEY").ok_or(ConfigError::Missing("POLKA_KEY"))?,
            database_url: get("DB_URL"),
            bind_addr,
        })
    }
}
