use std::net::SocketAddr;

use crate::errors::ConfigError;
use crate::store::StoreConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. `DATABASE_URL` is required and
    /// must be an SQLite URL; everything else has a default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;
        if !database_url.starts_with("sqlite:") {
            return Err(ConfigError::InvalidDatabaseUrl(database_url));
        }

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue { key: "BIND_ADDR", value: bind_raw.clone() })?;

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidValue { key: "DB_MAX_CONNECTIONS", value: raw })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let create_if_missing = match lookup("DB_CREATE_IF_MISSING") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidValue { key: "DB_CREATE_IF_MISSING", value: raw })?,
            None => false,
        };

        Ok(Self {
            store: StoreConfig {
                database_url,
                max_connections,
                create_if_missing,
            },
            bind_addr,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[("DATABASE_URL", "sqlite:Stock.db")]).unwrap();
        assert_eq!(cfg.store.database_url, "sqlite:Stock.db");
        assert_eq!(cfg.store.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(!cfg.store.create_if_missing);
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
    }

    #[test]
    fn test_database_url_is_required() {
        assert!(matches!(config(&[]), Err(ConfigError::MissingDatabaseUrl)));
        assert!(matches!(config(&[("DATABASE_URL", "  ")]), Err(ConfigError::MissingDatabaseUrl)));
    }

    #[test]
    fn test_database_url_must_be_sqlite() {
        let err = config(&[("DATABASE_URL", "postgres://localhost/stocks")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDatabaseUrl(_)));
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let cfg = config(&[
            ("DATABASE_URL", "sqlite://data/stocks.db"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DB_MAX_CONNECTIONS", "2"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.store.max_connections, 2);

        let err = config(&[("DATABASE_URL", "sqlite:x.db"), ("BIND_ADDR", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "BIND_ADDR", .. }));

        let err = config(&[("DATABASE_URL", "sqlite:x.db"), ("DB_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "DB_MAX_CONNECTIONS", .. }));
    }

    #[test]
    fn test_database_creation_is_opt_in() {
        let cfg = config(&[("DATABASE_URL", "sqlite:x.db"), ("DB_CREATE_IF_MISSING", " TRUE ")]).unwrap();
        assert!(cfg.store.create_if_missing);

        let cfg = config(&[("DATABASE_URL", "sqlite:x.db"), ("DB_CREATE_IF_MISSING", "0")]).unwrap();
        assert!(!cfg.store.create_if_missing);

        let err = config(&[("DATABASE_URL", "sqlite:x.db"), ("DB_CREATE_IF_MISSING", "sometimes")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "DB_CREATE_IF_MISSING", .. }));
    }
}
