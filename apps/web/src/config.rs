//! Web app configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use stockbook_core::{CostBasis, DEFAULT_LOW_STOCK_THRESHOLD};
use stockbook_db::DbConfig;
use tracing::warn;

/// Signing secret used when `STOCKBOOK_JWT_SECRET` is unset.
pub const DEV_JWT_SECRET: &str = "stockbook-dev-secret-change-in-production";

/// Web app configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// HS256 secret for bearer tokens
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub token_lifetime_secs: i64,

    /// Products below this quantity count as low stock
    pub low_stock_threshold: i64,

    /// Cost basis for reports that do not ask for one
    pub cost_basis: CostBasis,
}

impl WebConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the raw value of a
    /// variable if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = match lookup("STOCKBOOK_JWT_SECRET") {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ => {
                warn!("STOCKBOOK_JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let config = WebConfig {
            bind_addr: parse_var(&lookup, "STOCKBOOK_BIND_ADDR", "0.0.0.0:8080")?,
            database_path: PathBuf::from(
                lookup("STOCKBOOK_DB_PATH").unwrap_or_else(|| "./stockbook.db".to_string()),
            ),
            db_max_connections: parse_var(&lookup, "STOCKBOOK_DB_MAX_CONNECTIONS", "5")?,
            jwt_secret,
            token_lifetime_secs: parse_var(&lookup, "STOCKBOOK_TOKEN_LIFETIME_SECS", "3600")?,
            low_stock_threshold: match lookup("STOCKBOOK_LOW_STOCK_THRESHOLD") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("STOCKBOOK_LOW_STOCK_THRESHOLD".to_string()))?,
                None => DEFAULT_LOW_STOCK_THRESHOLD,
            },
            cost_basis: parse_var(&lookup, "STOCKBOOK_COST_BASIS", "snapshot")?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STOCKBOOK_DB_MAX_CONNECTIONS".to_string(),
            ));
        }
        if config.token_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "STOCKBOOK_TOKEN_LIFETIME_SECS".to_string(),
            ));
        }
        if config.low_stock_threshold < 0 {
            return Err(ConfigError::InvalidValue(
                "STOCKBOOK_LOW_STOCK_THRESHOLD".to_string(),
            ));
        }

        Ok(config)
    }

    /// Pool configuration for [`stockbook_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.db_max_connections)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError> {
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<WebConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WebConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.database_path, PathBuf::from("./stockbook.db"));
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.token_lifetime_secs, 3600);
        assert_eq!(config.low_stock_threshold, 10);
        assert_eq!(config.cost_basis, CostBasis::Snapshot);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOCKBOOK_BIND_ADDR", "127.0.0.1:9000"),
            ("STOCKBOOK_JWT_SECRET", "s3cret"),
            ("STOCKBOOK_LOW_STOCK_THRESHOLD", "3"),
            ("STOCKBOOK_COST_BASIS", "LIVE"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.low_stock_threshold, 3);
        assert_eq!(config.cost_basis, CostBasis::Live);
        assert_eq!(config.db_config().max_connections, 5);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("STOCKBOOK_COST_BASIS", "average")]),
            Err(ConfigError::InvalidValue(key)) if key == "STOCKBOOK_COST_BASIS"
        ));
        assert!(load(&[("STOCKBOOK_DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("STOCKBOOK_TOKEN_LIFETIME_SECS", "soon")]).is_err());
        assert!(load(&[("STOCKBOOK_BIND_ADDR", "nowhere")]).is_err());
    }
}
