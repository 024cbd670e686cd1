//! Server configuration.

use std::env;

use anyhow::Context;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 54880;

/// Storage backend selected by the database URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local map; contents are lost on restart.
    Memory,
    /// SQLite database at the given URL.
    Sqlite(String),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database URL; `None` or `memory` selects the in-memory store.
    pub database_url: Option<String>,
    /// Secret used to verify identity tokens. Verification is off without it.
    pub jwt_secret: Option<String>,
    /// Expected identity token issuer.
    pub jwt_issuer: Option<String>,
    /// Log level.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            jwt_secret: None,
            jwt_issuer: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through a variable lookup function.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("LOCALGIGS_SERVER_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("LOCALGIGS_SERVER_PORT is not a valid port: {port}"))?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup("LOCALGIGS_SERVER_HOST").unwrap_or(defaults.host),
            port,
            database_url: lookup("LOCALGIGS_DATABASE_URL")
                .or_else(|| lookup("DATABASE_URL"))
                .filter(|url| !url.is_empty()),
            jwt_secret: lookup("LOCALGIGS_JWT_SECRET").filter(|s| !s.is_empty()),
            jwt_issuer: lookup("LOCALGIGS_JWT_ISSUER").filter(|s| !s.is_empty()),
            log_level: lookup("LOCALGIGS_LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns true if identity tokens are verified.
    pub fn identity_enabled(&self) -> bool {
        self.jwt_secret.is_some()
    }

    /// Returns the storage backend to use.
    pub fn storage_backend(&self) -> StorageBackend {
        match self.database_url.as_deref() {
            None | Some("memory") => StorageBackend::Memory,
            Some(url) => StorageBackend::Sqlite(url.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.storage_backend(), StorageBackend::Memory);
        assert!(!config.identity_enabled());
        assert_eq!(config.server_addr(), format!("0.0.0.0:{DEFAULT_PORT}"));
    }

    #[test]
    fn test_sqlite_backend_and_identity() {
        let config = Config::from_lookup(lookup(&[
            ("LOCALGIGS_DATABASE_URL", "sqlite:profiles.db?mode=rwc"),
            ("LOCALGIGS_JWT_SECRET", "secret"),
            ("LOCALGIGS_SERVER_PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(
            config.storage_backend(),
            StorageBackend::Sqlite("sqlite:profiles.db?mode=rwc".to_string())
        );
        assert!(config.identity_enabled());
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_memory_keyword() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "memory")])).unwrap();
        assert_eq!(config.storage_backend(), StorageBackend::Memory);
    }

    #[test]
    fn test_invalid_port() {
        assert!(Config::from_lookup(lookup(&[("LOCALGIGS_SERVER_PORT", "http")])).is_err());
    }
}
