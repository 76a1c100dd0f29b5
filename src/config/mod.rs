//! Configuration module for the Pinnacle backend.
//!
//! All configuration is loaded from environment variables. The token secret has no
//! default and must be supplied by the deployment.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Secrets shorter than this are accepted but logged as weak.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PINNACLE_JWT_SECRET must be set")]
    MissingSecret,
    #[error("Invalid PINNACLE_BIND_ADDR '{0}'")]
    InvalidBindAddr(String),
    #[error("PINNACLE_ADMIN_USERNAME and PINNACLE_ADMIN_PASSWORD must be set together")]
    IncompleteBootstrapAdmin,
}

/// Initial Admin account created when the user table is empty.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// HMAC secret for session tokens
    pub jwt_secret: String,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed CORS origin, `None` means any
    pub allowed_origin: Option<String>,
    /// Optional JSON file replacing the compiled-in site defaults
    pub site_defaults_path: Option<PathBuf>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("jwt_secret", &"<redacted>")
            .field("db_path", &self.db_path)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("allowed_origin", &self.allowed_origin)
            .field("site_defaults_path", &self.site_defaults_path)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let jwt_secret = non_empty_var("PINNACLE_JWT_SECRET").ok_or(ConfigError::MissingSecret)?;

        let db_path = env::var("PINNACLE_DB_PATH")
            .unwrap_or_else(|_| "./data/site.sqlite".to_string())
            .into();

        let bind_raw =
            env::var("PINNACLE_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_raw.clone()))?;

        let log_level = env::var("PINNACLE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let allowed_origin = non_empty_var("PINNACLE_ALLOWED_ORIGIN").filter(|o| o != "*");

        let site_defaults_path = non_empty_var("PINNACLE_SITE_DEFAULTS").map(PathBuf::from);

        let bootstrap_admin = match (
            non_empty_var("PINNACLE_ADMIN_USERNAME"),
            non_empty_var("PINNACLE_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(BootstrapAdmin { username, password }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteBootstrapAdmin),
        };

        Ok(Self {
            jwt_secret,
            db_path,
            bind_addr,
            log_level,
            allowed_origin,
            site_defaults_path,
            bootstrap_admin,
        })
    }

    pub fn has_weak_secret(&self) -> bool {
        self.jwt_secret.len() < RECOMMENDED_SECRET_LEN
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: &[&str] = &[
        "PINNACLE_JWT_SECRET",
        "PINNACLE_DB_PATH",
        "PINNACLE_BIND_ADDR",
        "PINNACLE_LOG_LEVEL",
        "PINNACLE_ALLOWED_ORIGIN",
        "PINNACLE_SITE_DEFAULTS",
        "PINNACLE_ADMIN_USERNAME",
        "PINNACLE_ADMIN_PASSWORD",
    ];

    // Single test so the process-wide environment is not mutated concurrently.
    #[test]
    fn test_config_from_env() {
        for var in VARS {
            env::remove_var(var);
        }

        assert!(matches!(Config::from_env(), Err(ConfigError::MissingSecret)));

        env::set_var("PINNACLE_JWT_SECRET", "short");
        let config = Config::from_env().unwrap();
        assert_eq!(config.db_path, PathBuf::from("./data/site.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(config.allowed_origin.is_none());
        assert!(config.bootstrap_admin.is_none());
        assert!(config.has_weak_secret());
        assert!(!format!("{:?}", config).contains("short"));

        env::set_var("PINNACLE_ADMIN_USERNAME", "admin");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::IncompleteBootstrapAdmin)
        ));
        env::set_var("PINNACLE_ADMIN_PASSWORD", "admin123");
        let config = Config::from_env().unwrap();
        assert_eq!(config.bootstrap_admin.unwrap().username, "admin");

        env::set_var("PINNACLE_BIND_ADDR", "not-an-addr");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidBindAddr(_))
        ));

        for var in VARS {
            env::remove_var(var);
        }
    }
}
