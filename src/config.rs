use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use ::config::builder::DefaultState;
use ::config::{ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Name of the optional config file looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "pastebin";

/// Service configuration.
///
/// Keys are flat so that they line up one to one with the environment
/// variables used in deployment (`DB_HOST`, `SERVER_PORT`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server_host: IpAddr,
    pub server_port: u16,
    pub store: StoreKind,
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_max_lifetime_secs: u64,
    pub db_idle_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_paste_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl Config {
    /// Load the config from defaults, an optional file and the environment.
    ///
    /// An explicitly given file must exist; the default `pastebin.toml` is
    /// optional.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        defaults()?
            .add_source(file)
            .add_source(Environment::default())
            .build()?
            .try_deserialize()
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Startup connectivity check only.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// How long a request may wait for a pooled connection. Same as the
    /// request timeout.
    pub fn acquire_timeout(&self) -> Duration {
        self.request_timeout()
    }

    /// Connection options for the Postgres store. TLS is disabled.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_password)
            .database(&self.db_name)
            .ssl_mode(PgSslMode::Disable)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    ::config::Config::builder()
        .set_default("server_host", "0.0.0.0")?
        .set_default("server_port", 8080)?
        .set_default("store", "postgres")?
        .set_default("db_host", "localhost")?
        .set_default("db_port", 5432)?
        .set_default("db_user", "postgres")?
        .set_default("db_password", "")?
        .set_default("db_name", "postgres")?
        .set_default("db_max_connections", 25)?
        .set_default("db_min_connections", 5)?
        .set_default("db_max_lifetime_secs", 60 * 60)?
        .set_default("db_idle_timeout_secs", 30 * 60)?
        .set_default("request_timeout_secs", 10)?
        .set_default("connect_timeout_secs", 5)?
        .set_default("max_paste_size", 10 * 1024 * 1024)
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    defaults()
        .and_then(|builder| builder.set_override("store", "memory"))
        .and_then(|builder| builder.build())
        .and_then(|config| config.try_deserialize())
        .expect("default config")
}

#[cfg(test)]
mod tests {
    use ::config::FileFormat;

    use super::*;

    fn from_toml(toml: &str) -> Result<Config, ConfigError> {
        defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn defaults_match_deployment() {
        let config = from_toml("").unwrap();
        assert_eq!(config.listen_addr(), "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.store, StoreKind::Postgres);
        assert_eq!(config.db_port, 5432);
        assert_eq!(config.db_max_connections, 25);
        assert_eq!(config.db_min_connections, 5);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn file_overrides_defaults() {
        let config = from_toml(
            r#"
            server_port = 9000
            store = "memory"
            db_host = "db.internal"
            db_password = "hunter2"
            "#,
        )
        .unwrap();
        assert_eq!(config.server_port, 9000);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.db_host, "db.internal");
        assert_eq!(config.db_password, "hunter2");
    }

    #[test]
    fn pool_waits_as_long_as_a_request() {
        let config = from_toml("request_timeout_secs = 30\nconnect_timeout_secs = 2").unwrap();
        assert_eq!(config.acquire_timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(2));
        assert!(config.acquire_timeout() >= config.request_timeout());
    }

    #[test]
    fn unknown_store_kind_is_rejected() {
        assert!(from_toml(r#"store = "redis""#).is_err());
    }

    #[test]
    fn numeric_strings_are_coerced() {
        // environment values always arrive as strings
        let config = from_toml(r#"db_port = "6543""#).unwrap();
        assert_eq!(config.db_port, 6543);
    }
}
