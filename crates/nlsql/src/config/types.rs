//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Root configuration structure for the command-line front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database to attach to.
    pub database: ConnectionConfig,

    /// Driver pool sizing for the active session.
    #[serde(default)]
    pub pool: PoolConfig,
}

/// Credentials and address of the database to connect to.
///
/// Field names follow the JSON shape clients already send (`db_type`,
/// `dbname`). All address parts are strings; the port is only parsed when
/// the configuration is validated.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Dialect tag ("postgres" or "mysql").
    #[serde(rename = "db_type")]
    pub dialect: String,

    /// Database host.
    pub host: String,

    /// Database port.
    #[serde(deserialize_with = "string_or_number")]
    pub port: String,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Database name.
    #[serde(rename = "dbname")]
    pub database: String,

    /// TLS mode (default: "disable").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_mode: Option<String>,
}

impl ConnectionConfig {
    /// Build a config from its parts with TLS disabled.
    pub fn new(
        dialect: impl Into<String>,
        host: impl Into<String>,
        port: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            dialect: dialect.into(),
            host: host.into(),
            port: port.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            ssl_mode: None,
        }
    }

    /// Set the TLS mode.
    pub fn with_ssl_mode(mut self, ssl_mode: impl Into<String>) -> Self {
        self.ssl_mode = Some(ssl_mode.into());
        self
    }

    /// The configured TLS mode, or "disable" when unset.
    pub fn ssl_mode(&self) -> &str {
        self.ssl_mode.as_deref().unwrap_or("disable")
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("dialect", &self.dialect)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// Driver pool sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum connections held by the driver for the active session (default: 4).
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> usize {
    4
}

/// Accept `port: 5432` as well as `port: "5432"`.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Text(String),
        Number(u64),
    }

    Ok(match Port::deserialize(deserializer)? {
        Port::Text(s) => s,
        Port::Number(n) => n.to_string(),
    })
}
