//! Configuration validation.

use super::{Config, ConnectionConfig};
use crate::drivers::common::SslMode;
use crate::error::{NlsqlError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    validate_connection(&config.database)?;

    if config.pool.max_connections == 0 {
        return Err(NlsqlError::Config(
            "pool.max_connections must be at least 1".into(),
        ));
    }

    Ok(())
}

/// Validate connection parameters.
///
/// The dialect tag is deliberately not checked here: unknown tags are
/// reported by the adapter registry as `UnsupportedDialect`.
pub fn validate_connection(config: &ConnectionConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(NlsqlError::Config("database.host is required".into()));
    }
    if config.user.is_empty() {
        return Err(NlsqlError::Config("database.user is required".into()));
    }
    if config.database.is_empty() {
        return Err(NlsqlError::Config("database.dbname is required".into()));
    }
    if config.port.parse::<u16>().is_err() {
        return Err(NlsqlError::Config(format!(
            "database.port must be a number between 0 and 65535, got '{}'",
            config.port
        )));
    }
    SslMode::parse(config.ssl_mode())?;

    Ok(())
}
