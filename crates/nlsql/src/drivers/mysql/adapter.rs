//! MySQL dialect adapter.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use tracing::info;

use crate::config::{ConnectionConfig, PoolConfig};
use crate::core::schema::SchemaDocument;
use crate::core::traits::DialectAdapter;
use crate::drivers::common::conn_str::url_component;
use crate::drivers::common::SslMode;
use crate::drivers::Connection;
use crate::error::{NlsqlError, Result};

use super::introspect;
use super::rows::MysqlConnection;

/// Pool acquire timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// MySQL/MariaDB adapter.
#[derive(Debug, Clone, Default)]
pub struct MysqlAdapter;

impl MysqlAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DialectAdapter for MysqlAdapter {
    fn name(&self) -> &str {
        "mysql"
    }

    fn connection_string(&self, config: &ConnectionConfig) -> String {
        let ssl_mode = SslMode::parse(config.ssl_mode()).unwrap_or_default();
        format!(
            "mysql://{}:{}@{}:{}/{}?ssl-mode={}",
            url_component(&config.user),
            url_component(&config.password),
            config.host,
            config.port,
            url_component(&config.database),
            ssl_mode.mysql_param()
        )
    }

    async fn open(&self, config: &ConnectionConfig, pool: &PoolConfig) -> Result<Connection> {
        let options = MySqlConnectOptions::from_str(&self.connection_string(config))
            .map_err(|e| NlsqlError::connection(&e, "parsing MySQL connection URL").with_source(e))?;

        let pool = MySqlPoolOptions::new()
            .max_connections(pool.max_connections as u32)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| NlsqlError::connection(&e, "connecting to MySQL").with_source(e))?;

        if let Err(e) = sqlx::query("SELECT 1").fetch_one(&pool).await {
            pool.close().await;
            return Err(NlsqlError::connection(&e, "verifying MySQL connection").with_source(e));
        }

        info!(
            "Connected to MySQL: {}:{}/{}",
            config.host, config.port, config.database
        );
        Ok(Connection::Mysql(MysqlConnection::new(pool)))
    }

    async fn introspect_schema(&self, conn: &Connection) -> Result<SchemaDocument> {
        match conn {
            Connection::Mysql(my) => introspect::introspect(my.pool()).await,
            other => Err(NlsqlError::introspection(format!(
                "mysql adapter cannot introspect a {} connection",
                other.dialect()
            ))),
        }
    }
}
