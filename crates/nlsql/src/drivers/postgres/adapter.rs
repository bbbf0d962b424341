//! PostgreSQL dialect adapter.

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::{Config as PgConfig, NoTls};
use tracing::info;

use crate::config::{ConnectionConfig, PoolConfig};
use crate::core::schema::SchemaDocument;
use crate::core::traits::DialectAdapter;
use crate::drivers::common::conn_str::pg_value;
use crate::drivers::common::{SslMode, TlsBuilder};
use crate::drivers::Connection;
use crate::error::{NlsqlError, Result};

use super::diagnostics::{pg_message, pool_message};
use super::introspect;
use super::rows::PostgresConnection;

/// PostgreSQL adapter.
#[derive(Debug, Clone, Default)]
pub struct PostgresAdapter;

impl PostgresAdapter {
    pub fn new() -> Self {
        Self
    }

    fn build_pool(&self, config: &ConnectionConfig, pool: &PoolConfig) -> Result<Pool> {
        let pg_config: PgConfig = self
            .connection_string(config)
            .parse()
            .map_err(|e| {
                NlsqlError::connection(pg_message(&e), "parsing PostgreSQL connection string")
                    .with_source(e)
            })?;

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = match TlsBuilder::new(SslMode::parse(config.ssl_mode())?).build()? {
            Some(tls) => Manager::from_config(pg_config, tls, mgr_config),
            None => Manager::from_config(pg_config, NoTls, mgr_config),
        };

        Pool::builder(mgr)
            .max_size(pool.max_connections)
            .build()
            .map_err(|e| NlsqlError::connection(&e, "creating PostgreSQL pool").with_source(e))
    }
}

#[async_trait]
impl DialectAdapter for PostgresAdapter {
    fn name(&self) -> &str {
        "postgres"
    }

    fn connection_string(&self, config: &ConnectionConfig) -> String {
        let ssl_mode = SslMode::parse(config.ssl_mode()).unwrap_or_default();
        format!(
            "host={} port={} user={} password={} dbname={} sslmode={}",
            pg_value(&config.host),
            pg_value(&config.port),
            pg_value(&config.user),
            pg_value(&config.password),
            pg_value(&config.database),
            ssl_mode.postgres_param()
        )
    }

    async fn open(&self, config: &ConnectionConfig, pool: &PoolConfig) -> Result<Connection> {
        let pool = self.build_pool(config, pool)?;

        // Pool creation is lazy; the first checkout performs the real connect.
        let client = pool
            .get()
            .await
            .map_err(|e| {
                NlsqlError::connection(pool_message(&e), "connecting to PostgreSQL").with_source(e)
            })?;
        if let Err(e) = client.simple_query("SELECT 1").await {
            drop(client);
            pool.close();
            return Err(
                NlsqlError::connection(pg_message(&e), "verifying PostgreSQL connection")
                    .with_source(e),
            );
        }
        drop(client);

        info!(
            "Connected to PostgreSQL: {}:{}/{}",
            config.host, config.port, config.database
        );
        Ok(Connection::Postgres(PostgresConnection::new(pool)))
    }

    async fn introspect_schema(&self, conn: &Connection) -> Result<SchemaDocument> {
        match conn {
            Connection::Postgres(pg) => introspect::fetch_schema(pg.pool()).await,
            other => Err(NlsqlError::introspection(format!(
                "postgres adapter cannot introspect a {} connection",
                other.dialect()
            ))),
        }
    }
}
