//! Database driver implementations.
//!
//! - [`postgres`]: PostgreSQL adapter (tokio-postgres over a deadpool pool)
//! - [`mysql`]: MySQL/MariaDB adapter (sqlx)
//! - [`common`]: shared TLS and connection-string helpers
//!
//! # Adding New Databases
//!
//! Outside this crate: implement [`DialectConnection`] for the live handle,
//! return it from `open` as [`Connection::External`] and register the adapter
//! with `AdapterRegistry::register`. Nothing here needs editing.
//!
//! As a built-in:
//!
//! 1. Create a module under `drivers/` with an adapter implementing
//!    [`DialectAdapter`](crate::core::DialectAdapter)
//! 2. Add a [`Connection`] variant for its live handle
//! 3. Register the adapter in `AdapterRegistry::with_builtins()`

pub mod common;
pub mod mysql;
pub mod postgres;

pub use mysql::{MysqlAdapter, MysqlConnection};
pub use postgres::{PostgresAdapter, PostgresConnection};

use async_trait::async_trait;

use crate::codec::ResultCodec;
use crate::core::traits::{DialectConnection, SessionHandle};
use crate::core::value::QueryResult;
use crate::error::Result;

/// A live, verified connection to one of the supported engines.
///
/// Built-in engines are dispatched statically; each variant owns its
/// driver's pool. Dialects registered at runtime ride in `External`.
pub enum Connection {
    Postgres(PostgresConnection),
    Mysql(MysqlConnection),
    External(Box<dyn DialectConnection>),
}

impl Connection {
    /// Dialect tag of the engine behind this connection.
    pub fn dialect(&self) -> &str {
        match self {
            Connection::Postgres(_) => "postgres",
            Connection::Mysql(_) => "mysql",
            Connection::External(c) => c.dialect(),
        }
    }

    /// Run caller-supplied SQL and decode the result set.
    pub async fn execute(&self, sql: &str, codec: &ResultCodec) -> Result<QueryResult> {
        match self {
            Connection::Postgres(c) => c.execute(sql, codec).await,
            Connection::Mysql(c) => c.execute(sql, codec).await,
            Connection::External(c) => c.execute(sql, codec).await,
        }
    }

    /// Release every pooled connection.
    pub async fn close(&self) {
        match self {
            Connection::Postgres(c) => c.close().await,
            Connection::Mysql(c) => c.close().await,
            Connection::External(c) => c.close().await,
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Connection").field(&self.dialect()).finish()
    }
}

#[async_trait]
impl SessionHandle for Connection {
    async fn close(&self) {
        Connection::close(self).await
    }
}
