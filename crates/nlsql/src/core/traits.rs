//! Core traits for dialect-agnostic database access.
//!
//! - [`DialectAdapter`]: connection strings, connection setup and schema
//!   introspection for one database engine
//! - [`SessionHandle`]: a live connection the session manager can close
//! - [`DialectConnection`]: live connection of a dialect registered from
//!   outside this crate
//! - [`ResultCursor`]: forward-only access to a result set for the codec
//! - [`SqlTranslator`]: the natural-language to SQL collaborator
//!
//! # Design Patterns
//!
//! - **Abstract Factory**: the adapter registry hands out one adapter per dialect
//! - **Strategy**: adapters provide interchangeable connection and catalog logic

use std::any::Any;

use async_trait::async_trait;

use crate::codec::ResultCodec;
use crate::config::{ConnectionConfig, PoolConfig};
use crate::drivers::Connection;
use crate::error::Result;

use super::schema::SchemaDocument;
use super::value::{QueryResult, Scalar};

/// Per-dialect connection and introspection strategy.
#[async_trait]
pub trait DialectAdapter: Send + Sync {
    /// Get the dialect identifier (e.g., "postgres", "mysql").
    fn name(&self) -> &str;

    /// Format credentials and address in the driver's connection string form.
    ///
    /// Pure and deterministic; credentials are only checked by [`open`](Self::open).
    fn connection_string(&self, config: &ConnectionConfig) -> String;

    /// Open a connection and verify it is live.
    async fn open(&self, config: &ConnectionConfig, pool: &PoolConfig) -> Result<Connection>;

    /// Enumerate tables and columns of the connected database.
    async fn introspect_schema(&self, conn: &Connection) -> Result<SchemaDocument>;
}

/// Live connection for a dialect the built-in [`Connection`] variants do
/// not cover. An adapter registered at runtime wraps its handle in
/// [`Connection::External`].
#[async_trait]
pub trait DialectConnection: Send + Sync + 'static {
    /// Dialect tag of the engine behind this connection.
    fn dialect(&self) -> &str;

    /// Run caller-supplied SQL and decode the result set with `codec`.
    async fn execute(&self, sql: &str, codec: &ResultCodec) -> Result<QueryResult>;

    /// Release the underlying connection.
    async fn close(&self);

    /// Lets the owning adapter downcast back to its concrete type for
    /// introspection.
    fn as_any(&self) -> &dyn Any;
}

/// A connection owned by the session manager.
#[async_trait]
pub trait SessionHandle: Send + Sync + 'static {
    /// Release the underlying connection. Called at most once per handle.
    async fn close(&self);
}

/// Name and database-reported type of a result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Type name as the driver reports it (e.g. `VARCHAR`, `INT4`).
    pub type_name: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Forward-only view of an executed query.
pub trait ResultCursor {
    /// Result columns in select-list order.
    fn columns(&self) -> &[ColumnInfo];

    /// Decode the next row, one entry per column, `None` for SQL NULL.
    ///
    /// Returns `Ok(None)` once the cursor is exhausted.
    fn next_row(&mut self) -> Result<Option<Vec<Option<Scalar>>>>;
}

/// Translates a question into SQL for the given schema and dialect.
#[async_trait]
pub trait SqlTranslator: Send + Sync {
    async fn translate(&self, question: &str, schema: &str, dialect: &str) -> Result<String>;
}
