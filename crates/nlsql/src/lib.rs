//! # nlsql
//!
//! Database adapter and dynamic result layer for natural-language SQL tools.
//!
//! This library hides PostgreSQL and MySQL differences behind one interface:
//!
//! - **Adapter registry** resolving a dialect tag to its adapter
//! - **Schema introspection** into canonical `CREATE TABLE` text for prompts
//! - **Single active session** that is safe to read and replace concurrently
//! - **Dynamic result decoding** into JSON-ready rows, whatever the query
//!
//! ## Example
//!
//! ```rust,no_run
//! use nlsql::{Config, QueryService};
//!
//! #[tokio::main]
//! async fn main() -> nlsql::Result<()> {
//!     let config = Config::load("nlsql.yaml")?;
//!     let service = QueryService::from_config(&config);
//!     service.connect(&config.database).await?;
//!
//!     println!("{}", service.schema_text().await?);
//!     let result = service.execute_query("SELECT 1 AS one").await?;
//!     println!("{}", serde_json::to_string(&result)?);
//!
//!     service.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod service;
pub mod session;

// Re-exports for convenient access
pub use codec::ResultCodec;
pub use config::{Config, ConnectionConfig, PoolConfig};
pub use crate::core::{
    AdapterRegistry, ColumnDef, DialectAdapter, DialectConnection, QueryResult, Row, Scalar, SchemaDocument,
    SqlTranslator, TableDef, Value,
};
pub use drivers::Connection;
pub use error::{NlsqlError, Result};
pub use service::QueryService;
pub use session::{Session, SessionManager};
