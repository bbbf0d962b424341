//! Core abstractions shared by every dialect.
//!
//! - [`schema`]: introspected tables and columns, canonical DDL rendering
//! - [`value`]: dialect-neutral result values
//! - [`traits`]: adapter, session-handle, cursor and translator traits
//! - [`catalog`]: adapter registry
//!
//! Driver modules (`drivers/postgres`, `drivers/mysql`) implement these
//! traits; nothing in here depends on a particular engine.

pub mod catalog;
pub mod schema;
pub mod traits;
pub mod value;

pub use catalog::AdapterRegistry;
pub use schema::{ColumnDef, SchemaDocument, TableDef};
pub use traits::{
    ColumnInfo, DialectAdapter, DialectConnection, ResultCursor, SessionHandle, SqlTranslator,
};
pub use value::{QueryResult, Row, Scalar, Value};
