//! PostgreSQL driver.
//!
//! - [`PostgresAdapter`]: connection strings, connect, schema introspection
//! - [`PostgresConnection`]: pooled handle that executes queries
//! - [`TableGrouper`]: streaming group-by behind introspection

mod adapter;
mod diagnostics;
mod introspect;
mod rows;

pub use adapter::PostgresAdapter;
pub use introspect::TableGrouper;
pub use rows::PostgresConnection;
