//! MySQL/MariaDB driver.
//!
//! - [`MysqlAdapter`]: connection URLs, connect, schema introspection
//! - [`MysqlConnection`]: pooled handle that executes queries
//! - [`MysqlCatalog`]: the two catalog lookups introspection is built from

mod adapter;
mod introspect;
mod rows;

pub use adapter::MysqlAdapter;
pub use introspect::{introspect, MysqlCatalog};
pub use rows::MysqlConnection;
