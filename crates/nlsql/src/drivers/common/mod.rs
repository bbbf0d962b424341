//! Utilities shared by the driver implementations.
//!
//! - [`tls`]: `ssl_mode` parsing and the rustls connector
//! - [`conn_str`]: escaping for connection strings

pub mod conn_str;
pub mod tls;

pub use tls::{SslMode, TlsBuilder};
