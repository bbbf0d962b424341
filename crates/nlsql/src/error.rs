//! Error types for the adapter and result subsystem.

use thiserror::Error;

/// Boxed driver error kept as the `source` of an [`NlsqlError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for nlsql operations.
#[derive(Error, Debug)]
pub enum NlsqlError {
    /// Dialect tag is not registered in the adapter registry.
    #[error("unsupported database type: {0}")]
    UnsupportedDialect(String),

    /// Driver open or liveness check failed.
    #[error("Connection failed: {message}\n  Context: {context}")]
    Connection {
        message: String,
        context: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Schema fetch failed.
    #[error("Schema introspection failed: {0}")]
    Introspection(String),

    /// Caller-supplied SQL failed to execute.
    #[error("Query execution failed: {message}")]
    QueryExecution {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A row value could not be read from the result cursor.
    #[error("Failed to scan row {row}, column '{column}': {message}")]
    Scan {
        row: usize,
        column: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// An operation needing a connection ran before any connect succeeded.
    #[error("Not connected to database")]
    NoActiveSession,

    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The natural-language translator failed.
    #[error("Failed to generate SQL query: {0}")]
    Translation(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NlsqlError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl ToString, context: impl Into<String>) -> Self {
        NlsqlError::Connection {
            message: message.to_string(),
            context: context.into(),
            source: None,
        }
    }

    /// Create an Introspection error.
    pub fn introspection(message: impl ToString) -> Self {
        NlsqlError::Introspection(message.to_string())
    }

    /// Create a QueryExecution error.
    pub fn query(message: impl ToString) -> Self {
        NlsqlError::QueryExecution {
            message: message.to_string(),
            source: None,
        }
    }

    /// Create a Scan error for a cell of the result set.
    pub fn scan(row: usize, column: impl Into<String>, message: impl ToString) -> Self {
        NlsqlError::Scan {
            row,
            column: column.into(),
            message: message.to_string(),
            source: None,
        }
    }

    /// Attach the underlying driver error so `format_detailed` can walk it.
    ///
    /// Only `Connection`, `QueryExecution` and `Scan` carry a source; other
    /// variants are returned unchanged.
    pub fn with_source(mut self, err: impl Into<BoxError>) -> Self {
        match &mut self {
            NlsqlError::Connection { source, .. }
            | NlsqlError::QueryExecution { source, .. }
            | NlsqlError::Scan { source, .. } => *source = Some(err.into()),
            _ => {}
        }
        self
    }

    /// Process exit code used by the command-line front end.
    pub fn exit_code(&self) -> u8 {
        match self {
            NlsqlError::Config(_)
            | NlsqlError::UnsupportedDialect(_)
            | NlsqlError::Yaml(_)
            | NlsqlError::Io(_) => 2,
            NlsqlError::Connection { .. } | NlsqlError::NoActiveSession => 3,
            NlsqlError::Introspection(_)
            | NlsqlError::QueryExecution { .. }
            | NlsqlError::Scan { .. } => 4,
            NlsqlError::Translation(_) | NlsqlError::Json(_) => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for nlsql operations.
pub type Result<T> = std::result::Result<T, NlsqlError>;
