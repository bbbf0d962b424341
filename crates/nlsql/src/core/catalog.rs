//! Adapter registry for explicit dependency injection.
//!
//! The [`AdapterRegistry`] maps dialect tags to [`DialectAdapter`]s. It is
//! built once at startup and handed to the query service instead of being a
//! global, so tests can register fakes and new dialects are added by
//! registration rather than by editing a match.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{NlsqlError, Result};

use super::traits::DialectAdapter;

/// Registry of dialect adapters keyed by tag.
///
/// # Example
///
/// ```rust
/// use nlsql::core::AdapterRegistry;
///
/// let registry = AdapterRegistry::with_builtins();
/// let adapter = registry.resolve("postgres").unwrap();
/// assert_eq!(adapter.name(), "postgres");
/// assert!(registry.resolve("oracle").is_err());
/// ```
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn DialectAdapter>>,
}

impl AdapterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in `postgres` and `mysql` adapters.
    pub fn with_builtins() -> Self {
        use crate::drivers::{MysqlAdapter, PostgresAdapter};

        let mut registry = Self::new();
        registry.register("postgres", PostgresAdapter::new());
        registry.register("mysql", MysqlAdapter::new());
        registry
    }

    /// Register an adapter under a dialect tag, replacing any previous one.
    pub fn register(&mut self, tag: impl Into<String>, adapter: impl DialectAdapter + 'static) {
        self.adapters.insert(tag.into(), Arc::new(adapter));
    }

    /// Register an adapter as an Arc (for sharing).
    pub fn register_arc(&mut self, tag: impl Into<String>, adapter: Arc<dyn DialectAdapter>) {
        self.adapters.insert(tag.into(), adapter);
    }

    /// Get the adapter for a dialect tag.
    ///
    /// # Errors
    ///
    /// Returns [`NlsqlError::UnsupportedDialect`] carrying `tag` when nothing
    /// is registered under it.
    pub fn resolve(&self, tag: &str) -> Result<Arc<dyn DialectAdapter>> {
        self.adapters
            .get(tag)
            .cloned()
            .ok_or_else(|| NlsqlError::UnsupportedDialect(tag.to_string()))
    }

    /// Check if a dialect is registered.
    pub fn contains(&self, tag: &str) -> bool {
        self.adapters.contains_key(tag)
    }

    /// Registered dialect tags, sorted.
    pub fn dialects(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_resolve_to_matching_adapter() {
        let registry = AdapterRegistry::with_builtins();
        for tag in ["postgres", "mysql"] {
            let adapter = registry.resolve(tag).unwrap();
            assert_eq!(adapter.name(), tag);
        }
        assert_eq!(registry.dialects(), vec!["mysql", "postgres"]);
    }

    #[test]
    fn test_unknown_tag_is_unsupported() {
        let registry = AdapterRegistry::with_builtins();
        for tag in ["sqlite", "", "Postgres", "mssql"] {
            match registry.resolve(tag) {
                Err(NlsqlError::UnsupportedDialect(t)) => assert_eq!(t, tag),
                Err(other) => panic!("unexpected error for '{}': {}", tag, other),
                Ok(_) => panic!("'{}' should not resolve", tag),
            }
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = AdapterRegistry::new();
        assert!(!registry.contains("postgres"));
        assert!(registry.resolve("postgres").is_err());
    }

    #[test]
    fn test_register_shared_adapter() {
        let mut registry = AdapterRegistry::new();
        let pg: Arc<dyn DialectAdapter> = Arc::new(crate::drivers::PostgresAdapter::new());
        registry.register_arc("pg", pg);
        assert_eq!(registry.resolve("pg").unwrap().name(), "postgres");
    }
}
