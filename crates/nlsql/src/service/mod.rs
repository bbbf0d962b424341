//! Connect, introspect, translate and execute against the active session.
//!
//! [`QueryService`] is what an HTTP layer or the CLI drives. It owns the
//! adapter registry, the session manager and the result codec, and wires the
//! request flows through them:
//!
//! ```text
//! connect:  config -> registry -> adapter.open -> sessions.install
//! generate: sessions.current -> adapter.introspect_schema -> translator
//! execute:  sessions.current -> connection.execute -> codec
//! ```

use tracing::{debug, info};

use crate::codec::ResultCodec;
use crate::config::{validate_connection, Config, ConnectionConfig, PoolConfig};
use crate::core::catalog::AdapterRegistry;
use crate::core::schema::SchemaDocument;
use crate::core::traits::SqlTranslator;
use crate::core::value::QueryResult;
use crate::error::{NlsqlError, Result};
use crate::session::SessionManager;

/// Facade over the adapter registry, the session and the codec.
pub struct QueryService {
    registry: AdapterRegistry,
    sessions: SessionManager,
    codec: ResultCodec,
    pool: PoolConfig,
}

impl Default for QueryService {
    fn default() -> Self {
        Self::new(
            AdapterRegistry::with_builtins(),
            ResultCodec::with_builtins(),
            PoolConfig::default(),
        )
    }
}

impl QueryService {
    pub fn new(registry: AdapterRegistry, codec: ResultCodec, pool: PoolConfig) -> Self {
        Self {
            registry,
            sessions: SessionManager::new(),
            codec,
            pool,
        }
    }

    /// Service with the built-in adapters and the pool settings from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            AdapterRegistry::with_builtins(),
            ResultCodec::with_builtins(),
            config.pool.clone(),
        )
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Open and verify a connection, then make it the active session.
    ///
    /// Nothing about the current session changes unless the new connection
    /// is already open and verified.
    pub async fn connect(&self, config: &ConnectionConfig) -> Result<()> {
        let adapter = self.registry.resolve(&config.dialect)?;
        validate_connection(config)?;

        let conn = adapter.open(config, &self.pool).await?;
        self.sessions.install(conn, config.dialect.clone()).await;
        Ok(())
    }

    /// Introspect the live schema of the active session.
    pub async fn schema(&self) -> Result<SchemaDocument> {
        let session = self.sessions.current().await?;
        let adapter = self.registry.resolve(&session.dialect)?;
        adapter.introspect_schema(&session.handle).await
    }

    /// Canonical DDL text of the live schema.
    pub async fn schema_text(&self) -> Result<String> {
        Ok(self.schema().await?.to_ddl())
    }

    /// Ask `translator` for SQL answering `question` against the live schema.
    pub async fn generate_query(
        &self,
        question: &str,
        translator: &dyn SqlTranslator,
    ) -> Result<String> {
        let session = self.sessions.current().await?;
        let adapter = self.registry.resolve(&session.dialect)?;
        let schema = adapter.introspect_schema(&session.handle).await?.to_ddl();
        drop(session);

        debug!("Translating question against {} bytes of schema", schema.len());
        let raw = translator.translate(question, &schema, adapter.name()).await?;
        let sql = strip_code_fences(&raw);
        if sql.is_empty() {
            return Err(NlsqlError::Translation("no SQL query generated".into()));
        }
        Ok(sql.to_string())
    }

    /// Execute caller-supplied SQL on the active session.
    pub async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let session = self.sessions.current().await?;
        let result = session.handle.execute(sql, &self.codec).await?;
        info!("Query returned {} rows", result.row_count());
        Ok(result)
    }

    pub async fn dialect(&self) -> Option<String> {
        self.sessions.dialect().await
    }

    pub async fn is_connected(&self) -> bool {
        self.sessions.is_active().await
    }

    /// Close the active session.
    pub async fn shutdown(&self) {
        self.sessions.shutdown().await;
    }
}

/// Remove a surrounding markdown code fence (```` ```sql ```` or ```` ``` ````).
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```sql")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{ColumnDef, TableDef};
    use crate::core::traits::{ColumnInfo, DialectAdapter, DialectConnection, ResultCursor};
    use crate::core::value::{Scalar, Value};
    use crate::drivers::{Connection, PostgresConnection};
    use async_trait::async_trait;
    use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_postgres::NoTls;

    /// Adapter whose `open` always fails the way a bad password does.
    struct RejectingAdapter {
        opens: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DialectAdapter for RejectingAdapter {
        fn name(&self) -> &str {
            "postgres"
        }

        fn connection_string(&self, _config: &ConnectionConfig) -> String {
            String::new()
        }

        async fn open(&self, _config: &ConnectionConfig, _pool: &PoolConfig) -> Result<Connection> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            Err(NlsqlError::connection(
                "password authentication failed for user \"alice\"",
                "connecting to PostgreSQL",
            ))
        }

        async fn introspect_schema(&self, _conn: &Connection) -> Result<SchemaDocument> {
            Err(NlsqlError::introspection("unused"))
        }
    }

    /// A pool that never connects unless a client is checked out.
    fn idle_connection() -> Connection {
        let pg_config: tokio_postgres::Config =
            "host=127.0.0.1 port=1 user=idle dbname=idle".parse().unwrap();
        let mgr = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(mgr).max_size(1).build().unwrap();
        Connection::Postgres(PostgresConnection::new(pool))
    }

    fn pg_config() -> ConnectionConfig {
        ConnectionConfig::new("postgres", "db.local", "5432", "alice", "wrong", "shop")
    }

    fn rejecting_service() -> (QueryService, Arc<AtomicUsize>) {
        let opens = Arc::new(AtomicUsize::new(0));
        let mut registry = AdapterRegistry::new();
        registry.register(
            "postgres",
            RejectingAdapter {
                opens: Arc::clone(&opens),
            },
        );
        let svc = QueryService::new(registry, ResultCodec::with_builtins(), PoolConfig::default());
        (svc, opens)
    }

    #[tokio::test]
    async fn test_failed_connect_keeps_previous_session() {
        let (svc, opens) = rejecting_service();
        svc.sessions().install(idle_connection(), "postgres").await;
        let before = svc.sessions().current().await.unwrap();

        let err = svc.connect(&pg_config()).await.unwrap_err();
        assert!(matches!(err, NlsqlError::Connection { .. }));
        assert_eq!(opens.load(Ordering::SeqCst), 1);

        let after = svc.sessions().current().await.unwrap();
        assert!(Arc::ptr_eq(&before.handle, &after.handle));
        assert_eq!(svc.dialect().await.as_deref(), Some("postgres"));
    }

    #[tokio::test]
    async fn test_connect_unknown_dialect() {
        let svc = QueryService::default();
        let cfg = ConnectionConfig::new("oracle", "h", "1521", "u", "p", "d");
        let err = svc.connect(&cfg).await.unwrap_err();
        assert!(matches!(err, NlsqlError::UnsupportedDialect(ref t) if t == "oracle"));
        assert!(!svc.is_connected().await);
    }

    #[tokio::test]
    async fn test_connect_invalid_config_never_opens() {
        let (svc, opens) = rejecting_service();
        let mut cfg = pg_config();
        cfg.port = "abc".into();
        let err = svc.connect(&cfg).await.unwrap_err();
        assert!(matches!(err, NlsqlError::Config(_)));
        assert_eq!(opens.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_operations_require_session() {
        struct NeverCalled;

        #[async_trait]
        impl SqlTranslator for NeverCalled {
            async fn translate(&self, _q: &str, _s: &str, _d: &str) -> Result<String> {
                panic!("translator called without a session");
            }
        }

        let svc = QueryService::default();
        assert!(matches!(
            svc.execute_query("SELECT 1").await,
            Err(NlsqlError::NoActiveSession)
        ));
        assert!(matches!(
            svc.schema_text().await,
            Err(NlsqlError::NoActiveSession)
        ));
        assert!(matches!(
            svc.generate_query("how many users?", &NeverCalled).await,
            Err(NlsqlError::NoActiveSession)
        ));
    }

    #[tokio::test]
    async fn test_shutdown_clears_session() {
        let svc = QueryService::default();
        svc.sessions().install(idle_connection(), "postgres").await;
        assert!(svc.is_connected().await);

        svc.shutdown().await;
        assert!(!svc.is_connected().await);
        assert!(svc.dialect().await.is_none());
    }

    /// In-memory engine standing in for a dialect the crate does not ship.
    struct MemoryConnection {
        closes: Arc<AtomicUsize>,
    }

    struct OneRowCursor {
        columns: Vec<ColumnInfo>,
        row: Option<Vec<Option<Scalar>>>,
    }

    impl ResultCursor for OneRowCursor {
        fn columns(&self) -> &[ColumnInfo] {
            &self.columns
        }

        fn next_row(&mut self) -> Result<Option<Vec<Option<Scalar>>>> {
            Ok(self.row.take())
        }
    }

    #[async_trait]
    impl DialectConnection for MemoryConnection {
        fn dialect(&self) -> &str {
            "memory"
        }

        async fn execute(&self, sql: &str, codec: &ResultCodec) -> Result<QueryResult> {
            let mut cursor = OneRowCursor {
                columns: vec![ColumnInfo::new("sql", "TEXT"), ColumnInfo::new("n", "INT8")],
                row: Some(vec![Some(Scalar::from(sql)), Some(Scalar::Int(1))]),
            };
            codec.decode(&mut cursor)
        }

        async fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    struct MemoryAdapter {
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DialectAdapter for MemoryAdapter {
        fn name(&self) -> &str {
            "memory"
        }

        fn connection_string(&self, config: &ConnectionConfig) -> String {
            format!("memory://{}", config.database)
        }

        async fn open(&self, _config: &ConnectionConfig, _pool: &PoolConfig) -> Result<Connection> {
            Ok(Connection::External(Box::new(MemoryConnection {
                closes: Arc::clone(&self.closes),
            })))
        }

        async fn introspect_schema(&self, conn: &Connection) -> Result<SchemaDocument> {
            match conn {
                Connection::External(c) if c.as_any().is::<MemoryConnection>() => {
                    let mut table = TableDef::new("notes");
                    table.columns.push(ColumnDef::new("body", "text"));
                    let mut doc = SchemaDocument::new();
                    doc.push(table);
                    Ok(doc)
                }
                _ => Err(NlsqlError::introspection("not a memory connection")),
            }
        }
    }

    #[tokio::test]
    async fn test_registered_dialect_runs_end_to_end() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut registry = AdapterRegistry::with_builtins();
        registry.register(
            "memory",
            MemoryAdapter {
                closes: Arc::clone(&closes),
            },
        );
        let svc = QueryService::new(registry, ResultCodec::with_builtins(), PoolConfig::default());

        let cfg = ConnectionConfig::new("memory", "local", "1", "u", "p", "scratch");
        svc.connect(&cfg).await.unwrap();
        assert_eq!(svc.dialect().await.as_deref(), Some("memory"));

        let result = svc.execute_query("SELECT 1").await.unwrap();
        assert_eq!(result.headers, vec!["sql", "n"]);
        assert_eq!(result.rows[0].get("sql"), Some(&Value::Text("SELECT 1".into())));
        assert_eq!(result.rows[0].get("n"), Some(&Value::Native(Scalar::Int(1))));
        assert!(svc.schema_text().await.unwrap().contains("notes"));

        svc.shutdown().await;
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("SELECT 1"), "SELECT 1");
        assert_eq!(strip_code_fences("```sql\nSELECT 1;\n```"), "SELECT 1;");
        assert_eq!(strip_code_fences("  ```\nSELECT 1\n```  "), "SELECT 1");
        assert_eq!(strip_code_fences("```sql```"), "");
    }
}
