//! Schema introspection for PostgreSQL.
//!
//! One ordered query over `information_schema.columns` is streamed and folded
//! into table blocks as the table name changes, so the whole catalog never
//! has to sit in memory as rows.

use deadpool_postgres::Pool;
use futures::StreamExt;
use tracing::debug;

use crate::core::schema::{ColumnDef, SchemaDocument, TableDef};
use crate::error::{NlsqlError, Result};

use super::diagnostics::{pg_message, pool_message};

const SCHEMA_QUERY: &str = r#"
SELECT c.table_name::text, c.column_name::text, c.data_type::text
FROM information_schema.columns c
WHERE c.table_schema = 'public'
ORDER BY c.table_name, c.ordinal_position
"#;

/// Folds `(table, column, type)` rows, ordered by table, into a [`SchemaDocument`].
#[derive(Debug, Default)]
pub struct TableGrouper {
    doc: SchemaDocument,
    current: Option<TableDef>,
}

impl TableGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one row. A new table name closes the block in progress.
    pub fn push(
        &mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        data_type: impl Into<String>,
    ) {
        let table = table.into();
        if self.current.as_ref().map_or(true, |t| t.name != table) {
            self.flush();
            self.current = Some(TableDef::new(table));
        }
        if let Some(t) = self.current.as_mut() {
            t.columns.push(ColumnDef::new(column, data_type));
        }
    }

    fn flush(&mut self) {
        if let Some(done) = self.current.take() {
            self.doc.push(done);
        }
    }

    /// Close the last block. An empty public schema is an error.
    pub fn finish(mut self) -> Result<SchemaDocument> {
        self.flush();
        if self.doc.is_empty() {
            return Err(NlsqlError::introspection("no tables found in public schema"));
        }
        Ok(self.doc)
    }
}

/// Run the catalog query and build the schema document.
pub(super) async fn fetch_schema(pool: &Pool) -> Result<SchemaDocument> {
    let client = pool
        .get()
        .await
        .map_err(|e| {
            NlsqlError::introspection(format!("acquiring connection: {}", pool_message(&e)))
        })?;

    let stream = client
        .query_raw(SCHEMA_QUERY, Vec::<String>::new())
        .await
        .map_err(|e| {
            NlsqlError::introspection(format!("querying information_schema: {}", pg_message(&e)))
        })?;
    tokio::pin!(stream);

    let mut grouper = TableGrouper::new();
    let mut rows = 0usize;
    while let Some(row) = stream.next().await {
        let row = row.map_err(|e| {
            NlsqlError::introspection(format!("reading catalog row: {}", pg_message(&e)))
        })?;
        let table: String = row
            .try_get(0)
            .map_err(|e| NlsqlError::introspection(format!("table_name: {}", e)))?;
        let column: String = row
            .try_get(1)
            .map_err(|e| NlsqlError::introspection(format!("column_name: {}", e)))?;
        let data_type: String = row
            .try_get(2)
            .map_err(|e| NlsqlError::introspection(format!("data_type: {}", e)))?;
        grouper.push(table, column, data_type);
        rows += 1;
    }

    let doc = grouper.finish()?;
    debug!("Introspected {} tables from {} catalog rows", doc.len(), rows);
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_consecutive_rows_by_table() {
        let mut g = TableGrouper::new();
        g.push("a", "x", "int4");
        g.push("a", "y", "text");
        g.push("b", "z", "bool");
        let doc = g.finish().unwrap();

        assert_eq!(doc.len(), 2);
        assert_eq!(
            doc.to_ddl(),
            "CREATE TABLE a (\n  x int4,\n  y text\n);\n\nCREATE TABLE b (\n  z bool\n);\n"
        );
    }

    #[test]
    fn test_keeps_column_order() {
        let mut g = TableGrouper::new();
        for col in ["id", "name", "created_at"] {
            g.push("users", col, "text");
        }
        let doc = g.finish().unwrap();
        let names: Vec<_> = doc.tables[0].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "created_at"]);
    }

    #[test]
    fn test_empty_schema_is_error() {
        let err = TableGrouper::new().finish().unwrap_err();
        assert!(matches!(err, NlsqlError::Introspection(_)));
        assert!(err.to_string().contains("no tables found in public schema"));
    }
}
