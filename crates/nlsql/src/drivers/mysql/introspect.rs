//! Schema introspection for MySQL.
//!
//! Tables are listed with `SHOW TABLES` and described one at a time. A table
//! that cannot be described is logged and left out; the rest of the schema is
//! still returned.

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::Row;
use tracing::{debug, warn};

use crate::core::schema::{ColumnDef, SchemaDocument, TableDef};
use crate::error::{NlsqlError, Result};

/// Catalog lookups used by [`introspect`].
#[async_trait]
pub trait MysqlCatalog: Send + Sync {
    /// Table names of the connected database, in server order.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// `(field, type)` pairs for one table.
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDef>>;
}

fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[async_trait]
impl MysqlCatalog for MySqlPool {
    async fn list_tables(&self) -> Result<Vec<String>> {
        // text protocol; some servers refuse SHOW/DESCRIBE as prepared statements
        let rows: Vec<MySqlRow> = sqlx::raw_sql("SHOW TABLES")
            .fetch_all(self)
            .await
            .map_err(|e| NlsqlError::introspection(format!("SHOW TABLES: {}", e)))?;

        rows.iter()
            .map(|row| {
                row.try_get_unchecked::<String, _>(0)
                    .map_err(|e| NlsqlError::introspection(format!("SHOW TABLES row: {}", e)))
            })
            .collect()
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDef>> {
        let sql = format!("DESCRIBE {}", quote_ident(table));
        let rows: Vec<MySqlRow> = sqlx::raw_sql(&sql)
            .fetch_all(self)
            .await
            .map_err(|e| NlsqlError::introspection(format!("{}: {}", sql, e)))?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let field: String = row
                .try_get_unchecked(0)
                .map_err(|e| NlsqlError::introspection(format!("{} field: {}", sql, e)))?;
            let data_type: String = row
                .try_get_unchecked(1)
                .map_err(|e| NlsqlError::introspection(format!("{} type: {}", sql, e)))?;
            columns.push(ColumnDef::new(field, data_type));
        }
        Ok(columns)
    }
}

/// Build a [`SchemaDocument`] from `catalog`.
///
/// Failing to list tables is fatal. Failing to describe a single table only
/// drops that table. An empty database yields an empty document.
pub async fn introspect<C: MysqlCatalog + ?Sized>(catalog: &C) -> Result<SchemaDocument> {
    let tables = catalog.list_tables().await?;
    debug!("Found {} MySQL tables", tables.len());

    let mut doc = SchemaDocument::new();
    for name in tables {
        match catalog.describe_table(&name).await {
            Ok(columns) => {
                let mut table = TableDef::new(name);
                table.columns = columns;
                doc.push(table);
            }
            Err(e) => warn!("Skipping table {}: {}", name, e),
        }
    }
    Ok(doc)
}
