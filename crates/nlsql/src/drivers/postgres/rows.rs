//! Query execution and cell decoding for PostgreSQL.
//!
//! Statements are prepared for their column metadata and then run through
//! the simple query protocol, which returns every value in PostgreSQL's text
//! output format. Enums, intervals, arrays, network types and numerics of any
//! precision therefore arrive readable; only the types listed in
//! [`decode_text`] are turned into native scalars.

use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::types::Type;
use tokio_postgres::{Column, SimpleQueryMessage, SimpleQueryRow};
use tracing::debug;

use crate::codec::ResultCodec;
use crate::core::traits::{ColumnInfo, ResultCursor};
use crate::core::value::{QueryResult, Scalar};
use crate::error::{NlsqlError, Result};

use super::diagnostics::{pg_message, pool_message, query_error};

/// Pooled PostgreSQL connection.
pub struct PostgresConnection {
    pool: Pool,
}

impl PostgresConnection {
    pub(crate) fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Prepare, execute and decode `sql`.
    ///
    /// Preparing first gives column metadata even when no rows come back.
    pub async fn execute(&self, sql: &str, codec: &ResultCodec) -> Result<QueryResult> {
        let client = self.pool.get().await.map_err(|e| {
            NlsqlError::query(format!("acquiring connection: {}", pool_message(&e))).with_source(e)
        })?;

        let stmt = client.prepare(sql).await.map_err(query_error)?;
        let messages = client.simple_query(sql).await.map_err(query_error)?;
        let rows: Vec<SimpleQueryRow> = messages
            .into_iter()
            .filter_map(|m| match m {
                SimpleQueryMessage::Row(row) => Some(row),
                _ => None,
            })
            .collect();
        debug!("PostgreSQL returned {} rows", rows.len());

        let mut cursor = PgCursor::new(stmt.columns(), rows);
        codec.decode(&mut cursor)
    }

    pub async fn close(&self) {
        self.pool.close();
    }
}

/// Cursor over fully fetched text-format rows.
struct PgCursor {
    columns: Vec<ColumnInfo>,
    types: Vec<Type>,
    rows: std::vec::IntoIter<SimpleQueryRow>,
    index: usize,
}

impl PgCursor {
    fn new(columns: &[Column], rows: Vec<SimpleQueryRow>) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|c| ColumnInfo::new(c.name(), c.type_().name().to_uppercase()))
                .collect(),
            types: columns.iter().map(|c| c.type_().clone()).collect(),
            rows: rows.into_iter(),
            index: 0,
        }
    }
}

impl ResultCursor for PgCursor {
    fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Option<Scalar>>>> {
        let Some(row) = self.rows.next() else {
            return Ok(None);
        };
        let row_index = self.index;
        self.index += 1;

        let mut cells = Vec::with_capacity(self.types.len());
        for (idx, ty) in self.types.iter().enumerate() {
            let column = &self.columns[idx].name;
            let text = row.try_get(idx).map_err(|e| {
                NlsqlError::scan(row_index, column.clone(), pg_message(&e)).with_source(e)
            })?;
            let cell = match text {
                Some(text) => Some(
                    decode_text(ty, text)
                        .map_err(|e| NlsqlError::scan(row_index, column.clone(), e))?,
                ),
                None => None,
            };
            cells.push(cell);
        }
        Ok(Some(cells))
    }
}

/// Decode one text-format value by its PostgreSQL type name.
///
/// Anything not matched here is kept as the server printed it.
fn decode_text(ty: &Type, text: &str) -> std::result::Result<Scalar, String> {
    let value = match ty.name() {
        "bool" => match text {
            "t" => Scalar::Bool(true),
            "f" => Scalar::Bool(false),
            other => return Err(format!("invalid boolean '{}'", other)),
        },
        "int2" | "int4" | "int8" => Scalar::Int(
            text.parse()
                .map_err(|e| format!("invalid integer '{}': {}", text, e))?,
        ),
        "oid" => Scalar::UInt(
            text.parse()
                .map_err(|e| format!("invalid oid '{}': {}", text, e))?,
        ),
        // The server already prints the shortest round-trip form.
        "float4" | "float8" => Scalar::Float(
            text.parse()
                .map_err(|e| format!("invalid float '{}': {}", text, e))?,
        ),
        "timestamptz" => Scalar::Text(normalize_timestamptz(text)),
        "bytea" => Scalar::Bytes(decode_bytea(text)?),
        _ => Scalar::Text(text.to_string()),
    };
    Ok(value)
}

/// `2024-01-02 03:04:05+02` to RFC 3339 in UTC. Values chrono cannot
/// represent (`infinity`, BC dates) pass through untouched.
fn normalize_timestamptz(text: &str) -> String {
    match DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z") {
        Ok(ts) => ts.with_timezone(&Utc).to_rfc3339(),
        Err(_) => text.to_string(),
    }
}

/// bytea in the `hex` output format (`\x0a0b`).
fn decode_bytea(text: &str) -> std::result::Result<Vec<u8>, String> {
    let hex = text
        .strip_prefix("\\x")
        .ok_or_else(|| "bytea value is not in hex output format".to_string())?;
    if !hex.is_ascii() || hex.len() % 2 != 0 {
        return Err(format!("malformed bytea hex '{}'", hex));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("malformed bytea hex '{}': {}", hex, e))
        })
        .collect()
}
