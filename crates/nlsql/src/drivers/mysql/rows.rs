//! Query execution and cell decoding for MySQL.
//!
//! Queries go through the text protocol (`sqlx::raw_sql`), so decimals,
//! dates and times arrive exactly as the server prints them. `DECIMAL(65,30)`,
//! negative `TIME` and `TIME` past 24 hours are all valid there, but have no
//! fixed-width Rust type to land in.

use sqlx::mysql::{MySqlColumn, MySqlPool, MySqlRow};
use sqlx::{Column, Executor, Row, TypeInfo, ValueRef};
use tracing::debug;

use crate::codec::ResultCodec;
use crate::core::traits::{ColumnInfo, ResultCursor};
use crate::core::value::{QueryResult, Scalar};
use crate::error::{NlsqlError, Result};

/// Pooled MySQL connection.
pub struct MysqlConnection {
    pool: MySqlPool,
}

impl MysqlConnection {
    pub(crate) fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Execute `sql` and decode the result set.
    pub async fn execute(&self, sql: &str, codec: &ResultCodec) -> Result<QueryResult> {
        let rows: Vec<MySqlRow> = sqlx::raw_sql(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| NlsqlError::query(&e).with_source(e))?;
        debug!("MySQL returned {} rows", rows.len());

        // Column metadata rides on the rows; an empty result has to ask the server.
        let columns = match rows.first() {
            Some(row) => column_info(row.columns()),
            None => {
                let described = (&self.pool)
                    .describe(sql)
                    .await
                    .map_err(|e| NlsqlError::query(&e).with_source(e))?;
                column_info(described.columns())
            }
        };

        let mut cursor = MysqlCursor {
            columns,
            rows: rows.into_iter(),
            index: 0,
        };
        codec.decode(&mut cursor)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn column_info(columns: &[MySqlColumn]) -> Vec<ColumnInfo> {
    columns
        .iter()
        .map(|c| ColumnInfo::new(c.name(), c.type_info().name()))
        .collect()
}

struct MysqlCursor {
    columns: Vec<ColumnInfo>,
    rows: std::vec::IntoIter<MySqlRow>,
    index: usize,
}

impl ResultCursor for MysqlCursor {
    fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Option<Scalar>>>> {
        let Some(row) = self.rows.next() else {
            return Ok(None);
        };
        let row_index = self.index;
        self.index += 1;

        let mut cells = Vec::with_capacity(self.columns.len());
        for (idx, col) in self.columns.iter().enumerate() {
            let cell = decode_cell(&row, idx, &col.type_name)
                .map_err(|e| NlsqlError::scan(row_index, col.name.clone(), &e).with_source(e))?;
            cells.push(cell);
        }
        Ok(Some(cells))
    }
}

/// Decode one cell by the type name sqlx reports (`INT`, `BIGINT UNSIGNED`, ...).
fn decode_cell(row: &MySqlRow, idx: usize, type_name: &str) -> sqlx::Result<Option<Scalar>> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(None);
    }

    let value = match type_name {
        "BOOLEAN" => Scalar::Bool(row.try_get::<bool, _>(idx)?),
        "TINYINT" => Scalar::Int(row.try_get::<i8, _>(idx)?.into()),
        "SMALLINT" => Scalar::Int(row.try_get::<i16, _>(idx)?.into()),
        "MEDIUMINT" | "INT" => Scalar::Int(row.try_get::<i32, _>(idx)?.into()),
        "BIGINT" => Scalar::Int(row.try_get::<i64, _>(idx)?),
        "TINYINT UNSIGNED" => Scalar::UInt(row.try_get::<u8, _>(idx)?.into()),
        "SMALLINT UNSIGNED" => Scalar::UInt(row.try_get::<u16, _>(idx)?.into()),
        "YEAR" => Scalar::UInt(row.try_get_unchecked::<u16, _>(idx)?.into()),
        "MEDIUMINT UNSIGNED" | "INT UNSIGNED" => {
            Scalar::UInt(row.try_get::<u32, _>(idx)?.into())
        }
        "BIGINT UNSIGNED" => Scalar::UInt(row.try_get::<u64, _>(idx)?),
        "FLOAT" => Scalar::from(row.try_get::<f32, _>(idx)?),
        "DOUBLE" => Scalar::Float(row.try_get::<f64, _>(idx)?),
        "DECIMAL" | "DATE" | "TIME" | "DATETIME" | "TIMESTAMP" | "CHAR" | "VARCHAR" | "TEXT"
        | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" | "JSON" => {
            Scalar::Text(row.try_get_unchecked::<String, _>(idx)?)
        }
        // BINARY, VARBINARY, the BLOB family, BIT, GEOMETRY and anything newer
        _ => Scalar::Bytes(row.try_get_unchecked::<Vec<u8>, _>(idx)?),
    };
    Ok(Some(value))
}
