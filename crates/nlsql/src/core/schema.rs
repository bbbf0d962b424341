//! Introspected schema metadata and its canonical DDL rendering.
//!
//! The rendered text is handed verbatim to the SQL translator as prompt
//! context, so its shape must stay byte-stable for identical schema state:
//!
//! ```text
//! CREATE TABLE orders (
//!   id int4,
//!   placed_at timestamp
//! );
//!
//! CREATE TABLE users (
//!   id int4
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A column as reported by the database catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,

    /// Declared type name, exactly as the catalog reports it.
    pub data_type: String,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A table and its columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    /// Table name.
    pub name: String,

    /// Columns ordered by ordinal position.
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Render this table as a single `CREATE TABLE` block.
    pub fn to_ddl(&self) -> String {
        let mut out = format!("CREATE TABLE {} (\n", self.name);
        let columns = self
            .columns
            .iter()
            .map(|c| format!("  {} {}", c.name, c.data_type))
            .collect::<Vec<_>>()
            .join(",\n");
        if !columns.is_empty() {
            out.push_str(&columns);
            out.push('\n');
        }
        out.push_str(");\n");
        out
    }
}

/// Tables in introspection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub tables: Vec<TableDef>,
}

impl SchemaDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, table: TableDef) {
        self.tables.push(table);
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Render the whole schema, one block per table separated by a blank line.
    pub fn to_ddl(&self) -> String {
        self.tables
            .iter()
            .map(TableDef::to_ddl)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for SchemaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ddl())
    }
}
