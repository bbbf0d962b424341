//! Result-set decoding into dialect-neutral rows.
//!
//! [`ResultCodec`] walks a [`ResultCursor`] once, front to back, and turns
//! every cell into a [`Value`]:
//!
//! - SQL NULL becomes [`Value::Null`], whatever the column type
//! - columns whose type name is in the renderer table become [`Value::Text`]
//! - everything else is passed through as [`Value::Native`]
//!
//! Result headers are unique: a repeated column name gets a `_2`, `_3`, ...
//! suffix so each row serializes as a JSON object with one key per column.
//!
//! The renderer table is keyed by the database-reported type name
//! (case-insensitive), so dialect-specific names are added with
//! [`ResultCodec::register`] rather than by touching the traversal.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::core::traits::ResultCursor;
use crate::core::value::{QueryResult, Row, Scalar, Value};
use crate::error::Result;

/// Converts a non-NULL scalar into its textual form.
pub type Renderer = fn(&Scalar) -> String;

/// Plain `Display` rendering.
pub fn render_display(value: &Scalar) -> String {
    value.to_string()
}

/// Bytes as (lossy) UTF-8 text; other scalars via `Display`.
pub fn render_utf8(value: &Scalar) -> String {
    match value {
        Scalar::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        other => other.to_string(),
    }
}

/// Character, UUID and date/time type names.
const DISPLAY_TYPES: &[&str] = &[
    "VARCHAR",
    "TEXT",
    "CHAR",
    "BPCHAR",
    "NAME",
    "UUID",
    "TIMESTAMP",
    "TIMESTAMPTZ",
    "DATETIME",
    "DATE",
    "TIME",
];

/// Opaque binary type names.
const BINARY_TYPES: &[&str] = &["BYTEA", "BLOB", "BINARY", "VARBINARY"];

/// Type-aware cursor decoder.
#[derive(Debug, Clone)]
pub struct ResultCodec {
    renderers: HashMap<String, Renderer>,
}

impl Default for ResultCodec {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ResultCodec {
    /// Codec with an empty renderer table: every value passes through.
    pub fn passthrough() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Codec with the built-in character, UUID, temporal and binary renderers.
    pub fn with_builtins() -> Self {
        let mut codec = Self::passthrough();
        for name in DISPLAY_TYPES {
            codec.register(name, render_display);
        }
        for name in BINARY_TYPES {
            codec.register(name, render_utf8);
        }
        codec
    }

    /// Render values of `type_name` columns to text with `renderer`.
    pub fn register(&mut self, type_name: &str, renderer: Renderer) {
        self.renderers.insert(type_name.to_ascii_uppercase(), renderer);
    }

    /// Renderer for a type name, if it is rendered as text.
    pub fn renderer_for(&self, type_name: &str) -> Option<Renderer> {
        self.renderers.get(&type_name.to_ascii_uppercase()).copied()
    }

    /// Classify one cell.
    pub fn convert(&self, type_name: &str, value: Option<Scalar>) -> Value {
        match value {
            None => Value::Null,
            Some(v) => match self.renderer_for(type_name) {
                Some(render) => Value::Text(render(&v)),
                None => Value::Native(v),
            },
        }
    }

    /// Drain `cursor` into a [`QueryResult`].
    ///
    /// Any row error aborts the whole conversion; no partial result is
    /// returned.
    pub fn decode<C: ResultCursor + ?Sized>(&self, cursor: &mut C) -> Result<QueryResult> {
        let columns = cursor.columns().to_vec();
        let headers = unique_headers(columns.iter().map(|c| c.name.as_str()));
        let renderers: Vec<Option<Renderer>> = columns
            .iter()
            .map(|c| self.renderer_for(&c.type_name))
            .collect();

        let mut rows = Vec::new();
        while let Some(raw) = cursor.next_row()? {
            let mut row = Row::with_capacity(columns.len());
            for ((name, render), cell) in headers.iter().zip(&renderers).zip(raw) {
                let value = match (cell, render) {
                    (None, _) => Value::Null,
                    (Some(v), Some(render)) => Value::Text(render(&v)),
                    (Some(v), None) => Value::Native(v),
                };
                row.push(name.clone(), value);
            }
            rows.push(row);
        }

        debug!("Decoded {} rows x {} columns", rows.len(), columns.len());

        Ok(QueryResult { headers, rows })
    }
}

/// Column names with repeats suffixed (`a`, `a_2`, `a_3`), skipping any
/// suffix that is already a real column name.
fn unique_headers<'a>(names: impl Iterator<Item = &'a str> + Clone) -> Vec<String> {
    let mut taken: HashSet<String> = names.clone().map(str::to_string).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut headers = Vec::new();

    for name in names {
        if seen.insert(name) {
            headers.push(name.to_string());
            continue;
        }
        let mut n = 2;
        let renamed = loop {
            let candidate = format!("{}_{}", name, n);
            if !taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        taken.insert(renamed.clone());
        headers.push(renamed);
    }
    headers
}
