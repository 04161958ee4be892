//! Column helpers for the table-backed models
//!
//! Decimals are stored as text, string lists as JSON text, enums by their
//! `as_str()` name.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::Row;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized value '{value}' in column {column}")]
struct UnknownVariant {
    column: String,
    value: String,
}

pub(crate) fn decimal(row: &Row, column: &str) -> rusqlite::Result<Decimal> {
    let idx = row.as_ref().column_index(column)?;
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn optional_decimal(row: &Row, column: &str) -> rusqlite::Result<Option<Decimal>> {
    let idx = row.as_ref().column_index(column)?;
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| Decimal::from_str(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub(crate) fn json<T: DeserializeOwned>(row: &Row, column: &str) -> rusqlite::Result<T> {
    let idx = row.as_ref().column_index(column)?;
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

/// Read an enum column through its `from_str` parser
pub(crate) fn variant<T>(
    row: &Row,
    column: &str,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let idx = row.as_ref().column_index(column)?;
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        conversion_error(
            idx,
            UnknownVariant {
                column: column.to_string(),
                value: raw,
            },
        )
    })
}

pub(crate) fn decimal_text(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_string())
}

pub(crate) fn json_text<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}
