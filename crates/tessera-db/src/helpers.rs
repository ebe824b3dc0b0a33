//! Row decoding and parameter conversion helpers.
//!
//! Timestamps are written as RFC 3339 by the repos but default to
//! `SQLite`'s `datetime('now')` format in the migration, so both are read.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use tessera_query::sqlite::SqlParam;

use crate::error::DatabaseError;

/// Parse a TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Current time at the precision timestamps are stored with.
#[must_use]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 (microseconds, `Z`), so TEXT ordering matches time
/// ordering.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Read a nullable TEXT column. SQL NULL and the empty string are both `None`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Decode a JSON document column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the text is not valid JSON.
pub fn parse_json(s: &str) -> Result<serde_json::Value, DatabaseError> {
    serde_json::from_str(s).map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))
}

/// Encode a JSON document for a TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if serialization fails.
pub fn to_json_text(value: &serde_json::Value) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::Other(e.into()))
}

#[must_use]
pub fn to_libsql(param: SqlParam) -> libsql::Value {
    match param {
        SqlParam::Null => libsql::Value::Null,
        SqlParam::Integer(i) => libsql::Value::Integer(i),
        SqlParam::Real(f) => libsql::Value::Real(f),
        SqlParam::Text(s) => libsql::Value::Text(s),
    }
}

/// Whether a libSQL failure is a `UNIQUE` or primary-key constraint violation.
#[must_use]
pub fn is_unique_violation(e: &DatabaseError) -> bool {
    match e {
        DatabaseError::LibSql(inner) => {
            let msg = inner.to_string();
            msg.contains("UNIQUE constraint failed") || msg.contains("PRIMARY KEY constraint failed")
        }
        _ => false,
    }
}
