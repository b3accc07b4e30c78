//! Generic ODBC dialect (Access-style): bracketed identifiers, `#...#`
//! datetime literals, TOP-based row limiting, no reflection.

use chrono::NaiveDateTime;

use crate::error::DbError;

pub(crate) fn delimit(name: &str) -> String {
    format!(
        "[{}]",
        name.replace('[', "[[").replace(']', "]]")
    )
}

pub(crate) fn format_datetime(value: &NaiveDateTime) -> String {
    format!("#{}#", value.format("%m/%d/%Y %H:%M:%S"))
}

/// Bracket-class escaping; no ESCAPE clause exists, so the wildcards and the
/// opening bracket are neutralized with character classes.
pub(crate) fn escape_like(value: &str, pos: i32) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '\'' => escaped.push_str("''"),
            '%' => escaped.push_str("[%]"),
            '_' => escaped.push_str("[_]"),
            '[' => escaped.push_str("[[]"),
            _ => escaped.push(ch),
        }
    }
    let prefix = if pos <= 0 { "'%" } else { "'" };
    let suffix = if pos >= 0 { "%'" } else { "'" };
    format!("{prefix}{escaped}{suffix}")
}

pub(crate) fn apply_limit(
    sql: &str,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<String, DbError> {
    if offset.unwrap_or(0) > 0 {
        return Err(DbError::NotSupported(
            "offset is not supported by the odbc dialect".to_string(),
        ));
    }
    match limit {
        Some(limit) => super::inject_top(sql, limit),
        None => Ok(sql.to_string()),
    }
}
