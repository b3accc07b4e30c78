//! MySQL-family dialect: backtick delimiting, backslash-escaped strings,
//! LIMIT/OFFSET, SHOW-based reflection.

use chrono::{Duration, NaiveDateTime};

use crate::error::{DbError, ErrorKind};
use crate::reflection::{row_text, row_truthy, Column, ForeignKey, Index, Table};
use crate::results::Row;

pub(crate) fn delimit(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

pub(crate) fn quote_text(value: &str) -> String {
    format!(
        "'{}'",
        value.replace('\\', "\\\\").replace('\'', "''")
    )
}

pub(crate) fn format_datetime(value: &NaiveDateTime) -> String {
    format!("'{}'", value.format("%Y-%m-%d %H:%M:%S"))
}

pub(crate) fn format_interval(value: &Duration) -> String {
    let total = value.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "'{sign}{}:{:02}:{:02}'",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

pub(crate) fn escape_like(value: &str, pos: i32) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            // A literal backslash needs four in the pattern: two survive
            // string parsing, and LIKE needs a doubled escape character.
            '\\' => escaped.push_str("\\\\\\\\"),
            '\'' => escaped.push_str("\\'"),
            '%' => escaped.push_str("\\%"),
            '_' => escaped.push_str("\\_"),
            _ => escaped.push(ch),
        }
    }
    let prefix = if pos <= 0 { "'%" } else { "'" };
    let suffix = if pos >= 0 { "%'" } else { "'" };
    format!("{prefix}{escaped}{suffix}")
}

pub(crate) fn apply_limit(sql: &str, limit: Option<i64>, offset: Option<i64>) -> String {
    let offset = offset.unwrap_or(0);
    if limit.is_none() && offset == 0 {
        return sql.to_string();
    }
    // LIMIT is mandatory in MySQL when OFFSET is wanted.
    let mut out = format!(
        "{sql} LIMIT {}",
        limit.map_or_else(|| "18446744073709551615".to_string(), |l| l.to_string())
    );
    if offset > 0 {
        out.push_str(&format!(" OFFSET {offset}"));
    }
    out
}

pub(crate) fn classify_error(code: Option<i64>) -> ErrorKind {
    match code {
        Some(1216 | 1217 | 1451 | 1452 | 1701) => ErrorKind::ForeignKeyViolation,
        Some(1062 | 1557 | 1569 | 1586) => ErrorKind::UniqueViolation,
        Some(code) if (2001..=2028).contains(&code) => ErrorKind::Connection,
        Some(1048 | 1121 | 1138 | 1171 | 1252 | 1263 | 1566) => ErrorKind::NotNullViolation,
        _ => ErrorKind::Query,
    }
}

/********************* reflection *********************/

pub(crate) const TABLES_SQL: &str = "SHOW FULL TABLES";

pub(crate) fn columns_sql(table: &str) -> String {
    format!("SHOW FULL COLUMNS FROM {}", delimit(table))
}

pub(crate) fn indexes_sql(table: &str) -> String {
    format!("SHOW INDEX FROM {}", delimit(table))
}

pub(crate) fn foreign_keys_sql(table: &str) -> String {
    format!(
        "SELECT CONSTRAINT_NAME, COLUMN_NAME, REFERENCED_TABLE_NAME, REFERENCED_COLUMN_NAME \
         FROM information_schema.KEY_COLUMN_USAGE \
         WHERE TABLE_SCHEMA = DATABASE() \
           AND REFERENCED_TABLE_NAME IS NOT NULL \
           AND TABLE_NAME = {}",
        quote_text(table)
    )
}

/// `SHOW FULL TABLES` reports the table name and a `BASE TABLE`/`VIEW` kind;
/// the name column's header varies with the schema, so access is positional.
pub(crate) fn map_tables(rows: &[Row]) -> Result<Vec<Table>, DbError> {
    rows.iter()
        .map(|row| {
            let name = row
                .value_at(0)
                .map(row_text)
                .ok_or_else(|| DbError::InvalidArgument("empty catalog row".to_string()))?;
            let view = row.value_at(1).map(row_text).as_deref() == Some("VIEW");
            Ok(Table { name, view })
        })
        .collect()
}

pub(crate) fn map_columns(table: &str, rows: &[Row]) -> Result<Vec<Column>, DbError> {
    rows.iter()
        .map(|row| {
            let full_type = row_text(row.get("Type")?);
            let (native_type, size) = split_type(&full_type);
            Ok(Column {
                name: row_text(row.get("Field")?),
                table: table.to_string(),
                native_type,
                size,
                nullable: row_text(row.get("Null")?) == "YES",
                default: match row.get("Default")? {
                    v if v.is_null() => None,
                    v => Some(row_text(v)),
                },
                auto_increment: row_text(row.get("Extra")?) == "auto_increment",
                primary: row_text(row.get("Key")?) == "PRI",
            })
        })
        .collect()
}

pub(crate) fn map_indexes(rows: &[Row]) -> Result<Vec<Index>, DbError> {
    let mut indexes: Vec<Index> = Vec::new();
    for row in rows {
        let name = row_text(row.get("Key_name")?);
        let column = row_text(row.get("Column_name")?);
        let unique = !row_truthy(row.get("Non_unique")?);
        match indexes.iter_mut().find(|ix| ix.name == name) {
            Some(ix) => ix.columns.push(column),
            None => indexes.push(Index {
                primary: name == "PRIMARY",
                unique,
                name,
                columns: vec![column],
            }),
        }
    }
    Ok(indexes)
}

pub(crate) fn map_foreign_keys(rows: &[Row]) -> Result<Vec<ForeignKey>, DbError> {
    let mut keys: Vec<ForeignKey> = Vec::new();
    for row in rows {
        let name = row_text(row.get("CONSTRAINT_NAME")?);
        let column = row_text(row.get("COLUMN_NAME")?);
        let target_table = row_text(row.get("REFERENCED_TABLE_NAME")?);
        let target_column = row_text(row.get("REFERENCED_COLUMN_NAME")?);
        match keys.iter_mut().find(|k| k.name == name) {
            Some(key) => {
                key.columns.push(column);
                key.target_columns.push(target_column);
            }
            None => keys.push(ForeignKey {
                name,
                columns: vec![column],
                target_table,
                target_columns: vec![target_column],
            }),
        }
    }
    Ok(keys)
}

fn split_type(full: &str) -> (String, Option<u32>) {
    match full.split_once('(') {
        Some((base, rest)) => {
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            (base.to_string(), digits.parse().ok())
        }
        None => (full.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_splitting() {
        assert_eq!(split_type("int(11)"), ("int".to_string(), Some(11)));
        assert_eq!(split_type("text"), ("text".to_string(), None));
        assert_eq!(
            split_type("decimal(10,2)"),
            ("decimal".to_string(), Some(10))
        );
    }

    #[test]
    fn error_code_table() {
        assert_eq!(classify_error(Some(1062)), ErrorKind::UniqueViolation);
        assert_eq!(classify_error(Some(1452)), ErrorKind::ForeignKeyViolation);
        assert_eq!(classify_error(Some(1048)), ErrorKind::NotNullViolation);
        assert_eq!(classify_error(Some(2006)), ErrorKind::Connection);
        assert_eq!(classify_error(Some(1064)), ErrorKind::Query);
        assert_eq!(classify_error(None), ErrorKind::Query);
    }
}
