//! SQLite-family dialect: bracket delimiting, unix-second datetimes,
//! pragma-based reflection.

use regex::Regex;

use crate::error::{DbError, ErrorKind};
use crate::reflection::{row_text, row_truthy, Column, ForeignKey, Index, Table};
use crate::results::Row;

/// SQLite has no way to escape `[` / `]` inside a bracketed identifier,
/// so embedded brackets are blanked out.
pub(crate) fn delimit(name: &str) -> String {
    format!("[{}]", name.replace(['[', ']'], " "))
}

pub(crate) fn escape_like(value: &str, pos: i32) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '\'' => escaped.push_str("''"),
            '\\' => escaped.push_str("\\\\"),
            '%' => escaped.push_str("\\%"),
            '_' => escaped.push_str("\\_"),
            _ => escaped.push(ch),
        }
    }
    let prefix = if pos <= 0 { "'%" } else { "'" };
    let suffix = if pos >= 0 { "%'" } else { "'" };
    format!("{prefix}{escaped}{suffix} ESCAPE '\\'")
}

pub(crate) fn apply_limit(sql: &str, limit: Option<i64>, offset: Option<i64>) -> String {
    let offset = offset.unwrap_or(0);
    if limit.is_none() && offset == 0 {
        return sql.to_string();
    }
    // -1 means "no limit" in SQLite.
    let mut out = format!("{sql} LIMIT {}", limit.unwrap_or(-1));
    if offset > 0 {
        out.push_str(&format!(" OFFSET {offset}"));
    }
    out
}

/// SQLite reports every constraint failure as primary code 19; the violated
/// constraint is only visible in the message text.
pub(crate) fn classify_error(code: Option<i64>, message: &str) -> ErrorKind {
    let Some(code) = code else {
        return ErrorKind::Query;
    };
    if code & 0xff != 19 {
        return ErrorKind::Query;
    }
    if message.contains("must be unique")
        || message.contains("is not unique")
        || message.contains("UNIQUE constraint failed")
    {
        ErrorKind::UniqueViolation
    } else if message.contains("may not be NULL")
        || message.contains("may not be null")
        || message.contains("NOT NULL constraint failed")
    {
        ErrorKind::NotNullViolation
    } else if message.contains("foreign key constraint failed")
        || message.contains("FOREIGN KEY constraint failed")
    {
        ErrorKind::ForeignKeyViolation
    } else {
        ErrorKind::Query
    }
}

/********************* reflection *********************/

pub(crate) const TABLES_SQL: &str = "\
SELECT name, type = 'view' AS view \
FROM sqlite_master \
WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' \
UNION ALL \
SELECT name, type = 'view' AS view \
FROM sqlite_temp_master \
WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' \
ORDER BY name";

/// Query for the stored `CREATE TABLE` statement, needed to detect
/// AUTOINCREMENT (pragmas do not expose it).
pub(crate) fn create_table_sql(table: &str) -> String {
    let quoted = super::quote_ansi(table);
    format!(
        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = {quoted} \
         UNION ALL \
         SELECT sql FROM sqlite_temp_master WHERE type = 'table' AND name = {quoted}"
    )
}

pub(crate) fn table_info_sql(table: &str) -> String {
    format!("PRAGMA table_info({})", delimit(table))
}

pub(crate) fn index_list_sql(table: &str) -> String {
    format!("PRAGMA index_list({})", delimit(table))
}

pub(crate) fn index_info_sql(index: &str) -> String {
    format!("PRAGMA index_info({})", delimit(index))
}

pub(crate) fn foreign_key_list_sql(table: &str) -> String {
    format!("PRAGMA foreign_key_list({})", delimit(table))
}

pub(crate) fn map_tables(rows: &[Row]) -> Result<Vec<Table>, DbError> {
    rows.iter()
        .map(|row| {
            Ok(Table {
                name: row_text(row.get("name")?),
                view: row_truthy(row.get("view")?),
            })
        })
        .collect()
}

pub(crate) fn map_columns(
    table: &str,
    create_sql: Option<&str>,
    rows: &[Row],
) -> Result<Vec<Column>, DbError> {
    rows.iter()
        .map(|row| {
            let name = row_text(row.get("name")?);
            let full_type = row_text(row.get("type")?);
            let (native_type, size) = match full_type.split_once('(') {
                Some((base, rest)) => {
                    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
                    (base.to_string(), digits.parse().ok())
                }
                None => (full_type, None),
            };
            Ok(Column {
                auto_increment: create_sql.is_some_and(|sql| is_autoincrement(sql, &name)),
                table: table.to_string(),
                native_type,
                size,
                nullable: !row_truthy(row.get("notnull")?),
                default: match row.get("dflt_value")? {
                    v if v.is_null() => None,
                    v => Some(row_text(v)),
                },
                primary: row.get("pk")?.as_int().copied().unwrap_or(0) > 0,
                name,
            })
        })
        .collect()
}

fn is_autoincrement(create_sql: &str, column: &str) -> bool {
    let c = regex::escape(column);
    Regex::new(&format!(
        r#"(?i)("{c}"|`{c}`|\[{c}\]|{c})\s+[^,]+?\s+PRIMARY\s+KEY\s+AUTOINCREMENT"#
    ))
    .is_ok_and(|re| re.is_match(create_sql))
}

/// `PRAGMA index_list` rows; columns are filled in per index from
/// `PRAGMA index_info`, and the primary flag from the table's columns.
pub(crate) fn map_index_list(rows: &[Row]) -> Result<Vec<Index>, DbError> {
    rows.iter()
        .map(|row| {
            Ok(Index {
                name: row_text(row.get("name")?),
                unique: row_truthy(row.get("unique")?),
                primary: row.find("origin").is_some_and(|v| row_text(v) == "pk"),
                columns: Vec::new(),
            })
        })
        .collect()
}

pub(crate) fn index_columns(rows: &[Row]) -> Result<Vec<String>, DbError> {
    rows.iter().map(|row| Ok(row_text(row.get("name")?))).collect()
}

pub(crate) fn map_foreign_keys(rows: &[Row]) -> Result<Vec<ForeignKey>, DbError> {
    let mut keys: Vec<(i64, ForeignKey)> = Vec::new();
    for row in rows {
        let id = row.get("id")?.as_int().copied().unwrap_or(0);
        let column = row_text(row.get("from")?);
        let target = row.get("to")?;
        let target_column = if target.is_null() {
            None
        } else {
            Some(row_text(target))
        };
        match keys.iter_mut().find(|(key_id, _)| *key_id == id) {
            Some((_, key)) => {
                key.columns.push(column);
                if let Some(tc) = target_column {
                    key.target_columns.push(tc);
                }
            }
            None => keys.push((
                id,
                ForeignKey {
                    name: id.to_string(),
                    columns: vec![column],
                    target_table: row_text(row.get("table")?),
                    target_columns: target_column.into_iter().collect(),
                },
            )),
        }
    }
    Ok(keys.into_iter().map(|(_, key)| key).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiting_blanks_brackets() {
        assert_eq!(delimit("users"), "[users]");
        assert_eq!(delimit("we[ird]"), "[we ird ]");
    }

    #[test]
    fn autoincrement_detection() {
        let sql = "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)";
        assert!(is_autoincrement(sql, "id"));
        assert!(!is_autoincrement(sql, "name"));
        let quoted = r#"CREATE TABLE t ("id" INTEGER PRIMARY KEY AUTOINCREMENT)"#;
        assert!(is_autoincrement(quoted, "id"));
        let plain_pk = "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)";
        assert!(!is_autoincrement(plain_pk, "id"));
    }

    #[test]
    fn constraint_classification_needs_code_19() {
        assert_eq!(
            classify_error(Some(19 | (2 << 8)), "UNIQUE constraint failed: t.id"),
            ErrorKind::UniqueViolation
        );
        assert_eq!(
            classify_error(Some(19), "NOT NULL constraint failed: t.name"),
            ErrorKind::NotNullViolation
        );
        assert_eq!(
            classify_error(Some(19 | (3 << 8)), "FOREIGN KEY constraint failed"),
            ErrorKind::ForeignKeyViolation
        );
        assert_eq!(
            classify_error(Some(1), "UNIQUE constraint failed"),
            ErrorKind::Query
        );
    }
}
