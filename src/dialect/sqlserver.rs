//! SQL Server dialect: bracketed identifiers, ISO-8601 datetime literals,
//! TOP or OFFSET/FETCH row limiting by server version, sys-catalog
//! reflection.

use chrono::NaiveDateTime;

use crate::error::DbError;
use crate::reflection::{row_text, row_truthy, Column, ForeignKey, Index, Table};
use crate::results::Row;

/// OFFSET/FETCH arrived with SQL Server 2012.
const OFFSET_FETCH_MAJOR: u32 = 11;

pub(crate) fn delimit(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

pub(crate) fn format_datetime(value: &NaiveDateTime) -> String {
    format!("'{}'", value.format("%Y-%m-%dT%H:%M:%S"))
}

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
    server_major_version: Option<u32>,
) -> Result<String, DbError> {
    let offset = offset.unwrap_or(0);
    if server_major_version.is_some_and(|major| major >= OFFSET_FETCH_MAJOR) {
        if limit.is_none() && offset == 0 {
            return Ok(sql.to_string());
        }
        let mut out = format!("{sql} OFFSET {offset} ROWS");
        if let Some(limit) = limit {
            out.push_str(&format!(" FETCH NEXT {limit} ROWS ONLY"));
        }
        return Ok(out);
    }
    if offset > 0 {
        return Err(DbError::NotSupported(
            "offset requires SQL Server 2012 or newer".to_string(),
        ));
    }
    match limit {
        Some(limit) => super::inject_top(sql, limit),
        None => Ok(sql.to_string()),
    }
}

/********************* reflection *********************/

pub(crate) const TABLES_SQL: &str = "\
SELECT name, CASE type WHEN 'U' THEN 0 WHEN 'V' THEN 1 END AS [view] \
FROM sys.objects \
WHERE type IN ('U', 'V')";

pub(crate) fn columns_sql(table: &str) -> String {
    format!(
        "SELECT c.name AS name, UPPER(t.name) AS nativetype, \
                c.max_length AS size, c.is_nullable AS nullable, \
                OBJECT_DEFINITION(c.default_object_id) AS [default], \
                c.is_identity AS autoincrement, \
                CASE WHEN i.index_id IS NULL THEN 0 ELSE 1 END AS [primary] \
         FROM sys.columns c \
         JOIN sys.objects o ON c.object_id = o.object_id \
         LEFT JOIN sys.types t ON c.user_type_id = t.user_type_id \
         LEFT JOIN sys.key_constraints k \
                ON o.object_id = k.parent_object_id AND k.type = 'PK' \
         LEFT JOIN sys.index_columns i \
                ON k.parent_object_id = i.object_id \
               AND i.index_id = k.unique_index_id \
               AND i.column_id = c.column_id \
         WHERE o.type IN ('U', 'V') AND o.name = {}",
        super::quote_ansi(table)
    )
}

pub(crate) fn indexes_sql(table: &str) -> String {
    format!(
        "SELECT i.name AS name, \
                CASE WHEN i.is_unique = 1 OR i.is_unique_constraint = 1 \
                     THEN 1 ELSE 0 END AS [unique], \
                i.is_primary_key AS [primary], c.name AS [column] \
         FROM sys.indexes i \
         JOIN sys.index_columns ic \
              ON i.object_id = ic.object_id AND i.index_id = ic.index_id \
         JOIN sys.columns c \
              ON ic.object_id = c.object_id AND ic.column_id = c.column_id \
         WHERE i.object_id = OBJECT_ID({})",
        super::quote_ansi(table)
    )
}

pub(crate) fn foreign_keys_sql(table: &str) -> String {
    format!(
        "SELECT fk.name AS name, cl.name AS [local], \
                tf.name AS [table], cf.name AS [column] \
         FROM sys.foreign_keys fk \
         JOIN sys.foreign_key_columns fkc \
              ON fk.object_id = fkc.constraint_object_id \
         JOIN sys.columns cl \
              ON fkc.parent_object_id = cl.object_id \
             AND fkc.parent_column_id = cl.column_id \
         JOIN sys.columns cf \
              ON fkc.referenced_object_id = cf.object_id \
             AND fkc.referenced_column_id = cf.column_id \
         JOIN sys.tables tf ON fkc.referenced_object_id = tf.object_id \
         WHERE fk.parent_object_id = OBJECT_ID({})",
        super::quote_ansi(table)
    )
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

pub(crate) fn map_columns(table: &str, rows: &[Row]) -> Result<Vec<Column>, DbError> {
    rows.iter()
        .map(|row| {
            Ok(Column {
                name: row_text(row.get("name")?),
                table: table.to_string(),
                native_type: row_text(row.get("nativetype")?),
                size: row
                    .get("size")?
                    .as_int()
                    .and_then(|s| u32::try_from(*s).ok()),
                nullable: row_truthy(row.get("nullable")?),
                default: match row.get("default")? {
                    v if v.is_null() => None,
                    v => Some(row_text(v)),
                },
                auto_increment: row_truthy(row.get("autoincrement")?),
                primary: row_truthy(row.get("primary")?),
            })
        })
        .collect()
}

pub(crate) fn map_indexes(rows: &[Row]) -> Result<Vec<Index>, DbError> {
    let mut indexes: Vec<Index> = Vec::new();
    for row in rows {
        let name = row_text(row.get("name")?);
        let column = row_text(row.get("column")?);
        let unique = row_truthy(row.get("unique")?);
        let primary = row_truthy(row.get("primary")?);
        match indexes.iter_mut().find(|ix| ix.name == name) {
            Some(ix) => ix.columns.push(column),
            None => indexes.push(Index {
                name,
                unique,
                primary,
                columns: vec![column],
            }),
        }
    }
    Ok(indexes)
}

pub(crate) fn map_foreign_keys(rows: &[Row]) -> Result<Vec<ForeignKey>, DbError> {
    let mut keys: Vec<ForeignKey> = Vec::new();
    for row in rows {
        let name = row_text(row.get("name")?);
        let column = row_text(row.get("local")?);
        let target_table = row_text(row.get("table")?);
        let target_column = row_text(row.get("column")?);
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
