//! Oracle dialect: double-quote delimiting, ROWNUM row limiting, catalog
//! listing via `cat`. Column/index/foreign-key reflection is not modeled.

use crate::error::{DbError, ErrorKind};
use crate::reflection::{row_text, Table};
use crate::results::Row;

pub(crate) fn delimit(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Pre-12c row limiting: wrap the statement in ROWNUM subqueries.
pub(crate) fn apply_limit(sql: &str, limit: Option<i64>, offset: Option<i64>) -> String {
    let offset = offset.unwrap_or(0);
    if offset > 0 {
        let upper = limit.map_or(String::new(), |l| format!("WHERE ROWNUM <= {} ", offset + l));
        format!(
            "SELECT * FROM (SELECT t.*, ROWNUM AS \"__rownum\" FROM ({sql}) t {upper}) \
             WHERE \"__rownum\" > {offset}"
        )
    } else if let Some(limit) = limit {
        format!("SELECT * FROM ({sql}) WHERE ROWNUM <= {limit}")
    } else {
        sql.to_string()
    }
}

pub(crate) fn classify_error(code: Option<i64>) -> ErrorKind {
    match code {
        Some(1 | 2299 | 38911) => ErrorKind::UniqueViolation,
        Some(1400) => ErrorKind::NotNullViolation,
        Some(2266 | 2291 | 2292) => ErrorKind::ForeignKeyViolation,
        _ => ErrorKind::Query,
    }
}

/********************* reflection *********************/

pub(crate) const TABLES_SQL: &str = "SELECT * FROM cat";

pub(crate) fn map_tables(rows: &[Row]) -> Result<Vec<Table>, DbError> {
    rows.iter()
        .map(|row| {
            Ok(Table {
                name: row_text(row.get("TABLE_NAME")?),
                view: row_text(row.get("TABLE_TYPE")?) == "VIEW",
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rownum_wrapping() {
        assert_eq!(
            apply_limit("SELECT 1 FROM DUAL", Some(10), None),
            "SELECT * FROM (SELECT 1 FROM DUAL) WHERE ROWNUM <= 10"
        );
        assert_eq!(
            apply_limit("SELECT 1 FROM DUAL", Some(10), Some(20)),
            "SELECT * FROM (SELECT t.*, ROWNUM AS \"__rownum\" FROM (SELECT 1 FROM DUAL) t \
             WHERE ROWNUM <= 30 ) WHERE \"__rownum\" > 20"
        );
        assert_eq!(
            apply_limit("SELECT 1 FROM DUAL", None, None),
            "SELECT 1 FROM DUAL"
        );
    }

    #[test]
    fn error_code_table() {
        // ORA-00001, ORA-02299 and ORA-38911 all report duplicate keys.
        assert_eq!(classify_error(Some(1)), ErrorKind::UniqueViolation);
        assert_eq!(classify_error(Some(2299)), ErrorKind::UniqueViolation);
        assert_eq!(classify_error(Some(38911)), ErrorKind::UniqueViolation);
        assert_eq!(classify_error(Some(1400)), ErrorKind::NotNullViolation);
        assert_eq!(classify_error(Some(2291)), ErrorKind::ForeignKeyViolation);
        assert_eq!(classify_error(Some(900)), ErrorKind::Query);
    }
}
