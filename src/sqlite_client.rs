//! Bundled SQLite implementation of the native-client boundary, backed by
//! `rusqlite`.

use rusqlite::types::ValueRef;

use crate::native::{NativeClient, NativeColumn, NativeError, NativeOutput};
use crate::value::Value;

/// Synchronous SQLite client over one database file (or `:memory:`).
pub struct SqliteClient {
    path: String,
    conn: Option<rusqlite::Connection>,
}

impl SqliteClient {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            conn: None,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    fn conn(&self) -> Result<&rusqlite::Connection, NativeError> {
        self.conn
            .as_ref()
            .ok_or_else(|| NativeError::new("not connected"))
    }
}

impl NativeClient for SqliteClient {
    fn connect(&mut self) -> Result<(), NativeError> {
        if self.conn.is_none() {
            self.conn = Some(rusqlite::Connection::open(&self.path).map_err(map_err)?);
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        self.conn = None;
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<NativeOutput, NativeError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql).map_err(map_err)?;
        let bound = params.iter().map(bind_value);

        if stmt.column_count() == 0 {
            let rows_affected = stmt
                .execute(rusqlite::params_from_iter(bound))
                .map_err(map_err)?;
            return Ok(NativeOutput {
                rows_affected: rows_affected as u64,
                ..NativeOutput::default()
            });
        }

        // Column metadata borrows the statement, so it is materialized
        // before row iteration takes the borrow.
        let columns: Vec<NativeColumn> = stmt
            .columns()
            .iter()
            .map(|c| NativeColumn {
                name: c.name().to_string(),
                native_type: c.decl_type().map(str::to_string),
            })
            .collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut raw = stmt
            .query(rusqlite::params_from_iter(bound))
            .map_err(map_err)?;
        while let Some(raw_row) = raw.next().map_err(map_err)? {
            let mut values = Vec::with_capacity(column_count);
            for ix in 0..column_count {
                values.push(read_value(raw_row.get_ref(ix).map_err(map_err)?));
            }
            rows.push(values);
        }

        Ok(NativeOutput {
            columns,
            rows,
            rows_affected: 0,
        })
    }

    fn begin(&mut self) -> Result<(), NativeError> {
        self.conn()?.execute_batch("BEGIN").map_err(map_err)
    }

    fn commit(&mut self) -> Result<(), NativeError> {
        self.conn()?.execute_batch("COMMIT").map_err(map_err)
    }

    fn rollback(&mut self) -> Result<(), NativeError> {
        self.conn()?.execute_batch("ROLLBACK").map_err(map_err)
    }

    fn last_insert_id(&mut self, _sequence: Option<&str>) -> Result<Option<i64>, NativeError> {
        Ok(Some(self.conn()?.last_insert_rowid()))
    }
}

fn bind_value(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Bool(b) => rusqlite::types::Value::Integer(i64::from(*b)),
        Value::Int(i) => rusqlite::types::Value::Integer(*i),
        Value::Float(f) => rusqlite::types::Value::Real(*f),
        Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
        Value::Blob(bytes) => rusqlite::types::Value::Blob(bytes.clone()),
        Value::Timestamp(ts) => {
            rusqlite::types::Value::Text(ts.format("%Y-%m-%d %H:%M:%S").to_string())
        }
        Value::Json(json) => rusqlite::types::Value::Text(json.to_string()),
    }
}

fn read_value(raw: ValueRef<'_>) -> Value {
    match raw {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

fn map_err(err: rusqlite::Error) -> NativeError {
    match err {
        rusqlite::Error::SqliteFailure(ffi_err, message) => {
            NativeError::new(message.unwrap_or_else(|| ffi_err.to_string()))
                .with_code(i64::from(ffi_err.extended_code))
        }
        other => NativeError::new(other.to_string()),
    }
}
