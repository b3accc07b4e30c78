//! The boundary between the facade and a vendor's native client library.
//!
//! A [`NativeClient`] speaks one wire protocol and nothing else: it binds
//! already-preprocessed SQL, buffers the raw output, and reports failures
//! with the vendor's own code and SQLSTATE. Classification against the
//! dialect's error tables happens on the facade side of the boundary.

use crate::value::Value;

/// A raw native failure, before classification.
#[derive(Debug, Clone)]
pub struct NativeError {
    pub message: String,
    pub sql_state: Option<String>,
    pub code: Option<i64>,
}

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sql_state: None,
            code: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    #[must_use]
    pub fn with_sql_state(mut self, sql_state: impl Into<String>) -> Self {
        self.sql_state = Some(sql_state.into());
        self
    }
}

/// One result column as the native client reports it.
#[derive(Debug, Clone)]
pub struct NativeColumn {
    pub name: String,
    /// Declared/native type name, when the client exposes one.
    pub native_type: Option<String>,
}

/// Buffered output of one statement.
#[derive(Debug, Clone, Default)]
pub struct NativeOutput {
    pub columns: Vec<NativeColumn>,
    pub rows: Vec<Vec<Value>>,
    pub rows_affected: u64,
}

/// A synchronous native database client.
///
/// The facade owns exactly one client and serializes all calls through it;
/// implementations do not need interior locking.
pub trait NativeClient: Send {
    fn connect(&mut self) -> Result<(), NativeError>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;

    /// Run one statement with positionally-bound parameters and buffer its
    /// complete output.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<NativeOutput, NativeError>;

    fn begin(&mut self) -> Result<(), NativeError>;
    fn commit(&mut self) -> Result<(), NativeError>;
    fn rollback(&mut self) -> Result<(), NativeError>;

    /// Identifier generated by the last INSERT; `sequence` is consulted by
    /// clients whose vendor allocates ids from named sequences.
    fn last_insert_id(&mut self, sequence: Option<&str>) -> Result<Option<i64>, NativeError>;

    /// Server major version, when the client can report one. Feeds the
    /// dialect settings that vary by version.
    fn server_major_version(&self) -> Option<u32> {
        None
    }
}
