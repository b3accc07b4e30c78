use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values that can be bound to a query or read back from a result row.
///
/// Reuse the same enum across dialects so callers do not need to branch on
/// driver types:
/// ```rust
/// use sql_facade::prelude::*;
///
/// let params = vec![
///     Param::from(1i64),
///     Param::from("alice"),
///     Param::from(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// JSON value
    Json(JsonValue),
}

impl Value {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let Value::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let Value::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<chrono::NaiveDateTime> {
        if let Value::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S.%3f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let Value::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        Value::Json(v)
    }
}

/// A raw SQL fragment plus the parameters bound inside it.
///
/// The fragment is spliced into the query text verbatim; its parameters are
/// appended to the outgoing parameter list at the splice point.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlLiteral {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SqlLiteral {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }
}

/// One argument consumed by a `?` marker during preprocessing.
///
/// The argument's kind selects the expansion: plain values are bound
/// positionally, lists expand to `(?, ?, …)`, pair groups to
/// `(col = ? OR col = ?)`, identifiers and literals are spliced into the
/// query text and never bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// A single positionally-bound value.
    Value(Value),
    /// An array expanded to a parenthesized placeholder group.
    List(Vec<Value>),
    /// Column/value pairs expanded to an OR-ed equality group.
    Pairs(Vec<(String, Value)>),
    /// A table/column name, delimited and spliced into the text.
    Identifier(String),
    /// A preformatted SQL fragment spliced into the text.
    Literal(SqlLiteral),
}

impl Param {
    pub fn value(v: impl Into<Value>) -> Self {
        Param::Value(v.into())
    }

    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Param::List(values.into_iter().map(Into::into).collect())
    }

    pub fn pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        Param::Pairs(
            pairs
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Param::Identifier(name.into())
    }

    pub fn literal(literal: SqlLiteral) -> Self {
        Param::Literal(literal)
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Value(v.into())
    }
}

impl From<i32> for Param {
    fn from(v: i32) -> Self {
        Param::Value(v.into())
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Param::Value(v.into())
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Param::Value(v.into())
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Value(v.into())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Value(v.into())
    }
}

impl From<Value> for Param {
    fn from(v: Value) -> Self {
        Param::Value(v)
    }
}

impl From<Vec<Value>> for Param {
    fn from(v: Vec<Value>) -> Self {
        Param::List(v)
    }
}

impl From<SqlLiteral> for Param {
    fn from(v: SqlLiteral) -> Self {
        Param::Literal(v)
    }
}
