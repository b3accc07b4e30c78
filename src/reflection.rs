//! Schema descriptors returned by the reflection accessors.
//!
//! Descriptors are plain data, freshly built from catalog queries on every
//! call; nothing here is cached.

use serde::{Deserialize, Serialize};

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub view: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub table: String,
    pub native_type: String,
    pub size: Option<u32>,
    pub nullable: bool,
    /// Default expression as reported by the catalog, verbatim.
    pub default: Option<String>,
    pub auto_increment: bool,
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    pub primary: bool,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub target_table: String,
    pub target_columns: Vec<String>,
}

/// Render a catalog cell as text, the way loosely-typed catalog rows come
/// back from `SHOW`/pragma queries.
pub(crate) fn row_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        Value::Json(json) => json.to_string(),
    }
}

/// Loose truthiness for catalog flags that arrive as ints, strings or bools
/// depending on the vendor.
pub(crate) fn row_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Text(s) => !s.is_empty() && s != "0",
        Value::Blob(bytes) => !bytes.is_empty(),
        Value::Timestamp(_) => true,
        Value::Json(json) => !json.is_null(),
    }
}
