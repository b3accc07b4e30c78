//! Result rows and the pull-based cursor over a buffered result set.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::dialect::Driver;
use crate::error::DbError;
use crate::native::NativeOutput;
use crate::typing::{LogicalType, TypeDetector};
use crate::value::Value;

/// One result row: an ordered column → value mapping.
///
/// Access is strict: asking for a column the result set does not declare is
/// an error, carrying the closest declared name as a suggestion. Typos stay
/// loud instead of silently reading NULLs.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Build a row from name/value pairs. Intended for tests and for code
    /// that assembles rows by hand.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, Value)>) -> Self {
        let (columns, values) = pairs.into_iter().unzip();
        Self {
            columns: Arc::new(columns),
            values,
        }
    }

    /// Read a column by name.
    ///
    /// # Errors
    /// Returns `DbError::UnknownColumn` when the result set does not declare
    /// the column, with a did-you-mean hint when a declared name is close.
    pub fn get(&self, column: &str) -> Result<&Value, DbError> {
        self.find(column).ok_or_else(|| DbError::UnknownColumn {
            column: column.to_string(),
            hint: suggest(&self.columns, column),
        })
    }

    /// Read a column by name, `None` when undeclared.
    #[must_use]
    pub fn find(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|ix| &self.values[ix])
    }

    /// Read a column by position.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Closest declared column within an edit-distance threshold that scales
/// with the typo's length.
fn suggest(columns: &[String], wanted: &str) -> Option<String> {
    let threshold = wanted.len() / 4 + 1;
    columns
        .iter()
        .map(|c| (levenshtein(c, wanted), c))
        .filter(|(distance, _)| *distance <= threshold)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, c)| c.clone())
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}

/// Pull-based adapter over one statement's buffered output.
///
/// Rows are handed out front to back; once the buffer drains the cursor is
/// spent and drops its memory with it, so there is nothing to close.
#[derive(Debug)]
pub struct ResultCursor {
    columns: Arc<Vec<String>>,
    native_types: Vec<Option<String>>,
    rows: VecDeque<Vec<Value>>,
    row_count: usize,
    driver: Driver,
    detector: TypeDetector,
}

impl ResultCursor {
    pub(crate) fn new(output: NativeOutput, driver: Driver) -> Self {
        let (columns, native_types) = output
            .columns
            .into_iter()
            .map(|c| (c.name, c.native_type))
            .unzip::<_, _, Vec<_>, Vec<_>>();
        let rows: VecDeque<Vec<Value>> = output.rows.into();
        Self {
            columns: Arc::new(columns),
            native_types,
            row_count: rows.len(),
            rows,
            driver,
            detector: TypeDetector::new(),
        }
    }

    /// Pull the next row, `None` once the buffer is exhausted.
    pub fn fetch(&mut self) -> Option<Row> {
        self.rows
            .pop_front()
            .map(|values| Row::new(Arc::clone(&self.columns), values))
    }

    /// Drain all remaining rows.
    pub fn fetch_all(&mut self) -> Vec<Row> {
        let mut rows = Vec::with_capacity(self.rows.len());
        while let Some(row) = self.fetch() {
            rows.push(row);
        }
        rows
    }

    /// Pull the next row's first value.
    pub fn fetch_field(&mut self) -> Option<Value> {
        self.fetch()
            .and_then(|row| row.values().first().cloned())
    }

    /// Drain the remaining rows into key/value pairs: first column → second
    /// column. A single-column result yields position-keyed pairs, so the
    /// values stay ordered.
    pub fn fetch_pairs(&mut self) -> Vec<(Value, Value)> {
        let single = self.columns.len() < 2;
        self.fetch_all()
            .into_iter()
            .enumerate()
            .map(|(ix, row)| {
                let mut values = row.values().iter();
                let first = values.next().cloned().unwrap_or(Value::Null);
                if single {
                    (Value::Int(ix as i64), first)
                } else {
                    let second = values.next().cloned().unwrap_or(Value::Null);
                    (first, second)
                }
            })
            .collect()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Rows buffered when the statement ran, regardless of how many have
    /// been fetched since.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Column names with their detected logical types. Columns whose native
    /// type the client does not report come back as `Text`.
    pub fn column_types(&mut self) -> Vec<(String, LogicalType)> {
        let driver = self.driver.clone();
        self.columns
            .iter()
            .zip(&self.native_types)
            .map(|(name, native)| {
                let logical = native.as_deref().map_or(LogicalType::Text, |native| {
                    driver.logical_type(&mut self.detector, native)
                });
                (name.clone(), logical)
            })
            .collect()
    }
}
