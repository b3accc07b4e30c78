use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Best-effort logical classification of a native column type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Text,
    Integer,
    Fixed,
    Float,
    Bool,
    Time,
    Date,
    DateTime,
    /// Durations reported by vendors whose TIME columns are intervals.
    Interval,
    /// Date/time columns stored as unix seconds.
    UnixTimestamp,
    Binary,
}

/// Order-sensitive pattern table: first match wins, unknown names fall
/// through to `Text`. Patterns are anchored and case-insensitive.
static TYPE_PATTERNS: LazyLock<Vec<(Regex, LogicalType)>> = LazyLock::new(|| {
    let table: &[(&str, LogicalType)] = &[
        // PostgreSQL arrays
        ("_.*", LogicalType::Text),
        (
            r"(TINY|SMALL|SHORT|MEDIUM|BIG|LONG)(INT)?|INT(EGER|\d+| IDENTITY)?|(SMALL|BIG|)SERIAL\d*|COUNTER|YEAR|BYTE|LONGLONG|UNSIGNED BIG INT",
            LogicalType::Integer,
        ),
        (
            r"(NEW)?DEC(IMAL)?(\(.*)?|NUMERIC|(SMALL)?MONEY|CURRENCY|NUMBER",
            LogicalType::Fixed,
        ),
        (r"REAL|DOUBLE( PRECISION)?|FLOAT\d*", LogicalType::Float),
        (r"BOOL(EAN)?", LogicalType::Bool),
        ("TIME", LogicalType::Time),
        ("DATE", LogicalType::Date),
        (
            r"(SMALL)?DATETIME(OFFSET)?\d*|TIME(STAMP.*)?",
            LogicalType::DateTime,
        ),
        (
            r"BYTEA|(TINY|MEDIUM|LONG|)BLOB|(LONG )?(VAR)?BINARY|IMAGE",
            LogicalType::Binary,
        ),
    ];
    table
        .iter()
        .map(|(pattern, logical)| {
            let re = Regex::new(&format!("(?i)^(?:{pattern})$"))
                .expect("type pattern table entries are valid regexes");
            (re, *logical)
        })
        .collect()
});

/// Heuristic native-type-name classifier with a per-instance memo table.
///
/// The memo table is owned by the detector (one per result cursor) rather
/// than being process-wide state, so concurrent connections cannot observe
/// each other's entries.
#[derive(Debug, Default)]
pub struct TypeDetector {
    cache: HashMap<String, LogicalType>,
}

impl TypeDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a native type name, memoizing the result per distinct name.
    pub fn detect(&mut self, native_type: &str) -> LogicalType {
        if let Some(hit) = self.cache.get(native_type) {
            return *hit;
        }
        let detected = TYPE_PATTERNS
            .iter()
            .find(|(re, _)| re.is_match(native_type))
            .map_or(LogicalType::Text, |(_, logical)| *logical);
        self.cache.insert(native_type.to_string(), detected);
        detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_native_types() {
        let mut d = TypeDetector::new();
        assert_eq!(d.detect("BIGINT"), LogicalType::Integer);
        assert_eq!(d.detect("int"), LogicalType::Integer);
        assert_eq!(d.detect("INT4"), LogicalType::Integer);
        assert_eq!(d.detect("NUMERIC"), LogicalType::Fixed);
        assert_eq!(d.detect("double precision"), LogicalType::Float);
        assert_eq!(d.detect("BOOLEAN"), LogicalType::Bool);
        assert_eq!(d.detect("TIME"), LogicalType::Time);
        assert_eq!(d.detect("DATE"), LogicalType::Date);
        assert_eq!(d.detect("DATETIME"), LogicalType::DateTime);
        assert_eq!(d.detect("TIMESTAMP WITH TIME ZONE"), LogicalType::DateTime);
        assert_eq!(d.detect("MEDIUMBLOB"), LogicalType::Binary);
        assert_eq!(d.detect("VARBINARY"), LogicalType::Binary);
    }

    #[test]
    fn order_sensitivity_keeps_time_and_datetime_apart() {
        // Anchoring means TIME does not swallow TIMESTAMP.
        let mut d = TypeDetector::new();
        assert_eq!(d.detect("TIMESTAMP"), LogicalType::DateTime);
        assert_eq!(d.detect("TIME"), LogicalType::Time);
    }

    #[test]
    fn unknown_types_default_to_text() {
        let mut d = TypeDetector::new();
        assert_eq!(d.detect("GEOGRAPHY"), LogicalType::Text);
        assert_eq!(d.detect("uuid"), LogicalType::Text);
    }

    #[test]
    fn memoizes_per_instance() {
        let mut d = TypeDetector::new();
        assert_eq!(d.detect("VARCHAR"), LogicalType::Text);
        assert!(d.cache.contains_key("VARCHAR"));
        let fresh = TypeDetector::new();
        assert!(fresh.cache.is_empty());
    }
}
