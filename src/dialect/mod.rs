//! Vendor-specific SQL syntax and catalog variation.
//!
//! Each supported vendor family lives in its own module; the [`Driver`]
//! struct couples a [`DialectKind`] with per-connection settings and
//! dispatches every dialect-sensitive operation to the right module. The
//! kind is chosen once at connect time, so each vendor's logic stays
//! isolated and independently testable.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDateTime};
use regex::Regex;

use crate::error::{DbError, ErrorKind};
use crate::typing::{LogicalType, TypeDetector};

pub(crate) mod mysql;
pub(crate) mod odbc;
pub(crate) mod oracle;
pub(crate) mod sqlite;
pub(crate) mod sqlserver;

/// The vendor families this facade can speak to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    MySql,
    Sqlite,
    Oracle,
    Odbc,
    SqlServer,
}

impl DialectKind {
    /// Resolve a DSN scheme (the part before the first `:`) to a dialect.
    #[must_use]
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "mysql" => Some(DialectKind::MySql),
            "sqlite" => Some(DialectKind::Sqlite),
            "oci" | "oracle" => Some(DialectKind::Oracle),
            "odbc" => Some(DialectKind::Odbc),
            "sqlsrv" | "mssql" => Some(DialectKind::SqlServer),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DialectKind::MySql => "mysql",
            DialectKind::Sqlite => "sqlite",
            DialectKind::Oracle => "oci",
            DialectKind::Odbc => "odbc",
            DialectKind::SqlServer => "sqlsrv",
        }
    }
}

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("identifier pattern is a valid regex")
});

static TOP_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\s*(?:SELECT(?:\s+DISTINCT|\s+ALL)?|UPDATE|DELETE))")
        .expect("statement prefix pattern is a valid regex")
});

/// ANSI string literal quoting: wrap in single quotes, doubling embedded
/// ones. Every dialect except MySQL quotes this way.
pub(crate) fn quote_ansi(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Inject `TOP n` right after the statement verb, for dialects without a
/// LIMIT clause.
pub(crate) fn inject_top(sql: &str, limit: i64) -> Result<String, DbError> {
    if !TOP_PREFIX_RE.is_match(sql) {
        return Err(DbError::InvalidArgument(
            "the statement must begin with SELECT, UPDATE or DELETE to accept a row limit"
                .to_string(),
        ));
    }
    Ok(TOP_PREFIX_RE
        .replace(sql, format!("$1 TOP {limit}"))
        .into_owned())
}

/// Dialect driver: one vendor family plus the per-connection settings that
/// influence its output.
#[derive(Debug, Clone)]
pub struct Driver {
    kind: DialectKind,
    /// chrono format override for vendors that default to unix seconds.
    datetime_format: Option<String>,
    /// SQL Server major version; decides TOP vs OFFSET/FETCH.
    server_major_version: Option<u32>,
}

impl Driver {
    #[must_use]
    pub fn new(kind: DialectKind) -> Self {
        Self {
            kind,
            datetime_format: None,
            server_major_version: None,
        }
    }

    #[must_use]
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_server_major_version(mut self, major: u32) -> Self {
        self.server_major_version = Some(major);
        self
    }

    #[must_use]
    pub fn kind(&self) -> DialectKind {
        self.kind
    }

    /// Wrap a single (undotted) name in the vendor's identifier delimiters,
    /// doubling any embedded delimiter character. Succeeds for any input.
    #[must_use]
    pub fn delimit(&self, name: &str) -> String {
        match self.kind {
            DialectKind::MySql => mysql::delimit(name),
            DialectKind::Sqlite => sqlite::delimit(name),
            DialectKind::Oracle => oracle::delimit(name),
            DialectKind::Odbc => odbc::delimit(name),
            DialectKind::SqlServer => sqlserver::delimit(name),
        }
    }

    /// Validate a bare or dotted identifier and delimit each part.
    ///
    /// # Errors
    /// Returns `DbError::InvalidIdentifier` when the name is not a
    /// syntactically valid bare or dotted name.
    pub fn delimit_qualified(&self, name: &str) -> Result<String, DbError> {
        if !IDENTIFIER_RE.is_match(name) {
            return Err(DbError::InvalidIdentifier(name.to_string()));
        }
        Ok(name
            .split('.')
            .map(|part| self.delimit(part))
            .collect::<Vec<_>>()
            .join("."))
    }

    /// Quote a string as a vendor SQL literal.
    #[must_use]
    pub fn quote_text(&self, value: &str) -> String {
        match self.kind {
            DialectKind::MySql => mysql::quote_text(value),
            _ => quote_ansi(value),
        }
    }

    /// Render a timestamp as a vendor-specific literal.
    #[must_use]
    pub fn format_datetime(&self, value: &NaiveDateTime) -> String {
        match self.kind {
            DialectKind::MySql => mysql::format_datetime(value),
            DialectKind::SqlServer => sqlserver::format_datetime(value),
            DialectKind::Odbc => odbc::format_datetime(value),
            DialectKind::Sqlite | DialectKind::Oracle => match &self.datetime_format {
                Some(fmt) => value.format(fmt).to_string(),
                None => value.and_utc().timestamp().to_string(),
            },
        }
    }

    /// Render a duration as a vendor-specific interval literal.
    ///
    /// # Errors
    /// Returns `DbError::NotSupported` for vendors without interval literals.
    pub fn format_interval(&self, value: &Duration) -> Result<String, DbError> {
        match self.kind {
            DialectKind::MySql => Ok(mysql::format_interval(value)),
            _ => Err(DbError::NotSupported(format!(
                "interval literals are not supported by the {} dialect",
                self.kind.as_str()
            ))),
        }
    }

    /// Escape a value for use in a LIKE clause and wrap it with positional
    /// wildcards: `pos < 0` matches "ends with", `pos > 0` "starts with",
    /// `pos == 0` "contains". The returned string is a complete SQL literal
    /// (including an `ESCAPE` suffix where the vendor needs one).
    ///
    /// # Errors
    /// Returns `DbError::NotImplemented` for vendors without a modeled
    /// LIKE-escaping scheme.
    pub fn escape_like(&self, value: &str, pos: i32) -> Result<String, DbError> {
        match self.kind {
            DialectKind::MySql => Ok(mysql::escape_like(value, pos)),
            DialectKind::Sqlite => Ok(sqlite::escape_like(value, pos)),
            DialectKind::Odbc => Ok(odbc::escape_like(value, pos)),
            DialectKind::SqlServer => Ok(sqlserver::escape_like(value, pos)),
            DialectKind::Oracle => Err(DbError::NotImplemented(
                "LIKE escaping is not implemented for the oci dialect".to_string(),
            )),
        }
    }

    /// Rewrite a complete SQL statement to add row-limiting semantics.
    ///
    /// # Errors
    /// Returns a usage error for negative limit/offset, `NotSupported` when
    /// the vendor cannot express an offset, and a usage error when TOP
    /// injection finds no SELECT/UPDATE/DELETE prefix.
    pub fn apply_limit(
        &self,
        sql: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<String, DbError> {
        if limit.is_some_and(|l| l < 0) || offset.is_some_and(|o| o < 0) {
            return Err(DbError::InvalidArgument(
                "negative offset or limit".to_string(),
            ));
        }
        match self.kind {
            DialectKind::MySql => Ok(mysql::apply_limit(sql, limit, offset)),
            DialectKind::Sqlite => Ok(sqlite::apply_limit(sql, limit, offset)),
            DialectKind::Oracle => Ok(oracle::apply_limit(sql, limit, offset)),
            DialectKind::Odbc => odbc::apply_limit(sql, limit, offset),
            DialectKind::SqlServer => {
                sqlserver::apply_limit(sql, limit, offset, self.server_major_version)
            }
        }
    }

    /// Map a native error code (and message, for vendors that encode the
    /// violated constraint in text) to an error-taxonomy kind. Unrecognized
    /// codes fall through to the generic query classification.
    #[must_use]
    pub fn classify_error(&self, code: Option<i64>, message: &str) -> ErrorKind {
        match self.kind {
            DialectKind::MySql => mysql::classify_error(code),
            DialectKind::Sqlite => sqlite::classify_error(code, message),
            DialectKind::Oracle => oracle::classify_error(code),
            DialectKind::Odbc | DialectKind::SqlServer => ErrorKind::Query,
        }
    }

    /// Classify a native type name, applying vendor quirks on top of the
    /// common pattern table.
    #[must_use]
    pub fn logical_type(&self, detector: &mut TypeDetector, native_type: &str) -> LogicalType {
        match self.kind {
            // SQLite stores DATE/DATETIME declared columns as unix seconds.
            DialectKind::Sqlite
                if native_type.eq_ignore_ascii_case("DATE")
                    || native_type.eq_ignore_ascii_case("DATETIME") =>
            {
                LogicalType::UnixTimestamp
            }
            // MySQL TIME columns hold intervals, not times of day.
            DialectKind::MySql => match detector.detect(native_type) {
                LogicalType::Time => LogicalType::Interval,
                other => other,
            },
            _ => detector.detect(native_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_resolution() {
        assert_eq!(DialectKind::from_scheme("mysql"), Some(DialectKind::MySql));
        assert_eq!(DialectKind::from_scheme("SQLITE"), Some(DialectKind::Sqlite));
        assert_eq!(DialectKind::from_scheme("oci"), Some(DialectKind::Oracle));
        assert_eq!(
            DialectKind::from_scheme("mssql"),
            Some(DialectKind::SqlServer)
        );
        assert_eq!(DialectKind::from_scheme("pgsql"), None);
    }

    #[test]
    fn qualified_identifiers_are_delimited_per_part() {
        let driver = Driver::new(DialectKind::MySql);
        assert_eq!(
            driver.delimit_qualified("db.users").unwrap(),
            "`db`.`users`"
        );
        assert!(matches!(
            driver.delimit_qualified("2foo"),
            Err(DbError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            driver.delimit_qualified("foo bar"),
            Err(DbError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            driver.delimit_qualified("foo-4"),
            Err(DbError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn vendor_type_quirks() {
        let mut detector = TypeDetector::new();
        let mysql = Driver::new(DialectKind::MySql);
        assert_eq!(
            mysql.logical_type(&mut detector, "TIME"),
            LogicalType::Interval
        );
        let sqlite = Driver::new(DialectKind::Sqlite);
        assert_eq!(
            sqlite.logical_type(&mut detector, "DATETIME"),
            LogicalType::UnixTimestamp
        );
        let odbc = Driver::new(DialectKind::Odbc);
        assert_eq!(odbc.logical_type(&mut detector, "TIME"), LogicalType::Time);
    }
}
