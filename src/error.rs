use thiserror::Error;

/// Classification of a native driver failure, as derived from the vendor's
/// error-code tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection could not be established or was lost.
    Connection,
    /// Generic query/driver failure.
    Query,
    /// Unique constraint violation.
    UniqueViolation,
    /// Not-null constraint violation.
    NotNullViolation,
    /// Foreign-key constraint violation.
    ForeignKeyViolation,
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("query failed: {message}")]
    Query {
        message: String,
        sql_state: Option<String>,
        code: Option<i64>,
    },

    #[error("unique constraint violation: {message}")]
    UniqueViolation { message: String, code: Option<i64> },

    #[error("not-null constraint violation: {message}")]
    NotNullViolation { message: String, code: Option<i64> },

    #[error("foreign key constraint violation: {message}")]
    ForeignKeyViolation { message: String, code: Option<i64> },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("cannot read an undeclared column '{column}'{}", .hint.as_ref().map(|h| format!(", did you mean '{h}'?")).unwrap_or_else(|| ".".to_string()))]
    UnknownColumn {
        column: String,
        hint: Option<String>,
    },

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl DbError {
    /// Build an error from a native failure that has already been classified
    /// against the vendor's code table.
    #[must_use]
    pub fn from_native(
        kind: ErrorKind,
        message: String,
        sql_state: Option<String>,
        code: Option<i64>,
    ) -> Self {
        match kind {
            ErrorKind::Connection => DbError::Connection(message),
            ErrorKind::UniqueViolation => DbError::UniqueViolation { message, code },
            ErrorKind::NotNullViolation => DbError::NotNullViolation { message, code },
            ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message, code },
            ErrorKind::Query => DbError::Query {
                message,
                sql_state,
                code,
            },
        }
    }

    /// The native driver code carried by this error, if any.
    #[must_use]
    pub fn native_code(&self) -> Option<i64> {
        match self {
            DbError::Query { code, .. }
            | DbError::UniqueViolation { code, .. }
            | DbError::NotNullViolation { code, .. }
            | DbError::ForeignKeyViolation { code, .. } => *code,
            _ => None,
        }
    }

    /// Whether this error is one of the constraint-violation kinds.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DbError::UniqueViolation { .. }
                | DbError::NotNullViolation { .. }
                | DbError::ForeignKeyViolation { .. }
        )
    }
}
