//! Placeholder preprocessing: expands typed `?` arguments into vendor SQL
//! plus a flat positional parameter list.
//!
//! The scanner walks the template once and only treats `?` as a marker in
//! plain SQL text. Markers inside string literals, quoted identifiers and
//! comments pass through untouched.

use tracing::debug;

use crate::dialect::Driver;
use crate::error::DbError;
use crate::value::{Param, Value};

/// What an empty list argument expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyListBehavior {
    /// Fail the preprocessing call. `IN ()` is invalid SQL everywhere, so
    /// the mistake surfaces before the server sees it.
    #[default]
    Error,
    /// Expand to a condition that matches no rows.
    AlwaysFalse,
}

/// The preprocessor's output: final SQL and the values to bind, in order.
///
/// Placeholder count and `params.len()` always agree.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Clone, Copy, PartialEq)]
enum State {
    Plain,
    SingleQuote,
    DoubleQuote,
    Backtick,
    Bracket,
    LineComment,
    BlockComment,
}

/// Expand every `?` marker against its argument.
///
/// # Errors
/// Usage errors for marker/argument count mismatch and empty lists (under
/// the default behavior); `InvalidIdentifier` for malformed identifier
/// arguments.
pub fn preprocess(
    sql: &str,
    params: &[Param],
    driver: &Driver,
    empty_list: EmptyListBehavior,
) -> Result<PreparedQuery, DbError> {
    let mut out = String::with_capacity(sql.len());
    let mut bound: Vec<Value> = Vec::with_capacity(params.len());
    let mut args = params.iter();
    let mut chars = sql.chars().peekable();
    let mut state = State::Plain;

    while let Some(ch) = chars.next() {
        match state {
            State::Plain => match ch {
                '?' => {
                    let Some(param) = args.next() else {
                        return Err(DbError::InvalidArgument(
                            "more placeholders than parameters".to_string(),
                        ));
                    };
                    expand(param, driver, empty_list, &mut out, &mut bound)?;
                }
                '\'' => {
                    state = State::SingleQuote;
                    out.push(ch);
                }
                '"' => {
                    state = State::DoubleQuote;
                    out.push(ch);
                }
                '`' => {
                    state = State::Backtick;
                    out.push(ch);
                }
                '[' => {
                    state = State::Bracket;
                    out.push(ch);
                }
                '-' if chars.peek() == Some(&'-') => {
                    state = State::LineComment;
                    out.push('-');
                    out.push('-');
                    chars.next();
                }
                '/' if chars.peek() == Some(&'*') => {
                    state = State::BlockComment;
                    out.push('/');
                    out.push('*');
                    chars.next();
                }
                _ => out.push(ch),
            },
            State::SingleQuote => {
                out.push(ch);
                if ch == '\'' {
                    state = State::Plain;
                }
            }
            State::DoubleQuote => {
                out.push(ch);
                if ch == '"' {
                    state = State::Plain;
                }
            }
            State::Backtick => {
                out.push(ch);
                if ch == '`' {
                    state = State::Plain;
                }
            }
            State::Bracket => {
                out.push(ch);
                if ch == ']' {
                    state = State::Plain;
                }
            }
            State::LineComment => {
                out.push(ch);
                if ch == '\n' {
                    state = State::Plain;
                }
            }
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    out.push('*');
                    out.push('/');
                    chars.next();
                    state = State::Plain;
                } else {
                    out.push(ch);
                }
            }
        }
    }

    if args.next().is_some() {
        return Err(DbError::InvalidArgument(
            "more parameters than placeholders".to_string(),
        ));
    }
    debug!(sql = %out, params = bound.len(), "preprocessed statement");
    Ok(PreparedQuery { sql: out, params: bound })
}

fn expand(
    param: &Param,
    driver: &Driver,
    empty_list: EmptyListBehavior,
    out: &mut String,
    bound: &mut Vec<Value>,
) -> Result<(), DbError> {
    match param {
        Param::Value(value) => {
            out.push('?');
            bound.push(value.clone());
        }
        // Lists expand in place, inside whatever parentheses the template
        // already has around the marker.
        Param::List(values) => {
            if values.is_empty() {
                match empty_list {
                    EmptyListBehavior::Error => {
                        return Err(DbError::InvalidArgument(
                            "empty list bound to a placeholder".to_string(),
                        ));
                    }
                    EmptyListBehavior::AlwaysFalse => out.push_str("SELECT 1 WHERE 1 = 0"),
                }
            } else {
                for (ix, value) in values.iter().enumerate() {
                    if ix > 0 {
                        out.push_str(", ");
                    }
                    out.push('?');
                    bound.push(value.clone());
                }
            }
        }
        Param::Pairs(pairs) => {
            if pairs.is_empty() {
                match empty_list {
                    EmptyListBehavior::Error => {
                        return Err(DbError::InvalidArgument(
                            "empty pair group bound to a placeholder".to_string(),
                        ));
                    }
                    EmptyListBehavior::AlwaysFalse => out.push_str("1 = 0"),
                }
            } else {
                out.push('(');
                for (ix, (column, value)) in pairs.iter().enumerate() {
                    if ix > 0 {
                        out.push_str(" OR ");
                    }
                    out.push_str(&driver.delimit_qualified(column)?);
                    out.push_str(" = ?");
                    bound.push(value.clone());
                }
                out.push(')');
            }
        }
        Param::Identifier(name) => out.push_str(&driver.delimit_qualified(name)?),
        Param::Literal(literal) => {
            out.push_str(&literal.sql);
            bound.extend(literal.params.iter().cloned());
        }
    }
    Ok(())
}
