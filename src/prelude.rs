//! Convenience re-exports of the types most callers touch.

pub use crate::connection::{ConnectOptions, Connection};
pub use crate::dialect::{DialectKind, Driver};
pub use crate::error::{DbError, ErrorKind};
pub use crate::preprocess::{EmptyListBehavior, PreparedQuery};
pub use crate::reflection::{Column, ForeignKey, Index, Table};
pub use crate::results::{ResultCursor, Row};
#[cfg(feature = "sqlite")]
pub use crate::sqlite_client::SqliteClient;
pub use crate::typing::LogicalType;
pub use crate::value::{Param, SqlLiteral, Value};
