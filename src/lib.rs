//! A thin synchronous SQL access facade.
//!
//! One [`Connection`](connection::Connection) couples a native client with a
//! vendor dialect driver. Statements are written with typed `?` placeholders
//! and preprocessed into final vendor SQL plus a flat parameter list; results
//! come back as strict rows behind a pull-based cursor. The dialect layer
//! also covers identifier quoting, LIKE escaping, row limiting, error
//! classification and schema reflection for each supported vendor family.
//!
//! ```
//! use sql_facade::prelude::*;
//!
//! fn main() -> Result<(), DbError> {
//!     let mut db = Connection::open("sqlite::memory:", ConnectOptions::default())?;
//!     db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)", &[])?;
//!     db.execute("INSERT INTO users (name) VALUES (?)", &[Param::from("alice")])?;
//!     let name = db.fetch_field("SELECT name FROM users WHERE id = ?", &[Param::from(1i64)])?;
//!     assert_eq!(name, Some(Value::Text("alice".to_string())));
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod dialect;
pub mod error;
pub mod native;
pub mod preprocess;
pub mod prelude;
pub mod reflection;
pub mod results;
#[cfg(feature = "sqlite")]
pub mod sqlite_client;
pub mod typing;
pub mod value;

pub use connection::{ConnectOptions, Connection};
pub use dialect::{DialectKind, Driver};
pub use error::{DbError, ErrorKind};
pub use native::{NativeClient, NativeColumn, NativeError, NativeOutput};
pub use preprocess::{preprocess, EmptyListBehavior, PreparedQuery};
pub use reflection::{Column, ForeignKey, Index, Table};
pub use results::{ResultCursor, Row};
#[cfg(feature = "sqlite")]
pub use sqlite_client::SqliteClient;
pub use typing::{LogicalType, TypeDetector};
pub use value::{Param, SqlLiteral, Value};
