//! The connection facade: one native client, one dialect driver, and the
//! bookkeeping that ties them together.

use tracing::debug;

use crate::dialect::{mysql, oracle, sqlite, sqlserver, DialectKind, Driver};
use crate::error::DbError;
use crate::native::{NativeClient, NativeError};
use crate::preprocess::{preprocess, EmptyListBehavior};
use crate::reflection::{row_text, Column, ForeignKey, Index, Table};
use crate::results::{ResultCursor, Row};
#[cfg(feature = "sqlite")]
use crate::sqlite_client::SqliteClient;
use crate::value::{Param, Value};

/// Connection-time configuration.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Defer the native connect until the first statement.
    pub lazy: bool,
    /// Connection charset, applied post-connect on MySQL via `SET NAMES`.
    pub charset: Option<String>,
    /// MySQL `sql_mode`, applied post-connect.
    pub sql_mode: Option<String>,
    /// chrono format for datetime literals on dialects that default to unix
    /// seconds.
    pub datetime_format: Option<String>,
    /// What an empty list argument expands to.
    pub empty_list: EmptyListBehavior,
}

impl ConnectOptions {
    #[must_use]
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    #[must_use]
    pub fn with_sql_mode(mut self, sql_mode: impl Into<String>) -> Self {
        self.sql_mode = Some(sql_mode.into());
        self
    }

    #[must_use]
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_empty_list(mut self, behavior: EmptyListBehavior) -> Self {
        self.empty_list = behavior;
        self
    }
}

/// A single database connection.
///
/// Owns the native client and serializes every statement through it. All
/// SQL goes through the placeholder preprocessor; native failures come back
/// classified against the dialect's error tables.
pub struct Connection {
    client: Box<dyn NativeClient>,
    driver: Driver,
    options: ConnectOptions,
    transaction_depth: u32,
}

impl Connection {
    /// Open a connection from a DSN. The scheme (the part before the first
    /// `:`) picks the dialect; `sqlite:` uses the bundled client, every
    /// other recognized scheme needs a caller-supplied client via
    /// [`Connection::with_client`].
    ///
    /// # Errors
    /// `DbError::Connection` for malformed or unrecognized DSNs, and for
    /// native connect failures unless `options.lazy` is set.
    pub fn open(dsn: &str, options: ConnectOptions) -> Result<Self, DbError> {
        let (scheme, rest) = dsn
            .split_once(':')
            .ok_or_else(|| DbError::Connection(format!("malformed DSN '{dsn}'")))?;
        let kind = DialectKind::from_scheme(scheme)
            .ok_or_else(|| DbError::Connection(format!("unrecognized DSN scheme '{scheme}'")))?;
        let client: Box<dyn NativeClient> = match kind {
            #[cfg(feature = "sqlite")]
            DialectKind::Sqlite => Box::new(SqliteClient::new(rest)),
            other => {
                return Err(DbError::Connection(format!(
                    "no bundled client for the {} dialect; supply one with Connection::with_client",
                    other.as_str()
                )));
            }
        };
        Self::build(client, kind, options)
    }

    /// Build a connection over a caller-supplied native client.
    ///
    /// # Errors
    /// Native connect failures, unless `options.lazy` is set.
    pub fn with_client(
        client: Box<dyn NativeClient>,
        kind: DialectKind,
        options: ConnectOptions,
    ) -> Result<Self, DbError> {
        Self::build(client, kind, options)
    }

    fn build(
        client: Box<dyn NativeClient>,
        kind: DialectKind,
        options: ConnectOptions,
    ) -> Result<Self, DbError> {
        let mut driver = Driver::new(kind);
        if let Some(format) = &options.datetime_format {
            driver = driver.with_datetime_format(format.clone());
        }
        let mut connection = Self {
            client,
            driver,
            options,
            transaction_depth: 0,
        };
        if !connection.options.lazy {
            connection.connect()?;
        }
        Ok(connection)
    }

    /// Establish the native connection. Idempotent; called implicitly by
    /// every statement, so lazy connections wake up on first use.
    ///
    /// # Errors
    /// `DbError::Connection` when the native connect fails.
    pub fn connect(&mut self) -> Result<(), DbError> {
        if self.client.is_connected() {
            return Ok(());
        }
        self.client
            .connect()
            .map_err(|e| DbError::Connection(e.message))?;
        debug!(dialect = self.driver.kind().as_str(), "connected");
        if let Some(major) = self.client.server_major_version() {
            self.driver = self.driver.clone().with_server_major_version(major);
        }
        if self.driver.kind() == DialectKind::MySql {
            if let Some(charset) = self.options.charset.clone() {
                let sql = format!("SET NAMES {}", self.driver.quote_text(&charset));
                self.raw_execute(&sql)?;
            }
            if let Some(mode) = self.options.sql_mode.clone() {
                let sql = format!("SET sql_mode = {}", self.driver.quote_text(&mode));
                self.raw_execute(&sql)?;
            }
        }
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.client.disconnect();
        self.transaction_depth = 0;
    }

    /// Drop the native connection and establish a fresh one.
    ///
    /// # Errors
    /// `DbError::Connection` when the reconnect fails.
    pub fn reconnect(&mut self) -> Result<(), DbError> {
        self.disconnect();
        self.connect()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    #[must_use]
    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    #[must_use]
    pub fn transaction_depth(&self) -> u32 {
        self.transaction_depth
    }

    /// Run a statement and return a cursor over its buffered result set.
    ///
    /// # Errors
    /// Preprocessing usage errors, or the classified native failure.
    pub fn query(&mut self, sql: &str, params: &[Param]) -> Result<ResultCursor, DbError> {
        self.connect()?;
        let prepared = preprocess(sql, params, &self.driver, self.options.empty_list)?;
        debug!(sql = %prepared.sql, params = prepared.params.len(), "query");
        let output = self
            .client
            .execute(&prepared.sql, &prepared.params)
            .map_err(|e| self.remap(e))?;
        Ok(ResultCursor::new(output, self.driver.clone()))
    }

    /// Run a statement and return the number of rows it affected.
    ///
    /// # Errors
    /// Same failure modes as [`Connection::query`].
    pub fn execute(&mut self, sql: &str, params: &[Param]) -> Result<u64, DbError> {
        self.connect()?;
        let prepared = preprocess(sql, params, &self.driver, self.options.empty_list)?;
        debug!(sql = %prepared.sql, params = prepared.params.len(), "execute");
        let output = self
            .client
            .execute(&prepared.sql, &prepared.params)
            .map_err(|e| self.remap(e))?;
        Ok(output.rows_affected)
    }

    /// First row of the result, if any.
    ///
    /// # Errors
    /// Same failure modes as [`Connection::query`].
    pub fn fetch(&mut self, sql: &str, params: &[Param]) -> Result<Option<Row>, DbError> {
        Ok(self.query(sql, params)?.fetch())
    }

    /// First value of the first row, if any.
    ///
    /// # Errors
    /// Same failure modes as [`Connection::query`].
    pub fn fetch_field(&mut self, sql: &str, params: &[Param]) -> Result<Option<Value>, DbError> {
        Ok(self.query(sql, params)?.fetch_field())
    }

    /// All rows of the result.
    ///
    /// # Errors
    /// Same failure modes as [`Connection::query`].
    pub fn fetch_all(&mut self, sql: &str, params: &[Param]) -> Result<Vec<Row>, DbError> {
        Ok(self.query(sql, params)?.fetch_all())
    }

    /// All rows as first-column → second-column pairs.
    ///
    /// # Errors
    /// Same failure modes as [`Connection::query`].
    pub fn fetch_pairs(
        &mut self,
        sql: &str,
        params: &[Param],
    ) -> Result<Vec<(Value, Value)>, DbError> {
        Ok(self.query(sql, params)?.fetch_pairs())
    }

    /// Identifier generated by the last INSERT on this connection.
    ///
    /// # Errors
    /// The classified native failure.
    pub fn last_insert_id(&mut self, sequence: Option<&str>) -> Result<Option<i64>, DbError> {
        self.connect()?;
        self.client
            .last_insert_id(sequence)
            .map_err(|e| self.remap(e))
    }

    /// Run a closure inside a transaction.
    ///
    /// Frames nest by counting: only the outermost frame issues the native
    /// begin, commit and rollback. An error escaping any frame propagates
    /// out; the native rollback happens exactly once, when the outermost
    /// frame unwinds. The depth counter is restored on every exit path.
    ///
    /// # Errors
    /// The closure's error, or the classified native failure from the
    /// transaction statements themselves.
    pub fn transaction<T, F>(&mut self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&mut Self) -> Result<T, DbError>,
    {
        self.connect()?;
        if self.transaction_depth == 0 {
            self.client.begin().map_err(|e| self.remap(e))?;
            debug!("begin");
        }
        self.transaction_depth += 1;
        let result = f(self);
        self.transaction_depth -= 1;
        match result {
            Ok(value) => {
                if self.transaction_depth == 0 {
                    self.client.commit().map_err(|e| self.remap(e))?;
                    debug!("commit");
                }
                Ok(value)
            }
            Err(err) => {
                if self.transaction_depth == 0 {
                    if let Err(rollback_err) = self.client.rollback() {
                        debug!(error = %rollback_err.message, "rollback failed");
                    }
                    debug!("rollback");
                }
                Err(err)
            }
        }
    }

    /// Explicitly start a transaction.
    ///
    /// # Errors
    /// A usage error inside a [`Connection::transaction`] block, where the
    /// depth counter owns the native transaction statements.
    pub fn begin(&mut self) -> Result<(), DbError> {
        self.assert_outside_transaction("begin")?;
        self.connect()?;
        self.client.begin().map_err(|e| self.remap(e))
    }

    /// # Errors
    /// A usage error inside a transaction block; otherwise the classified
    /// native failure.
    pub fn commit(&mut self) -> Result<(), DbError> {
        self.assert_outside_transaction("commit")?;
        self.client.commit().map_err(|e| self.remap(e))
    }

    /// # Errors
    /// A usage error inside a transaction block; otherwise the classified
    /// native failure.
    pub fn rollback(&mut self) -> Result<(), DbError> {
        self.assert_outside_transaction("rollback")?;
        self.client.rollback().map_err(|e| self.remap(e))
    }

    fn assert_outside_transaction(&self, operation: &str) -> Result<(), DbError> {
        if self.transaction_depth > 0 {
            return Err(DbError::InvalidArgument(format!(
                "{operation} is not allowed inside a transaction block"
            )));
        }
        Ok(())
    }

    /// Validate and delimit a bare or dotted identifier.
    ///
    /// # Errors
    /// `DbError::InvalidIdentifier` for malformed names.
    pub fn quote_identifier(&self, name: &str) -> Result<String, DbError> {
        self.driver.delimit_qualified(name)
    }

    /// See [`Driver::escape_like`].
    ///
    /// # Errors
    /// Propagates the driver's `NotImplemented`.
    pub fn escape_like(&self, value: &str, pos: i32) -> Result<String, DbError> {
        self.driver.escape_like(value, pos)
    }

    /// See [`Driver::apply_limit`].
    ///
    /// # Errors
    /// Propagates the driver's usage and `NotSupported` errors.
    pub fn apply_limit(
        &self,
        sql: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<String, DbError> {
        self.driver.apply_limit(sql, limit, offset)
    }

    #[must_use]
    pub fn format_datetime(&self, value: &chrono::NaiveDateTime) -> String {
        self.driver.format_datetime(value)
    }

    /********************* reflection *********************/

    /// List tables and views.
    ///
    /// # Errors
    /// `NotImplemented` on dialects without modeled reflection.
    pub fn tables(&mut self) -> Result<Vec<Table>, DbError> {
        match self.driver.kind() {
            DialectKind::MySql => mysql::map_tables(&self.raw_rows(mysql::TABLES_SQL)?),
            DialectKind::Sqlite => sqlite::map_tables(&self.raw_rows(sqlite::TABLES_SQL)?),
            DialectKind::SqlServer => {
                sqlserver::map_tables(&self.raw_rows(sqlserver::TABLES_SQL)?)
            }
            DialectKind::Oracle => oracle::map_tables(&self.raw_rows(oracle::TABLES_SQL)?),
            DialectKind::Odbc => Err(self.reflection_not_implemented()),
        }
    }

    /// Describe a table's columns.
    ///
    /// # Errors
    /// `NotImplemented` on dialects without modeled column reflection.
    pub fn columns(&mut self, table: &str) -> Result<Vec<Column>, DbError> {
        match self.driver.kind() {
            DialectKind::MySql => {
                mysql::map_columns(table, &self.raw_rows(&mysql::columns_sql(table))?)
            }
            DialectKind::Sqlite => {
                let create_sql = self
                    .raw_rows(&sqlite::create_table_sql(table))?
                    .first()
                    .and_then(|row| row.value_at(0).filter(|v| !v.is_null()).map(row_text));
                let rows = self.raw_rows(&sqlite::table_info_sql(table))?;
                sqlite::map_columns(table, create_sql.as_deref(), &rows)
            }
            DialectKind::SqlServer => {
                sqlserver::map_columns(table, &self.raw_rows(&sqlserver::columns_sql(table))?)
            }
            DialectKind::Oracle | DialectKind::Odbc => Err(self.reflection_not_implemented()),
        }
    }

    /// Describe a table's indexes.
    ///
    /// # Errors
    /// `NotImplemented` on dialects without modeled index reflection.
    pub fn indexes(&mut self, table: &str) -> Result<Vec<Index>, DbError> {
        match self.driver.kind() {
            DialectKind::MySql => {
                mysql::map_indexes(&self.raw_rows(&mysql::indexes_sql(table))?)
            }
            DialectKind::Sqlite => {
                let mut indexes = sqlite::map_index_list(
                    &self.raw_rows(&sqlite::index_list_sql(table))?,
                )?;
                for index in &mut indexes {
                    index.columns =
                        sqlite::index_columns(&self.raw_rows(&sqlite::index_info_sql(&index.name))?)?;
                }
                // An INTEGER PRIMARY KEY is the rowid and has no index_list
                // entry; synthesize its index from the column flags.
                if !indexes.iter().any(|ix| ix.primary) {
                    let pk_columns: Vec<String> = self
                        .columns(table)?
                        .into_iter()
                        .filter(|c| c.primary)
                        .map(|c| c.name)
                        .collect();
                    if !pk_columns.is_empty() {
                        indexes.insert(
                            0,
                            Index {
                                name: String::new(),
                                unique: true,
                                primary: true,
                                columns: pk_columns,
                            },
                        );
                    }
                }
                Ok(indexes)
            }
            DialectKind::SqlServer => {
                sqlserver::map_indexes(&self.raw_rows(&sqlserver::indexes_sql(table))?)
            }
            DialectKind::Oracle | DialectKind::Odbc => Err(self.reflection_not_implemented()),
        }
    }

    /// Describe a table's outgoing foreign keys.
    ///
    /// # Errors
    /// `NotImplemented` on dialects without modeled foreign-key reflection.
    pub fn foreign_keys(&mut self, table: &str) -> Result<Vec<ForeignKey>, DbError> {
        match self.driver.kind() {
            DialectKind::MySql => {
                mysql::map_foreign_keys(&self.raw_rows(&mysql::foreign_keys_sql(table))?)
            }
            DialectKind::Sqlite => {
                sqlite::map_foreign_keys(&self.raw_rows(&sqlite::foreign_key_list_sql(table))?)
            }
            DialectKind::SqlServer => {
                sqlserver::map_foreign_keys(&self.raw_rows(&sqlserver::foreign_keys_sql(table))?)
            }
            DialectKind::Oracle | DialectKind::Odbc => Err(self.reflection_not_implemented()),
        }
    }

    fn reflection_not_implemented(&self) -> DbError {
        DbError::NotImplemented(format!(
            "schema reflection is not implemented for the {} dialect",
            self.driver.kind().as_str()
        ))
    }

    /// Run already-final SQL, bypassing the preprocessor. Catalog and
    /// session-setup statements only.
    fn raw_execute(&mut self, sql: &str) -> Result<(), DbError> {
        debug!(sql, "execute");
        self.client.execute(sql, &[]).map_err(|e| self.remap(e))?;
        Ok(())
    }

    fn raw_rows(&mut self, sql: &str) -> Result<Vec<Row>, DbError> {
        self.connect()?;
        debug!(sql, "query");
        let output = self.client.execute(sql, &[]).map_err(|e| self.remap(e))?;
        Ok(ResultCursor::new(output, self.driver.clone()).fetch_all())
    }

    fn remap(&self, err: NativeError) -> DbError {
        let kind = self.driver.classify_error(err.code, &err.message);
        DbError::from_native(kind, err.message, err.sql_state, err.code)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("dialect", &self.driver.kind())
            .field("connected", &self.client.is_connected())
            .field("transaction_depth", &self.transaction_depth)
            .finish()
    }
}
