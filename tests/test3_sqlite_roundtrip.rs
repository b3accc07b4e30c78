#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use sql_facade::prelude::*;

fn open() -> Connection {
    Connection::open("sqlite::memory:", ConnectOptions::default()).unwrap()
}

fn seed(db: &mut Connection) {
    db.execute(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER, email TEXT UNIQUE)",
        &[],
    )
    .unwrap();
    for (name, age, email) in [
        ("alice", 30i64, "alice@example.org"),
        ("bob", 25, "bob@example.org"),
        ("carol", 41, "carol@example.org"),
    ] {
        db.execute(
            "INSERT INTO users (name, age, email) VALUES (?, ?, ?)",
            &[Param::from(name), Param::from(age), Param::from(email)],
        )
        .unwrap();
    }
}

#[test]
fn test_roundtrip_query_and_strict_rows() {
    let mut db = open();
    seed(&mut db);

    let mut cursor = db
        .query(
            "SELECT name, age FROM users WHERE age > ? ORDER BY age",
            &[Param::from(26i64)],
        )
        .unwrap();
    assert_eq!(cursor.row_count(), 2);
    let names: Vec<&str> = cursor.column_names().iter().map(String::as_str).collect();
    assert_eq!(names, ["name", "age"]);

    let row = cursor.fetch().unwrap();
    assert_eq!(row.get("name").unwrap(), &Value::Text("alice".to_string()));
    assert_eq!(row.get("age").unwrap(), &Value::Int(30));

    let err = row.get("nmae").unwrap_err();
    match err {
        DbError::UnknownColumn { column, hint } => {
            assert_eq!(column, "nmae");
            assert_eq!(hint.as_deref(), Some("name"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let row = cursor.fetch().unwrap();
    assert_eq!(row.get("name").unwrap(), &Value::Text("carol".to_string()));
    assert!(cursor.fetch().is_none());
}

#[test]
fn test_fetch_shortcuts() {
    let mut db = open();
    seed(&mut db);

    let count = db
        .fetch_field("SELECT COUNT(*) FROM users", &[])
        .unwrap();
    assert_eq!(count, Some(Value::Int(3)));

    let rows = db
        .fetch_all("SELECT name FROM users ORDER BY name", &[])
        .unwrap();
    assert_eq!(rows.len(), 3);

    let pairs = db
        .fetch_pairs("SELECT name, age FROM users ORDER BY name", &[])
        .unwrap();
    assert_eq!(
        pairs,
        vec![
            (Value::Text("alice".to_string()), Value::Int(30)),
            (Value::Text("bob".to_string()), Value::Int(25)),
            (Value::Text("carol".to_string()), Value::Int(41)),
        ]
    );

    let none = db
        .fetch("SELECT * FROM users WHERE id = ?", &[Param::from(999i64)])
        .unwrap();
    assert!(none.is_none());
}

#[test]
fn test_list_expansion_end_to_end() {
    let mut db = open();
    seed(&mut db);
    let rows = db
        .fetch_all(
            "SELECT name FROM users WHERE age IN (?) ORDER BY name",
            &[Param::list([25i64, 41])],
        )
        .unwrap();
    let names: Vec<_> = rows
        .iter()
        .map(|r| r.get("name").unwrap().as_text().unwrap().to_string())
        .collect();
    assert_eq!(names, ["bob", "carol"]);
}

#[test]
fn test_execute_reports_rows_affected_and_last_insert_id() {
    let mut db = open();
    seed(&mut db);

    db.execute(
        "INSERT INTO users (name, age, email) VALUES (?, ?, ?)",
        &[Param::from("dave"), Param::from(19i64), Param::from("dave@example.org")],
    )
    .unwrap();
    assert_eq!(db.last_insert_id(None).unwrap(), Some(4));

    let affected = db
        .execute("UPDATE users SET age = age + 1 WHERE age < ?", &[Param::from(30i64)])
        .unwrap();
    assert_eq!(affected, 2);
}

#[test]
fn test_constraint_errors_are_classified() {
    let mut db = open();
    seed(&mut db);

    let err = db
        .execute(
            "INSERT INTO users (name, age, email) VALUES (?, ?, ?)",
            &[Param::from("dup"), Param::from(1i64), Param::from("alice@example.org")],
        )
        .unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }));
    assert!(err.is_constraint_violation());

    let err = db
        .execute(
            "INSERT INTO users (name) VALUES (?)",
            &[Param::Value(Value::Null)],
        )
        .unwrap_err();
    assert!(matches!(err, DbError::NotNullViolation { .. }));

    let err = db.execute("SELEKT 1", &[]).unwrap_err();
    assert!(matches!(err, DbError::Query { .. }));
}

#[test]
fn test_timestamp_values_roundtrip_as_text() {
    let mut db = open();
    db.execute("CREATE TABLE events (at DATETIME)", &[]).unwrap();
    let ts = NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(14, 30, 9)
        .unwrap();
    db.execute("INSERT INTO events (at) VALUES (?)", &[Param::Value(Value::Timestamp(ts))])
        .unwrap();
    let stored = db.fetch_field("SELECT at FROM events", &[]).unwrap().unwrap();
    assert_eq!(stored.as_timestamp(), Some(ts));

    let mut cursor = db.query("SELECT at FROM events", &[]).unwrap();
    assert_eq!(
        cursor.column_types(),
        vec![("at".to_string(), LogicalType::UnixTimestamp)]
    );
}

#[test]
fn test_lazy_connections_wake_on_first_statement() {
    let mut db = Connection::open("sqlite::memory:", ConnectOptions::default().lazy()).unwrap();
    assert!(!db.is_connected());
    db.execute("CREATE TABLE t (a)", &[]).unwrap();
    assert!(db.is_connected());
}

#[test]
fn test_file_backed_database_persists_across_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    let dsn = format!("sqlite:{}", path.display());

    let mut db = Connection::open(&dsn, ConnectOptions::default()).unwrap();
    db.execute("CREATE TABLE t (a INTEGER)", &[]).unwrap();
    db.execute("INSERT INTO t (a) VALUES (?)", &[Param::from(7i64)])
        .unwrap();
    db.disconnect();
    assert!(!db.is_connected());

    db.connect().unwrap();
    let stored = db.fetch_field("SELECT a FROM t", &[]).unwrap();
    assert_eq!(stored, Some(Value::Int(7)));
}

#[test]
fn test_unknown_scheme_is_a_connection_error() {
    assert!(matches!(
        Connection::open("pgsql:whatever", ConnectOptions::default()),
        Err(DbError::Connection(_))
    ));
    assert!(matches!(
        Connection::open("mysql:host=localhost", ConnectOptions::default()),
        Err(DbError::Connection(_))
    ));
    assert!(matches!(
        Connection::open("no-scheme-here", ConnectOptions::default()),
        Err(DbError::Connection(_))
    ));
}
