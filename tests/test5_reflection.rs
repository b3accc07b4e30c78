#![cfg(feature = "sqlite")]

use sql_facade::prelude::*;

fn open() -> Connection {
    let mut db = Connection::open("sqlite::memory:", ConnectOptions::default()).unwrap();
    db.execute(
        "CREATE TABLE users ( \
            id INTEGER PRIMARY KEY AUTOINCREMENT, \
            email TEXT NOT NULL, \
            name VARCHAR(40) DEFAULT 'anon' \
         )",
        &[],
    )
    .unwrap();
    db.execute("CREATE UNIQUE INDEX ix_users_email ON users (email)", &[])
        .unwrap();
    db.execute(
        "CREATE TABLE posts ( \
            id INTEGER PRIMARY KEY, \
            user_id INTEGER NOT NULL REFERENCES users (id) \
         )",
        &[],
    )
    .unwrap();
    db.execute("CREATE VIEW v_users AS SELECT id, name FROM users", &[])
        .unwrap();
    db
}

#[test]
fn test_tables_lists_tables_and_views() {
    let mut db = open();
    let tables = db.tables().unwrap();
    let names: Vec<(&str, bool)> = tables
        .iter()
        .map(|t| (t.name.as_str(), t.view))
        .collect();
    assert_eq!(
        names,
        [("posts", false), ("users", false), ("v_users", true)]
    );
}

#[test]
fn test_columns_carry_types_flags_and_defaults() {
    let mut db = open();
    let columns = db.columns("users").unwrap();
    assert_eq!(columns.len(), 3);

    let id = &columns[0];
    assert_eq!(id.name, "id");
    assert_eq!(id.table, "users");
    assert_eq!(id.native_type, "INTEGER");
    assert!(id.primary);
    assert!(id.auto_increment);
    assert!(id.nullable);
    assert_eq!(id.default, None);

    let email = &columns[1];
    assert_eq!(email.name, "email");
    assert!(!email.nullable);
    assert!(!email.auto_increment);
    assert!(!email.primary);

    let name = &columns[2];
    assert_eq!(name.native_type, "VARCHAR");
    assert_eq!(name.size, Some(40));
    assert_eq!(name.default.as_deref(), Some("'anon'"));
}

#[test]
fn test_plain_integer_primary_key_is_not_autoincrement() {
    let mut db = open();
    let columns = db.columns("posts").unwrap();
    let id = &columns[0];
    assert!(id.primary);
    assert!(!id.auto_increment);
}

#[test]
fn test_indexes_include_the_synthesized_rowid_primary() {
    let mut db = open();
    let indexes = db.indexes("users").unwrap();

    let primary = indexes.iter().find(|ix| ix.primary).unwrap();
    assert!(primary.unique);
    assert_eq!(primary.columns, ["id"]);

    let email = indexes.iter().find(|ix| ix.name == "ix_users_email").unwrap();
    assert!(email.unique);
    assert!(!email.primary);
    assert_eq!(email.columns, ["email"]);
}

#[test]
fn test_foreign_keys_group_by_constraint() {
    let mut db = open();
    let keys = db.foreign_keys("posts").unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].columns, ["user_id"]);
    assert_eq!(keys[0].target_table, "users");
    assert_eq!(keys[0].target_columns, ["id"]);

    assert!(db.foreign_keys("users").unwrap().is_empty());
}

#[test]
fn test_descriptors_are_rebuilt_per_call() {
    let mut db = open();
    assert_eq!(db.tables().unwrap().len(), 3);
    db.execute("CREATE TABLE extra (a INTEGER)", &[]).unwrap();
    assert_eq!(db.tables().unwrap().len(), 4);
}
