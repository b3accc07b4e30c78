use chrono::{Duration, NaiveDate};
use sql_facade::prelude::*;

fn driver(kind: DialectKind) -> Driver {
    Driver::new(kind)
}

#[test]
fn test_identifier_delimiting_per_vendor() {
    assert_eq!(driver(DialectKind::MySql).delimit("we`ird"), "`we``ird`");
    assert_eq!(driver(DialectKind::Sqlite).delimit("we]ird"), "[we ird]");
    assert_eq!(driver(DialectKind::Odbc).delimit("we]ird"), "[we]]ird]");
    assert_eq!(driver(DialectKind::SqlServer).delimit("we]ird"), "[we]]ird]");
    assert_eq!(driver(DialectKind::Oracle).delimit("we\"ird"), "\"we\"\"ird\"");
}

#[test]
fn test_like_escaping_per_vendor_and_position() {
    let mysql = driver(DialectKind::MySql);
    assert_eq!(mysql.escape_like("10%", 0).unwrap(), "'%10\\%%'");
    assert_eq!(mysql.escape_like("a_b", 1).unwrap(), "'a\\_b%'");
    assert_eq!(mysql.escape_like("x", -1).unwrap(), "'%x'");
    assert_eq!(
        mysql.escape_like("back\\slash", 0).unwrap(),
        "'%back\\\\\\\\slash%'"
    );

    let sqlite = driver(DialectKind::Sqlite);
    assert_eq!(sqlite.escape_like("10%", 0).unwrap(), "'%10\\%%' ESCAPE '\\'");
    assert_eq!(sqlite.escape_like("o'clock", 1).unwrap(), "'o''clock%' ESCAPE '\\'");

    let sqlserver = driver(DialectKind::SqlServer);
    assert_eq!(sqlserver.escape_like("10%", 0).unwrap(), "'%10[%]%'");
    assert_eq!(sqlserver.escape_like("a[b]", 0).unwrap(), "'%a[[]b]%'");

    assert!(matches!(
        driver(DialectKind::Oracle).escape_like("x", 0),
        Err(DbError::NotImplemented(_))
    ));
}

#[test]
fn test_apply_limit_per_vendor() {
    let sql = "SELECT * FROM t";

    let mysql = driver(DialectKind::MySql);
    assert_eq!(
        mysql.apply_limit(sql, Some(10), Some(20)).unwrap(),
        "SELECT * FROM t LIMIT 10 OFFSET 20"
    );
    assert_eq!(
        mysql.apply_limit(sql, None, Some(20)).unwrap(),
        "SELECT * FROM t LIMIT 18446744073709551615 OFFSET 20"
    );
    assert_eq!(mysql.apply_limit(sql, None, Some(0)).unwrap(), sql);

    let sqlite = driver(DialectKind::Sqlite);
    assert_eq!(
        sqlite.apply_limit(sql, Some(10), Some(20)).unwrap(),
        "SELECT * FROM t LIMIT 10 OFFSET 20"
    );
    assert_eq!(
        sqlite.apply_limit(sql, None, Some(20)).unwrap(),
        "SELECT * FROM t LIMIT -1 OFFSET 20"
    );

    let oracle = driver(DialectKind::Oracle);
    assert_eq!(
        oracle.apply_limit(sql, Some(10), None).unwrap(),
        "SELECT * FROM (SELECT * FROM t) WHERE ROWNUM <= 10"
    );

    let odbc = driver(DialectKind::Odbc);
    assert_eq!(
        odbc.apply_limit(sql, Some(10), None).unwrap(),
        "SELECT TOP 10 * FROM t"
    );
    assert!(matches!(
        odbc.apply_limit(sql, Some(10), Some(5)),
        Err(DbError::NotSupported(_))
    ));
    assert!(matches!(
        odbc.apply_limit("WITH x AS (SELECT 1) SELECT * FROM x", Some(10), None),
        Err(DbError::InvalidArgument(_))
    ));

    let old_mssql = driver(DialectKind::SqlServer).with_server_major_version(10);
    assert_eq!(
        old_mssql.apply_limit(sql, Some(10), None).unwrap(),
        "SELECT TOP 10 * FROM t"
    );
    let new_mssql = driver(DialectKind::SqlServer).with_server_major_version(12);
    assert_eq!(
        new_mssql
            .apply_limit("SELECT * FROM t ORDER BY id", Some(10), Some(20))
            .unwrap(),
        "SELECT * FROM t ORDER BY id OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
    );
}

#[test]
fn test_apply_limit_rejects_negatives_everywhere() {
    for kind in [
        DialectKind::MySql,
        DialectKind::Sqlite,
        DialectKind::Oracle,
        DialectKind::Odbc,
        DialectKind::SqlServer,
    ] {
        let d = driver(kind);
        assert!(matches!(
            d.apply_limit("SELECT 1", Some(-1), None),
            Err(DbError::InvalidArgument(_))
        ));
        assert!(matches!(
            d.apply_limit("SELECT 1", None, Some(-1)),
            Err(DbError::InvalidArgument(_))
        ));
    }
}

#[test]
fn test_datetime_and_interval_formatting() {
    let ts = NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(14, 30, 9)
        .unwrap();

    assert_eq!(
        driver(DialectKind::MySql).format_datetime(&ts),
        "'2024-03-05 14:30:09'"
    );
    assert_eq!(
        driver(DialectKind::SqlServer).format_datetime(&ts),
        "'2024-03-05T14:30:09'"
    );
    assert_eq!(
        driver(DialectKind::Odbc).format_datetime(&ts),
        "#03/05/2024 14:30:09#"
    );
    assert_eq!(
        driver(DialectKind::Sqlite).format_datetime(&ts),
        ts.and_utc().timestamp().to_string()
    );
    assert_eq!(
        driver(DialectKind::Sqlite)
            .with_datetime_format("%Y-%m-%d")
            .format_datetime(&ts),
        "2024-03-05"
    );

    assert_eq!(
        driver(DialectKind::MySql)
            .format_interval(&Duration::seconds(-3723))
            .unwrap(),
        "'-1:02:03'"
    );
    assert!(matches!(
        driver(DialectKind::Sqlite).format_interval(&Duration::seconds(60)),
        Err(DbError::NotSupported(_))
    ));
}

#[test]
fn test_error_classification_tables() {
    let mysql = driver(DialectKind::MySql);
    assert_eq!(
        mysql.classify_error(Some(1062), "Duplicate entry"),
        ErrorKind::UniqueViolation
    );
    assert_eq!(
        mysql.classify_error(Some(2013), "Lost connection"),
        ErrorKind::Connection
    );

    let sqlite = driver(DialectKind::Sqlite);
    assert_eq!(
        sqlite.classify_error(Some(2067), "UNIQUE constraint failed: t.a"),
        ErrorKind::UniqueViolation
    );
    assert_eq!(
        sqlite.classify_error(Some(1299), "NOT NULL constraint failed: t.a"),
        ErrorKind::NotNullViolation
    );

    let oracle = driver(DialectKind::Oracle);
    assert_eq!(
        oracle.classify_error(Some(1), "unique constraint violated"),
        ErrorKind::UniqueViolation
    );
    assert_eq!(
        oracle.classify_error(Some(2291), "integrity constraint"),
        ErrorKind::ForeignKeyViolation
    );

    assert_eq!(
        driver(DialectKind::Odbc).classify_error(Some(1062), "whatever"),
        ErrorKind::Query
    );
}
