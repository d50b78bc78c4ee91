use attendance_core::db::migrations::latest_version;
use attendance_core::db::{default_db_path, open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "students");
    assert_table_exists(&conn, "attendance");
}

#[test]
fn opened_connection_enforces_foreign_keys() {
    let conn = open_db_in_memory().unwrap();

    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let orphan = conn.execute(
        "INSERT INTO attendance (student_id, date, status) VALUES (42, '2024-01-10', 'Present');",
        [],
    );
    assert!(orphan.is_err());
}

#[test]
fn schema_rejects_duplicate_pair_and_unknown_status() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO students (roll_no, name, class_label) VALUES ('S1', 'Alice', '10A');",
        [],
    )
    .unwrap();
    let student_id = conn.last_insert_rowid();

    conn.execute(
        "INSERT INTO attendance (student_id, date, status) VALUES (?1, '2024-01-10', 'Present');",
        [student_id],
    )
    .unwrap();
    let duplicate = conn.execute(
        "INSERT INTO attendance (student_id, date, status) VALUES (?1, '2024-01-10', 'Absent');",
        [student_id],
    );
    assert!(duplicate.is_err());

    let bad_status = conn.execute(
        "INSERT INTO attendance (student_id, date, status) VALUES (?1, '2024-01-11', 'Late');",
        [student_id],
    );
    assert!(bad_status.is_err());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = default_db_path(dir.path());
    assert!(path.ends_with("attendance.db"));

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO students (roll_no, name, class_label) VALUES ('S1', 'Alice', '10A');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
