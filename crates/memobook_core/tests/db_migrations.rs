use memobook_core::db::migrations::latest_version;
use memobook_core::db::{open_db, open_db_in_memory, DbError};
use memobook_core::{SqliteTodoRepository, TodoStatus, TodoStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "todos");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO todos (content, createdDate) VALUES ('kept', '2026-03-01T08:00:00.000Z')",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM todos", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn status_column_defaults_to_pending() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO todos (content, createdDate) VALUES ('x', '2026-03-01T08:00:00.000Z')",
        [],
    )
    .unwrap();
    let status: String = conn
        .query_row("SELECT status FROM todos", [], |row| row.get(0))
        .unwrap();
    assert_eq!(status, "pending");
}

#[test]
fn legacy_unversioned_table_is_adopted_without_data_loss() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL,
            createdDate TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
        );
        INSERT INTO todos (content, createdDate, status)
            VALUES ('old', '2025-05-05T05:05:05.505Z', 'completed');",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let store = TodoStore::new(SqliteTodoRepository::try_new(conn).unwrap());
    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].content, "old");
    assert_eq!(listed[0].status, TodoStatus::Completed);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn open_db_creates_missing_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("todos.db");

    open_db(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn open_db_reports_unusable_data_directory() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    match open_db(blocker.join("todos.db")).unwrap_err() {
        DbError::DataDir { path, .. } => assert_eq!(path, blocker),
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
