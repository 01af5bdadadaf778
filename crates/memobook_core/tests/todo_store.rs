use chrono::Utc;
use memobook_core::db::migrations::latest_version;
use memobook_core::db::{open_db, open_db_in_memory};
use memobook_core::{
    RepoError, SqliteTodoRepository, TodoPatch, TodoStatus, TodoStore, TodoValidationError,
};
use rusqlite::Connection;

fn memory_store() -> TodoStore<SqliteTodoRepository> {
    let conn = open_db_in_memory().unwrap();
    TodoStore::new(SqliteTodoRepository::try_new(conn).unwrap())
}

#[test]
fn create_trims_content_and_stamps_pending_now() {
    let store = memory_store();
    let before = Utc::now();

    let todo = store.create("  buy milk \n").unwrap();

    let after = Utc::now();
    assert_eq!(todo.content, "buy milk");
    assert_eq!(todo.status, TodoStatus::Pending);
    // createdDate is stored at millisecond precision.
    assert!(todo.created_date >= before - chrono::Duration::milliseconds(1));
    assert!(todo.created_date <= after);
}

#[test]
fn create_returns_the_persisted_record() {
    let store = memory_store();
    let created = store.create("call mom").unwrap();

    let loaded = store.get(created.id, false).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_rejects_blank_content_without_inserting() {
    let store = memory_store();

    for blank in ["", "   ", "\t\n"] {
        let err = store.create(blank).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(TodoValidationError::EmptyContent)
        ));
    }
    assert!(store.list_all().unwrap().is_empty());
}

#[test]
fn ids_are_monotonic_and_never_reused_after_delete() {
    let store = memory_store();
    let first = store.create("a").unwrap();
    let second = store.create("b").unwrap();
    assert!(second.id > first.id);

    assert!(store.delete(second.id).unwrap());
    let third = store.create("c").unwrap();
    assert!(third.id > second.id);
}

#[test]
fn list_orders_by_created_date_then_id() {
    let store = memory_store();
    let a = store.create("a").unwrap();
    let b = store.create("b").unwrap();
    let c = store.create("c").unwrap();

    let conn = store.repository().connection();
    conn.execute(
        "UPDATE todos SET createdDate = '2026-01-01T00:00:00.000Z' WHERE id = ?1",
        [c.id],
    )
    .unwrap();
    conn.execute(
        "UPDATE todos SET createdDate = '2026-01-02T00:00:00.000Z' WHERE id IN (?1, ?2)",
        [a.id, b.id],
    )
    .unwrap();

    let ids: Vec<_> = store.list().unwrap().iter().map(|todo| todo.id).collect();
    assert_eq!(ids, vec![c.id, a.id, b.id]);
}

#[test]
fn list_never_contains_deleted_todos() {
    let store = memory_store();
    let keep = store.create("keep").unwrap();
    let drop = store.create("drop").unwrap();
    store
        .update(keep.id, &TodoPatch::status(TodoStatus::Completed))
        .unwrap();
    store.delete(drop.id).unwrap();

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);
    assert!(listed.iter().all(|todo| todo.status != TodoStatus::Deleted));

    let all = store.list_all().unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn update_applies_only_supplied_fields() {
    let store = memory_store();
    let todo = store.create("draft").unwrap();

    assert!(store.update(todo.id, &TodoPatch::content(" final ")).unwrap());
    let loaded = store.get(todo.id, false).unwrap().unwrap();
    assert_eq!(loaded.content, "final");
    assert_eq!(loaded.status, TodoStatus::Pending);
    assert_eq!(loaded.created_date, todo.created_date);

    assert!(store
        .update(todo.id, &TodoPatch::status(TodoStatus::Completed))
        .unwrap());
    let loaded = store.get(todo.id, false).unwrap().unwrap();
    assert_eq!(loaded.content, "final");
    assert_eq!(loaded.status, TodoStatus::Completed);
}

#[test]
fn update_reports_existence_not_change() {
    let store = memory_store();
    let todo = store.create("same").unwrap();

    assert!(store.update(todo.id, &TodoPatch::content("same")).unwrap());
    assert!(!store.update(todo.id, &TodoPatch::default()).unwrap());
    assert!(!store
        .update(todo.id + 100, &TodoPatch::status(TodoStatus::Completed))
        .unwrap());
    assert!(!store.delete(todo.id + 100).unwrap());
}

#[test]
fn update_rejects_blank_content() {
    let store = memory_store();
    let todo = store.create("keep me").unwrap();

    let err = store.update(todo.id, &TodoPatch::content("  ")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(store.get(todo.id, false).unwrap().unwrap().content, "keep me");
}

#[test]
fn deleted_todo_is_retained_and_can_be_restored() {
    let store = memory_store();
    let todo = store.create("oops").unwrap();

    assert!(store.delete(todo.id).unwrap());
    assert!(store.get(todo.id, false).unwrap().is_none());
    let tombstone = store.get(todo.id, true).unwrap().unwrap();
    assert_eq!(tombstone.status, TodoStatus::Deleted);
    assert_eq!(tombstone.content, "oops");

    assert!(store
        .update(todo.id, &TodoPatch::status(TodoStatus::Pending))
        .unwrap());
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn buy_milk_lifecycle() {
    let store = memory_store();
    let todo = store.create("buy milk").unwrap();

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].content, "buy milk");
    assert_eq!(listed[0].status, TodoStatus::Pending);

    assert!(store
        .update(todo.id, &TodoPatch::status(TodoStatus::Completed))
        .unwrap());
    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, TodoStatus::Completed);

    assert!(store.delete(todo.id).unwrap());
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn writes_are_visible_to_a_fresh_connection_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.db");
    let store = TodoStore::new(SqliteTodoRepository::try_new(open_db(&path).unwrap()).unwrap());

    let todo = store.create("durable").unwrap();
    store
        .update(todo.id, &TodoPatch::status(TodoStatus::Completed))
        .unwrap();

    let reader = TodoStore::new(SqliteTodoRepository::try_new(open_db(&path).unwrap()).unwrap());
    let listed = reader.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, TodoStatus::Completed);

    store.close().unwrap();
    reader.close().unwrap();
}

#[test]
fn rows_with_unknown_status_are_reported_as_invalid() {
    let store = memory_store();
    let todo = store.create("x").unwrap();
    store
        .repository()
        .connection()
        .execute("UPDATE todos SET status = 'archived' WHERE id = ?1", [todo.id])
        .unwrap();

    let err = store.list().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("archived")));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteTodoRepository::try_new(conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_missing_table_and_columns() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();
    assert!(matches!(
        SqliteTodoRepository::try_new(conn),
        Err(RepoError::MissingRequiredTable("todos"))
    ));

    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE todos (id INTEGER PRIMARY KEY, content TEXT NOT NULL, status TEXT);
         PRAGMA user_version = {};",
        latest_version()
    ))
    .unwrap();
    assert!(matches!(
        SqliteTodoRepository::try_new(conn),
        Err(RepoError::MissingRequiredColumn {
            table: "todos",
            column: "createdDate"
        })
    ));
}

#[test]
fn todo_serializes_with_camel_case_wire_fields() {
    let store = memory_store();
    let todo = store.create("wire").unwrap();

    let json = serde_json::to_value(&todo).unwrap();
    assert_eq!(json["id"], todo.id);
    assert_eq!(json["content"], "wire");
    assert_eq!(json["status"], "pending");
    assert!(json["createdDate"].is_string());
    assert!(json.get("created_date").is_none());
}

