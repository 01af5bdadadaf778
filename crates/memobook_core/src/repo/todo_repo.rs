//! Todo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `todos` table with soft-delete semantics.
//! - Own the single connection all store reads and writes go through.
//!
//! # Invariants
//! - Every successful write is committed before the call returns.
//! - Listings order by `createdDate ASC, id ASC`.
//! - Read paths reject malformed rows instead of masking them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::todo::{
    format_created_date, normalize_content, parse_created_date, Todo, TodoId, TodoPatch,
    TodoStatus, TodoValidationError,
};
use chrono::{SubsecRound, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TODO_SELECT_SQL: &str = "SELECT id, content, createdDate, status FROM todos";
const REQUIRED_COLUMNS: &[&str] = &["id", "content", "createdDate", "status"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for todo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TodoValidationError),
    Db(DbError),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing todos.
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoListQuery {
    /// Include soft-deleted rows. Only inspection paths set this.
    pub include_deleted: bool,
}

/// Repository interface for todo CRUD.
pub trait TodoRepository {
    /// Inserts a pending todo with trimmed `content`, stamped now.
    fn create_todo(&self, content: &str) -> RepoResult<Todo>;
    fn get_todo(&self, id: TodoId, include_deleted: bool) -> RepoResult<Option<Todo>>;
    fn list_todos(&self, query: &TodoListQuery) -> RepoResult<Vec<Todo>>;
    /// Applies the supplied fields; `Ok(true)` iff the row exists.
    fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> RepoResult<bool>;
    fn soft_delete_todo(&self, id: TodoId) -> RepoResult<bool>;

    /// Releases the underlying storage handle.
    fn close(self) -> RepoResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// SQLite-backed todo repository owning its connection.
pub struct SqliteTodoRepository {
    conn: Connection,
}

impl SqliteTodoRepository {
    /// Wraps a connection after checking it carries the current schema.
    ///
    /// Connections must come from `open_db`/`open_db_in_memory`; a raw
    /// connection is rejected rather than silently migrated here.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow of the underlying connection for inspection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl TodoRepository for SqliteTodoRepository {
    fn create_todo(&self, content: &str) -> RepoResult<Todo> {
        let content = normalize_content(content)?;
        let created_date = Utc::now().trunc_subsecs(3);

        self.conn.execute(
            "INSERT INTO todos (content, createdDate, status) VALUES (?1, ?2, ?3);",
            params![
                content.as_str(),
                format_created_date(created_date),
                TodoStatus::Pending.as_str(),
            ],
        )?;

        Ok(Todo {
            id: self.conn.last_insert_rowid(),
            content,
            created_date,
            status: TodoStatus::Pending,
        })
    }

    fn get_todo(&self, id: TodoId, include_deleted: bool) -> RepoResult<Option<Todo>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TODO_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR status != 'deleted');"
        ))?;

        let row = stmt
            .query_row(params![id, i64::from(include_deleted)], |row| {
                Ok(parse_todo_row(row))
            })
            .optional()?;

        row.transpose()
    }

    fn list_todos(&self, query: &TodoListQuery) -> RepoResult<Vec<Todo>> {
        let mut sql = format!("{TODO_SELECT_SQL} WHERE 1 = 1");
        if !query.include_deleted {
            sql.push_str(" AND status != 'deleted'");
        }
        sql.push_str(" ORDER BY createdDate ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        Ok(todos)
    }

    fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> RepoResult<bool> {
        if patch.is_empty() {
            return Ok(false);
        }

        let mut assignments = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(content) = patch.content.as_deref() {
            assignments.push("content = ?");
            bind_values.push(Value::Text(normalize_content(content)?));
        }
        if let Some(status) = patch.status {
            assignments.push("status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        bind_values.push(Value::Integer(id));

        let sql = format!("UPDATE todos SET {} WHERE id = ?;", assignments.join(", "));
        // SQLite counts matched rows, so rewriting identical values still
        // reports the row as changed.
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;

        Ok(changed > 0)
    }

    fn soft_delete_todo(&self, id: TodoId) -> RepoResult<bool> {
        self.update_todo(id, &TodoPatch::status(TodoStatus::Deleted))
    }

    /// Closes the connection synchronously.
    fn close(self) -> RepoResult<()> {
        self.conn.close().map_err(|(_, err)| RepoError::from(err))
    }
}

fn ensure_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('todos');")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable("todos"));
    }

    for &column in REQUIRED_COLUMNS {
        if !columns.iter().any(|name| name.as_str() == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "todos",
                column,
            });
        }
    }

    Ok(())
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let id: TodoId = row.get("id")?;

    let created_text: String = row.get("createdDate")?;
    let created_date = parse_created_date(&created_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid createdDate `{created_text}` for todo {id}"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = TodoStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` for todo {id}"))
    })?;

    Ok(Todo {
        id,
        content: row.get("content")?,
        created_date,
        status,
    })
}
