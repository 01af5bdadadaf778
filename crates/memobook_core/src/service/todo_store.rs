//! Todo store use-case service.
//!
//! # Responsibility
//! - Expose the create/list/update/delete contract callers rely on.
//! - Emit metadata-only diagnostics for every store mutation.
//!
//! # Invariants
//! - The store is the validation authority for content.
//! - `list` is recomputed from storage on every call.
//! - Log lines never include todo content.

use crate::model::todo::{Todo, TodoId, TodoPatch};
use crate::repo::todo_repo::{RepoError, RepoResult, TodoListQuery, TodoRepository};
use log::{debug, info, warn};

/// Persisted todo CRUD with soft delete.
pub struct TodoStore<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a pending todo from raw user input.
    ///
    /// # Errors
    /// - `RepoError::Validation` when `content` is blank after trimming.
    pub fn create(&self, content: &str) -> RepoResult<Todo> {
        match self.repo.create_todo(content) {
            Ok(todo) => {
                info!(
                    "event=todo_create module=store status=ok id={} content_len={}",
                    todo.id,
                    todo.content.chars().count()
                );
                Ok(todo)
            }
            Err(err) => {
                let code = match err {
                    RepoError::Validation(_) => "validation",
                    _ => "db",
                };
                warn!("event=todo_create module=store status=error error_code={code} error={err}");
                Err(err)
            }
        }
    }

    /// Lists non-deleted todos, oldest first.
    pub fn list(&self) -> RepoResult<Vec<Todo>> {
        self.repo.list_todos(&TodoListQuery::default())
    }

    /// Lists every todo including soft-deleted ones.
    pub fn list_all(&self) -> RepoResult<Vec<Todo>> {
        self.repo.list_todos(&TodoListQuery {
            include_deleted: true,
        })
    }

    /// Gets one todo; deleted rows are only visible with `include_deleted`.
    pub fn get(&self, id: TodoId, include_deleted: bool) -> RepoResult<Option<Todo>> {
        self.repo.get_todo(id, include_deleted)
    }

    /// Applies `patch` to todo `id`.
    ///
    /// Returns `Ok(false)` for an empty patch or an unknown id.
    pub fn update(&self, id: TodoId, patch: &TodoPatch) -> RepoResult<bool> {
        let found = self.repo.update_todo(id, patch)?;
        log_update("todo_update", id, patch, found);
        Ok(found)
    }

    /// Soft-deletes todo `id`; same truth value as `update`.
    pub fn delete(&self, id: TodoId) -> RepoResult<bool> {
        let found = self.repo.soft_delete_todo(id)?;
        log_update("todo_delete", id, &TodoPatch::default(), found);
        Ok(found)
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Closes the backing repository; the store is unusable afterwards.
    pub fn close(self) -> RepoResult<()> {
        self.repo.close()?;
        info!("event=store_close module=store status=ok");
        Ok(())
    }
}

fn log_update(event: &str, id: TodoId, patch: &TodoPatch, found: bool) {
    if found {
        debug!(
            "event={event} module=store status=ok id={id} content={} status_field={}",
            patch.content.is_some(),
            patch.status.map_or("-", |status| status.as_str())
        );
    } else {
        warn!("event={event} module=store status=skip id={id} reason=not_found_or_empty");
    }
}
