//! Core of MemoBook, a quick-capture todo utility.
//! This crate is the single source of truth for store and window invariants.

pub mod command;
pub mod config;
pub mod db;
pub mod integration;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod window;

pub use command::{CommandError, CommandResult, CommandSurface};
pub use config::{load_config, load_config_from_env, AppConfig, ConfigError};
pub use integration::{AutoLaunch, IntegrationError, UnsupportedAutoLaunch};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status,
};
pub use model::todo::{Todo, TodoId, TodoPatch, TodoStatus, TodoValidationError};
pub use repo::todo_repo::{
    RepoError, RepoResult, SqliteTodoRepository, TodoListQuery, TodoRepository,
};
pub use service::todo_store::TodoStore;
pub use window::{
    InputPanelController, PanelBounds, PanelState, PanelWindowController, Position, QueuedHost,
    WindowCommand, WindowHost, WorkArea,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
