//! Command-line front end for the todo store.
//!
//! # Responsibility
//! - Manage todos from a terminal against the same database the panel uses.
//! - Keep output line-oriented so it can be piped.

use clap::{Parser, Subcommand};
use memobook_core::db::open_db;
use memobook_core::{
    init_logging_from_config, load_config, load_config_from_env, AppConfig,
    SqliteTodoRepository, Todo, TodoId, TodoPatch, TodoStatus, TodoStore,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "memobook")]
#[command(version)]
#[command(about = "Quick-capture todo list")]
struct Cli {
    /// Config file (defaults to $MEMOBOOK_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Add a todo
    Add {
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// List todos, oldest first
    List {
        /// Include deleted todos
        #[arg(long)]
        all: bool,
    },
    /// Replace a todo's text
    Edit {
        id: TodoId,
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// Mark a todo completed
    Done { id: TodoId },
    /// Mark a todo pending again
    Reopen { id: TodoId },
    /// Soft-delete a todo
    Delete { id: TodoId },
}

type Store = TodoStore<SqliteTodoRepository>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_cli_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    start_logging(&config);

    let store = match open_store(&config) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = run(&store, cli.command);
    if let Err(err) = store.close() {
        log::warn!("event=db_close module=cli status=error error={err}");
    }

    match outcome {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_cli_config(cli: &Cli) -> Result<AppConfig, String> {
    let mut config = match &cli.config {
        Some(path) => load_config(path),
        None => load_config_from_env(),
    }
    .map_err(|err| err.to_string())?;
    if let Some(db) = &cli.db {
        config.db_path = Some(db.clone());
    }
    Ok(config)
}

/// Logging is best effort for the CLI; a failure is reported, not fatal.
fn start_logging(config: &AppConfig) {
    if let Err(err) = init_logging_from_config(config) {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn open_store(config: &AppConfig) -> Result<Store, String> {
    let conn = open_db(config.resolved_db_path()).map_err(|err| err.to_string())?;
    let repo = SqliteTodoRepository::try_new(conn).map_err(|err| err.to_string())?;
    Ok(TodoStore::new(repo))
}

fn run(store: &Store, command: Command) -> Result<ExitCode, String> {
    match command {
        Command::Add { content } => {
            let todo = store.create(&content.join(" ")).map_err(|err| err.to_string())?;
            println!("{}", format_todo(&todo));
            Ok(ExitCode::SUCCESS)
        }
        Command::List { all } => {
            let todos = if all { store.list_all() } else { store.list() }
                .map_err(|err| err.to_string())?;
            for todo in &todos {
                println!("{}", format_todo(todo));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Edit { id, content } => {
            apply(store, id, &TodoPatch::content(content.join(" ")), "edited")
        }
        Command::Done { id } => {
            apply(store, id, &TodoPatch::status(TodoStatus::Completed), "completed")
        }
        Command::Reopen { id } => {
            apply(store, id, &TodoPatch::status(TodoStatus::Pending), "reopened")
        }
        Command::Delete { id } => {
            let found = store.delete(id).map_err(|err| err.to_string())?;
            Ok(report(id, found, "deleted"))
        }
    }
}

fn apply(store: &Store, id: TodoId, patch: &TodoPatch, verb: &str) -> Result<ExitCode, String> {
    let found = store.update(id, patch).map_err(|err| err.to_string())?;
    Ok(report(id, found, verb))
}

fn report(id: TodoId, found: bool, verb: &str) -> ExitCode {
    if found {
        println!("{verb} {id}");
        ExitCode::SUCCESS
    } else {
        eprintln!("warning: no todo with id {id}");
        ExitCode::from(1)
    }
}

fn format_todo(todo: &Todo) -> String {
    let mark = match todo.status {
        TodoStatus::Pending => " ",
        TodoStatus::Completed => "x",
        TodoStatus::Deleted => "-",
    };
    format!(
        "{:>4} [{mark}] {}  ({})",
        todo.id,
        todo.content,
        todo.created_date.format("%Y-%m-%d %H:%M")
    )
}
