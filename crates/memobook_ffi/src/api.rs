//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the command surface to Dart via FRB through one opaque handle.
//! - Flatten core types into plain DTOs with string labels.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Errors cross as UTF-8 messages; a poisoned or shut-down handle reports
//!   an error instead of aborting.
//! - Window effects are handed out in issue order and each exactly once.

use memobook_core::model::todo::format_created_date;
use memobook_core::window::{
    PanelBounds, Position, QueuedHost, WindowCommand, WindowSpec, WorkArea,
};
use memobook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, load_config,
    load_config_from_env, CommandResult, CommandSurface, SqliteTodoRepository, Todo, TodoPatch,
    TodoStatus, UnsupportedAutoLaunch,
};
use std::sync::{Mutex, MutexGuard};

type Surface = CommandSurface<SqliteTodoRepository, QueuedHost>;

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Todo record as shown by the list panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: i64,
    pub content: String,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub created_date: String,
    /// `pending|completed|deleted`.
    pub status: String,
}

impl From<Todo> for TodoItem {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            content: todo.content,
            created_date: format_created_date(todo.created_date),
            status: todo.status.as_str().to_string(),
        }
    }
}

/// Generic action response envelope for todo commands.
///
/// An unknown id is not a failure: it reports `ok = true, found = false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoActionResponse {
    /// Whether the operation ran without a store error.
    pub ok: bool,
    /// Whether the addressed todo exists.
    pub found: bool,
    /// Affected todo, when the command produces one.
    pub item: Option<TodoItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TodoActionResponse {
    fn created(todo: Todo) -> Self {
        Self {
            ok: true,
            found: true,
            message: format!("Created todo {}.", todo.id),
            item: Some(todo.into()),
        }
    }

    fn applied(id: i64, found: bool, verb: &str) -> Self {
        let message = if found {
            format!("{verb} todo {id}.")
        } else {
            format!("No todo {id}.")
        };
        Self {
            ok: true,
            found,
            item: None,
            message,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            found: false,
            item: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelBoundsDto {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl From<PanelBounds> for PanelBoundsDto {
    fn from(bounds: PanelBounds) -> Self {
        Self {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        }
    }
}

/// Window creation flags for a `create` effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpecDto {
    /// `panel|input`.
    pub role: String,
    pub frameless: bool,
    pub always_on_top: bool,
    pub skip_taskbar: bool,
    pub resizable: bool,
    pub transparent: bool,
}

impl From<WindowSpec> for WindowSpecDto {
    fn from(spec: WindowSpec) -> Self {
        Self {
            role: spec.role.as_str().to_string(),
            frameless: spec.frameless,
            always_on_top: spec.always_on_top,
            skip_taskbar: spec.skip_taskbar,
            resizable: spec.resizable,
            transparent: spec.transparent,
        }
    }
}

/// One window-system effect for the Dart side to apply.
///
/// `kind` is one of `create|set_bounds|show|focus|destroy|start_interval|
/// cancel_interval|capture_pointer|release_pointer`; only the fields that
/// kind uses are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEffect {
    pub kind: String,
    pub window: Option<u64>,
    pub timer: Option<u64>,
    pub bounds: Option<PanelBoundsDto>,
    pub spec: Option<WindowSpecDto>,
    pub interval_ms: Option<u64>,
}

impl WindowEffect {
    fn on_window(kind: &str, window: u64) -> Self {
        Self {
            kind: kind.to_string(),
            window: Some(window),
            timer: None,
            bounds: None,
            spec: None,
            interval_ms: None,
        }
    }
}

impl From<WindowCommand> for WindowEffect {
    fn from(command: WindowCommand) -> Self {
        match command {
            WindowCommand::Create { window, spec } => Self {
                bounds: Some(spec.bounds.into()),
                spec: Some(spec.into()),
                ..Self::on_window("create", window)
            },
            WindowCommand::SetBounds { window, bounds } => Self {
                bounds: Some(bounds.into()),
                ..Self::on_window("set_bounds", window)
            },
            WindowCommand::Show { window } => Self::on_window("show", window),
            WindowCommand::Focus { window } => Self::on_window("focus", window),
            WindowCommand::Destroy { window } => Self::on_window("destroy", window),
            WindowCommand::StartInterval {
                window,
                timer,
                every,
            } => Self {
                timer: Some(timer),
                interval_ms: Some(u64::try_from(every.as_millis()).unwrap_or(u64::MAX)),
                ..Self::on_window("start_interval", window)
            },
            WindowCommand::CancelInterval { timer } => Self {
                kind: "cancel_interval".to_string(),
                window: None,
                timer: Some(timer),
                bounds: None,
                spec: None,
                interval_ms: None,
            },
            WindowCommand::CapturePointer { window } => Self::on_window("capture_pointer", window),
            WindowCommand::ReleasePointer { window } => Self::on_window("release_pointer", window),
        }
    }
}

/// Final teardown of the app handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownResponse {
    /// Window effects that release both surfaces.
    pub effects: Vec<WindowEffect>,
    /// Store close failure, if any.
    pub error: Option<String>,
}

/// Process-wide application handle owned by the Dart side.
///
/// Every call locks the handle, runs one command and returns; effects queue
/// up until `take_window_effects`.
#[flutter_rust_bridge::frb(opaque)]
pub struct MemoBookApp {
    surface: Mutex<Option<Surface>>,
}

/// Opens the todo store and wires both window controllers.
///
/// `config_path` overrides the `MEMOBOOK_CONFIG` lookup; the work area is
/// the primary display's usable size in logical pixels.
///
/// # FFI contract
/// - Sync call; opens (and migrates) the database file.
/// - Never panics; returns error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn app_open(
    config_path: Option<String>,
    work_area_width: i32,
    work_area_height: i32,
) -> Result<MemoBookApp, String> {
    let config = match config_path.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => load_config(path),
        _ => load_config_from_env(),
    }
    .map_err(|err| err.to_string())?;

    let host = QueuedHost::new(WorkArea::new(work_area_width, work_area_height));
    let surface = CommandSurface::open(&config, host, Box::new(UnsupportedAutoLaunch))
        .map_err(|err| format!("app_open failed: {err}"))?;
    log::info!("event=app_open module=ffi status=ok");

    Ok(MemoBookApp {
        surface: Mutex::new(Some(surface)),
    })
}

impl MemoBookApp {
    // --- todos ---

    #[flutter_rust_bridge::frb(sync)]
    pub fn add_todo(&self, content: String) -> TodoActionResponse {
        match self.run(|surface| surface.add_todo(&content)) {
            Ok(todo) => TodoActionResponse::created(todo),
            Err(message) => TodoActionResponse::failure(message),
        }
    }

    /// Non-deleted todos, oldest first.
    #[flutter_rust_bridge::frb(sync)]
    pub fn get_todos(&self) -> Result<Vec<TodoItem>, String> {
        let todos = self.run(|surface| surface.get_todos())?;
        Ok(todos.into_iter().map(TodoItem::from).collect())
    }

    /// Applies the given fields; `status` is `pending|completed|deleted`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn update_todo(
        &self,
        id: i64,
        content: Option<String>,
        status: Option<String>,
    ) -> TodoActionResponse {
        let status = match status.as_deref().map(str::trim) {
            None => None,
            Some(label) => match TodoStatus::parse(label) {
                Some(status) => Some(status),
                None => {
                    return TodoActionResponse::failure(format!("unknown status `{label}`"));
                }
            },
        };
        let patch = TodoPatch { content, status };

        match self.run(|surface| surface.update_todo(id, &patch)) {
            Ok(found) => TodoActionResponse::applied(id, found, "Updated"),
            Err(message) => TodoActionResponse::failure(message),
        }
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn delete_todo(&self, id: i64) -> TodoActionResponse {
        match self.run(|surface| surface.delete_todo(id)) {
            Ok(found) => TodoActionResponse::applied(id, found, "Deleted"),
            Err(message) => TodoActionResponse::failure(message),
        }
    }

    // --- panel ---

    #[flutter_rust_bridge::frb(sync)]
    pub fn toggle_panel(&self) -> Result<(), String> {
        self.run(|surface| surface.toggle_panel())
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn show_panel(&self) -> Result<(), String> {
        self.run(|surface| surface.show_panel())
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn hide_panel(&self) -> Result<(), String> {
        self.apply(|surface| surface.hide_panel())
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn move_panel(&self, dx: i32, dy: i32) -> Result<(), String> {
        self.apply(|surface| surface.move_panel(dx, dy))
    }

    /// `None` while no panel exists.
    #[flutter_rust_bridge::frb(sync)]
    pub fn get_panel_bounds(&self) -> Result<Option<PanelBoundsDto>, String> {
        self.with_surface(|surface| Ok(surface.get_panel_bounds().map(PanelBoundsDto::from)))
    }

    /// `closed|visible|hidden_at_edge|dragging`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn panel_state(&self) -> Result<String, String> {
        self.with_surface(|surface| Ok(surface.panel_state().as_str().to_string()))
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn panel_blur(&self) -> Result<(), String> {
        self.apply(|surface| surface.panel_blur())
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn panel_pointer_enter(&self) -> Result<(), String> {
        self.run(|surface| surface.panel_pointer_enter())
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn panel_drag_start(&self, x: i32, y: i32) -> Result<(), String> {
        self.apply(|surface| surface.panel_drag_start(Position::new(x, y)))
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn panel_drag_move(&self, x: i32, y: i32) -> Result<(), String> {
        self.apply(|surface| surface.panel_drag_move(Position::new(x, y)))
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn panel_drag_end(&self, x: i32, y: i32) -> Result<(), String> {
        self.apply(|surface| surface.panel_drag_end(Position::new(x, y)))
    }

    /// Closes the panel window; the saved position is kept for the next show.
    #[flutter_rust_bridge::frb(sync)]
    pub fn destroy_panel(&self) -> Result<(), String> {
        self.apply(|surface| surface.destroy_panel())
    }

    /// Forwards an interval tick; returns whether the panel snapped.
    #[flutter_rust_bridge::frb(sync)]
    pub fn panel_edge_tick(&self, timer: u64) -> Result<bool, String> {
        self.with_surface(|surface| Ok(surface.panel_edge_tick(timer)))
    }

    // --- input ---

    #[flutter_rust_bridge::frb(sync)]
    pub fn show_input(&self) -> Result<(), String> {
        self.run(|surface| surface.show_input())
    }

    /// Stores the typed text and closes the input surface on success.
    #[flutter_rust_bridge::frb(sync)]
    pub fn submit_input(&self, content: String) -> TodoActionResponse {
        match self.run(|surface| surface.submit_input(&content)) {
            Ok(todo) => TodoActionResponse::created(todo),
            Err(message) => TodoActionResponse::failure(message),
        }
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn dismiss_input(&self) -> Result<(), String> {
        self.apply(|surface| surface.dismiss_input())
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn input_blur(&self) -> Result<(), String> {
        self.apply(|surface| surface.input_blur())
    }

    // --- lifecycle ---

    #[flutter_rust_bridge::frb(sync)]
    pub fn window_closed(&self, window: u64) -> Result<(), String> {
        self.apply(|surface| surface.window_closed(window))
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn close_requested(&self, window: u64) -> Result<(), String> {
        self.apply(|surface| surface.close_requested(window))
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn set_work_area(&self, width: i32, height: i32) -> Result<(), String> {
        self.apply(|surface| {
            surface
                .host_mut()
                .set_work_area(WorkArea::new(width, height))
        })
    }

    /// Drains queued window effects in issue order.
    #[flutter_rust_bridge::frb(sync)]
    pub fn take_window_effects(&self) -> Result<Vec<WindowEffect>, String> {
        self.with_surface(|surface| Ok(drain_effects(surface.host_mut())))
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn begin_quit(&self) -> Result<(), String> {
        self.apply(|surface| surface.begin_quit())
    }

    /// Tears everything down and returns the final effects.
    ///
    /// Effects are delivered even when closing the store fails. Later calls
    /// on this handle report an error.
    #[flutter_rust_bridge::frb(sync)]
    pub fn shutdown(&self) -> Result<ShutdownResponse, String> {
        let surface = self
            .lock()?
            .take()
            .ok_or_else(|| "app already shut down".to_string())?;
        let (mut host, closed) = surface.shutdown();
        Ok(ShutdownResponse {
            effects: drain_effects(&mut host),
            error: closed.err().map(|err| err.to_string()),
        })
    }

    // --- OS integration ---

    #[flutter_rust_bridge::frb(sync)]
    pub fn toggle_auto_launch(&self) -> Result<bool, String> {
        self.with_surface(|surface| Ok(surface.toggle_auto_launch()))
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn get_auto_launch_status(&self) -> Result<bool, String> {
        self.with_surface(|surface| Ok(surface.get_auto_launch_status()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Surface>>, String> {
        self.surface.lock().map_err(|_| {
            log::error!("event=ffi_lock module=ffi status=error reason=poisoned");
            "app state is poisoned".to_string()
        })
    }

    fn run<T>(&self, f: impl FnOnce(&mut Surface) -> CommandResult<T>) -> Result<T, String> {
        self.with_surface(|surface| f(surface).map_err(|err| err.to_string()))
    }

    fn apply(&self, f: impl FnOnce(&mut Surface)) -> Result<(), String> {
        self.with_surface(|surface| {
            f(surface);
            Ok(())
        })
    }

    fn with_surface<T>(
        &self,
        f: impl FnOnce(&mut Surface) -> Result<T, String>,
    ) -> Result<T, String> {
        let mut guard = self.lock()?;
        let surface = guard
            .as_mut()
            .ok_or_else(|| "app already shut down".to_string())?;
        f(surface)
    }
}

fn drain_effects(host: &mut QueuedHost) -> Vec<WindowEffect> {
    host.drain().into_iter().map(WindowEffect::from).collect()
}

#[cfg(test)]
mod tests {
    use super::{app_open, core_version, init_logging, MemoBookApp};

    fn open_app(dir: &tempfile::TempDir) -> MemoBookApp {
        let config_path = dir.path().join("memobook.toml");
        let db_path = dir.path().join("todos.db");
        std::fs::write(
            &config_path,
            format!("db_path = {:?}\n", db_path.to_str().unwrap()),
        )
        .unwrap();
        app_open(Some(config_path.to_str().unwrap().to_string()), 1920, 1080)
            .expect("app should open")
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn todo_commands_round_through_the_handle() {
        let dir = tempfile::tempdir().unwrap();
        let app = open_app(&dir);

        let created = app.add_todo("  buy milk ".to_string());
        assert!(created.ok, "{}", created.message);
        let item = created.item.expect("created todo should be returned");
        assert_eq!(item.content, "buy milk");
        assert_eq!(item.status, "pending");
        assert!(item.created_date.ends_with('Z'));

        let done = app.update_todo(item.id, None, Some("completed".to_string()));
        assert!(done.ok && done.found, "{}", done.message);
        assert_eq!(app.get_todos().unwrap()[0].status, "completed");

        let deleted = app.delete_todo(item.id);
        assert!(deleted.ok && deleted.found, "{}", deleted.message);
        assert!(app.get_todos().unwrap().is_empty());

        let missing = app.delete_todo(9_999);
        assert!(missing.ok, "{}", missing.message);
        assert!(!missing.found);
        let missing = app.update_todo(9_999, Some("x".to_string()), None);
        assert!(missing.ok, "{}", missing.message);
        assert!(!missing.found);
    }

    #[test]
    fn invalid_input_is_reported_not_thrown() {
        let dir = tempfile::tempdir().unwrap();
        let app = open_app(&dir);

        let blank = app.add_todo("   ".to_string());
        assert!(!blank.ok);
        assert!(blank.item.is_none());
        let bad_status = app.update_todo(1, None, Some("archived".to_string()));
        assert!(!bad_status.ok);
        assert!(bad_status.message.contains("archived"));
    }

    #[test]
    fn panel_effects_are_drained_once_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let app = open_app(&dir);

        app.toggle_panel().unwrap();
        let effects = app.take_window_effects().unwrap();
        let kinds: Vec<&str> = effects.iter().map(|effect| effect.kind.as_str()).collect();
        assert_eq!(kinds, ["create", "show", "focus", "start_interval"]);
        let spec = effects[0].spec.as_ref().unwrap();
        assert_eq!(spec.role, "panel");
        assert_eq!(effects[3].interval_ms, Some(500));
        assert!(app.take_window_effects().unwrap().is_empty());

        assert_eq!(app.panel_state().unwrap(), "visible");
        let bounds = app.get_panel_bounds().unwrap().unwrap();
        assert_eq!((bounds.width, bounds.height), (300, 500));
    }

    #[test]
    fn submit_input_closes_capture_window() {
        let dir = tempfile::tempdir().unwrap();
        let app = open_app(&dir);

        app.show_input().unwrap();
        let created = app.submit_input("call mom".to_string());
        assert!(created.ok, "{}", created.message);

        let kinds: Vec<String> = app
            .take_window_effects()
            .unwrap()
            .into_iter()
            .map(|effect| effect.kind)
            .collect();
        assert_eq!(kinds.first().map(String::as_str), Some("create"));
        assert_eq!(kinds.last().map(String::as_str), Some("destroy"));
    }

    #[test]
    fn destroyed_panel_is_closed_until_shown_again() {
        let dir = tempfile::tempdir().unwrap();
        let app = open_app(&dir);
        app.show_panel().unwrap();
        app.take_window_effects().unwrap();

        app.destroy_panel().unwrap();
        let kinds: Vec<String> = app
            .take_window_effects()
            .unwrap()
            .into_iter()
            .map(|effect| effect.kind)
            .collect();
        assert_eq!(kinds, ["cancel_interval", "destroy"]);
        assert_eq!(app.panel_state().unwrap(), "closed");
        assert_eq!(app.get_panel_bounds().unwrap(), None);
    }

    #[test]
    fn shutdown_invalidates_the_handle() {
        let dir = tempfile::tempdir().unwrap();
        let app = open_app(&dir);
        app.show_panel().unwrap();
        app.take_window_effects().unwrap();

        let last = app.shutdown().unwrap();
        assert_eq!(last.error, None);
        let kinds: Vec<&str> = last
            .effects
            .iter()
            .map(|effect| effect.kind.as_str())
            .collect();
        assert_eq!(kinds, ["cancel_interval", "destroy"]);

        assert!(app.get_todos().is_err());
        assert!(app.shutdown().is_err());
    }
}
