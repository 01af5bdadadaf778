//! Command surface invoked by the presentation layer.
//!
//! # Responsibility
//! - Dispatch presentation requests to the todo store and both window
//!   controllers.
//! - Degrade OS-integration failures to logged no-ops.
//!
//! # Invariants
//! - Requests are handled one at a time on the owning event loop.
//! - Toggles act on controller state, so duplicates cannot diverge flags.
//! - `shutdown` releases both surfaces and the store before returning.

use crate::config::AppConfig;
use crate::db::open_db;
use crate::integration::AutoLaunch;
use crate::model::todo::{Todo, TodoId, TodoPatch};
use crate::repo::todo_repo::{RepoError, SqliteTodoRepository, TodoRepository};
use crate::service::todo_store::TodoStore;
use crate::window::{
    InputPanelController, InputSettings, PanelBounds, PanelSettings, PanelState,
    PanelWindowController, Position, TimerId, WindowError, WindowHost, WindowId,
};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug)]
pub enum CommandError {
    Store(RepoError),
    Window(WindowError),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Window(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Window(err) => Some(err),
        }
    }
}

impl From<RepoError> for CommandError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

impl From<WindowError> for CommandError {
    fn from(value: WindowError) -> Self {
        Self::Window(value)
    }
}

/// Everything the presentation layer can ask of the core.
pub struct CommandSurface<R: TodoRepository, H: WindowHost> {
    store: TodoStore<R>,
    host: H,
    panel: PanelWindowController,
    input: InputPanelController,
    auto_launch: Box<dyn AutoLaunch + Send>,
    quitting: bool,
}

impl<H: WindowHost> CommandSurface<SqliteTodoRepository, H> {
    /// Opens the configured database and wires both controllers.
    pub fn open(
        config: &AppConfig,
        host: H,
        auto_launch: Box<dyn AutoLaunch + Send>,
    ) -> CommandResult<Self> {
        let conn = open_db(config.resolved_db_path()).map_err(RepoError::from)?;
        let repo = SqliteTodoRepository::try_new(conn)?;
        Ok(Self::new(
            TodoStore::new(repo),
            host,
            PanelSettings::from(&config.panel),
            InputSettings::from(&config.input),
            auto_launch,
        ))
    }
}

impl<R: TodoRepository, H: WindowHost> CommandSurface<R, H> {
    pub fn new(
        store: TodoStore<R>,
        host: H,
        panel: PanelSettings,
        input: InputSettings,
        auto_launch: Box<dyn AutoLaunch + Send>,
    ) -> Self {
        Self {
            store,
            host,
            panel: PanelWindowController::new(panel),
            input: InputPanelController::new(input),
            auto_launch,
            quitting: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn panel(&self) -> &PanelWindowController {
        &self.panel
    }

    pub fn input(&self) -> &InputPanelController {
        &self.input
    }

    // --- todos ---

    pub fn add_todo(&self, content: &str) -> CommandResult<Todo> {
        Ok(self.store.create(content)?)
    }

    pub fn get_todos(&self) -> CommandResult<Vec<Todo>> {
        Ok(self.store.list()?)
    }

    pub fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> CommandResult<bool> {
        Ok(self.store.update(id, patch)?)
    }

    pub fn delete_todo(&self, id: TodoId) -> CommandResult<bool> {
        Ok(self.store.delete(id)?)
    }

    // --- panel ---

    pub fn toggle_panel(&mut self) -> CommandResult<()> {
        Ok(self.panel.toggle(&mut self.host)?)
    }

    pub fn show_panel(&mut self) -> CommandResult<()> {
        Ok(self.panel.show(&mut self.host)?)
    }

    pub fn hide_panel(&mut self) {
        self.panel.hide(&mut self.host);
    }

    /// Relative move; ignored when no panel exists.
    pub fn move_panel(&mut self, dx: i32, dy: i32) {
        self.panel.move_by(&mut self.host, dx, dy);
    }

    pub fn get_panel_bounds(&self) -> Option<PanelBounds> {
        self.panel.bounds()
    }

    pub fn panel_state(&self) -> PanelState {
        self.panel.state()
    }

    pub fn panel_blur(&mut self) {
        self.panel.blur(&mut self.host);
    }

    pub fn panel_pointer_enter(&mut self) -> CommandResult<()> {
        Ok(self.panel.pointer_enter(&mut self.host)?)
    }

    pub fn panel_drag_start(&mut self, pointer: Position) {
        self.panel.drag_start(&mut self.host, pointer);
    }

    pub fn panel_drag_move(&mut self, pointer: Position) {
        self.panel.drag_move(&mut self.host, pointer);
    }

    pub fn panel_drag_end(&mut self, pointer: Position) {
        self.panel.drag_end(&mut self.host, pointer);
    }

    /// Delivers an edge-poll tick; returns whether the panel snapped.
    pub fn panel_edge_tick(&mut self, timer: TimerId) -> bool {
        self.panel.edge_check(&mut self.host, timer)
    }

    /// Releases the panel instance; the next show opens a fresh window at
    /// the saved position.
    pub fn destroy_panel(&mut self) {
        self.panel.destroy(&mut self.host);
    }

    // --- input ---

    pub fn show_input(&mut self) -> CommandResult<()> {
        Ok(self.input.show(&mut self.host)?)
    }

    /// Stores the captured text, then closes the capture surface.
    ///
    /// A rejected submission leaves the surface open for correction.
    pub fn submit_input(&mut self, content: &str) -> CommandResult<Todo> {
        let todo = self.store.create(content)?;
        self.input.dismiss(&mut self.host);
        Ok(todo)
    }

    pub fn dismiss_input(&mut self) {
        self.input.dismiss(&mut self.host);
    }

    pub fn input_blur(&mut self) {
        self.input.blur(&mut self.host);
    }

    // --- lifecycle ---

    /// The host closed `window` on its own.
    pub fn window_closed(&mut self, window: WindowId) {
        if !self.panel.window_closed(&mut self.host, window) {
            self.input.window_closed(&mut self.host, window);
        }
    }

    /// The user asked to close `window`.
    ///
    /// The panel re-hides unless the process is quitting; the input surface
    /// always closes.
    pub fn close_requested(&mut self, window: WindowId) {
        if self.panel.window_id() == Some(window) {
            if self.quitting {
                self.panel.destroy(&mut self.host);
            } else {
                self.panel.hide(&mut self.host);
            }
        } else if self.input.window_id() == Some(window) {
            self.input.dismiss(&mut self.host);
        }
    }

    /// Marks the process as quitting; must precede teardown.
    pub fn begin_quit(&mut self) {
        if !self.quitting {
            self.quitting = true;
            info!("event=app_quit module=command status=start");
        }
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// Tears down both surfaces, then closes the store.
    ///
    /// The host is handed back even when closing the store fails, so its
    /// final teardown effects can still be applied.
    pub fn shutdown(mut self) -> (H, CommandResult<()>) {
        self.begin_quit();
        self.input.dismiss(&mut self.host);
        self.panel.destroy(&mut self.host);
        let closed = self.store.close().map_err(CommandError::from);
        match &closed {
            Ok(()) => info!("event=app_quit module=command status=ok"),
            Err(err) => error!("event=app_quit module=command status=error error={err}"),
        }
        (self.host, closed)
    }

    // --- OS integration pass-throughs ---

    /// Flips launch-at-login; returns the resulting state.
    pub fn toggle_auto_launch(&mut self) -> bool {
        let enabled = match self.auto_launch.is_enabled() {
            Ok(enabled) => enabled,
            Err(err) => {
                warn!("event=auto_launch_toggle module=integration status=error error={err}");
                return false;
            }
        };

        match self.auto_launch.set_enabled(!enabled) {
            Ok(()) => {
                info!(
                    "event=auto_launch_toggle module=integration status=ok enabled={}",
                    !enabled
                );
                !enabled
            }
            Err(err) => {
                warn!("event=auto_launch_toggle module=integration status=error error={err}");
                enabled
            }
        }
    }

    pub fn get_auto_launch_status(&self) -> bool {
        self.auto_launch.is_enabled().unwrap_or_else(|err| {
            warn!("event=auto_launch_status module=integration status=error error={err}");
            false
        })
    }
}
