//! Sliding list panel controller.
//!
//! # Responsibility
//! - Own the single panel instance and its `PanelState`.
//! - Translate toggle/show/hide/blur/drag/poll events into host effects.
//!
//! # Invariants
//! - `Closed` holds exactly when no instance exists.
//! - The edge poll is armed exactly while the panel is `Visible`, and each
//!   arm is cancelled exactly once.
//! - Pointer capture is held exactly while `Dragging`.
//! - The saved position outlives the instance for the process lifetime.

use super::geometry::{PanelBounds, Position};
use super::host::{TimerId, WindowHost, WindowId, WindowResult, WindowSpec};
use crate::config::PanelConfig;
use log::{debug, info};
use std::time::{Duration, Instant};

/// Observable panel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelState {
    Closed,
    Visible,
    HiddenAtEdge,
    Dragging,
}

impl PanelState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Visible => "visible",
            Self::HiddenAtEdge => "hidden_at_edge",
            Self::Dragging => "dragging",
        }
    }
}

/// Geometry and timing policy for the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSettings {
    pub width: i32,
    pub height: i32,
    /// Where a panel opens when no position was saved yet.
    pub default_position: Position,
    /// Pixels left on screen while hidden at the top edge.
    pub peek_margin: i32,
    /// A top coordinate at or above this snaps to the edge.
    pub edge_tolerance: i32,
    /// A saved top coordinate below `-restore_tolerance` restores at `y = 0`.
    pub restore_tolerance: i32,
    pub edge_poll_interval: Duration,
    /// Window after a show during which a toggle focuses instead of hiding.
    pub toggle_settle: Duration,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self::from(&PanelConfig::default())
    }
}

impl From<&PanelConfig> for PanelSettings {
    fn from(config: &PanelConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            default_position: Position::new(config.default_x, config.default_y),
            peek_margin: config.peek_margin,
            edge_tolerance: config.edge_tolerance,
            restore_tolerance: config.restore_tolerance,
            edge_poll_interval: Duration::from_millis(config.edge_poll_ms),
            toggle_settle: Duration::from_millis(config.toggle_settle_ms),
        }
    }
}

impl PanelSettings {
    /// Applies the restore clamp to a saved position.
    fn restore_position(&self, saved: Position) -> Position {
        if saved.y < -self.restore_tolerance {
            Position::new(saved.x, 0)
        } else {
            saved
        }
    }

    /// Bounds that leave only the peek margin visible at the top edge.
    fn stowed_bounds(&self, bounds: PanelBounds) -> PanelBounds {
        PanelBounds {
            y: self.peek_margin - bounds.height,
            ..bounds
        }
    }

    fn is_at_edge(&self, bounds: PanelBounds) -> bool {
        bounds.y <= self.edge_tolerance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DragSession {
    pointer_origin: Position,
    window_origin: Position,
}

impl DragSession {
    fn target(&self, pointer: Position) -> Position {
        let (dx, dy) = pointer.delta_from(self.pointer_origin);
        self.window_origin.offset(dx, dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Visible { settle_until: Option<Instant> },
    HiddenAtEdge,
    Dragging(DragSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EdgeWatch {
    timer: TimerId,
    last_seen: PanelBounds,
}

#[derive(Debug)]
struct PanelInstance {
    window: WindowId,
    bounds: PanelBounds,
    phase: Phase,
    edge_watch: Option<EdgeWatch>,
}

impl PanelInstance {
    fn state(&self) -> PanelState {
        match self.phase {
            Phase::Visible { .. } => PanelState::Visible,
            Phase::HiddenAtEdge => PanelState::HiddenAtEdge,
            Phase::Dragging(_) => PanelState::Dragging,
        }
    }

    fn apply_bounds(&mut self, host: &mut dyn WindowHost, bounds: PanelBounds) {
        self.bounds = bounds;
        host.set_bounds(self.window, bounds);
    }

    fn arm_edge_watch(&mut self, host: &mut dyn WindowHost, every: Duration) {
        if self.edge_watch.is_none() {
            let timer = host.start_interval(self.window, every);
            self.edge_watch = Some(EdgeWatch {
                timer,
                last_seen: self.bounds,
            });
        }
    }

    fn disarm_edge_watch(&mut self, host: &mut dyn WindowHost) {
        if let Some(watch) = self.edge_watch.take() {
            host.cancel_interval(watch.timer);
        }
    }

    /// Records the current position and parks the panel at the edge.
    fn stow(
        &mut self,
        host: &mut dyn WindowHost,
        settings: &PanelSettings,
        saved_position: &mut Option<Position>,
    ) {
        if let Phase::Dragging(_) = self.phase {
            host.release_pointer(self.window);
        }
        *saved_position = Some(self.bounds.position());
        self.disarm_edge_watch(host);
        let parked = settings.stowed_bounds(self.bounds);
        self.apply_bounds(host, parked);
        self.phase = Phase::HiddenAtEdge;
    }

    fn teardown(mut self, host: &mut dyn WindowHost, window_alive: bool) {
        self.disarm_edge_watch(host);
        if !window_alive {
            host.forget_window(self.window);
            return;
        }
        if let Phase::Dragging(_) = self.phase {
            host.release_pointer(self.window);
        }
        host.destroy_window(self.window);
    }
}

/// State machine for the sliding, auto-hiding list panel.
#[derive(Debug)]
pub struct PanelWindowController {
    settings: PanelSettings,
    instance: Option<PanelInstance>,
    saved_position: Option<Position>,
}

impl PanelWindowController {
    pub fn new(settings: PanelSettings) -> Self {
        Self {
            settings,
            instance: None,
            saved_position: None,
        }
    }

    pub fn state(&self) -> PanelState {
        self.instance
            .as_ref()
            .map_or(PanelState::Closed, PanelInstance::state)
    }

    /// Current bounds of the live instance, `None` when closed.
    pub fn bounds(&self) -> Option<PanelBounds> {
        self.instance.as_ref().map(|instance| instance.bounds)
    }

    pub fn saved_position(&self) -> Option<Position> {
        self.saved_position
    }

    pub fn window_id(&self) -> Option<WindowId> {
        self.instance.as_ref().map(|instance| instance.window)
    }

    /// Timer id of the armed edge poll, if any.
    pub fn edge_timer(&self) -> Option<TimerId> {
        self.instance
            .as_ref()
            .and_then(|instance| instance.edge_watch)
            .map(|watch| watch.timer)
    }

    /// Shows a closed or hidden panel, hides a settled visible one.
    ///
    /// A toggle that lands within the settle window of a show (e.g. a
    /// duplicated shortcut event) only focuses the panel.
    pub fn toggle(&mut self, host: &mut dyn WindowHost) -> WindowResult<()> {
        let now = host.now();
        let phase = self.instance.as_ref().map(|instance| instance.phase);
        match phase {
            None | Some(Phase::HiddenAtEdge) => self.show(host),
            Some(Phase::Visible { settle_until }) => {
                if settle_until.is_some_and(|until| now < until) {
                    self.focus_existing(host, "toggle_settling");
                } else {
                    self.hide(host);
                }
                Ok(())
            }
            Some(Phase::Dragging(_)) => {
                debug!("event=panel_toggle module=window status=skip reason=dragging");
                Ok(())
            }
        }
    }

    /// Opens the panel, reveals it from the edge, or focuses it.
    pub fn show(&mut self, host: &mut dyn WindowHost) -> WindowResult<()> {
        let settle_until = host.now() + self.settings.toggle_settle;
        let settings = self.settings;
        let restore_to = self.saved_position.map(|saved| settings.restore_position(saved));

        let Some(instance) = self.instance.as_mut() else {
            return self.open(host, settle_until);
        };

        let phase = instance.phase;
        match phase {
            Phase::Visible { .. } | Phase::Dragging(_) => {
                self.focus_existing(host, "already_visible");
            }
            Phase::HiddenAtEdge => {
                let target = restore_to.unwrap_or_else(|| instance.bounds.position());
                let restored = instance.bounds.moved_to(target);
                instance.apply_bounds(host, restored);
                host.show(instance.window);
                host.focus(instance.window);
                instance.phase = Phase::Visible {
                    settle_until: Some(settle_until),
                };
                instance.arm_edge_watch(host, settings.edge_poll_interval);
                info!(
                    "event=panel_show module=window status=ok from=hidden_at_edge x={} y={}",
                    restored.x, restored.y
                );
            }
        }
        Ok(())
    }

    /// Hides a visible (or dragging) panel at the top edge.
    ///
    /// No-op when closed or already hidden.
    pub fn hide(&mut self, host: &mut dyn WindowHost) {
        self.stow_if(host, "hide", |phase| !matches!(phase, Phase::HiddenAtEdge));
    }

    /// Focus left the panel; only a resting visible panel auto-hides.
    pub fn blur(&mut self, host: &mut dyn WindowHost) {
        self.stow_if(host, "blur", |phase| matches!(phase, Phase::Visible { .. }));
    }

    /// Pointer entered the peek margin of a hidden panel.
    pub fn pointer_enter(&mut self, host: &mut dyn WindowHost) -> WindowResult<()> {
        if self.state() == PanelState::HiddenAtEdge {
            return self.show(host);
        }
        Ok(())
    }

    pub fn drag_start(&mut self, host: &mut dyn WindowHost, pointer: Position) {
        let Some(instance) = self.instance.as_mut() else {
            return;
        };
        if !matches!(instance.phase, Phase::Visible { .. }) {
            debug!(
                "event=panel_drag_start module=window status=skip state={}",
                instance.state().as_str()
            );
            return;
        }

        instance.disarm_edge_watch(host);
        host.capture_pointer(instance.window);
        instance.phase = Phase::Dragging(DragSession {
            pointer_origin: pointer,
            window_origin: instance.bounds.position(),
        });
        debug!(
            "event=panel_drag_start module=window status=ok x={} y={}",
            instance.bounds.x, instance.bounds.y
        );
    }

    /// Follows the pointer; ignored outside a drag.
    pub fn drag_move(&mut self, host: &mut dyn WindowHost, pointer: Position) {
        let Some(instance) = self.instance.as_mut() else {
            return;
        };
        if let Phase::Dragging(session) = instance.phase {
            let moved = instance.bounds.moved_to(session.target(pointer));
            instance.apply_bounds(host, moved);
        }
    }

    /// Ends a drag, snapping to the edge when released near the top.
    pub fn drag_end(&mut self, host: &mut dyn WindowHost, pointer: Position) {
        let settings = self.settings;
        let Some(instance) = self.instance.as_mut() else {
            return;
        };
        let Phase::Dragging(session) = instance.phase else {
            return;
        };

        let released = instance.bounds.moved_to(session.target(pointer));
        if released != instance.bounds {
            instance.apply_bounds(host, released);
        }

        if settings.is_at_edge(released) {
            instance.stow(host, &settings, &mut self.saved_position);
            info!(
                "event=panel_hide module=window status=ok reason=drag_snap x={} y={}",
                released.x, released.y
            );
            return;
        }

        host.release_pointer(instance.window);
        instance.phase = Phase::Visible { settle_until: None };
        instance.arm_edge_watch(host, settings.edge_poll_interval);
        debug!(
            "event=panel_drag_end module=window status=ok x={} y={}",
            released.x, released.y
        );
    }

    /// Moves the live panel by a relative offset; no-op when closed.
    pub fn move_by(&mut self, host: &mut dyn WindowHost, dx: i32, dy: i32) {
        let Some(instance) = self.instance.as_mut() else {
            debug!("event=panel_move module=window status=skip reason=closed");
            return;
        };
        let moved = instance.bounds.offset(dx, dy);
        instance.apply_bounds(host, moved);
    }

    /// Periodic edge poll tick.
    ///
    /// Snaps a visible panel that moved into the edge band since the
    /// previous tick. Returns whether it snapped. Ticks from timers that
    /// are no longer armed are ignored.
    pub fn edge_check(&mut self, host: &mut dyn WindowHost, timer: TimerId) -> bool {
        let settings = self.settings;
        let Some(instance) = self.instance.as_mut() else {
            return false;
        };
        let Some(watch) = instance.edge_watch.as_mut() else {
            return false;
        };
        if watch.timer != timer {
            debug!(
                "event=panel_edge_check module=window status=skip reason=stale_timer timer={timer}"
            );
            return false;
        }

        let moved = watch.last_seen != instance.bounds;
        watch.last_seen = instance.bounds;
        if !moved
            || !matches!(instance.phase, Phase::Visible { .. })
            || !settings.is_at_edge(instance.bounds)
        {
            return false;
        }

        instance.stow(host, &settings, &mut self.saved_position);
        info!("event=panel_hide module=window status=ok reason=edge_poll");
        true
    }

    /// Releases the instance; the saved position is kept.
    pub fn destroy(&mut self, host: &mut dyn WindowHost) {
        if let Some(instance) = self.instance.take() {
            let window = instance.window;
            instance.teardown(host, true);
            info!("event=panel_destroy module=window status=ok window={window}");
        }
    }

    /// The host closed `window` itself; drop controller state for it.
    pub fn window_closed(&mut self, host: &mut dyn WindowHost, window: WindowId) -> bool {
        if self.window_id() != Some(window) {
            return false;
        }
        if let Some(instance) = self.instance.take() {
            instance.teardown(host, false);
            info!(
                "event=panel_destroy module=window status=ok window={window} reason=host_closed"
            );
        }
        true
    }

    fn open(&mut self, host: &mut dyn WindowHost, settle_until: Instant) -> WindowResult<()> {
        let settings = self.settings;
        let origin = self
            .saved_position
            .map_or(settings.default_position, |saved| {
                settings.restore_position(saved)
            });
        let bounds = PanelBounds::new(origin.x, origin.y, settings.width, settings.height);

        let window = host.create_window(&WindowSpec::panel(bounds))?;
        host.show(window);
        host.focus(window);

        let mut instance = PanelInstance {
            window,
            bounds,
            phase: Phase::Visible {
                settle_until: Some(settle_until),
            },
            edge_watch: None,
        };
        instance.arm_edge_watch(host, settings.edge_poll_interval);
        self.instance = Some(instance);

        info!(
            "event=panel_open module=window status=ok window={window} x={} y={}",
            bounds.x, bounds.y
        );
        Ok(())
    }

    fn focus_existing(&self, host: &mut dyn WindowHost, reason: &str) {
        if let Some(instance) = self.instance.as_ref() {
            host.focus(instance.window);
            debug!("event=panel_focus module=window status=ok reason={reason}");
        }
    }

    fn stow_if(&mut self, host: &mut dyn WindowHost, reason: &str, allowed: fn(Phase) -> bool) {
        let settings = self.settings;
        let Some(instance) = self.instance.as_mut() else {
            return;
        };
        if !allowed(instance.phase) {
            debug!(
                "event=panel_hide module=window status=skip reason={reason} state={}",
                instance.state().as_str()
            );
            return;
        }
        instance.stow(host, &settings, &mut self.saved_position);
        info!("event=panel_hide module=window status=ok reason={reason}");
    }
}
