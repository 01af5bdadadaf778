//! Seam between the window controllers and the OS window system.
//!
//! The host applies effects; it never decides. Controllers keep their own
//! copy of every bounds value they set, so hosts need no query surface
//! beyond the work area and a clock.

use super::geometry::{PanelBounds, WorkArea};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

/// Host-assigned window handle.
pub type WindowId = u64;
/// Host-assigned interval timer handle.
pub type TimerId = u64;

pub type WindowResult<T> = Result<T, WindowError>;

/// Which surface a window backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowRole {
    Panel,
    Input,
}

impl WindowRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Panel => "panel",
            Self::Input => "input",
        }
    }
}

/// Creation parameters for a borderless utility window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub role: WindowRole,
    pub bounds: PanelBounds,
    pub frameless: bool,
    pub always_on_top: bool,
    pub skip_taskbar: bool,
    pub resizable: bool,
    pub transparent: bool,
}

impl WindowSpec {
    /// Sliding list panel: translucent, pinned above other windows.
    pub fn panel(bounds: PanelBounds) -> Self {
        Self {
            role: WindowRole::Panel,
            bounds,
            frameless: true,
            always_on_top: true,
            skip_taskbar: true,
            resizable: false,
            transparent: true,
        }
    }

    /// Quick-capture input surface.
    pub fn input(bounds: PanelBounds) -> Self {
        Self {
            role: WindowRole::Input,
            bounds,
            frameless: true,
            always_on_top: true,
            skip_taskbar: true,
            resizable: false,
            transparent: false,
        }
    }
}

/// Window system failure surfaced to controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    CreateFailed { role: WindowRole, reason: String },
}

impl Display for WindowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateFailed { role, reason } => {
                write!(f, "failed to create {} window: {reason}", role.as_str())
            }
        }
    }
}

impl Error for WindowError {}

/// Effects the controllers issue against the OS window system.
///
/// All calls happen on the single event-loop thread.
pub trait WindowHost {
    fn work_area(&self) -> WorkArea;
    fn now(&self) -> Instant;
    fn create_window(&mut self, spec: &WindowSpec) -> WindowResult<WindowId>;
    fn set_bounds(&mut self, window: WindowId, bounds: PanelBounds);
    fn show(&mut self, window: WindowId);
    fn focus(&mut self, window: WindowId);
    fn destroy_window(&mut self, window: WindowId);
    /// Starts a repeating timer whose ticks are reported back with its id.
    fn start_interval(&mut self, window: WindowId, every: Duration) -> TimerId;
    fn cancel_interval(&mut self, timer: TimerId);
    /// Subscribes `window` to pointer-move/pointer-up notifications.
    fn capture_pointer(&mut self, window: WindowId);
    fn release_pointer(&mut self, window: WindowId);
    /// Acknowledges that the host already closed `window` on its own.
    fn forget_window(&mut self, _window: WindowId) {}
}
