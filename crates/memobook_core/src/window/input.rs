//! Quick-capture input surface controller.
//!
//! # Invariants
//! - At most one input window exists; a second `show` focuses it.
//! - Losing focus or dismissing destroys the window and clears the handle.

use super::geometry::PanelBounds;
use super::host::{WindowHost, WindowId, WindowResult, WindowSpec};
use crate::config::InputConfig;
use log::{debug, info};

/// Size of the centred capture window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSettings {
    pub width: i32,
    pub height: i32,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self::from(&InputConfig::default())
    }
}

impl From<&InputConfig> for InputSettings {
    fn from(config: &InputConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
        }
    }
}

/// Singleton owner of the ephemeral capture window.
#[derive(Debug, Default)]
pub struct InputPanelController {
    settings: InputSettings,
    window: Option<WindowId>,
}

impl InputPanelController {
    pub fn new(settings: InputSettings) -> Self {
        Self {
            settings,
            window: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.window.is_some()
    }

    pub fn window_id(&self) -> Option<WindowId> {
        self.window
    }

    /// Creates the centred capture window, or focuses the live one.
    pub fn show(&mut self, host: &mut dyn WindowHost) -> WindowResult<()> {
        if let Some(window) = self.window {
            host.focus(window);
            debug!("event=input_show module=window status=ok reason=focus_existing");
            return Ok(());
        }

        let bounds = PanelBounds::centered(
            host.work_area(),
            self.settings.width,
            self.settings.height,
        );
        let window = host.create_window(&WindowSpec::input(bounds))?;
        host.show(window);
        host.focus(window);
        self.window = Some(window);
        info!(
            "event=input_show module=window status=ok window={window} x={} y={}",
            bounds.x, bounds.y
        );
        Ok(())
    }

    /// Destroys the capture window if one exists.
    pub fn dismiss(&mut self, host: &mut dyn WindowHost) {
        if let Some(window) = self.window.take() {
            host.destroy_window(window);
            info!("event=input_dismiss module=window status=ok window={window}");
        }
    }

    /// Focus loss ends the capture session.
    pub fn blur(&mut self, host: &mut dyn WindowHost) {
        self.dismiss(host);
    }

    /// The host closed `window` itself; forget it without a second destroy.
    pub fn window_closed(&mut self, host: &mut dyn WindowHost, window: WindowId) -> bool {
        if self.window == Some(window) {
            self.window = None;
            host.forget_window(window);
            debug!(
                "event=input_dismiss module=window status=ok window={window} reason=host_closed"
            );
            return true;
        }
        false
    }
}
