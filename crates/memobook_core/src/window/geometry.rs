//! Integer screen geometry shared by both window controllers.

use serde::{Deserialize, Serialize};

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise `self - origin`.
    pub fn delta_from(self, origin: Position) -> (i32, i32) {
        (
            self.x.saturating_sub(origin.x),
            self.y.saturating_sub(origin.y),
        )
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// Window rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PanelBounds {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A `width` x `height` rectangle centred in `area`.
    pub fn centered(area: WorkArea, width: i32, height: i32) -> Self {
        Self::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Same size, top-left corner moved to `position`.
    pub fn moved_to(self, position: Position) -> Self {
        Self {
            x: position.x,
            y: position.y,
            ..self
        }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        self.moved_to(self.position().offset(dx, dy))
    }
}

/// Usable area of the primary display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkArea {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WorkArea {
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

impl Default for WorkArea {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}
