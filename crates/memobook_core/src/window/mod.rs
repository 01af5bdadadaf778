//! Window controllers for the capture surface and the sliding list panel.
//!
//! # Responsibility
//! - Own the authoritative position/visibility state of both surfaces.
//! - Drive the OS window system only through the `WindowHost` seam.
//!
//! # Invariants
//! - At most one panel and one input surface exist at any time.
//! - Every interval timer armed for a panel is cancelled exactly once.

pub mod geometry;
pub mod host;
pub mod input;
pub mod panel;
pub mod queued;

pub use geometry::{PanelBounds, Position, WorkArea};
pub use host::{TimerId, WindowError, WindowHost, WindowId, WindowResult, WindowRole, WindowSpec};
pub use input::{InputPanelController, InputSettings};
pub use panel::{PanelSettings, PanelState, PanelWindowController};
pub use queued::{QueuedHost, WindowCommand};
