//! Effect-queue window host.
//!
//! The presentation layer owns the real windows; this host records every
//! effect as a `WindowCommand` for it to drain and apply in order, and
//! tracks enough bookkeeping to answer "what is live right now".

use super::geometry::{PanelBounds, WorkArea};
use super::host::{TimerId, WindowHost, WindowId, WindowResult, WindowSpec};
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

/// One effect to apply in the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowCommand {
    Create { window: WindowId, spec: WindowSpec },
    SetBounds { window: WindowId, bounds: PanelBounds },
    Show { window: WindowId },
    Focus { window: WindowId },
    Destroy { window: WindowId },
    StartInterval {
        window: WindowId,
        timer: TimerId,
        every: Duration,
    },
    CancelInterval { timer: TimerId },
    CapturePointer { window: WindowId },
    ReleasePointer { window: WindowId },
}

#[derive(Debug, Clone, Copy)]
enum HostClock {
    System,
    Manual { base: Instant, elapsed: Duration },
}

/// `WindowHost` that queues effects instead of touching the OS.
#[derive(Debug)]
pub struct QueuedHost {
    work_area: WorkArea,
    clock: HostClock,
    next_window: WindowId,
    next_timer: TimerId,
    pending: Vec<WindowCommand>,
    live_windows: BTreeSet<WindowId>,
    active_timers: BTreeMap<TimerId, WindowId>,
    pointer_captures: BTreeSet<WindowId>,
}

impl QueuedHost {
    pub fn new(work_area: WorkArea) -> Self {
        Self {
            work_area,
            clock: HostClock::System,
            next_window: 1,
            next_timer: 1,
            pending: Vec::new(),
            live_windows: BTreeSet::new(),
            active_timers: BTreeMap::new(),
            pointer_captures: BTreeSet::new(),
        }
    }

    /// Host whose clock only moves through `advance`.
    pub fn with_manual_clock(work_area: WorkArea) -> Self {
        Self {
            clock: HostClock::Manual {
                base: Instant::now(),
                elapsed: Duration::ZERO,
            },
            ..Self::new(work_area)
        }
    }

    /// Moves a manual clock forward; no effect on the system clock.
    pub fn advance(&mut self, by: Duration) {
        if let HostClock::Manual { elapsed, .. } = &mut self.clock {
            *elapsed += by;
        }
    }

    /// Updates the work area, e.g. after a display change.
    pub fn set_work_area(&mut self, work_area: WorkArea) {
        self.work_area = work_area;
    }

    /// Takes every queued effect in issue order.
    pub fn drain(&mut self) -> Vec<WindowCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn live_window_count(&self) -> usize {
        self.live_windows.len()
    }

    pub fn is_live(&self, window: WindowId) -> bool {
        self.live_windows.contains(&window)
    }

    pub fn active_timer_count(&self) -> usize {
        self.active_timers.len()
    }

    pub fn has_pointer_capture(&self, window: WindowId) -> bool {
        self.pointer_captures.contains(&window)
    }
}

impl Default for QueuedHost {
    fn default() -> Self {
        Self::new(WorkArea::default())
    }
}

impl WindowHost for QueuedHost {
    fn work_area(&self) -> WorkArea {
        self.work_area
    }

    fn now(&self) -> Instant {
        match self.clock {
            HostClock::System => Instant::now(),
            HostClock::Manual { base, elapsed } => base + elapsed,
        }
    }

    fn create_window(&mut self, spec: &WindowSpec) -> WindowResult<WindowId> {
        let window = self.next_window;
        self.next_window += 1;
        self.live_windows.insert(window);
        self.pending.push(WindowCommand::Create {
            window,
            spec: *spec,
        });
        Ok(window)
    }

    fn set_bounds(&mut self, window: WindowId, bounds: PanelBounds) {
        self.pending
            .push(WindowCommand::SetBounds { window, bounds });
    }

    fn show(&mut self, window: WindowId) {
        self.pending.push(WindowCommand::Show { window });
    }

    fn focus(&mut self, window: WindowId) {
        self.pending.push(WindowCommand::Focus { window });
    }

    fn destroy_window(&mut self, window: WindowId) {
        self.live_windows.remove(&window);
        self.pending.push(WindowCommand::Destroy { window });
    }

    fn start_interval(&mut self, window: WindowId, every: Duration) -> TimerId {
        let timer = self.next_timer;
        self.next_timer += 1;
        self.active_timers.insert(timer, window);
        self.pending.push(WindowCommand::StartInterval {
            window,
            timer,
            every,
        });
        timer
    }

    fn cancel_interval(&mut self, timer: TimerId) {
        self.active_timers.remove(&timer);
        self.pending.push(WindowCommand::CancelInterval { timer });
    }

    fn capture_pointer(&mut self, window: WindowId) {
        self.pointer_captures.insert(window);
        self.pending.push(WindowCommand::CapturePointer { window });
    }

    fn release_pointer(&mut self, window: WindowId) {
        self.pointer_captures.remove(&window);
        self.pending.push(WindowCommand::ReleasePointer { window });
    }

    /// Timers and captures tied to `window` are dropped too; no effects
    /// are queued because the window is already gone.
    fn forget_window(&mut self, window: WindowId) {
        self.live_windows.remove(&window);
        self.pointer_captures.remove(&window);
        self.active_timers.retain(|_, owner| *owner != window);
    }
}

#[cfg(test)]
mod tests {
    use super::{QueuedHost, WindowCommand};
    use crate::window::geometry::{PanelBounds, WorkArea};
    use crate::window::host::{WindowHost, WindowSpec};
    use std::time::Duration;

    #[test]
    fn manual_clock_moves_only_on_advance() {
        let mut host = QueuedHost::with_manual_clock(WorkArea::default());
        let start = host.now();
        assert_eq!(host.now(), start);
        host.advance(Duration::from_millis(250));
        assert_eq!(host.now() - start, Duration::from_millis(250));
    }

    #[test]
    fn forget_window_drops_owned_timers_without_queueing() {
        let mut host = QueuedHost::default();
        let window = host
            .create_window(&WindowSpec::panel(PanelBounds::new(0, 0, 300, 500)))
            .unwrap();
        host.start_interval(window, Duration::from_millis(500));
        host.capture_pointer(window);
        let queued = host.drain().len();
        assert_eq!(queued, 3);

        host.forget_window(window);
        assert!(host.drain().is_empty());
        assert_eq!(host.live_window_count(), 0);
        assert_eq!(host.active_timer_count(), 0);
        assert!(!host.has_pointer_capture(window));
    }

    #[test]
    fn drain_preserves_issue_order() {
        let mut host = QueuedHost::default();
        host.show(7);
        host.focus(7);
        assert_eq!(
            host.drain(),
            vec![
                WindowCommand::Show { window: 7 },
                WindowCommand::Focus { window: 7 }
            ]
        );
    }
}
