//! Timer and frame scheduling
//!
//! Stands in for the three external schedulers an application relies on:
//! a recurring interval, a one-shot timeout and a frame callback. Nothing
//! runs by itself; the host polls with its own notion of "now" and
//! dispatches whatever fired. Everything registered here is identified by a
//! [`TimerId`] so the owner can cancel it explicitly.

use std::time::Duration;

use tracing::{trace, warn};

/// Handle to a registered interval, timeout or frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Interval { period: Duration },
    Timeout,
}

#[derive(Debug, Clone)]
struct TimerEntry {
    id: TimerId,
    kind: TimerKind,
    due: Duration,
}

/// Single-threaded scheduler driven by host time
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    timers: Vec<TimerEntry>,
    frames: Vec<TimerId>,
}

impl Scheduler {
    /// Upper bound on interval firings per poll when the host falls behind
    pub const MAX_CATCH_UP: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a recurring timer, first firing one period from `now`
    pub fn set_interval(&mut self, now: Duration, period: Duration) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        let id = self.allocate();
        self.timers.push(TimerEntry {
            id,
            kind: TimerKind::Interval { period },
            due: now + period,
        });
        trace!(?id, ?period, "interval registered");
        id
    }

    /// Registers a one-shot timer firing `delay` after `now`
    pub fn set_timeout(&mut self, now: Duration, delay: Duration) -> TimerId {
        let id = self.allocate();
        self.timers.push(TimerEntry {
            id,
            kind: TimerKind::Timeout,
            due: now + delay,
        });
        trace!(?id, ?delay, "timeout registered");
        id
    }

    /// Requests one callback on the next frame
    pub fn request_frame(&mut self) -> TimerId {
        let id = self.allocate();
        self.frames.push(id);
        id
    }

    /// Cancels an interval, timeout or frame request
    ///
    /// # Returns
    /// true if something was still pending under `id`
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len() + self.frames.len();
        self.timers.retain(|entry| entry.id != id);
        self.frames.retain(|frame| *frame != id);
        before != self.timers.len() + self.frames.len()
    }

    /// Checks whether `id` is still waiting to fire
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|entry| entry.id == id) || self.frames.contains(&id)
    }

    /// Number of pending timers (frame requests excluded)
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Collects every timer due at `now`, in due order
    ///
    /// Timeouts are removed once fired; intervals are re-armed one period
    /// later and fire repeatedly if several periods elapsed, up to
    /// [`Self::MAX_CATCH_UP`] times, after which they resync to `now`.
    pub fn poll(&mut self, now: Duration) -> Vec<TimerId> {
        let mut fired: Vec<(Duration, TimerId)> = Vec::new();

        for entry in &mut self.timers {
            match entry.kind {
                TimerKind::Timeout => {
                    if entry.due <= now {
                        fired.push((entry.due, entry.id));
                    }
                }
                TimerKind::Interval { period } => {
                    let mut count = 0;
                    while entry.due <= now && count < Self::MAX_CATCH_UP {
                        fired.push((entry.due, entry.id));
                        entry.due += period;
                        count += 1;
                    }
                    if entry.due <= now {
                        warn!(id = ?entry.id, "interval fell behind, skipping missed periods");
                        entry.due = now + period;
                    }
                }
            }
        }

        self.timers
            .retain(|entry| !(entry.kind == TimerKind::Timeout && entry.due <= now));

        // Stable sort keeps registration order for timers due together
        fired.sort_by_key(|(due, _)| *due);
        fired.into_iter().map(|(_, id)| id).collect()
    }

    /// Takes all pending frame requests
    pub fn take_frames(&mut self) -> Vec<TimerId> {
        std::mem::take(&mut self.frames)
    }

    fn allocate(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }
}
