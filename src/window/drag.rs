use std::time::{Duration, Instant};

use crate::window::WindowHandle;

/// An in-progress title-bar drag.
///
/// `pointer` is the last pointer position that was actually applied to the
/// window; deltas are measured from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub handle: WindowHandle,
    pub pointer: (u16, u16),
}

/// Coalesces raw pointer moves into at most one applied update per interval.
///
/// The first sample after an idle period arms a deadline; later samples only
/// overwrite the pending position. When the deadline passes the latest
/// sample is released and the throttle goes idle again.
#[derive(Debug, Clone)]
pub struct DragThrottle {
    interval: Duration,
    pending: Option<(u16, u16)>,
    deadline: Option<Instant>,
}

impl DragThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
            deadline: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn sample(&mut self, column: u16, row: u16, now: Instant) {
        self.pending = Some((column, row));
        if self.deadline.is_none() {
            self.deadline = Some(now + self.interval);
        }
    }

    /// Release the pending sample if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<(u16, u16)> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drop any pending sample and disarm, whether or not it was due.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }
}
