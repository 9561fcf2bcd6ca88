use std::time::{Duration, Instant};

use crate::constants::MINIMIZE_SCALE;
use crate::layout::{ease_out, lerp_rect, scale_rect};
use crate::window::{FloatRect, WindowHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    Minimize,
    Restore,
}

/// A transient ghost flying between a window and its taskbar entry.
///
/// The ghost is purely visual. The window's real visibility is changed by
/// the window manager independently of it.
#[derive(Debug, Clone, Copy)]
pub struct WindowAnimation {
    pub handle: WindowHandle,
    pub kind: AnimationKind,
    pub from: FloatRect,
    pub to: FloatRect,
    pub started: Instant,
    pub duration: Duration,
}

impl WindowAnimation {
    /// Shrink from `window` into `entry`, ending at a fraction of its size.
    pub fn minimize(
        handle: WindowHandle,
        window: FloatRect,
        entry: FloatRect,
        started: Instant,
        duration: Duration,
    ) -> Self {
        Self {
            handle,
            kind: AnimationKind::Minimize,
            from: window,
            to: shrunk_toward(window, entry),
            started,
            duration,
        }
    }

    /// Grow back out of `entry` into `window`.
    pub fn restore(
        handle: WindowHandle,
        entry: FloatRect,
        window: FloatRect,
        started: Instant,
        duration: Duration,
    ) -> Self {
        Self {
            handle,
            kind: AnimationKind::Restore,
            from: shrunk_toward(window, entry),
            to: window,
            started,
            duration,
        }
    }

    /// Progress in `0..=1`.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }

    pub fn frame(&self, now: Instant) -> FloatRect {
        lerp_rect(self.from, self.to, ease_out(self.progress(now)))
    }

    /// Whether the ghost should still be drawn faded. Minimize fades out,
    /// restore fades in.
    pub fn faded(&self, now: Instant) -> bool {
        let p = self.progress(now);
        match self.kind {
            AnimationKind::Minimize => p > 0.5,
            AnimationKind::Restore => p < 0.5,
        }
    }
}

/// The scaled-down window rectangle centered on the taskbar entry.
fn shrunk_toward(window: FloatRect, entry: FloatRect) -> FloatRect {
    let small = scale_rect(window, MINIMIZE_SCALE);
    FloatRect {
        x: entry.x + (entry.width as i32 - small.width as i32) / 2,
        y: entry.y + (entry.height as i32 - small.height as i32) / 2,
        ..small
    }
}
