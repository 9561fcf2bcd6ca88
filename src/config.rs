use std::path::PathBuf;
use std::time::Duration;

use tracing::Level;

use crate::constants::{
    DEFAULT_ANIMATION_MS, DEFAULT_DESKTOP_YEAR, DEFAULT_DRAG_THROTTLE_MS, DEFAULT_TICK_MS,
};

/// Runtime knobs for a desktop session.
///
/// The binary fills this from its command line; tests use `Default`.
#[derive(Debug, Clone)]
pub struct DesktopConfig {
    pub show_boot: bool,
    pub drag_throttle: Duration,
    pub animation: Duration,
    pub year: i32,
    pub tick: Duration,
    pub log_level: Level,
    pub log_file: Option<PathBuf>,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            show_boot: false,
            drag_throttle: Duration::from_millis(DEFAULT_DRAG_THROTTLE_MS),
            animation: Duration::from_millis(DEFAULT_ANIMATION_MS),
            year: DEFAULT_DESKTOP_YEAR,
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            log_level: Level::INFO,
            log_file: None,
        }
    }
}

impl DesktopConfig {
    pub fn with_boot(mut self, show_boot: bool) -> Self {
        self.show_boot = show_boot;
        self
    }

    pub fn with_drag_throttle(mut self, interval: Duration) -> Self {
        self.drag_throttle = interval;
        self
    }

    pub fn with_animation(mut self, duration: Duration) -> Self {
        self.animation = duration;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_desktop_timings() {
        let cfg = DesktopConfig::default();
        assert_eq!(cfg.drag_throttle, Duration::from_millis(50));
        assert_eq!(cfg.animation, Duration::from_millis(300));
        assert_eq!(cfg.year, 1999);
        assert!(!cfg.show_boot);
    }
}
