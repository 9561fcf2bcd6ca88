use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::Level;

use retro_desk::config::DesktopConfig;
use retro_desk::constants::{
    DEFAULT_ANIMATION_MS, DEFAULT_DESKTOP_YEAR, DEFAULT_DRAG_THROTTLE_MS, DEFAULT_TICK_MS,
};
use retro_desk::desktop::Desktop;
use retro_desk::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use retro_desk::runner::{SystemBrowser, run_desktop};
use retro_desk::tracing_sub;

#[derive(Parser, Debug)]
#[command(
    name = "retro-desk",
    version = env!("CARGO_PKG_VERSION"),
    about = "A retro desktop environment in your terminal"
)]
struct Cli {
    /// Go straight to the desktop: no boot screen, no welcome note.
    #[arg(long)]
    skip_boot: bool,

    /// Minimum time between applied window drag updates.
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_DRAG_THROTTLE_MS)]
    drag_throttle_ms: u64,

    /// Length of the minimize and restore animations.
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_ANIMATION_MS)]
    animation_ms: u64,

    /// Year shown on the taskbar clock.
    #[arg(long, value_name = "YEAR", default_value_t = DEFAULT_DESKTOP_YEAR)]
    year: i32,

    /// Event loop poll interval.
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u64,

    /// trace, debug, info, warn or error.
    #[arg(long, value_name = "LEVEL", default_value_t = Level::INFO)]
    log_level: Level,

    /// Append logs to this file instead of keeping them in memory.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl From<&Cli> for DesktopConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            show_boot: !cli.skip_boot,
            drag_throttle: Duration::from_millis(cli.drag_throttle_ms),
            animation: Duration::from_millis(cli.animation_ms),
            year: cli.year,
            tick: Duration::from_millis(cli.tick_ms.max(1)),
            log_level: cli.log_level,
            log_file: cli.log_file.clone(),
        }
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = DesktopConfig::from(&cli);
    let _logs = tracing_sub::init(config.log_level, config.log_file.as_deref())?;
    tracing::info!(year = config.year, boot = config.show_boot, "starting desktop");

    let tick = config.tick;
    let mut desktop = Desktop::new(config, Instant::now());
    let mut output = ConsoleOutputDriver::new()?;
    let result = run_desktop(
        &mut output,
        ConsoleInputDriver::new(),
        &mut desktop,
        &mut SystemBrowser,
        tick,
    );
    if let Err(err) = &result {
        tracing::error!(error = %err, "desktop stopped");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_boot_the_desktop() {
        let cli = Cli::parse_from(["retro-desk"]);
        let config = DesktopConfig::from(&cli);
        assert!(config.show_boot);
        assert_eq!(config.year, 1999);
        assert_eq!(config.drag_throttle, Duration::from_millis(50));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "retro-desk",
            "--skip-boot",
            "--year",
            "2007",
            "--animation-ms",
            "0",
            "--log-level",
            "debug",
        ]);
        let config = DesktopConfig::from(&cli);
        assert!(!config.show_boot);
        assert_eq!(config.year, 2007);
        assert_eq!(config.animation, Duration::ZERO);
        assert_eq!(config.log_level, Level::DEBUG);
    }
}
