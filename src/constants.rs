//! Shared crate-wide constants.

/// Minimum number of visible cells a window must keep within the desktop
/// area so the user can grab its title bar again.
pub const MIN_FLOATING_VISIBLE_MARGIN: u16 = 4;

/// First stacking index handed out by the window manager.
pub const FIRST_STACK_INDEX: u64 = 100;

/// Where new windows land, relative to the top-left corner of the desktop.
pub const DEFAULT_WINDOW_ORIGIN: (i32, i32) = (16, 1);

pub const DEFAULT_DRAG_THROTTLE_MS: u64 = 50;
pub const DEFAULT_ANIMATION_MS: u64 = 300;
pub const DEFAULT_TICK_MS: u64 = 16;

/// Year printed by the taskbar clock until Tweak changes it.
pub const DEFAULT_DESKTOP_YEAR: i32 = 1999;

/// Year that sets off the Y2K sequence when saved from Tweak.
pub const Y2K_TRIGGER_YEAR: &str = "2007";

/// Scale factor a window shrinks to while flying into the taskbar.
pub const MINIMIZE_SCALE: f32 = 0.2;

/// Desktop icon grid geometry (terminal cells).
pub const ICONS_PER_COLUMN: usize = 6;
pub const ICON_CELL_WIDTH: u16 = 14;
pub const ICON_CELL_HEIGHT: u16 = 3;

/// Bounds on a taskbar entry label. Labels shrink toward the minimum when
/// the row is crowded.
pub const TASKBAR_LABEL_MAX: usize = 16;
pub const TASKBAR_LABEL_MIN: usize = 1;

pub const CREATOR_URL: &str = "https://itsharshitgoat.github.io/Website/";
pub const SEARCH_URL: &str = "https://duckduckgo.com/?q=";
pub const MESSENGER_ADDRESS: &str = "itsharshitgoat@gmail.com";

