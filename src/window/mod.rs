pub mod animation;
pub mod decorator;
pub mod drag;

mod window_manager;

use std::fmt;

use ratatui::prelude::Rect;

use crate::applets::{Applet, AppletArgs, AppletFlags};

pub use animation::{AnimationKind, WindowAnimation};
pub use decorator::{HeaderAction, RetroDecorator};
pub use drag::{DragState, DragThrottle};
pub use window_manager::WindowManager;

/// Opaque, session-unique window identity. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowHandle(u64);

impl WindowHandle {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Open,
    Minimized,
}

/// Where a launch came from. Only desktop-icon launches are subject to the
/// one-window-per-app rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchSource {
    #[default]
    Desktop,
    Spawned,
}

/// Signed floating rectangle origin with unsigned size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl FloatRect {
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x as i32, rect.y as i32, rect.width, rect.height)
    }
}

/// How to open a window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOptions {
    pub source: LaunchSource,
    pub title: Option<String>,
    pub args: AppletArgs,
    pub flags: AppletFlags,
    pub position: Option<(i32, i32)>,
}

impl OpenOptions {
    /// A launch from a desktop icon.
    pub fn desktop() -> Self {
        Self::default()
    }

    /// A window spawned by another applet (viewers, the welcome file).
    pub fn spawned() -> Self {
        Self {
            source: LaunchSource::Spawned,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_args(mut self, args: AppletArgs) -> Self {
        self.args = args;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.flags.read_only = true;
        self
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.position = Some((x, y));
        self
    }
}

/// One open application instance.
#[derive(Debug)]
pub struct Window {
    app: String,
    title: String,
    stack_index: u64,
    rect: FloatRect,
    visibility: Visibility,
    unique: bool,
    args: AppletArgs,
    flags: AppletFlags,
    content: Box<dyn Applet>,
}

impl Window {
    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn stack_index(&self) -> u64 {
        self.stack_index
    }

    pub fn position(&self) -> (i32, i32) {
        (self.rect.x, self.rect.y)
    }

    pub fn rect(&self) -> FloatRect {
        self.rect
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_minimized(&self) -> bool {
        self.visibility == Visibility::Minimized
    }

    /// Whether this window counts toward the one-per-app rule.
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn flags(&self) -> AppletFlags {
        self.flags
    }

    pub fn content(&self) -> &dyn Applet {
        self.content.as_ref()
    }

    /// Content area inside the chrome: one title row on top, a one-cell
    /// border on the other three sides.
    pub fn content_rect(&self) -> FloatRect {
        content_rect_of(self.rect)
    }
}

pub(crate) fn content_rect_of(rect: FloatRect) -> FloatRect {
    FloatRect {
        x: rect.x + 1,
        y: rect.y + 1,
        width: rect.width.saturating_sub(2),
        height: rect.height.saturating_sub(2),
    }
}
