//! Embedded mini-applications and the registry that creates them.
//!
//! An applet is created by its registry factory (pure construction), then
//! `init` runs once it is mounted in a window. Anything an applet wants from
//! the outside world (dialogs, new windows, URLs) is queued as a
//! [`DesktopRequest`] on the [`AppletHost`] and carried out by the desktop
//! after the applet call returns.

use std::time::Instant;

use crossterm::event::Event;
use ratatui::prelude::Rect;

use crate::component_context::ComponentContext;
use crate::constants::DEFAULT_DESKTOP_YEAR;
use crate::error::{AppletError, WmError};
use crate::store::FileStore;
use crate::theme::Theme;
use crate::ui::UiFrame;
use crate::window::{OpenOptions, WindowHandle};

pub mod arcade;
pub mod canvas;
pub mod creator;
pub mod file_nest;
pub mod gallery;
pub mod messenger;
pub mod numpad;
pub mod text_pad;
pub mod timer;
pub mod tunebox;
pub mod tweak;
pub mod web_start;

pub const FILE_NEST: &str = "File Nest";
pub const TWEAK: &str = "Tweak";
pub const TEXT_PAD: &str = "Text Pad";
pub const NUMPAD: &str = "NumPad";
pub const CANVAS: &str = "Canvas";
pub const TIMER: &str = "Timer";
pub const WEB_START: &str = "Web Start";
pub const GALLERY: &str = "Gallery";
pub const TUNEBOX: &str = "Tunebox";
pub const ARCADE: &str = "Arcade";
pub const MESSENGER: &str = "Messenger";
pub const CREATOR: &str = "Creator";

/// Launch arguments handed to an applet factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AppletArgs {
    #[default]
    None,
    /// A stored file to show: its name and content.
    Document { name: String, body: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppletFlags {
    /// Disable editing and saving.
    pub read_only: bool,
}

/// Side effects applets ask the desktop to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum DesktopRequest {
    Open { app: String, options: OpenOptions },
    Refresh(String),
    OpenUrl(String),
    ShowDialog { title: String, body: String },
    Prompt {
        handle: WindowHandle,
        title: String,
        label: String,
        initial: String,
    },
    TriggerY2k,
}

/// Session services shared by every applet.
#[derive(Debug)]
pub struct AppletHost {
    pub store: FileStore,
    pub theme: Theme,
    pub year: i32,
    requests: Vec<DesktopRequest>,
}

impl Default for AppletHost {
    fn default() -> Self {
        Self::new(FileStore::seeded(), DEFAULT_DESKTOP_YEAR)
    }
}

impl AppletHost {
    pub fn new(store: FileStore, year: i32) -> Self {
        Self {
            store,
            theme: Theme::default(),
            year,
            requests: Vec::new(),
        }
    }

    pub fn push(&mut self, request: DesktopRequest) {
        self.requests.push(request);
    }

    pub fn requests(&self) -> &[DesktopRequest] {
        &self.requests
    }

    pub fn take_requests(&mut self) -> Vec<DesktopRequest> {
        std::mem::take(&mut self.requests)
    }
}

/// What an applet sees while it runs: its window, the clock, and the host.
pub struct AppletContext<'a> {
    handle: WindowHandle,
    flags: AppletFlags,
    now: Instant,
    focused: bool,
    host: &'a mut AppletHost,
}

impl<'a> AppletContext<'a> {
    pub fn new(
        handle: WindowHandle,
        flags: AppletFlags,
        now: Instant,
        focused: bool,
        host: &'a mut AppletHost,
    ) -> Self {
        Self {
            handle,
            flags,
            now,
            focused,
            host,
        }
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    pub fn flags(&self) -> AppletFlags {
        self.flags
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Whether the applet's window is the topmost visible one.
    pub fn focused(&self) -> bool {
        self.focused
    }

    pub fn store(&self) -> &FileStore {
        &self.host.store
    }

    pub fn store_mut(&mut self) -> &mut FileStore {
        &mut self.host.store
    }

    pub fn theme(&self) -> &Theme {
        &self.host.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.host.theme = theme;
    }

    pub fn year(&self) -> i32 {
        self.host.year
    }

    pub fn set_year(&mut self, year: i32) {
        self.host.year = year;
    }

    pub fn request(&mut self, request: DesktopRequest) {
        self.host.push(request);
    }

    pub fn show_dialog(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.request(DesktopRequest::ShowDialog {
            title: title.into(),
            body: body.into(),
        });
    }

    /// Ask the user for a line of text; the answer comes back through
    /// [`Applet::on_prompt`].
    pub fn prompt(&mut self, title: impl Into<String>, label: impl Into<String>) {
        let handle = self.handle;
        self.request(DesktopRequest::Prompt {
            handle,
            title: title.into(),
            label: label.into(),
            initial: String::new(),
        });
    }

    pub fn open_url(&mut self, url: impl Into<String>) {
        self.request(DesktopRequest::OpenUrl(url.into()));
    }
}

/// The contract every embedded application satisfies.
///
/// Mouse events reaching `handle_event` are already translated so that
/// `(0, 0)` is the top-left cell of the applet's content area.
pub trait Applet: std::fmt::Debug {
    /// Runs once after the content is mounted in a real window. The only
    /// place an applet may start ongoing activity.
    fn init(&mut self, _cx: &mut AppletContext<'_>) -> Result<(), AppletError> {
        Ok(())
    }

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>);

    fn handle_event(&mut self, _event: &Event, _cx: &mut AppletContext<'_>) -> bool {
        false
    }

    /// Driven by the event loop on every tick, including while minimized.
    fn tick(&mut self, _cx: &mut AppletContext<'_>) {}

    /// Answer to a [`AppletContext::prompt`] request.
    fn on_prompt(&mut self, _value: &str, _cx: &mut AppletContext<'_>) {}

    /// Release intervals, playback and any other running activity.
    fn teardown(&mut self) {}

    /// Whether the applet currently owns running background activity.
    fn is_active(&self) -> bool {
        false
    }
}

pub type AppletFactory = fn(&AppletArgs) -> Box<dyn Applet>;

/// One registry row: how to build an applet and how it shows up on the
/// desktop.
#[derive(Clone, Copy)]
pub struct AppletEntry {
    pub name: &'static str,
    pub icon: &'static str,
    /// Default outer window size (columns, rows).
    pub size: (u16, u16),
    pub create: AppletFactory,
}

impl std::fmt::Debug for AppletEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppletEntry")
            .field("name", &self.name)
            .field("icon", &self.icon)
            .field("size", &self.size)
            .finish()
    }
}

/// Name-keyed table of applets, kept in registration order.
#[derive(Debug, Default)]
pub struct AppletRegistry {
    entries: Vec<AppletEntry>,
}

impl AppletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in applet, in desktop icon order.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for entry in [
            file_nest::ENTRY,
            tweak::ENTRY,
            text_pad::ENTRY,
            numpad::ENTRY,
            canvas::ENTRY,
            timer::ENTRY,
            web_start::ENTRY,
            gallery::ENTRY,
            tunebox::ENTRY,
            arcade::ENTRY,
            messenger::ENTRY,
            creator::ENTRY,
        ] {
            registry.register(entry);
        }
        registry
    }

    /// Add an applet, replacing any previous entry with the same name.
    pub fn register(&mut self, entry: AppletEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.name == entry.name) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    pub fn get(&self, name: &str) -> Option<&AppletEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn entries(&self) -> &[AppletEntry] {
        &self.entries
    }

    pub fn create(&self, name: &str, args: &AppletArgs) -> Result<Box<dyn Applet>, WmError> {
        let entry = self
            .get(name)
            .ok_or_else(|| WmError::UnknownApp(name.to_string()))?;
        Ok((entry.create)(args))
    }
}
