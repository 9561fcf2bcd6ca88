//! The desktop session: window manager, icons, taskbar, dialog and the
//! full-screen effects wired to one input stream.
//!
//! Applets never touch any of this directly. They queue [`DesktopRequest`]s
//! on the shared [`AppletHost`] and the desktop carries them out once the
//! applet call has returned.

use std::time::Instant;

use chrono::NaiveDateTime;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::Rect;

use crate::applets::{AppletArgs, AppletHost, AppletRegistry, DesktopRequest, TEXT_PAD};
use crate::components::{Dialog, DialogOutcome};
use crate::config::DesktopConfig;
use crate::effects::{BootScreen, Y2kSequence, Y2kStage};
use crate::error::WmError;
use crate::icons::DesktopIconGrid;
use crate::store::{FileStore, WELCOME_PATH, split_path};
use crate::ui::UiFrame;
use crate::utils::XorShift;
use crate::window::{OpenOptions, WindowHandle, WindowManager};

/// Taskbar clock text: wall-clock time with the desktop's own year.
pub fn clock_label(now: NaiveDateTime, year: i32) -> String {
    format!("{}{year}", now.format("%H:%M %m/%d/"))
}

fn log_ignored<T>(result: Result<T, WmError>) {
    if let Err(err) = result {
        tracing::debug!(error = %err, "ignored window manager error");
    }
}

fn is_press(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    is_press(key) && key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

#[derive(Debug)]
pub struct Desktop {
    config: DesktopConfig,
    wm: WindowManager,
    host: AppletHost,
    icons: DesktopIconGrid,
    dialog: Dialog,
    boot: Option<BootScreen>,
    y2k: Option<Y2kSequence>,
    area: Rect,
    outbound: Vec<String>,
    quit: bool,
}

impl Desktop {
    pub fn new(config: DesktopConfig, now: Instant) -> Self {
        let wm = WindowManager::with_config(AppletRegistry::with_defaults(), &config);
        let icons = DesktopIconGrid::new(wm.registry());
        let host = AppletHost::new(FileStore::seeded(), config.year);
        let boot = config.show_boot.then(|| BootScreen::new(now));
        Self {
            config,
            wm,
            host,
            icons,
            dialog: Dialog::new(),
            boot,
            y2k: None,
            area: Rect::default(),
            outbound: Vec::new(),
            quit: false,
        }
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    pub fn wm(&self) -> &WindowManager {
        &self.wm
    }

    pub fn wm_mut(&mut self) -> &mut WindowManager {
        &mut self.wm
    }

    pub fn host(&self) -> &AppletHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut AppletHost {
        &mut self.host
    }

    pub fn icons(&self) -> &DesktopIconGrid {
        &self.icons
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut Dialog {
        &mut self.dialog
    }

    pub fn is_booting(&self) -> bool {
        self.boot.is_some()
    }

    pub fn y2k_stage(&self, now: Instant) -> Option<Y2kStage> {
        self.y2k.as_ref().map(|seq| seq.stage(now))
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }

    /// URLs applets asked to open since the last call. The runner hands
    /// them to the host browser.
    pub fn take_outbound_urls(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbound)
    }

    /// Lay the desktop out inside `area`: the taskbar takes the bottom row,
    /// icons and windows share the rest.
    pub fn set_area(&mut self, area: Rect) {
        if self.area == area {
            return;
        }
        self.area = area;
        let desktop = self.wm.taskbar_mut().split_area(area);
        self.wm.set_area(desktop);
        self.icons.set_area(desktop);
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Launch `app` the way its desktop icon does: focus the existing
    /// window or open the first one.
    pub fn open_from_icon(&mut self, app: &str, now: Instant) -> Result<WindowHandle, WmError> {
        let handle = self.wm.open(app, OpenOptions::desktop(), &mut self.host, now)?;
        self.process_requests(now);
        Ok(handle)
    }

    fn open_welcome(&mut self, now: Instant) {
        let Some(body) = self.host.store.load(WELCOME_PATH).map(str::to_string) else {
            return;
        };
        let name = split_path(WELCOME_PATH)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|_| WELCOME_PATH.to_string());
        let options = OpenOptions::spawned()
            .with_title(name.clone())
            .with_args(AppletArgs::Document { name, body })
            .read_only();
        log_ignored(self.wm.open(TEXT_PAD, options, &mut self.host, now));
    }

    /// Start the desktop over: windows close, settings and files return to
    /// their seeded state and the boot screen runs again.
    pub fn reboot(&mut self, now: Instant) {
        tracing::info!("rebooting desktop");
        let handles: Vec<_> = self.wm.windows().map(|(handle, _)| handle).collect();
        for handle in handles {
            log_ignored(self.wm.close(handle));
        }
        self.host = AppletHost::new(FileStore::seeded(), self.config.year);
        self.dialog.hide();
        self.icons.clear_selection();
        self.y2k = None;
        self.boot = Some(BootScreen::new(now));
    }

    /// Route one input event. Returns whether anything consumed it.
    pub fn handle_event(&mut self, event: &Event, now: Instant) -> bool {
        if let Event::Key(key) = event
            && is_ctrl(key, 'q')
        {
            self.quit = true;
            return true;
        }
        if let Event::Resize(width, height) = event {
            self.set_area(Rect::new(0, 0, *width, *height));
            return true;
        }
        if let Some(boot) = &mut self.boot {
            if let Event::Key(key) = event
                && is_press(key)
            {
                boot.skip();
            }
            return true;
        }
        if let Some(y2k) = &self.y2k {
            if y2k.stage(now) == Y2kStage::End
                && let Event::Key(key) = event
                && is_press(key)
                && key.code == KeyCode::Char('r')
            {
                self.reboot(now);
            }
            return true;
        }
        if self.dialog.is_visible() {
            let theme = self.host.theme;
            if let Some(DialogOutcome::Submitted { target, value }) = self.dialog.handle_event(event, &theme) {
                log_ignored(self.wm.deliver_prompt(target, &value, &mut self.host, now));
                self.process_requests(now);
            }
            return true;
        }

        let consumed = match event {
            Event::Key(key) if is_ctrl(key, 'w') => {
                if let Some(handle) = self.wm.focused() {
                    log_ignored(self.wm.close(handle));
                    self.dialog.forget_target(handle);
                }
                true
            }
            Event::Key(key) if is_press(key) && key.code == KeyCode::F(9) => {
                if let Some(handle) = self.wm.focused() {
                    log_ignored(self.wm.minimize(handle, now));
                }
                true
            }
            Event::Key(key) if is_press(key) && matches!(key.code, KeyCode::Tab | KeyCode::BackTab) => {
                self.wm.cycle_focus(key.code == KeyCode::Tab);
                true
            }
            Event::Key(key) if self.wm.focused().is_none() => self.handle_icon_key(key, now),
            _ => {
                let consumed = self.wm.handle_event(event, &mut self.host, now);
                match event {
                    Event::Mouse(mouse)
                        if !consumed && mouse.kind == MouseEventKind::Down(MouseButton::Left) =>
                    {
                        self.handle_icon_click(mouse.column, mouse.row, now)
                    }
                    _ => consumed,
                }
            }
        };
        self.process_requests(now);
        consumed
    }

    /// Arrow keys walk the icon grid while no window has focus; Enter
    /// launches the selected icon.
    fn handle_icon_key(&mut self, key: &KeyEvent, now: Instant) -> bool {
        if !is_press(key) {
            return false;
        }
        match key.code {
            KeyCode::Up => self.icons.move_selection(0, -1),
            KeyCode::Down => self.icons.move_selection(0, 1),
            KeyCode::Left => self.icons.move_selection(-1, 0),
            KeyCode::Right => self.icons.move_selection(1, 0),
            KeyCode::Enter => {
                let Some(app) = self.icons.selected() else {
                    return false;
                };
                log_ignored(self.open_from_icon(app, now));
            }
            _ => return false,
        }
        true
    }

    fn handle_icon_click(&mut self, column: u16, row: u16, now: Instant) -> bool {
        match self.icons.hit_test(column, row) {
            Some(app) => {
                self.icons.clear_selection();
                log_ignored(self.open_from_icon(app, now));
                true
            }
            None => {
                self.icons.clear_selection();
                false
            }
        }
    }

    /// Carry out everything applets queued. Requests raised while handling
    /// a request (an opened applet's `init`, say) are handled in the same
    /// call.
    pub fn process_requests(&mut self, now: Instant) {
        loop {
            let requests = self.host.take_requests();
            if requests.is_empty() {
                break;
            }
            for request in requests {
                self.apply_request(request, now);
            }
        }
    }

    fn apply_request(&mut self, request: DesktopRequest, now: Instant) {
        match request {
            DesktopRequest::Open { app, options } => {
                if let Err(err) = self.wm.open(&app, options, &mut self.host, now) {
                    tracing::warn!(app, error = %err, "open request failed");
                }
            }
            DesktopRequest::Refresh(app) => {
                log_ignored(self.wm.refresh(&app, &mut self.host, now));
            }
            DesktopRequest::OpenUrl(url) => {
                tracing::debug!(url, "queued outbound url");
                self.outbound.push(url);
            }
            DesktopRequest::ShowDialog { title, body } => self.dialog.show(title, body),
            DesktopRequest::Prompt {
                handle,
                title,
                label,
                initial,
            } => {
                if self.wm.contains(handle) {
                    self.dialog.prompt(title, label, initial, handle);
                }
            }
            DesktopRequest::TriggerY2k => {
                tracing::info!("year rolled over to 2007");
                self.dialog.hide();
                self.y2k = Some(Y2kSequence::new(now, XorShift::from_clock()));
            }
        }
    }

    /// Advance timers, animations and effects to `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.boot.as_ref().is_some_and(|boot| boot.is_done(now)) {
            self.boot = None;
            self.open_welcome(now);
        }
        if let Some(y2k) = &mut self.y2k {
            y2k.tick(now);
        }
        self.wm.tick(&mut self.host, now);
        self.process_requests(now);
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, now: Instant) {
        let area = frame.area();
        self.set_area(area);
        let theme = self.host.theme;

        let covered = self
            .y2k
            .as_ref()
            .is_some_and(|seq| seq.stage(now).covers_desktop());
        if self.boot.is_none() && !covered {
            let desktop = self.wm.area();
            frame.fill(desktop, theme.desktop());
            let wm = &self.wm;
            self.icons.render(frame, &theme, |app| wm.is_running(app));
            self.wm.render(frame, &theme, now);
            let clock = clock_label(chrono::Local::now().naive_local(), self.host.year);
            let focused = self.wm.focused();
            self.wm.taskbar_mut().render(frame, focused, &clock, &theme);
            self.dialog.render(frame, desktop, &theme);
        }
        if let Some(y2k) = &mut self.y2k {
            y2k.render(frame, area, now);
        }
        if let Some(boot) = &self.boot {
            boot.render(frame, area, now);
        }
    }
}
