//! Timer: a minutes-based countdown with presets.

use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Modifier;

use super::{Applet, AppletArgs, AppletContext, AppletEntry, TIMER};
use crate::component_context::ComponentContext;
use crate::components::{ButtonRow, Component, TextField, to_render_space};
use crate::ui::{UiFrame, centered_x};

pub const ENTRY: AppletEntry = AppletEntry {
    name: TIMER,
    icon: "(o)",
    size: (34, 11),
    create,
};

fn create(_args: &AppletArgs) -> Box<dyn Applet> {
    Box::new(Timer::new())
}

const PRESETS: [u32; 4] = [1, 3, 5, 10];
const SECOND: Duration = Duration::from_secs(1);

const START: usize = 0;
const PAUSE: usize = 1;
const RESET: usize = 2;

#[derive(Debug)]
pub struct Timer {
    minutes: TextField,
    remaining: u32,
    /// When the next second comes off the clock; `None` while stopped.
    next_tick: Option<Instant>,
    paused: bool,
    controls: ButtonRow,
    presets: ButtonRow,
    area: Rect,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        let mut timer = Self {
            minutes: TextField::new().with_max_len(2).with_value("0"),
            remaining: 0,
            next_tick: None,
            paused: false,
            controls: ButtonRow::new(["Start", "Pause", "Reset"]),
            presets: ButtonRow::new(PRESETS.iter().map(|m| format!("{m}m"))),
            area: Rect::default(),
        };
        timer.sync_controls();
        timer
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn minutes_input(&self) -> &str {
        self.minutes.value()
    }

    /// `MM:SS` of the time left.
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }

    fn sync_controls(&mut self) {
        let running = self.is_running();
        self.controls.set_label(START, if self.paused { "Resume" } else { "Start" });
        self.controls.set_enabled(START, !running);
        self.controls.set_enabled(PAUSE, running);
    }

    pub fn start(&mut self, now: Instant) {
        if self.remaining == 0 {
            let minutes: u32 = self.minutes.value().trim().parse().unwrap_or(0);
            self.remaining = minutes * 60;
        }
        if self.remaining > 0 && !self.is_running() {
            self.next_tick = Some(now + SECOND);
            tracing::debug!(seconds = self.remaining, "timer started");
        }
        self.sync_controls();
    }

    pub fn pause(&mut self) {
        if self.next_tick.take().is_some() {
            self.paused = true;
        }
        self.sync_controls();
    }

    fn stop(&mut self) {
        self.next_tick = None;
        self.remaining = 0;
        self.paused = false;
        self.sync_controls();
    }

    /// Stop the countdown and clear the minutes input.
    pub fn reset(&mut self) {
        self.stop();
        self.minutes.set_value("0");
    }

    /// Load a preset into the minutes input and stop the countdown.
    pub fn preset(&mut self, minutes: u32) {
        self.stop();
        self.minutes.set_value(minutes.to_string());
    }

    fn toggle(&mut self, now: Instant) {
        if self.is_running() {
            self.pause();
        } else {
            self.start(now);
        }
    }
}

impl Applet for Timer {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        self.area = area;
        let theme = ctx.theme();
        let body = theme.window_body();
        frame.fill(area, body);
        if area.height == 0 {
            return;
        }
        let clock = self.display();
        frame.text(area, centered_x(area, &clock), area.y, &clock, body.add_modifier(Modifier::BOLD));

        let label = "Minutes: ";
        let row = area.y.saturating_add(2);
        frame.text(area, area.x + 1, row, label, body);
        let field = Rect::new(area.x + 1 + label.len() as u16, row, 3, 1).intersection(area);
        let field_ctx = ctx.with_read_only(self.is_running());
        self.minutes.render(frame, field, &field_ctx);

        let controls = Rect::new(area.x + 1, area.y.saturating_add(4), area.width.saturating_sub(1), 1)
            .intersection(area);
        self.controls.render(frame, controls, ctx);
        let presets = Rect::new(area.x + 1, area.y.saturating_add(6), area.width.saturating_sub(1), 1)
            .intersection(area);
        self.presets.render(frame, presets, ctx);
    }

    fn handle_event(&mut self, event: &Event, cx: &mut AppletContext<'_>) -> bool {
        let now = cx.now();
        match event {
            Event::Key(key)
                if key.kind != KeyEventKind::Release
                    && !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                match key.code {
                    KeyCode::Enter | KeyCode::Char(' ') => self.toggle(now),
                    KeyCode::Char('r') => self.reset(),
                    KeyCode::Char(ch) if ch.is_ascii_digit() && !self.is_running() => {
                        if self.minutes.value() == "0" {
                            self.minutes.clear();
                        }
                        self.minutes.handle_key(key);
                    }
                    KeyCode::Backspace | KeyCode::Delete | KeyCode::Left | KeyCode::Right
                        if !self.is_running() =>
                    {
                        self.minutes.handle_key(key);
                    }
                    _ => return false,
                }
                true
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (column, row) = to_render_space(self.area, mouse);
                if let Some(button) = self.controls.hit_test(column, row) {
                    match button {
                        START => self.start(now),
                        PAUSE => self.pause(),
                        RESET => self.reset(),
                        _ => return false,
                    }
                    return true;
                }
                if let Some(index) = self.presets.hit_test(column, row) {
                    self.preset(PRESETS[index]);
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    fn tick(&mut self, cx: &mut AppletContext<'_>) {
        let now = cx.now();
        while let Some(due) = self.next_tick {
            if now < due {
                break;
            }
            self.remaining = self.remaining.saturating_sub(1);
            self.next_tick = Some(due + SECOND);
            if self.remaining == 0 {
                tracing::debug!("timer finished");
                cx.show_dialog("Time's Up!", "Timer has finished.");
                self.reset();
                break;
            }
        }
    }

    fn teardown(&mut self) {
        self.next_tick = None;
    }

    fn is_active(&self) -> bool {
        self.is_running()
    }
}
