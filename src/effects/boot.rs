//! Power-on screen: the boot log types itself out, holds, then fades.

use std::time::{Duration, Instant};

use indoc::indoc;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};

use crate::ui::UiFrame;

pub const BOOT_TEXT: &str = indoc! {"
    Harshit WebOS BIOS v1.0
    Copyright (C) 1999 Harshit Systems

    Main Processor : Pentium III 450MHz
    Memory Testing : 65536K OK

    Detecting IDE Primary Master ... RETRO-HDD 8.4GB
    Detecting IDE Primary Slave  ... None
    Initializing Plug and Play Cards...

    Loading Harshit WebOS...
    Starting desktop..."};

const START_DELAY: Duration = Duration::from_millis(500);
const PER_CHAR: Duration = Duration::from_millis(10);
const HOLD: Duration = Duration::from_secs(1);
const FADE: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BootPhase {
    Waiting,
    /// Number of characters typed so far.
    Typing(usize),
    Holding,
    /// Fade progress in `0..1`.
    Fading(f32),
    Done,
}

#[derive(Debug, Clone)]
pub struct BootScreen {
    started: Instant,
    skipped: bool,
}

impl BootScreen {
    pub fn new(now: Instant) -> Self {
        Self {
            started: now,
            skipped: false,
        }
    }

    fn typing_time() -> Duration {
        PER_CHAR * BOOT_TEXT.chars().count() as u32
    }

    /// Total time from power-on until the desktop takes over.
    pub fn total() -> Duration {
        START_DELAY + Self::typing_time() + HOLD + FADE
    }

    pub fn phase(&self, now: Instant) -> BootPhase {
        if self.skipped {
            return BootPhase::Done;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let Some(typing) = elapsed.checked_sub(START_DELAY) else {
            return BootPhase::Waiting;
        };
        let typing_time = Self::typing_time();
        if typing < typing_time {
            let typed = (typing.as_millis() / PER_CHAR.as_millis()) as usize;
            return BootPhase::Typing(typed);
        }
        let after = typing - typing_time;
        if after < HOLD {
            return BootPhase::Holding;
        }
        let fading = after - HOLD;
        if fading < FADE {
            return BootPhase::Fading(fading.as_secs_f32() / FADE.as_secs_f32());
        }
        BootPhase::Done
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.phase(now) == BootPhase::Done
    }

    pub fn skip(&mut self) {
        self.skipped = true;
    }

    pub fn render(&self, frame: &mut UiFrame<'_>, area: Rect, now: Instant) {
        let phase = self.phase(now);
        let (typed, style) = match phase {
            BootPhase::Done => return,
            BootPhase::Waiting => (0, Style::default()),
            BootPhase::Typing(n) => (n, Style::default()),
            BootPhase::Holding => (usize::MAX, Style::default()),
            BootPhase::Fading(p) if p < 0.5 => (usize::MAX, Style::default().add_modifier(Modifier::DIM)),
            BootPhase::Fading(_) => (usize::MAX, Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)),
        };
        let base = Style::default().bg(Color::Black).fg(Color::Gray);
        frame.fill(area, base);
        let style = base.patch(style);
        let shown: String = BOOT_TEXT.chars().take(typed).collect();
        let mut last = (area.x, area.y);
        for (row, line) in shown.lines().enumerate() {
            let y = area.y.saturating_add(1 + row as u16);
            frame.text(area, area.x + 2, y, line, style);
            last = (area.x + 2 + line.chars().count() as u16, y);
        }
        if matches!(phase, BootPhase::Typing(_) | BootPhase::Holding) {
            frame.text(area, last.0, last.1, "_", style);
        }
    }
}
