//! Tunebox: a three-track music player.
//!
//! There is no audio backend; playback is simulated against each track's
//! length so progress, auto-advance and stop-on-close behave as they would
//! with real sound.

use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Modifier;

use super::{Applet, AppletArgs, AppletContext, AppletEntry, TUNEBOX};
use crate::component_context::ComponentContext;
use crate::components::{ButtonRow, Component, ListComponent, to_render_space};
use crate::ui::{UiFrame, truncate_to_width};

pub const ENTRY: AppletEntry = AppletEntry {
    name: TUNEBOX,
    icon: "[>]",
    size: (38, 12),
    create,
};

fn create(_args: &AppletArgs) -> Box<dyn Applet> {
    Box::new(Tunebox::new())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    pub title: &'static str,
    pub length: Duration,
}

pub const TRACKS: [Track; 3] = [
    Track {
        title: "Track 1",
        length: Duration::from_secs(185),
    },
    Track {
        title: "Track 2",
        length: Duration::from_secs(212),
    },
    Track {
        title: "Track 3",
        length: Duration::from_secs(158),
    },
];

const VOLUME_STEP: u8 = 10;

const PREV: usize = 0;
const PLAY: usize = 1;
const NEXT: usize = 2;
const QUIETER: usize = 3;
const LOUDER: usize = 4;

fn clock(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[derive(Debug)]
pub struct Tunebox {
    current: usize,
    position: Duration,
    /// When playback last advanced; `None` while paused.
    playing_since: Option<Instant>,
    volume: u8,
    controls: ButtonRow,
    playlist: ListComponent,
    area: Rect,
}

impl Default for Tunebox {
    fn default() -> Self {
        Self::new()
    }
}

impl Tunebox {
    pub fn new() -> Self {
        let mut playlist = ListComponent::new();
        playlist.set_items(TRACKS.iter().map(|t| t.title.to_string()).collect());
        Self {
            current: 0,
            position: Duration::ZERO,
            playing_since: None,
            volume: 100,
            controls: ButtonRow::new(["|<", "Play", ">|", "-", "+"]),
            playlist,
            area: Rect::default(),
        }
    }

    pub fn current(&self) -> Track {
        TRACKS[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_playing(&self) -> bool {
        self.playing_since.is_some()
    }

    pub fn toggle_play(&mut self, now: Instant) {
        self.playing_since = match self.playing_since {
            Some(_) => None,
            None => Some(now),
        };
        let label = if self.is_playing() { "Pause" } else { "Play" };
        self.controls.set_label(PLAY, label);
    }

    /// Switch tracks; playback continues if it was running.
    pub fn load(&mut self, index: usize, now: Instant) {
        self.current = index % TRACKS.len();
        self.position = Duration::ZERO;
        if self.playing_since.is_some() {
            self.playing_since = Some(now);
        }
        self.playlist.set_selected(self.current);
        tracing::debug!(track = self.current().title, "tunebox loaded track");
    }

    pub fn next(&mut self, now: Instant) {
        self.load(self.current + 1, now);
    }

    pub fn prev(&mut self, now: Instant) {
        self.load(self.current + TRACKS.len() - 1, now);
    }

    /// Pick a track from the playlist and make sure it plays.
    pub fn select(&mut self, index: usize, now: Instant) {
        self.load(index, now);
        if !self.is_playing() {
            self.toggle_play(now);
        }
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }

    fn advance(&mut self, now: Instant) {
        let Some(since) = self.playing_since else {
            return;
        };
        self.position += now.saturating_duration_since(since);
        self.playing_since = Some(now);
        while self.position >= self.current().length {
            let overflow = self.position - self.current().length;
            self.current = (self.current + 1) % TRACKS.len();
            self.playlist.set_selected(self.current);
            self.position = overflow;
        }
    }

    fn stop(&mut self) {
        self.playing_since = None;
        self.controls.set_label(PLAY, "Play");
    }
}

impl Applet for Tunebox {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        self.area = area;
        let body = ctx.theme().window_body();
        frame.fill(area, body);
        if area.height < 2 {
            return;
        }
        let track = self.current();
        frame.text(area, area.x + 1, area.y, track.title, body.add_modifier(Modifier::BOLD));
        frame.text(area, area.x + 1, area.y + 1, "Tunebox", ctx.theme().hint());

        // Progress: "0:42 [=====-----] 3:05"
        let elapsed = clock(self.position);
        let total = clock(track.length);
        let bar_width = area
            .width
            .saturating_sub(elapsed.len() as u16 + total.len() as u16 + 6) as usize;
        let filled = if track.length.is_zero() {
            0
        } else {
            ((self.position.as_secs_f64() / track.length.as_secs_f64()) * bar_width as f64) as usize
        }
        .min(bar_width);
        let bar = format!(
            "{elapsed} [{}{}] {total}",
            "=".repeat(filled),
            "-".repeat(bar_width - filled)
        );
        frame.text(area, area.x + 1, area.y.saturating_add(2), &bar, body);

        let controls = Rect::new(area.x + 1, area.y.saturating_add(3), area.width.saturating_sub(1), 1)
            .intersection(area);
        self.controls.render(frame, controls, ctx);
        let volume = format!("Vol {}%", self.volume);
        let vx = area.right().saturating_sub(volume.len() as u16 + 1);
        frame.text(area, vx, area.y.saturating_add(4), &truncate_to_width(&volume, 8), body);

        let list = Rect::new(
            area.x + 1,
            area.y.saturating_add(5),
            area.width.saturating_sub(2),
            area.height.saturating_sub(5),
        )
        .intersection(area);
        self.playlist.render(frame, list, ctx);
    }

    fn handle_event(&mut self, event: &Event, cx: &mut AppletContext<'_>) -> bool {
        let now = cx.now();
        self.advance(now);
        match event {
            Event::Key(key)
                if key.kind != KeyEventKind::Release
                    && !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                match key.code {
                    KeyCode::Char(' ') | KeyCode::Char('p') => self.toggle_play(now),
                    KeyCode::Char('n') | KeyCode::Right => self.next(now),
                    KeyCode::Char('b') | KeyCode::Left => self.prev(now),
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        self.set_volume(self.volume.saturating_add(VOLUME_STEP))
                    }
                    KeyCode::Char('-') => self.set_volume(self.volume.saturating_sub(VOLUME_STEP)),
                    KeyCode::Up => self.playlist.move_selection(-1),
                    KeyCode::Down => self.playlist.move_selection(1),
                    KeyCode::Enter => self.select(self.playlist.selected(), now),
                    _ => return false,
                }
                true
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (column, row) = to_render_space(self.area, mouse);
                if let Some(button) = self.controls.hit_test(column, row) {
                    match button {
                        PREV => self.prev(now),
                        PLAY => self.toggle_play(now),
                        NEXT => self.next(now),
                        QUIETER => self.set_volume(self.volume.saturating_sub(VOLUME_STEP)),
                        LOUDER => self.set_volume(self.volume.saturating_add(VOLUME_STEP)),
                        _ => {}
                    }
                    return true;
                }
                if let Some(index) = self.playlist.item_at(column, row) {
                    self.select(index, now);
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    fn tick(&mut self, cx: &mut AppletContext<'_>) {
        self.advance(cx.now());
    }

    fn teardown(&mut self) {
        self.stop();
    }

    fn is_active(&self) -> bool {
        self.is_playing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_first_track_at_full_volume() {
        let player = Tunebox::new();
        assert_eq!(player.current().title, "Track 1");
        assert_eq!(player.volume(), 100);
        assert!(!player.is_playing());
    }

    #[test]
    fn prev_and_next_wrap() {
        let now = Instant::now();
        let mut player = Tunebox::new();
        player.prev(now);
        assert_eq!(player.current_index(), 2);
        player.next(now);
        assert_eq!(player.current_index(), 0);
    }

    #[test]
    fn playback_progresses_and_advances() {
        let now = Instant::now();
        let mut player = Tunebox::new();
        player.toggle_play(now);
        player.advance(now + Duration::from_secs(60));
        assert_eq!(player.position(), Duration::from_secs(60));
        player.advance(now + Duration::from_secs(190));
        assert_eq!(player.current_index(), 1);
        assert_eq!(player.position(), Duration::from_secs(5));
    }

    #[test]
    fn pause_freezes_position() {
        let now = Instant::now();
        let mut player = Tunebox::new();
        player.toggle_play(now);
        player.advance(now + Duration::from_secs(10));
        player.toggle_play(now + Duration::from_secs(10));
        player.advance(now + Duration::from_secs(100));
        assert_eq!(player.position(), Duration::from_secs(10));
    }

    #[test]
    fn selecting_from_playlist_plays() {
        let now = Instant::now();
        let mut player = Tunebox::new();
        player.select(2, now);
        assert!(player.is_playing());
        assert_eq!(player.current().title, "Track 3");
    }

    #[test]
    fn volume_is_clamped() {
        let mut player = Tunebox::new();
        player.set_volume(250);
        assert_eq!(player.volume(), 100);
        player.set_volume(0);
        assert_eq!(player.volume(), 0);
    }

    #[test]
    fn teardown_stops_playback() {
        let mut player = Tunebox::new();
        player.toggle_play(Instant::now());
        assert!(player.is_active());
        player.teardown();
        assert!(!player.is_active());
    }
}
