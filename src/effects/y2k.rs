//! The 2007 easter egg: a run of fake system errors, a dramatic pause,
//! fireworks, and an end screen offering a reboot.

use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::ui::{UiFrame, centered_x};
use crate::utils::XorShift;

pub const ERRORS: [&str; 5] = [
    "CRITICAL ERROR: System time corruption detected",
    "WARNING: Date overflow imminent",
    "FATAL ERROR: Memory allocation failed",
    "ERROR: Operating system crash detected",
    "SYSTEM FAILURE: Time paradox detected",
];

const BUT_WAIT: [&str; 4] = ["But wait", "But wait.", "But wait..", "But wait..."];

/// Stage start offsets from the moment the sequence was triggered.
const ERROR_STEP: Duration = Duration::from_secs(1);
const BUT_WAIT_AT: [Duration; 4] = [
    Duration::from_secs(5),
    Duration::from_secs(6),
    Duration::from_secs(7),
    Duration::from_secs(8),
];
const BLACKOUT_AT: Duration = Duration::from_secs(10);
const CELEBRATION_AT: Duration = Duration::from_secs(15);
const END_AT: Duration = Duration::from_secs(35);

const SIM_STEP: Duration = Duration::from_millis(33);
const LAUNCH_EVERY: Duration = Duration::from_millis(500);
const RISE_STEPS: u32 = 3;
const PARTICLES_PER_BURST: usize = 40;
const GRAVITY: f32 = 0.015;
const FADE_PER_STEP: f32 = 0.02;

const HUES: [Color; 7] = [
    Color::Red,
    Color::LightRed,
    Color::Yellow,
    Color::LightGreen,
    Color::LightCyan,
    Color::LightBlue,
    Color::LightMagenta,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Y2kStage {
    /// One of [`ERRORS`], shown over the desktop.
    Error(usize),
    ButWait(usize),
    Blackout,
    Celebration,
    End,
}

impl Y2kStage {
    /// Whether the stage replaces the desktop entirely.
    pub fn covers_desktop(self) -> bool {
        !matches!(self, Self::Error(_))
    }
}

#[derive(Debug, Clone)]
struct Rocket {
    x: f32,
    y: f32,
    target_y: f32,
    color: Color,
    steps: u32,
}

#[derive(Debug, Clone)]
struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    alpha: f32,
    color: Color,
}

#[derive(Debug)]
pub struct Y2kSequence {
    started: Instant,
    codes: [u16; 5],
    rng: XorShift,
    rockets: Vec<Rocket>,
    particles: Vec<Particle>,
    /// Simulation time already stepped, measured from the celebration start.
    simulated: Duration,
    next_launch: Duration,
    area: Rect,
}

impl Y2kSequence {
    pub fn new(now: Instant, mut rng: XorShift) -> Self {
        let codes = std::array::from_fn(|_| rng.below(9999) as u16);
        tracing::debug!("y2k sequence started");
        Self {
            started: now,
            codes,
            rng,
            rockets: Vec::new(),
            particles: Vec::new(),
            simulated: Duration::ZERO,
            next_launch: Duration::ZERO,
            area: Rect::default(),
        }
    }

    pub fn stage(&self, now: Instant) -> Y2kStage {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed >= END_AT {
            Y2kStage::End
        } else if elapsed >= CELEBRATION_AT {
            Y2kStage::Celebration
        } else if elapsed >= BLACKOUT_AT {
            Y2kStage::Blackout
        } else if let Some(i) = BUT_WAIT_AT.iter().rposition(|at| elapsed >= *at) {
            Y2kStage::ButWait(i)
        } else {
            let i = (elapsed.as_millis() / ERROR_STEP.as_millis()) as usize;
            Y2kStage::Error(i.min(ERRORS.len() - 1))
        }
    }

    pub fn error_code(&self, index: usize) -> Option<u16> {
        self.codes.get(index).copied()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Advance the fireworks in fixed steps up to `now`.
    pub fn tick(&mut self, now: Instant) {
        let Some(celebrating) = now
            .saturating_duration_since(self.started)
            .checked_sub(CELEBRATION_AT)
        else {
            return;
        };
        let celebrating = celebrating.min(END_AT - CELEBRATION_AT);
        while self.simulated + SIM_STEP <= celebrating {
            self.simulated += SIM_STEP;
            if self.simulated >= self.next_launch {
                self.launch();
                self.next_launch += LAUNCH_EVERY;
            }
            self.step();
        }
    }

    fn launch(&mut self) {
        let width = self.area.width.max(1) as f32;
        let height = self.area.height.max(1) as f32;
        let color = HUES[self.rng.below(HUES.len() as u64) as usize];
        self.rockets.push(Rocket {
            x: self.rng.unit() * width,
            y: height,
            target_y: self.rng.unit() * height / 2.0,
            color,
            steps: 0,
        });
    }

    fn step(&mut self) {
        let mut bursts = Vec::new();
        self.rockets.retain_mut(|rocket| {
            rocket.steps += 1;
            if rocket.steps % RISE_STEPS == 0 {
                rocket.y -= 1.0;
            }
            if rocket.y <= rocket.target_y {
                bursts.push((rocket.x, rocket.y, rocket.color));
                false
            } else {
                true
            }
        });
        for (x, y, color) in bursts {
            for _ in 0..PARTICLES_PER_BURST {
                let speed = self.rng.unit() * 0.3 + 0.1;
                let angle = self.rng.unit() * std::f32::consts::TAU;
                self.particles.push(Particle {
                    x,
                    y,
                    // Cells are about twice as tall as they are wide.
                    vx: angle.cos() * speed * 2.0,
                    vy: angle.sin() * speed,
                    alpha: 1.0,
                    color,
                });
            }
        }
        for particle in &mut self.particles {
            particle.vy += GRAVITY;
            particle.x += particle.vx;
            particle.y += particle.vy;
            particle.alpha -= FADE_PER_STEP;
        }
        self.particles.retain(|p| p.alpha > 0.0);
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, now: Instant) {
        self.area = area;
        match self.stage(now) {
            Y2kStage::Error(i) => self.render_error(frame, area, i),
            Y2kStage::ButWait(i) => {
                let style = Style::default().bg(Color::White).fg(Color::Black);
                frame.fill(area, style);
                let text = BUT_WAIT[i];
                let y = area.y + area.height * 2 / 5;
                frame.text(area, centered_x(area, text), y, text, style.add_modifier(Modifier::BOLD));
            }
            Y2kStage::Blackout => frame.fill(area, Style::default().bg(Color::Black)),
            Y2kStage::Celebration => self.render_celebration(frame, area, now),
            Y2kStage::End => render_end(frame, area),
        }
    }

    fn render_error(&self, frame: &mut UiFrame<'_>, area: Rect, index: usize) {
        let width = 54.min(area.width);
        let height = 7.min(area.height);
        let rect = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );
        let style = Style::default().bg(Color::Gray).fg(Color::Black);
        let code = self.error_code(index).unwrap_or(0);
        let body = format!("{}\n\nCode: Harshit WebOS-{code}", ERRORS[index]);
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" SYSTEM ERROR ")
            .title_style(style.fg(Color::Red).add_modifier(Modifier::BOLD))
            .style(style);
        let paragraph = Paragraph::new(body)
            .block(block)
            .wrap(Wrap { trim: true })
            .style(style);
        frame.render_widget(paragraph, rect);
    }

    fn render_celebration(&self, frame: &mut UiFrame<'_>, area: Rect, now: Instant) {
        frame.fill(area, Style::default().bg(Color::Black));
        for rocket in &self.rockets {
            put(frame, area, rocket.x, rocket.y, "|", Style::default().fg(rocket.color));
        }
        for particle in &self.particles {
            let mut style = Style::default().fg(particle.color);
            if particle.alpha < 0.4 {
                style = style.add_modifier(Modifier::DIM);
            }
            let glyph = if particle.alpha > 0.7 { "*" } else { "." };
            put(frame, area, particle.x, particle.y, glyph, style);
        }
        let shown = now.saturating_duration_since(self.started).saturating_sub(CELEBRATION_AT);
        let title = "Welcome to 2007!";
        let title_y = area.y + area.height / 10 + 1;
        frame.text(
            area,
            centered_x(area, title),
            title_y,
            title,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        );
        if shown >= Duration::from_secs(2) {
            let fact = "Fun Fact: This was the year Harshit was born";
            frame.text(
                area,
                centered_x(area, fact),
                title_y.saturating_add(2),
                fact,
                Style::default().fg(Color::Gray),
            );
        }
    }
}

fn put(frame: &mut UiFrame<'_>, area: Rect, x: f32, y: f32, glyph: &str, style: Style) {
    frame.put_signed(
        area.x as i32 + x.floor() as i32,
        area.y as i32 + y.floor() as i32,
        glyph,
        style.bg(Color::Black),
    );
}

fn render_end(frame: &mut UiFrame<'_>, area: Rect) {
    let base = Style::default().bg(Color::Black).fg(Color::White);
    frame.fill(area, base);
    let y = area.y + area.height * 3 / 10;
    let lines = [
        ("Thanks for Using!", base.add_modifier(Modifier::BOLD)),
        ("", base),
        ("Created by Harshit", base.fg(Color::DarkGray)),
        ("", base),
        ("[ r ] Let's do a reboot", base.fg(Color::White).bg(Color::DarkGray)),
    ];
    for (i, (text, style)) in lines.into_iter().enumerate() {
        frame.text(area, centered_x(area, text), y.saturating_add(i as u16), text, style);
    }
}
