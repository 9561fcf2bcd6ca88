use std::fmt;
use std::str::FromStr;

use ratatui::style::Color;

/// An sRGB triple as typed into Tweak (`#rrggbb`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb` or `rrggbb`, case-insensitive.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_color(self) -> Color {
        map_rgb_to_color(self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| format!("not a #rrggbb color: {s:?}"))
    }
}

/// Map an RGB triple to a `ratatui::style::Color` appropriate for the
/// current terminal. If truecolor is available (`COLORTERM` contains
/// `truecolor` or `24bit`) we return `Color::Rgb(r,g,b)`. Otherwise
/// we return the nearest xterm-256 `Color::Indexed(idx)`.
pub fn map_rgb_to_color(r: u8, g: u8, b: u8) -> Color {
    if let Ok(var) = std::env::var("COLORTERM") {
        let lv = var.to_lowercase();
        if lv.contains("truecolor") || lv.contains("24bit") {
            return Color::Rgb(r, g, b);
        }
    }
    Color::Indexed(rgb_to_xterm_index(r, g, b))
}

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

fn rgb_to_xterm_index(r: u8, g: u8, b: u8) -> u8 {
    let (r6, g6, b6) = (to_6cube(r), to_6cube(g), to_6cube(b));
    let cube = (
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let gray_idx = rgb_to_gray_index(r, g, b);
    let gray = gray_level(gray_idx);

    if distance_sq((r, g, b), (gray, gray, gray)) < distance_sq((r, g, b), cube) {
        232 + gray_idx
    } else {
        16 + 36 * r6 + 6 * g6 + b6
    }
}

fn to_6cube(v: u8) -> u8 {
    ((v as u16 * 5 + 127) / 255) as u8
}

fn rgb_to_gray_index(r: u8, g: u8, b: u8) -> u8 {
    let avg = (r as u16 + g as u16 + b as u16) / 3;
    ((avg * 23 + 127) / 255) as u8
}

fn gray_level(idx: u8) -> u8 {
    (8 + idx as u16 * 10).min(255) as u8
}

fn distance_sq(a: (u8, u8, u8), b: (u8, u8, u8)) -> u32 {
    let d = |x: u8, y: u8| (x as i32 - y as i32).pow(2) as u32;
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!(Rgb::from_hex("#c0c0c0"), Some(Rgb(192, 192, 192)));
        assert_eq!(Rgb::from_hex("F2426B"), Some(Rgb(0xf2, 0x42, 0x6b)));
        assert_eq!(Rgb::from_hex("#c0c0c"), None);
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn display_is_lowercase_hex() {
        assert_eq!(Rgb(0xd2, 0xa4, 0xa4).to_string(), "#d2a4a4");
    }

    #[test]
    fn pure_colors_land_in_cube() {
        assert_eq!(rgb_to_xterm_index(255, 0, 0), 196);
        assert_eq!(rgb_to_xterm_index(0, 0, 255), 21);
    }

    #[test]
    fn mid_gray_prefers_gray_ramp() {
        let idx = rgb_to_xterm_index(128, 128, 128);
        assert!((232..=255).contains(&idx), "got {idx}");
    }

    #[test]
    fn map_rgb_to_color_returns_some_color() {
        match map_rgb_to_color(12, 34, 56) {
            Color::Rgb(_, _, _) | Color::Indexed(_) => {}
            other => panic!("unexpected color variant {other:?}"),
        }
    }
}
