//! Canvas: a cell paint program, plus the text drawing format it saves.
//!
//! A saved drawing is a header line `drawing <width> <height>` followed by
//! one line per row, one palette code per cell (`.` for blank). Gallery
//! reads the same format.

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};

use super::{Applet, AppletArgs, AppletContext, AppletEntry, CANVAS, DesktopRequest, FILE_NEST};
use crate::component_context::ComponentContext;
use crate::components::{ButtonRow, to_render_space};
use crate::store::ART_FOLDER;
use crate::ui::UiFrame;

pub const ENTRY: AppletEntry = AppletEntry {
    name: CANVAS,
    icon: "[~]",
    size: (44, 18),
    create,
};

fn create(_args: &AppletArgs) -> Box<dyn Applet> {
    Box::new(Canvas::new())
}

pub const DRAWING_SIZE: (u16, u16) = (40, 14);
/// Largest drawing the saved format accepts.
pub const MAX_DRAWING_SIZE: (u16, u16) = (DRAWING_SIZE.0 * 4, DRAWING_SIZE.1 * 4);
pub const BRUSH_SIZES: std::ops::RangeInclusive<u8> = 1..=20;
const DEFAULT_BRUSH: u8 = 5;
const HEADER: &str = "drawing";

/// Paint colors and their one-letter codes in the saved format.
pub const PALETTE: [(char, &str, Color); 8] = [
    ('k', "Black", Color::Black),
    ('r', "Red", Color::Red),
    ('g', "Green", Color::Green),
    ('b', "Blue", Color::Blue),
    ('y', "Yellow", Color::Yellow),
    ('m', "Magenta", Color::Magenta),
    ('c', "Cyan", Color::Cyan),
    ('w', "White", Color::White),
];

const PAPER: Color = Color::White;

fn palette_color(code: char) -> Option<Color> {
    PALETTE.iter().find(|(c, ..)| *c == code).map(|(_, _, color)| *color)
}

/// A grid of painted cells. `None` is bare paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawing {
    width: u16,
    height: u16,
    cells: Vec<Option<char>>,
}

impl Drawing {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<char> {
        self.index(x, y).and_then(|i| self.cells[i])
    }

    /// Paint one cell; points off the paper are ignored.
    pub fn set(&mut self, x: i32, y: i32, code: char) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Some(code);
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Stamp a round brush of `radius` cells centred on `(x, y)`.
    pub fn stamp(&mut self, x: i32, y: i32, radius: i32, code: char) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius + radius {
                    self.set(x + dx, y + dy, code);
                }
            }
        }
    }

    /// Stamp along the straight segment between two points.
    pub fn stroke(&mut self, from: (i32, i32), to: (i32, i32), radius: i32, code: char) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.stamp(x, y, radius, code);
            if (x, y) == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = format!("{HEADER} {} {}\n", self.width, self.height);
        for row in self.cells.chunks(self.width.max(1) as usize) {
            out.extend(row.iter().map(|cell| cell.unwrap_or('.')));
            out.push('\n');
        }
        out
    }

    /// Read the saved format back. Anything else, including a header larger
    /// than [`MAX_DRAWING_SIZE`], yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.lines();
        let mut header = lines.next()?.split_whitespace();
        if header.next()? != HEADER {
            return None;
        }
        let width: u16 = header.next()?.parse().ok()?;
        let height: u16 = header.next()?.parse().ok()?;
        if width > MAX_DRAWING_SIZE.0 || height > MAX_DRAWING_SIZE.1 {
            return None;
        }
        let rows: Vec<&str> = lines.take(height as usize).collect();
        if rows.len() != height as usize {
            return None;
        }
        let mut drawing = Self::new(width, height);
        for (y, row) in rows.into_iter().enumerate() {
            if row.chars().count() != width as usize {
                return None;
            }
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    '.' => {}
                    code if palette_color(code).is_some() => {
                        drawing.cells[y * width as usize + x] = Some(code);
                    }
                    _ => return None,
                }
            }
        }
        Some(drawing)
    }

    /// Paint the drawing into `area`, clipped.
    pub fn render(&self, frame: &mut UiFrame<'_>, area: Rect) {
        let visible = Rect::new(area.x, area.y, self.width, self.height).intersection(area);
        frame.fill(visible, Style::default().bg(PAPER));
        for y in 0..visible.height {
            for x in 0..visible.width {
                if let Some(color) = self.get(x as i32, y as i32).and_then(palette_color) {
                    frame.text(
                        visible,
                        visible.x + x,
                        visible.y + y,
                        " ",
                        Style::default().bg(color),
                    );
                }
            }
        }
    }
}

const COLOR: usize = 0;
const SMALLER: usize = 1;
const BIGGER: usize = 2;
const CLEAR: usize = 3;
const SAVE: usize = 4;

#[derive(Debug)]
pub struct Canvas {
    drawing: Drawing,
    color: usize,
    brush: u8,
    /// Last painted point while a stroke is in progress.
    last: Option<(i32, i32)>,
    toolbar: ButtonRow,
    area: Rect,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            drawing: Drawing::new(DRAWING_SIZE.0, DRAWING_SIZE.1),
            color: 0,
            brush: DEFAULT_BRUSH,
            last: None,
            toolbar: ButtonRow::new(["Color", "-", "+", "Clear", "Save"]),
            area: Rect::default(),
        }
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    pub fn color_name(&self) -> &'static str {
        PALETTE[self.color].1
    }

    pub fn brush(&self) -> u8 {
        self.brush
    }

    pub fn cycle_color(&mut self) {
        self.color = (self.color + 1) % PALETTE.len();
    }

    pub fn set_brush(&mut self, size: u8) {
        self.brush = size.clamp(*BRUSH_SIZES.start(), *BRUSH_SIZES.end());
    }

    fn radius(&self) -> i32 {
        (self.brush as i32 - 1) / 4
    }

    fn code(&self) -> char {
        PALETTE[self.color].0
    }

    fn paper_rect(&self) -> Rect {
        Rect::new(
            self.area.x.saturating_add(1),
            self.area.y.saturating_add(2),
            DRAWING_SIZE.0,
            DRAWING_SIZE.1,
        )
    }

    /// Begin or continue a stroke at a paper coordinate.
    pub fn paint_to(&mut self, point: (i32, i32)) {
        let from = self.last.unwrap_or(point);
        self.drawing.stroke(from, point, self.radius(), self.code());
        self.last = Some(point);
    }

    pub fn lift(&mut self) {
        self.last = None;
    }

    fn request_save(&self, cx: &mut AppletContext<'_>) {
        let handle = cx.handle();
        cx.request(DesktopRequest::Prompt {
            handle,
            title: "Save Drawing".into(),
            label: "Enter filename:".into(),
            initial: "drawing.png".into(),
        });
    }

    fn press(&mut self, button: usize, cx: &mut AppletContext<'_>) {
        match button {
            COLOR => self.cycle_color(),
            SMALLER => self.set_brush(self.brush.saturating_sub(1)),
            BIGGER => self.set_brush(self.brush.saturating_add(1)),
            CLEAR => self.drawing.clear(),
            SAVE => self.request_save(cx),
            _ => {}
        }
    }
}

impl Applet for Canvas {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        self.area = area;
        let theme = ctx.theme();
        frame.fill(area, theme.window_body());
        if area.height == 0 {
            return;
        }
        let toolbar = Rect::new(area.x + 1, area.y, area.width.saturating_sub(1), 1).intersection(area);
        self.toolbar.render(frame, toolbar, ctx);
        let status = format!("{} / size {}", self.color_name(), self.brush);
        let swatch = Style::default().fg(PALETTE[self.color].2).bg(Color::Black);
        frame.text(area, area.x + 1, area.y.saturating_add(1), "■ ", swatch);
        frame.text(area, area.x + 3, area.y.saturating_add(1), &status, theme.hint());
        self.drawing.render(frame, self.paper_rect().intersection(area));
    }

    fn handle_event(&mut self, event: &Event, cx: &mut AppletContext<'_>) -> bool {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    if key.code == KeyCode::Char('s') {
                        self.request_save(cx);
                        return true;
                    }
                    return false;
                }
                let button = match key.code {
                    KeyCode::Char('c') => COLOR,
                    KeyCode::Char('-') => SMALLER,
                    KeyCode::Char('+') | KeyCode::Char('=') => BIGGER,
                    KeyCode::Char('x') => CLEAR,
                    _ => return false,
                };
                self.press(button, cx);
                true
            }
            Event::Mouse(mouse) => {
                let (column, row) = to_render_space(self.area, mouse);
                let paper = self.paper_rect();
                let point = (
                    column as i32 - paper.x as i32,
                    row as i32 - paper.y as i32,
                );
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        if let Some(button) = self.toolbar.hit_test(column, row) {
                            self.press(button, cx);
                            return true;
                        }
                        if paper.contains((column, row).into()) {
                            self.paint_to(point);
                            return true;
                        }
                        false
                    }
                    MouseEventKind::Drag(MouseButton::Left) if self.last.is_some() => {
                        self.paint_to(point);
                        true
                    }
                    MouseEventKind::Up(_) => {
                        let painting = self.last.is_some();
                        self.lift();
                        painting
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn on_prompt(&mut self, value: &str, cx: &mut AppletContext<'_>) {
        let filename = value.trim();
        if filename.is_empty() {
            cx.show_dialog("Error", "Please enter a filename.");
            return;
        }
        let path = format!("{ART_FOLDER}/{filename}");
        match cx.store_mut().save(&path, self.drawing.to_text()) {
            Ok(()) => {
                cx.show_dialog("Success", "Image saved successfully!");
                cx.request(DesktopRequest::Refresh(FILE_NEST.to_string()));
            }
            Err(err) => {
                tracing::warn!(path, error = %err, "canvas save rejected");
                cx.show_dialog(
                    "Error",
                    "Failed to save image. Ensure you are saving in the correct folder.",
                );
            }
        }
    }

    fn teardown(&mut self) {
        self.lift();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applets::{AppletFlags, AppletHost};
    use crate::window::WindowHandle;
    use std::time::Instant;

    fn context(host: &mut AppletHost) -> AppletContext<'_> {
        AppletContext::new(
            WindowHandle::new(3),
            AppletFlags::default(),
            Instant::now(),
            true,
            host,
        )
    }

    #[test]
    fn drawing_text_format_reads_back() {
        let mut drawing = Drawing::new(4, 2);
        drawing.set(1, 0, 'r');
        drawing.set(3, 1, 'k');
        let text = drawing.to_text();
        assert_eq!(text, "drawing 4 2\n.r..\n...k\n");
        assert_eq!(Drawing::parse(&text), Some(drawing));
    }

    #[test]
    fn parse_rejects_foreign_content() {
        assert_eq!(Drawing::parse("hello world"), None);
        assert_eq!(Drawing::parse("drawing 2 1\nzz\n"), None);
        assert_eq!(Drawing::parse("drawing 3 2\n...\n"), None);
    }

    #[test]
    fn parse_rejects_oversized_headers() {
        assert_eq!(Drawing::parse("drawing 65535 65535\n"), None);
        let (w, h) = MAX_DRAWING_SIZE;
        assert_eq!(Drawing::parse(&format!("drawing {} 1\n", w + 1)), None);
        assert_eq!(Drawing::parse(&format!("drawing 1 {}\n", h + 1)), None);
        let largest = Drawing::new(w, h);
        assert_eq!(Drawing::parse(&largest.to_text()), Some(largest));
    }

    #[test]
    fn stroke_connects_points() {
        let mut drawing = Drawing::new(10, 3);
        drawing.stroke((0, 1), (9, 1), 0, 'b');
        assert!((0..10).all(|x| drawing.get(x, 1) == Some('b')));
        assert_eq!(drawing.get(0, 0), None);
    }

    #[test]
    fn off_paper_points_are_ignored() {
        let mut drawing = Drawing::new(3, 3);
        drawing.stamp(-5, -5, 1, 'r');
        assert!(drawing.is_blank());
    }

    #[test]
    fn brush_is_clamped() {
        let mut canvas = Canvas::new();
        assert_eq!(canvas.brush(), 5);
        canvas.set_brush(0);
        assert_eq!(canvas.brush(), 1);
        canvas.set_brush(99);
        assert_eq!(canvas.brush(), 20);
    }

    #[test]
    fn keys_cycle_color_and_clear() {
        let mut host = AppletHost::default();
        let mut canvas = Canvas::new();
        canvas.paint_to((2, 2));
        canvas.lift();
        let mut cx = context(&mut host);
        let key = |code| Event::Key(crossterm::event::KeyEvent::new(code, KeyModifiers::NONE));
        assert!(canvas.handle_event(&key(KeyCode::Char('c')), &mut cx));
        assert_eq!(canvas.color_name(), "Red");
        assert!(canvas.handle_event(&key(KeyCode::Char('x')), &mut cx));
        assert!(canvas.drawing().is_blank());
    }

    #[test]
    fn ctrl_s_prompts_with_default_name() {
        let mut host = AppletHost::default();
        let canvas = Canvas::new();
        canvas.request_save(&mut context(&mut host));
        assert!(matches!(
            host.requests(),
            [DesktopRequest::Prompt { title, initial, .. }]
                if title == "Save Drawing" && initial == "drawing.png"
        ));
    }

    #[test]
    fn saving_stores_drawing_in_art() {
        let mut host = AppletHost::default();
        let mut canvas = Canvas::new();
        canvas.paint_to((5, 5));
        canvas.lift();
        canvas.on_prompt("cat.png", &mut context(&mut host));
        let saved = host.store.load("art/cat.png").unwrap();
        assert_eq!(Drawing::parse(saved).as_ref(), Some(canvas.drawing()));
        assert!(host.requests().contains(&DesktopRequest::Refresh(FILE_NEST.into())));
    }
}
