use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::style::Modifier;

use super::{Component, ComponentContext};
use crate::ui::UiFrame;

/// Multi-line plain text editor. Lines are kept unwrapped; the view
/// scrolls to follow the cursor.
#[derive(Debug, Clone)]
pub struct TextArea {
    lines: Vec<String>,
    row: usize,
    col: usize,
    scroll: usize,
    area: Rect,
}

impl Default for TextArea {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            scroll: 0,
            area: Rect::default(),
        }
    }
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

fn byte_index(line: &str, chars: usize) -> usize {
    line.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

impl TextArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        let mut area = Self::default();
        area.set_text(text);
        area
    }

    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.row = 0;
        self.col = 0;
        self.scroll = 0;
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    /// Cursor as (line, column) in chars.
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn clear(&mut self) {
        self.set_text("");
    }

    fn current_len(&self) -> usize {
        char_len(&self.lines[self.row])
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.newline();
            return;
        }
        if ch.is_control() {
            return;
        }
        let line = &mut self.lines[self.row];
        let at = byte_index(line, self.col);
        line.insert(at, ch);
        self.col += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars().filter(|c| *c != '\r') {
            self.insert_char(ch);
        }
    }

    fn newline(&mut self) {
        let line = &mut self.lines[self.row];
        let at = byte_index(line, self.col);
        let rest = line.split_off(at);
        self.row += 1;
        self.lines.insert(self.row, rest);
        self.col = 0;
    }

    fn backspace(&mut self) {
        if self.col > 0 {
            self.col -= 1;
            let line = &mut self.lines[self.row];
            let at = byte_index(line, self.col);
            line.remove(at);
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.current_len();
            self.lines[self.row].push_str(&line);
        }
    }

    fn delete(&mut self) {
        if self.col < self.current_len() {
            let line = &mut self.lines[self.row];
            let at = byte_index(line, self.col);
            line.remove(at);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        let target = if delta.is_negative() {
            self.row.saturating_sub(delta.unsigned_abs())
        } else {
            (self.row + delta as usize).min(self.lines.len() - 1)
        };
        self.row = target;
        self.col = self.col.min(self.current_len());
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        let page = self.area.height.max(1) as isize;
        match key.code {
            KeyCode::Char(ch) => self.insert_char(ch),
            KeyCode::Enter => self.newline(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => {
                if self.col > 0 {
                    self.col -= 1;
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = self.current_len();
                }
            }
            KeyCode::Right => {
                if self.col < self.current_len() {
                    self.col += 1;
                } else if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = 0;
                }
            }
            KeyCode::Up => self.move_vertical(-1),
            KeyCode::Down => self.move_vertical(1),
            KeyCode::PageUp => self.move_vertical(-page),
            KeyCode::PageDown => self.move_vertical(page),
            KeyCode::Home => self.col = 0,
            KeyCode::End => self.col = self.current_len(),
            _ => return false,
        }
        true
    }

    /// Keys that only move the view, for read-only viewers.
    fn handle_view_key(&mut self, key: &KeyEvent) -> bool {
        let page = self.area.height.max(1) as isize;
        match key.code {
            KeyCode::Up => self.move_vertical(-1),
            KeyCode::Down => self.move_vertical(1),
            KeyCode::PageUp => self.move_vertical(-page),
            KeyCode::PageDown => self.move_vertical(page),
            _ => return false,
        }
        true
    }

    fn keep_cursor_in_view(&mut self, view: usize) {
        if view == 0 {
            self.scroll = 0;
            return;
        }
        if self.row < self.scroll {
            self.scroll = self.row;
        } else if self.row >= self.scroll + view {
            self.scroll = self.row + 1 - view;
        }
    }
}

impl Component for TextArea {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        self.area = area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let style = ctx.theme().window_body();
        frame.fill(area, style);
        self.keep_cursor_in_view(area.height as usize);

        let width = area.width as usize;
        let hscroll = (self.col + 1).saturating_sub(width);
        for (offset, line) in self
            .lines
            .iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .enumerate()
        {
            let visible: String = line.chars().skip(hscroll).take(width).collect();
            frame.text(area, area.x, area.y + offset as u16, &visible, style);
        }

        if ctx.focused() && !ctx.read_only() {
            let x = area.x.saturating_add((self.col - hscroll) as u16);
            let y = area.y.saturating_add((self.row - self.scroll) as u16);
            if x < area.right()
                && y < area.bottom()
                && let Some(cell) = frame.buffer_mut().cell_mut((x, y))
            {
                cell.set_style(style.add_modifier(Modifier::REVERSED));
            }
        }
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext<'_>) -> bool {
        match event {
            Event::Key(key) if ctx.read_only() => self.handle_view_key(key),
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) if !ctx.read_only() => {
                self.insert_str(text);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_newlines() {
        let mut area = TextArea::new();
        area.insert_str("ab\ncd");
        assert_eq!(area.text(), "ab\ncd");
        assert_eq!(area.cursor(), (1, 2));
        area.handle_key(&key(KeyCode::Home));
        area.handle_key(&key(KeyCode::Backspace));
        assert_eq!(area.text(), "abcd");
        assert_eq!(area.cursor(), (0, 2));
        area.handle_key(&key(KeyCode::Enter));
        assert_eq!(area.lines(), &["ab".to_string(), "cd".to_string()]);
    }

    #[test]
    fn delete_joins_lines() {
        let mut area = TextArea::from_text("one\ntwo");
        area.handle_key(&key(KeyCode::End));
        area.handle_key(&key(KeyCode::Delete));
        assert_eq!(area.text(), "onetwo");
    }

    #[test]
    fn vertical_moves_clamp_column() {
        let mut area = TextArea::from_text("long line\nx");
        area.handle_key(&key(KeyCode::End));
        area.handle_key(&key(KeyCode::Down));
        assert_eq!(area.cursor(), (1, 1));
        area.handle_key(&key(KeyCode::Down));
        assert_eq!(area.cursor(), (1, 1));
    }

    #[test]
    fn read_only_ignores_edits() {
        let theme = Theme::default();
        let ctx = ComponentContext::new(&theme).with_read_only(true);
        let mut area = TextArea::from_text("fixed");
        assert!(!area.handle_event(&Event::Key(key(KeyCode::Char('x'))), &ctx));
        assert!(!area.handle_event(&Event::Paste("y".into()), &ctx));
        assert_eq!(area.text(), "fixed");
    }

    #[test]
    fn blank_detection_ignores_whitespace() {
        assert!(TextArea::from_text("  \n\t").is_blank());
        assert!(!TextArea::from_text(" a ").is_blank());
    }
}
