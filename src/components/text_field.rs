use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::style::Modifier;

use super::{Component, ComponentContext};
use crate::ui::UiFrame;

/// Single-line text input.
#[derive(Debug, Clone, Default)]
pub struct TextField {
    value: String,
    /// Cursor position in chars.
    cursor: usize,
    max_len: Option<usize>,
    placeholder: String,
    area: Rect,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        let mut value: String = value.into();
        if let Some(max) = self.max_len {
            value = value.chars().take(max).collect();
        }
        self.cursor = value.chars().count();
        self.value = value;
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Where the field was last drawn.
    pub fn area(&self) -> Rect {
        self.area
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.value
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        if self
            .max_len
            .is_some_and(|max| self.value.chars().count() >= max)
        {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
        true
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
        let len = self.value.chars().count();
        match key.code {
            KeyCode::Char(ch) => self.insert(ch),
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return true;
                }
                self.cursor -= 1;
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
                true
            }
            KeyCode::Delete => {
                if self.cursor < len {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(len);
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = len;
                true
            }
            _ => false,
        }
    }
}

impl Component for TextField {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        self.area = area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let theme = ctx.theme();
        let style = theme.input(ctx.focused());
        frame.fill(area, style);
        if self.value.is_empty() && !ctx.focused() {
            frame.text(area, area.x, area.y, &self.placeholder, theme.input(false).add_modifier(Modifier::DIM));
            return;
        }
        // Keep the cursor on screen by scrolling the text left.
        let width = area.width as usize;
        let start = (self.cursor + 1).saturating_sub(width);
        let visible: String = self.value.chars().skip(start).take(width).collect();
        frame.text(area, area.x, area.y, &visible, style);
        if ctx.focused() && !ctx.read_only() {
            let x = area.x.saturating_add((self.cursor - start) as u16);
            if x < area.right()
                && let Some(cell) = frame.buffer_mut().cell_mut((x, area.y))
            {
                cell.set_style(style.add_modifier(Modifier::REVERSED));
            }
        }
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext<'_>) -> bool {
        if ctx.read_only() {
            return false;
        }
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => {
                for ch in text.chars().filter(|c| !c.is_control()) {
                    self.insert(ch);
                }
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn editing_moves_cursor() {
        let mut field = TextField::new();
        for ch in "hllo".chars() {
            field.handle_key(&key(KeyCode::Char(ch)));
        }
        field.handle_key(&key(KeyCode::Home));
        field.handle_key(&key(KeyCode::Right));
        field.handle_key(&key(KeyCode::Char('e')));
        assert_eq!(field.value(), "hello");
        field.handle_key(&key(KeyCode::End));
        field.handle_key(&key(KeyCode::Backspace));
        assert_eq!(field.value(), "hell");
        field.handle_key(&key(KeyCode::Home));
        field.handle_key(&key(KeyCode::Delete));
        assert_eq!(field.value(), "ell");
    }

    #[test]
    fn max_len_caps_input() {
        let mut field = TextField::new().with_max_len(2);
        for ch in "2007".chars() {
            field.handle_key(&key(KeyCode::Char(ch)));
        }
        assert_eq!(field.value(), "20");
        field.set_value("abcdef");
        assert_eq!(field.value(), "ab");
    }

    #[test]
    fn control_chords_are_left_alone() {
        let mut field = TextField::new();
        let chord = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(!field.handle_key(&chord));
        assert!(field.is_empty());
    }

    #[test]
    fn multibyte_input_is_char_indexed() {
        let mut field = TextField::new().with_value("héllo");
        field.handle_key(&key(KeyCode::Left));
        field.handle_key(&key(KeyCode::Left));
        field.handle_key(&key(KeyCode::Left));
        field.handle_key(&key(KeyCode::Backspace));
        assert_eq!(field.value(), "hllo");
    }
}
