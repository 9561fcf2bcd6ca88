use ratatui::layout::Rect;

use super::ComponentContext;
use crate::layout::rect_contains;
use crate::ui::UiFrame;

#[derive(Debug, Clone)]
struct Button {
    label: String,
    enabled: bool,
    rect: Rect,
}

/// A horizontal row of push buttons, drawn as `[ label ]`.
#[derive(Debug, Clone, Default)]
pub struct ButtonRow {
    buttons: Vec<Button>,
}

impl ButtonRow {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            buttons: labels
                .into_iter()
                .map(|label| Button {
                    label: label.into(),
                    enabled: true,
                    rect: Rect::default(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.buttons.get(index).map(|b| b.label.as_str())
    }

    pub fn set_label(&mut self, index: usize, label: impl Into<String>) {
        if let Some(button) = self.buttons.get_mut(index) {
            button.label = label.into();
        }
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) {
        if let Some(button) = self.buttons.get_mut(index) {
            button.enabled = enabled;
        }
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.buttons.get(index).is_some_and(|b| b.enabled)
    }

    /// Total width the row needs.
    pub fn width(&self) -> u16 {
        self.buttons
            .iter()
            .map(|b| b.label.chars().count() as u16 + 4)
            .sum::<u16>()
            + self.buttons.len().saturating_sub(1) as u16
    }

    /// Lay the buttons out left to right from the start of `area` and draw
    /// them. Buttons that do not fit are skipped and cannot be clicked.
    pub fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        let theme = ctx.theme();
        let mut x = area.x;
        for button in &mut self.buttons {
            let text = format!("[ {} ]", button.label);
            let width = text.chars().count() as u16;
            if area.height == 0 || x.saturating_add(width) > area.right() {
                button.rect = Rect::default();
                continue;
            }
            button.rect = Rect::new(x, area.y, width, 1);
            let style = if button.enabled && !ctx.read_only() {
                theme.button()
            } else {
                theme.button_disabled()
            };
            frame.text(button.rect, x, area.y, &text, style);
            x = x.saturating_add(width + 1);
        }
    }

    /// Index of the enabled button at `(column, row)`, in the coordinate
    /// space of the last render.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<usize> {
        self.buttons
            .iter()
            .position(|b| b.enabled && b.rect.width > 0 && rect_contains(b.rect, column, row))
    }
}
