//! The shared modal dialog.
//!
//! There is exactly one dialog surface per desktop. Showing a message or a
//! prompt replaces whatever the dialog was showing before; there is no
//! queue.

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::layout::{Alignment, Rect};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::{ButtonRow, Component, ComponentContext, TextField};
use crate::theme::Theme;
use crate::ui::UiFrame;
use crate::window::WindowHandle;

#[derive(Debug, Clone)]
enum DialogKind {
    Message,
    Prompt {
        target: WindowHandle,
        label: String,
        field: TextField,
    },
}

/// How an interaction with the dialog ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Dismissed,
    /// A prompt was answered; `value` goes back to `target`.
    Submitted { target: WindowHandle, value: String },
}

#[derive(Debug, Clone)]
pub struct Dialog {
    title: String,
    body: String,
    kind: DialogKind,
    visible: bool,
    width: u16,
    height: u16,
    buttons: ButtonRow,
}

impl Default for Dialog {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialog {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            kind: DialogKind::Message,
            visible: false,
            width: 50,
            height: 8,
            buttons: ButtonRow::new(["OK"]),
        }
    }

    /// Show a message, replacing anything currently shown.
    pub fn show(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.title = title.into();
        self.body = body.into();
        self.kind = DialogKind::Message;
        self.buttons = ButtonRow::new(["OK"]);
        self.visible = true;
    }

    /// Ask for a line of text on behalf of `target`.
    pub fn prompt(
        &mut self,
        title: impl Into<String>,
        label: impl Into<String>,
        initial: impl Into<String>,
        target: WindowHandle,
    ) {
        self.title = title.into();
        self.body.clear();
        self.kind = DialogKind::Prompt {
            target,
            label: label.into(),
            field: TextField::new().with_value(initial),
        };
        self.buttons = ButtonRow::new(["OK", "Cancel"]);
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.kind = DialogKind::Message;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_prompt(&self) -> bool {
        self.visible && matches!(self.kind, DialogKind::Prompt { .. })
    }

    /// The window a pending prompt will answer.
    pub fn prompt_target(&self) -> Option<WindowHandle> {
        match &self.kind {
            DialogKind::Prompt { target, .. } if self.visible => Some(*target),
            _ => None,
        }
    }

    /// Drop a pending prompt whose window went away.
    pub fn forget_target(&mut self, handle: WindowHandle) {
        if self.prompt_target() == Some(handle) {
            self.hide();
        }
    }

    /// Clamp dialog size to the available area to avoid drawing outside the buffer
    /// when the terminal is smaller than the preferred minimums.
    pub fn rect_for(&self, area: Rect) -> Rect {
        let mut width = area.width.min(self.width).max(1);
        let mut height = area.height.min(self.height).max(1);
        if area.width >= 24 {
            width = width.max(24);
        }
        if area.height >= 5 {
            height = height.max(5);
        }
        let x = area.x.saturating_add(area.width.saturating_sub(width) / 2);
        let y = area
            .y
            .saturating_add(area.height.saturating_sub(height) / 2);
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    fn submit(&mut self) -> DialogOutcome {
        let outcome = match &self.kind {
            DialogKind::Prompt { target, field, .. } => DialogOutcome::Submitted {
                target: *target,
                value: field.value().to_string(),
            },
            DialogKind::Message => DialogOutcome::Dismissed,
        };
        self.hide();
        outcome
    }

    fn dismiss(&mut self) -> DialogOutcome {
        self.hide();
        DialogOutcome::Dismissed
    }

    /// Feed an event to the dialog while it is visible. The dialog is
    /// modal: callers should treat every event as consumed while it is
    /// up. Returns an outcome once the dialog closes.
    pub fn handle_event(&mut self, event: &Event, theme: &Theme) -> Option<DialogOutcome> {
        if !self.visible {
            return None;
        }
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                KeyCode::Esc => Some(self.dismiss()),
                KeyCode::Enter => Some(self.submit()),
                _ => {
                    if let DialogKind::Prompt { field, .. } = &mut self.kind {
                        let ctx = ComponentContext::new(theme).with_focus(true);
                        field.handle_event(event, &ctx);
                    }
                    None
                }
            },
            Event::Paste(_) => {
                if let DialogKind::Prompt { field, .. } = &mut self.kind {
                    let ctx = ComponentContext::new(theme).with_focus(true);
                    field.handle_event(event, &ctx);
                }
                None
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                match self.buttons.hit_test(mouse.column, mouse.row) {
                    Some(0) => Some(self.submit()),
                    Some(_) => Some(self.dismiss()),
                    None => None,
                }
            }
            _ => None,
        }
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, theme: &Theme) {
        if !self.visible || area.width == 0 || area.height == 0 {
            return;
        }
        let rect = self.rect_for(area);
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .title(self.title.as_str())
            .title_style(theme.dialog_title())
            .borders(Borders::ALL)
            .style(theme.dialog());
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        if inner.height == 0 {
            return;
        }

        let button_row = Rect::new(inner.x, inner.bottom().saturating_sub(1), inner.width, 1);
        let text_area = Rect {
            height: inner.height.saturating_sub(1),
            ..inner
        };
        let ctx = ComponentContext::new(theme).with_focus(true);
        match &mut self.kind {
            DialogKind::Message => {
                let paragraph = Paragraph::new(self.body.as_str())
                    .style(theme.dialog())
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, text_area);
            }
            DialogKind::Prompt { label, field, .. } => {
                frame.text(text_area, text_area.x + 1, text_area.y, label, theme.dialog());
                let field_rect = Rect::new(
                    text_area.x + 1,
                    text_area.y.saturating_add(2),
                    text_area.width.saturating_sub(2),
                    1,
                )
                .intersection(text_area);
                field.render(frame, field_rect, &ctx);
            }
        }
        let buttons_x = button_row
            .x
            .saturating_add(button_row.width.saturating_sub(self.buttons.width()) / 2);
        self.buttons.render(
            frame,
            Rect {
                x: buttons_x,
                width: button_row.right().saturating_sub(buttons_x),
                ..button_row
            },
            &ctx,
        );
    }
}
