use crossterm::event::{Event, KeyCode, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::widgets::{List, ListItem, ListState};

use super::{Component, ComponentContext};
use crate::layout::rect_contains;
use crate::ui::UiFrame;

/// Scrolling single-selection list.
#[derive(Debug, Clone, Default)]
pub struct ListComponent {
    items: Vec<String>,
    selected: usize,
    offset: usize,
    area: Rect,
}

impl ListComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    pub fn set_selected(&mut self, selected: usize) {
        self.selected = selected.min(self.items.len().saturating_sub(1));
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.items.is_empty() {
            self.selected = 0;
            return;
        }
        if delta.is_negative() {
            self.selected = self.selected.saturating_sub(delta.unsigned_abs());
        } else {
            self.selected = (self.selected + delta as usize).min(self.items.len() - 1);
        }
    }

    fn keep_selected_in_view(&mut self, view: usize) {
        if view == 0 || self.items.is_empty() {
            self.offset = 0;
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + view {
            self.offset = self.selected + 1 - view;
        }
    }

    /// Item under `(column, row)` in the space of the last render.
    pub fn item_at(&self, column: u16, row: u16) -> Option<usize> {
        if !rect_contains(self.area, column, row) {
            return None;
        }
        let index = self.offset + (row - self.area.y) as usize;
        (index < self.items.len()).then_some(index)
    }
}

impl Component for ListComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        self.area = area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let base = ctx.theme().window_body();
        frame.fill(area, base);
        let view = area.height as usize;
        self.keep_selected_in_view(view);

        let items = self
            .items
            .iter()
            .skip(self.offset)
            .take(view)
            .map(|item| ListItem::new(item.clone()))
            .collect::<Vec<_>>();

        let mut state = ListState::default();
        if !self.items.is_empty() && self.selected >= self.offset {
            state.select(Some(self.selected - self.offset));
        }
        let highlight = if ctx.focused() {
            base.add_modifier(Modifier::REVERSED)
        } else {
            base.add_modifier(Modifier::BOLD)
        };
        let list = List::new(items).style(base).highlight_style(highlight);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ComponentContext<'_>) -> bool {
        match event {
            Event::Key(key) => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection(-1);
                    true
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection(1);
                    true
                }
                KeyCode::Home => {
                    self.set_selected(0);
                    true
                }
                KeyCode::End => {
                    self.set_selected(self.items.len().saturating_sub(1));
                    true
                }
                _ => false,
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    match self.item_at(mouse.column, mouse.row) {
                        Some(index) => {
                            self.selected = index;
                            true
                        }
                        None => false,
                    }
                }
                MouseEventKind::ScrollUp => {
                    self.move_selection(-1);
                    true
                }
                MouseEventKind::ScrollDown => {
                    self.move_selection(1);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}
