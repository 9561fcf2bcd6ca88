//! Desktop icons: one launcher per registered applet, laid out in columns
//! of [`ICONS_PER_COLUMN`] from the top-left corner of the desktop.

use ratatui::layout::Rect;

use crate::applets::AppletRegistry;
use crate::constants::{ICON_CELL_HEIGHT, ICON_CELL_WIDTH, ICONS_PER_COLUMN};
use crate::layout::rect_contains;
use crate::theme::Theme;
use crate::ui::{UiFrame, centered_x, truncate_to_width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesktopIcon {
    pub app: &'static str,
    pub glyph: &'static str,
}

#[derive(Debug, Default)]
pub struct DesktopIconGrid {
    icons: Vec<DesktopIcon>,
    area: Rect,
    selected: Option<usize>,
}

impl DesktopIconGrid {
    pub fn new(registry: &AppletRegistry) -> Self {
        let icons = registry
            .entries()
            .iter()
            .map(|entry| DesktopIcon {
                app: entry.name,
                glyph: entry.icon,
            })
            .collect();
        Self {
            icons,
            area: Rect::default(),
            selected: None,
        }
    }

    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub fn icons(&self) -> &[DesktopIcon] {
        &self.icons
    }

    /// Cell of the icon at `index`. The first column starts one cell in
    /// from the desktop corner.
    pub fn cell_rect(&self, index: usize) -> Rect {
        let column = (index / ICONS_PER_COLUMN) as u16;
        let row = (index % ICONS_PER_COLUMN) as u16;
        Rect::new(
            self.area.x.saturating_add(1 + column * ICON_CELL_WIDTH),
            self.area.y.saturating_add(row * ICON_CELL_HEIGHT),
            ICON_CELL_WIDTH,
            ICON_CELL_HEIGHT,
        )
        .intersection(self.area)
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Option<&'static str> {
        (0..self.icons.len())
            .find(|i| rect_contains(self.cell_rect(*i), column, row))
            .map(|i| self.icons[i].app)
    }

    pub fn selected(&self) -> Option<&'static str> {
        self.selected.and_then(|i| self.icons.get(i)).map(|icon| icon.app)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Move the keyboard selection by whole cells, staying on the grid.
    pub fn move_selection(&mut self, columns: i32, rows: i32) {
        if self.icons.is_empty() {
            return;
        }
        let Some(current) = self.selected else {
            self.selected = Some(0);
            return;
        };
        let per_column = ICONS_PER_COLUMN as i32;
        let column = current as i32 / per_column + columns;
        let row = (current as i32 % per_column + rows).clamp(0, per_column - 1);
        let index = column * per_column + row;
        if column >= 0 && (index as usize) < self.icons.len() {
            self.selected = Some(index as usize);
        }
    }

    /// Draw the grid. `running` tells which apps currently have a window.
    pub fn render(&self, frame: &mut UiFrame<'_>, theme: &Theme, running: impl Fn(&str) -> bool) {
        for (index, icon) in self.icons.iter().enumerate() {
            let cell = self.cell_rect(index);
            if cell.width == 0 || cell.height == 0 {
                continue;
            }
            let highlighted = running(icon.app) || self.selected == Some(index);
            let style = theme.icon_label(highlighted);
            frame.text(cell, centered_x(cell, icon.glyph), cell.y, icon.glyph, style);
            let label = truncate_to_width(icon.app, ICON_CELL_WIDTH.saturating_sub(2) as usize);
            frame.text(cell, centered_x(cell, &label), cell.y.saturating_add(1), &label, style);
        }
    }
}
