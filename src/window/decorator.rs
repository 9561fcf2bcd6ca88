use ratatui::prelude::Rect;
use ratatui::style::Style;

use crate::layout::rect_contains;
use crate::theme::Theme;
use crate::ui::{UiFrame, truncate_to_width};
use crate::window::FloatRect;

/// What a click on a window's chrome means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    None,
    Drag,
    Minimize,
    Close,
}

/// Draws window chrome into an offscreen buffer whose origin is the
/// window's top-left corner, and maps local clicks back to actions.
pub trait WindowDecorator: std::fmt::Debug {
    fn render_window(
        &self,
        frame: &mut UiFrame<'_>,
        size: (u16, u16),
        title: &str,
        focused: bool,
        theme: &Theme,
    );

    /// `column`/`row` are relative to the window's top-left corner.
    fn hit_test(&self, size: (u16, u16), column: u16, row: u16) -> HeaderAction;
}

const CLOSE_LABEL: &str = " X ";
const MINIMIZE_LABEL: &str = " _ ";

/// Classic chrome: a colored title row with minimize and close buttons at
/// its right edge, and a single-line border around the content.
#[derive(Debug, Default)]
pub struct RetroDecorator;

impl RetroDecorator {
    fn close_rect(width: u16) -> Rect {
        Rect::new(width.saturating_sub(4), 0, 3, 1)
    }

    fn minimize_rect(width: u16) -> Rect {
        Rect::new(width.saturating_sub(8), 0, 3, 1)
    }

    fn buttons_fit(width: u16) -> bool {
        width >= 12
    }
}

impl WindowDecorator for RetroDecorator {
    fn render_window(
        &self,
        frame: &mut UiFrame<'_>,
        size: (u16, u16),
        title: &str,
        focused: bool,
        theme: &Theme,
    ) {
        let (width, height) = size;
        if width < 2 || height < 2 {
            return;
        }
        let full = Rect::new(0, 0, width, height);
        let border = theme.window_border();

        // Title row
        let header = Rect::new(0, 0, width, 1);
        let header_style = theme.title_bar(focused);
        frame.fill(header, header_style);
        let title_room = if Self::buttons_fit(width) {
            width.saturating_sub(10) as usize
        } else {
            width.saturating_sub(2) as usize
        };
        let label = truncate_to_width(title, title_room);
        frame.text(header, 1, 0, &label, header_style);
        if Self::buttons_fit(width) {
            let min = Self::minimize_rect(width);
            frame.text(min, min.x, 0, MINIMIZE_LABEL, theme.minimize_button());
            let close = Self::close_rect(width);
            frame.text(close, close.x, 0, CLOSE_LABEL, theme.close_button());
        }

        // Sides and bottom
        let right = width - 1;
        let bottom = height - 1;
        for y in 1..bottom {
            frame.text(full, 0, y, "│", border);
            frame.text(full, right, y, "│", border);
        }
        let mut bottom_line = String::with_capacity(width as usize * 3);
        bottom_line.push('└');
        for _ in 1..right {
            bottom_line.push('─');
        }
        bottom_line.push('┘');
        frame.text(full, 0, bottom, &bottom_line, border);

        let body = Rect::new(1, 1, width.saturating_sub(2), height.saturating_sub(2));
        frame.fill(body, theme.window_body());
    }

    fn hit_test(&self, size: (u16, u16), column: u16, row: u16) -> HeaderAction {
        let (width, _) = size;
        if row != 0 || column >= width {
            return HeaderAction::None;
        }
        if Self::buttons_fit(width) {
            if rect_contains(Self::close_rect(width), column, row) {
                return HeaderAction::Close;
            }
            if rect_contains(Self::minimize_rect(width), column, row) {
                return HeaderAction::Minimize;
            }
        }
        HeaderAction::Drag
    }
}

/// Draw the outline of a window in flight between its frame and its
/// taskbar entry. Only the outline is painted; whatever lies beneath the
/// interior stays visible.
pub fn render_ghost(frame: &mut UiFrame<'_>, rect: FloatRect, style: Style) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let right = rect.x + rect.width as i32 - 1;
    let bottom = rect.y + rect.height as i32 - 1;
    if rect.width == 1 || rect.height == 1 {
        for y in rect.y..=bottom {
            for x in rect.x..=right {
                frame.put_signed(x, y, "▪", style);
            }
        }
        return;
    }
    for x in rect.x + 1..right {
        frame.put_signed(x, rect.y, "─", style);
        frame.put_signed(x, bottom, "─", style);
    }
    for y in rect.y + 1..bottom {
        frame.put_signed(rect.x, y, "│", style);
        frame.put_signed(right, y, "│", style);
    }
    frame.put_signed(rect.x, rect.y, "┌", style);
    frame.put_signed(right, rect.y, "┐", style);
    frame.put_signed(rect.x, bottom, "└", style);
    frame.put_signed(right, bottom, "┘", style);
}
