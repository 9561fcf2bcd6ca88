//! Tweak: edit the five theme colors and the desktop year.

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::Rect;

use super::{Applet, AppletArgs, AppletContext, AppletEntry, DesktopRequest, TWEAK};
use crate::component_context::ComponentContext;
use crate::components::{ButtonRow, Component, TextField, to_render_space};
use crate::constants::Y2K_TRIGGER_YEAR;
use crate::term_color::Rgb;
use crate::theme::Theme;
use crate::ui::UiFrame;

pub const ENTRY: AppletEntry = AppletEntry {
    name: TWEAK,
    icon: "{*}",
    size: (40, 14),
    create,
};

fn create(_args: &AppletArgs) -> Box<dyn Applet> {
    Box::new(Tweak::new())
}

const LABELS: [&str; 6] = [
    "Button Color:",
    "Taskbar Color:",
    "Window Title Color:",
    "Close Button Color:",
    "Minimize Button Color:",
    "Set Year:",
];
const YEAR: usize = 5;
const LABEL_WIDTH: u16 = 23;
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1970..=2100;

/// The editable colors, in form order.
fn palette(theme: &Theme) -> [Rgb; 5] {
    [
        theme.button,
        theme.taskbar,
        theme.window_title,
        theme.close_button,
        theme.minimize_button,
    ]
}

#[derive(Debug)]
pub struct Tweak {
    fields: Vec<TextField>,
    active: usize,
    save: ButtonRow,
    area: Rect,
}

impl Default for Tweak {
    fn default() -> Self {
        Self::new()
    }
}

impl Tweak {
    pub fn new() -> Self {
        let theme = Theme::default();
        Self {
            fields: palette(&theme)
                .into_iter()
                .map(|rgb| TextField::new().with_max_len(7).with_value(rgb.to_string()))
                .chain([TextField::new().with_max_len(4).with_value("1999")])
                .collect(),
            active: 0,
            save: ButtonRow::new(["Save Settings"]),
            area: Rect::default(),
        }
    }

    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", TextField::value)
    }

    pub fn set_field(&mut self, index: usize, value: &str) {
        if let Some(field) = self.fields.get_mut(index) {
            field.set_value(value);
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    /// Parse the form. The first invalid field is reported by its label.
    pub fn parse(&self) -> Result<(Theme, i32), String> {
        let mut colors = [Rgb(0, 0, 0); 5];
        for (i, color) in colors.iter_mut().enumerate() {
            *color = Rgb::from_hex(self.field(i))
                .ok_or_else(|| format!("{} expects a #rrggbb color.", LABELS[i].trim_end_matches(':')))?;
        }
        let year = self
            .field(YEAR)
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|y| YEAR_RANGE.contains(y))
            .ok_or_else(|| {
                format!(
                    "Year must be between {} and {}.",
                    YEAR_RANGE.start(),
                    YEAR_RANGE.end()
                )
            })?;
        let [button, taskbar, window_title, close_button, minimize_button] = colors;
        Ok((
            Theme {
                button,
                taskbar,
                window_title,
                close_button,
                minimize_button,
            },
            year,
        ))
    }

    fn save(&mut self, cx: &mut AppletContext<'_>) {
        match self.parse() {
            Ok((theme, year)) => {
                cx.set_theme(theme);
                cx.set_year(year);
                tracing::debug!(year, "settings saved");
                if self.field(YEAR).trim() == Y2K_TRIGGER_YEAR {
                    cx.request(DesktopRequest::TriggerY2k);
                }
                cx.show_dialog("Success", "Settings have been saved.");
            }
            Err(message) => cx.show_dialog("Error", message),
        }
    }

    fn move_active(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        self.active = (self.active as isize + delta).rem_euclid(len) as usize;
    }

    fn field_rect(&self, index: usize) -> Rect {
        let area = self.area;
        Rect::new(
            area.x.saturating_add(LABEL_WIDTH + 1),
            area.y.saturating_add(index as u16 + 1 + u16::from(index == YEAR)),
            area.width.saturating_sub(LABEL_WIDTH + 2),
            1,
        )
        .intersection(area)
    }
}

impl Applet for Tweak {
    fn init(&mut self, cx: &mut AppletContext<'_>) -> Result<(), crate::error::AppletError> {
        // Start from what the desktop currently shows.
        for (field, rgb) in self.fields.iter_mut().zip(palette(cx.theme())) {
            field.set_value(rgb.to_string());
        }
        self.set_field(YEAR, &cx.year().to_string());
        Ok(())
    }

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        self.area = area;
        let theme = ctx.theme();
        let body = theme.window_body();
        frame.fill(area, body);
        if area.height == 0 {
            return;
        }
        frame.text(area, area.x + 1, area.y, "System Colors", theme.hint());
        let date_y = area.y.saturating_add(YEAR as u16 + 1);
        frame.text(area, area.x + 1, date_y, "Date & Time", theme.hint());

        for index in 0..self.fields.len() {
            let rect = self.field_rect(index);
            frame.text(area, area.x + 1, rect.y, LABELS[index], body);
            let field_ctx = ctx.with_focus(ctx.focused() && index == self.active);
            self.fields[index].render(frame, rect, &field_ctx);
        }
        let save_y = self.field_rect(YEAR).y.saturating_add(2);
        let save = Rect::new(area.x + 1, save_y, area.width.saturating_sub(1), 1).intersection(area);
        self.save.render(frame, save, ctx);
    }

    fn handle_event(&mut self, event: &Event, cx: &mut AppletContext<'_>) -> bool {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
                    self.save(cx);
                    return true;
                }
                match key.code {
                    KeyCode::Up => self.move_active(-1),
                    KeyCode::Down => self.move_active(1),
                    KeyCode::Enter => self.save(cx),
                    _ => {
                        let active = self.active;
                        return self.fields[active].handle_key(key);
                    }
                }
                true
            }
            Event::Paste(_) => {
                let ctx = ComponentContext::new(cx.theme()).with_focus(true);
                let active = self.active;
                self.fields[active].handle_event(event, &ctx)
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (column, row) = to_render_space(self.area, mouse);
                if self.save.hit_test(column, row).is_some() {
                    self.save(cx);
                    return true;
                }
                let hit = (0..self.fields.len()).find(|&i| {
                    let rect = self.field_rect(i);
                    row == rect.y && column >= rect.x && column < rect.right()
                });
                match hit {
                    Some(index) => {
                        self.active = index;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applets::{AppletFlags, AppletHost};
    use crate::window::WindowHandle;
    use std::time::Instant;

    fn save(tweak: &mut Tweak, host: &mut AppletHost) {
        let mut cx = AppletContext::new(
            WindowHandle::new(1),
            AppletFlags::default(),
            Instant::now(),
            true,
            host,
        );
        tweak.save(&mut cx);
    }

    #[test]
    fn defaults_show_current_palette() {
        let tweak = Tweak::new();
        assert_eq!(tweak.field(0), "#c0c0c0");
        assert_eq!(tweak.field(2), "#f2426b");
        assert_eq!(tweak.field(YEAR), "1999");
    }

    #[test]
    fn saving_applies_theme_and_year() {
        let mut host = AppletHost::default();
        let mut tweak = Tweak::new();
        tweak.set_field(1, "#102030");
        tweak.set_field(YEAR, "2001");
        save(&mut tweak, &mut host);
        assert_eq!(host.theme.taskbar, Rgb(0x10, 0x20, 0x30));
        assert_eq!(host.year, 2001);
        assert_eq!(
            host.requests(),
            &[DesktopRequest::ShowDialog {
                title: "Success".into(),
                body: "Settings have been saved.".into()
            }]
        );
    }

    #[test]
    fn year_2007_triggers_y2k() {
        let mut host = AppletHost::default();
        let mut tweak = Tweak::new();
        tweak.set_field(YEAR, "2007");
        save(&mut tweak, &mut host);
        assert!(host.requests().contains(&DesktopRequest::TriggerY2k));
    }

    #[test]
    fn invalid_color_is_reported_and_nothing_changes() {
        let mut host = AppletHost::default();
        let mut tweak = Tweak::new();
        tweak.set_field(0, "#zz0000");
        save(&mut tweak, &mut host);
        assert_eq!(host.theme, Theme::default());
        assert!(matches!(
            host.requests(),
            [DesktopRequest::ShowDialog { title, body }]
                if title == "Error" && body.starts_with("Button Color")
        ));
    }

    #[test]
    fn year_out_of_range_is_rejected() {
        let mut tweak = Tweak::new();
        tweak.set_field(YEAR, "1969");
        assert!(tweak.parse().is_err());
        tweak.set_field(YEAR, "2100");
        assert!(tweak.parse().is_ok());
    }

    #[test]
    fn arrows_cycle_fields() {
        let mut tweak = Tweak::new();
        tweak.move_active(-1);
        assert_eq!(tweak.active(), YEAR);
        tweak.move_active(1);
        assert_eq!(tweak.active(), 0);
    }
}
