//! Web Start: a search box that hands queries to the host browser.

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use indoc::indoc;
use ratatui::layout::Rect;

use super::{Applet, AppletArgs, AppletContext, AppletEntry, WEB_START};
use crate::component_context::ComponentContext;
use crate::components::{ButtonRow, Component, TextField, to_render_space};
use crate::constants::SEARCH_URL;
use crate::ui::UiFrame;
use crate::utils::encode_query_component;

pub const ENTRY: AppletEntry = AppletEntry {
    name: WEB_START,
    icon: "(@)",
    size: (44, 8),
    create,
};

fn create(_args: &AppletArgs) -> Box<dyn Applet> {
    Box::new(WebStart::new())
}

const BANNER: &str = indoc! {"
    ~ W E B   S T A R T ~
      surf the net 1999"};

/// Search URL for a query, or `None` when there is nothing to search for.
pub fn search_url(query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    Some(format!("{SEARCH_URL}{}", encode_query_component(query)))
}

#[derive(Debug)]
pub struct WebStart {
    query: TextField,
    search: ButtonRow,
    area: Rect,
}

impl Default for WebStart {
    fn default() -> Self {
        Self::new()
    }
}

impl WebStart {
    pub fn new() -> Self {
        Self {
            query: TextField::new().with_placeholder("Search the web..."),
            search: ButtonRow::new(["Search"]),
            area: Rect::default(),
        }
    }

    pub fn query(&self) -> &str {
        self.query.value()
    }

    pub fn set_query(&mut self, value: &str) {
        self.query.set_value(value);
    }

    fn submit(&mut self, cx: &mut AppletContext<'_>) {
        match search_url(self.query.value()) {
            Some(url) => {
                tracing::debug!(url, "web search");
                cx.open_url(url);
            }
            None => cx.show_dialog("Error", "Please enter a search query."),
        }
    }
}

impl Applet for WebStart {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        self.area = area;
        let theme = ctx.theme();
        frame.fill(area, theme.window_body());
        for (i, line) in BANNER.lines().enumerate() {
            frame.text(area, area.x + 1, area.y.saturating_add(i as u16), line, theme.title_bar(true));
        }
        let row = area.y.saturating_add(3);
        let button_width = self.search.width();
        let field = Rect::new(
            area.x + 1,
            row,
            area.width.saturating_sub(button_width + 3),
            1,
        )
        .intersection(area);
        self.query.render(frame, field, ctx);
        let button = Rect::new(field.right() + 1, row, button_width, 1).intersection(area);
        self.search.render(frame, button, ctx);
    }

    fn handle_event(&mut self, event: &Event, cx: &mut AppletContext<'_>) -> bool {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release && key.code == KeyCode::Enter => {
                self.submit(cx);
                true
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (column, row) = to_render_space(self.area, mouse);
                if self.search.hit_test(column, row).is_some() {
                    self.submit(cx);
                    return true;
                }
                false
            }
            _ => {
                let ctx = ComponentContext::new(cx.theme()).with_focus(true);
                self.query.handle_event(event, &ctx)
            }
        }
    }
}
