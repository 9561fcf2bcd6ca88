//! Messenger: a contact form delivered through the host mail client.

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Modifier;

use super::{Applet, AppletArgs, AppletContext, AppletEntry, MESSENGER};
use crate::component_context::ComponentContext;
use crate::components::{ButtonRow, Component, TextArea, TextField, to_render_space};
use crate::constants::MESSENGER_ADDRESS;
use crate::layout::rect_contains;
use crate::ui::UiFrame;
use crate::utils::encode_query_component;

pub const ENTRY: AppletEntry = AppletEntry {
    name: MESSENGER,
    icon: "[m]",
    size: (44, 14),
    create,
};

fn create(_args: &AppletArgs) -> Box<dyn Applet> {
    Box::new(Messenger::new())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    From,
    ReplyTo,
    Message,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Self::From => Self::ReplyTo,
            Self::ReplyTo => Self::Message,
            Self::Message => Self::From,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::From => Self::Message,
            Self::ReplyTo => Self::From,
            Self::Message => Self::ReplyTo,
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((user, domain)) = value.split_once('@') else {
        return false;
    };
    !user.is_empty() && !domain.is_empty() && !value.contains(char::is_whitespace)
}

/// `mailto:` link carrying the message.
pub fn mailto_url(from: &str, reply_to: &str, message: &str) -> String {
    let subject = format!("Message from {from}");
    let body = format!("{message}\n\nReply to: {reply_to}");
    format!(
        "mailto:{MESSENGER_ADDRESS}?subject={}&body={}",
        encode_query_component(&subject),
        encode_query_component(&body)
    )
}

#[derive(Debug)]
pub struct Messenger {
    from: TextField,
    reply_to: TextField,
    message: TextArea,
    active: Field,
    send: ButtonRow,
    area: Rect,
}

impl Default for Messenger {
    fn default() -> Self {
        Self::new()
    }
}

impl Messenger {
    pub fn new() -> Self {
        Self {
            from: TextField::new(),
            reply_to: TextField::new(),
            message: TextArea::new(),
            active: Field::From,
            send: ButtonRow::new(["Send Message"]),
            area: Rect::default(),
        }
    }

    pub fn active(&self) -> Field {
        self.active
    }

    pub fn fill(&mut self, from: &str, reply_to: &str, message: &str) {
        self.from.set_value(from);
        self.reply_to.set_value(reply_to);
        self.message.set_text(message);
    }

    /// Validate the form into a `mailto:` URL, or the complaint to show.
    pub fn compose(&self) -> Result<String, &'static str> {
        let from = self.from.value().trim();
        let reply_to = self.reply_to.value().trim();
        if from.is_empty() || reply_to.is_empty() || self.message.is_blank() {
            return Err("Please fill in all fields.");
        }
        if !looks_like_email(reply_to) {
            return Err("Please enter a valid email address.");
        }
        Ok(mailto_url(from, reply_to, &self.message.text()))
    }

    fn send(&mut self, cx: &mut AppletContext<'_>) {
        match self.compose() {
            Ok(url) => {
                cx.open_url(url);
                cx.show_dialog("Message Sent!", "Your message has been sent successfully.");
                self.fill("", "", "");
                self.active = Field::From;
            }
            Err(complaint) => cx.show_dialog("Error", complaint),
        }
    }

    fn rects(&self) -> [Rect; 3] {
        let area = self.area;
        let field = |row: u16| {
            Rect::new(
                area.x.saturating_add(11),
                area.y.saturating_add(row),
                area.width.saturating_sub(12),
                1,
            )
            .intersection(area)
        };
        let message = Rect::new(
            area.x.saturating_add(1),
            area.y.saturating_add(4),
            area.width.saturating_sub(2),
            area.height.saturating_sub(6),
        )
        .intersection(area);
        [field(0), field(1), message]
    }
}

impl Applet for Messenger {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        self.area = area;
        let theme = ctx.theme();
        let body = theme.window_body();
        frame.fill(area, body);
        if area.height == 0 {
            return;
        }
        let [from, reply_to, message] = self.rects();
        let label = body.add_modifier(Modifier::BOLD);
        frame.text(area, area.x + 1, from.y, "From:", label);
        frame.text(area, area.x + 1, reply_to.y, "Reply To:", label);
        frame.text(area, area.x + 1, area.y.saturating_add(3), "Message:", label);

        let focus = |field: Field| ctx.with_focus(ctx.focused() && self.active == field);
        let (from_ctx, reply_ctx, message_ctx) =
            (focus(Field::From), focus(Field::ReplyTo), focus(Field::Message));
        self.from.render(frame, from, &from_ctx);
        self.reply_to.render(frame, reply_to, &reply_ctx);
        frame.fill(message, theme.input(false));
        self.message.render(frame, message, &message_ctx);

        let send = Rect::new(area.x + 1, area.bottom().saturating_sub(1), area.width.saturating_sub(1), 1)
            .intersection(area);
        self.send.render(frame, send, ctx);
    }

    fn handle_event(&mut self, event: &Event, cx: &mut AppletContext<'_>) -> bool {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
                    self.send(cx);
                    return true;
                }
                let single_line = self.active != Field::Message;
                match key.code {
                    KeyCode::Down | KeyCode::Enter if single_line => {
                        self.active = self.active.next();
                        true
                    }
                    KeyCode::Up if single_line => {
                        self.active = self.active.prev();
                        true
                    }
                    _ => match self.active {
                        Field::From => self.from.handle_key(key),
                        Field::ReplyTo => self.reply_to.handle_key(key),
                        Field::Message => self.message.handle_key(key),
                    },
                }
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (column, row) = to_render_space(self.area, mouse);
                if self.send.hit_test(column, row).is_some() {
                    self.send(cx);
                    return true;
                }
                let [from, reply_to, message] = self.rects();
                let hit = [
                    (from, Field::From),
                    (reply_to, Field::ReplyTo),
                    (message, Field::Message),
                ]
                .into_iter()
                .find(|(rect, _)| rect_contains(*rect, column, row));
                match hit {
                    Some((_, field)) => {
                        self.active = field;
                        true
                    }
                    None => false,
                }
            }
            Event::Paste(_) => {
                let ctx = ComponentContext::new(cx.theme()).with_focus(true);
                match self.active {
                    Field::From => self.from.handle_event(event, &ctx),
                    Field::ReplyTo => self.reply_to.handle_event(event, &ctx),
                    Field::Message => self.message.handle_event(event, &ctx),
                }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applets::{AppletFlags, AppletHost, DesktopRequest};
    use crate::window::WindowHandle;
    use std::time::Instant;

    fn send(app: &mut Messenger, host: &mut AppletHost) {
        let mut cx = AppletContext::new(
            WindowHandle::new(1),
            AppletFlags::default(),
            Instant::now(),
            true,
            host,
        );
        app.send(&mut cx);
    }

    #[test]
    fn every_field_is_required() {
        let mut app = Messenger::new();
        app.fill("Ann", "", "hi");
        assert_eq!(app.compose(), Err("Please fill in all fields."));
        app.fill("Ann", "ann@example.com", "   ");
        assert_eq!(app.compose(), Err("Please fill in all fields."));
    }

    #[test]
    fn reply_to_must_be_an_address() {
        let mut app = Messenger::new();
        app.fill("Ann", "not-an-email", "hi");
        assert_eq!(app.compose(), Err("Please enter a valid email address."));
    }

    #[test]
    fn sending_opens_mailto_and_confirms() {
        let mut host = AppletHost::default();
        let mut app = Messenger::new();
        app.fill("Ann", "ann@example.com", "hello there");
        send(&mut app, &mut host);
        let requests = host.take_requests();
        assert!(matches!(
            &requests[0],
            DesktopRequest::OpenUrl(url)
                if url.starts_with("mailto:itsharshitgoat@gmail.com?subject=Message%20from%20Ann")
                    && url.contains("hello%20there")
        ));
        assert_eq!(
            requests[1],
            DesktopRequest::ShowDialog {
                title: "Message Sent!".into(),
                body: "Your message has been sent successfully.".into()
            }
        );
        assert_eq!(app.compose(), Err("Please fill in all fields."));
    }

    #[test]
    fn fields_cycle_with_arrows() {
        assert_eq!(Field::From.next(), Field::ReplyTo);
        assert_eq!(Field::From.prev(), Field::Message);
    }
}
