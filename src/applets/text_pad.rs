//! Text Pad: a plain text editor that saves into `notes/`.
//!
//! Opened read-only it doubles as the viewer File Nest uses for text files.

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::Rect;

use super::{Applet, AppletArgs, AppletContext, AppletEntry, DesktopRequest, FILE_NEST, TEXT_PAD};
use crate::clipboard;
use crate::component_context::ComponentContext;
use crate::components::{ButtonRow, Component, TextArea, to_render_space};
use crate::store::NOTES_FOLDER;
use crate::ui::UiFrame;

pub const ENTRY: AppletEntry = AppletEntry {
    name: TEXT_PAD,
    icon: "[T]",
    size: (48, 14),
    create,
};

fn create(args: &AppletArgs) -> Box<dyn Applet> {
    Box::new(TextPad::new(args))
}

const SAVE: usize = 0;
const COPY: usize = 1;

#[derive(Debug)]
pub struct TextPad {
    editor: TextArea,
    toolbar: ButtonRow,
    read_only: bool,
    area: Rect,
}

impl TextPad {
    pub fn new(args: &AppletArgs) -> Self {
        let editor = match args {
            AppletArgs::Document { body, .. } => TextArea::from_text(body),
            AppletArgs::None => TextArea::new(),
        };
        Self {
            editor,
            toolbar: ButtonRow::new(["Save", "Copy"]),
            read_only: false,
            area: Rect::default(),
        }
    }

    pub fn text(&self) -> String {
        self.editor.text()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn request_save(&mut self, cx: &mut AppletContext<'_>) {
        if self.read_only {
            return;
        }
        cx.prompt("Save File", "Enter filename:");
    }

    fn copy(&self, cx: &mut AppletContext<'_>) {
        if let Err(err) = clipboard::set(&self.editor.text()) {
            tracing::warn!(error = %err, "copy to clipboard failed");
            cx.show_dialog("Error", "Clipboard is not available.");
        }
    }

    fn paste(&mut self) {
        if self.read_only {
            return;
        }
        match clipboard::get() {
            Ok(text) => self.editor.insert_str(&text),
            Err(err) => tracing::debug!(error = %err, "clipboard read failed"),
        }
    }

    fn editor_ctx<'a>(&self, cx: &'a AppletContext<'_>) -> ComponentContext<'a> {
        ComponentContext::new(cx.theme())
            .with_focus(true)
            .with_read_only(self.read_only)
    }
}

impl Applet for TextPad {
    fn init(&mut self, cx: &mut AppletContext<'_>) -> Result<(), crate::error::AppletError> {
        self.read_only = cx.flags().read_only;
        Ok(())
    }

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        self.area = area;
        frame.fill(area, ctx.theme().window_body());
        let editor_area = if self.read_only {
            area
        } else {
            self.toolbar
                .render(frame, Rect { height: 1.min(area.height), ..area }, ctx);
            Rect {
                y: area.y.saturating_add(1),
                height: area.height.saturating_sub(1),
                ..area
            }
        };
        self.editor.render(frame, editor_area, ctx);
    }

    fn handle_event(&mut self, event: &Event, cx: &mut AppletContext<'_>) -> bool {
        match event {
            Event::Key(key)
                if key.kind != KeyEventKind::Release
                    && key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                match key.code {
                    KeyCode::Char('s') => self.request_save(cx),
                    KeyCode::Char('k') => self.copy(cx),
                    KeyCode::Char('v') => self.paste(),
                    _ => return false,
                }
                true
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (column, row) = to_render_space(self.area, mouse);
                match self.toolbar.hit_test(column, row) {
                    Some(SAVE) if !self.read_only => self.request_save(cx),
                    Some(COPY) if !self.read_only => self.copy(cx),
                    _ => return false,
                }
                true
            }
            _ => {
                let ctx = self.editor_ctx(cx);
                self.editor.handle_event(event, &ctx)
            }
        }
    }

    fn on_prompt(&mut self, value: &str, cx: &mut AppletContext<'_>) {
        let filename = value.trim();
        if filename.is_empty() {
            cx.show_dialog("Error", "Please enter a filename.");
            return;
        }
        let path = format!("{NOTES_FOLDER}/{filename}");
        let content = self.editor.text();
        match cx.store_mut().save(&path, content) {
            Ok(()) => {
                cx.show_dialog("Success", "File saved successfully!");
                cx.request(DesktopRequest::Refresh(FILE_NEST.to_string()));
            }
            Err(err) => {
                tracing::warn!(path, error = %err, "text pad save rejected");
                cx.show_dialog(
                    "Error",
                    "Failed to save file. Ensure you are saving in the correct folder.",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applets::{AppletFlags, AppletHost};
    use crate::window::WindowHandle;
    use crossterm::event::KeyEvent;
    use std::time::Instant;

    fn pad(read_only: bool, host: &mut AppletHost) -> TextPad {
        let mut pad = TextPad::new(&AppletArgs::Document {
            name: "welcome.txt".into(),
            body: "hello".into(),
        });
        let mut cx = AppletContext::new(
            WindowHandle::new(1),
            AppletFlags { read_only },
            Instant::now(),
            true,
            host,
        );
        pad.init(&mut cx).unwrap();
        pad
    }

    fn send(pad: &mut TextPad, host: &mut AppletHost, event: Event) -> bool {
        let mut cx = AppletContext::new(
            WindowHandle::new(1),
            AppletFlags::default(),
            Instant::now(),
            true,
            host,
        );
        pad.handle_event(&event, &mut cx)
    }

    fn answer(pad: &mut TextPad, host: &mut AppletHost, value: &str) {
        let mut cx = AppletContext::new(
            WindowHandle::new(1),
            AppletFlags::default(),
            Instant::now(),
            true,
            host,
        );
        pad.on_prompt(value, &mut cx);
    }

    #[test]
    fn ctrl_s_prompts_for_filename() {
        let mut host = AppletHost::default();
        let mut pad = pad(false, &mut host);
        let save = Event::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert!(send(&mut pad, &mut host, save));
        assert!(matches!(
            host.requests(),
            [DesktopRequest::Prompt { title, .. }] if title == "Save File"
        ));
    }

    #[test]
    fn saving_writes_notes_and_refreshes_file_nest() {
        let mut host = AppletHost::default();
        let mut pad = pad(false, &mut host);
        send(&mut pad, &mut host, Event::Key(KeyEvent::new(KeyCode::End, KeyModifiers::NONE)));
        send(&mut pad, &mut host, Event::Key(KeyEvent::new(KeyCode::Char('!'), KeyModifiers::NONE)));
        answer(&mut pad, &mut host, "todo.txt");
        assert_eq!(host.store.load("notes/todo.txt"), Some("hello!"));
        let requests = host.take_requests();
        assert!(requests.contains(&DesktopRequest::ShowDialog {
            title: "Success".into(),
            body: "File saved successfully!".into()
        }));
        assert!(requests.contains(&DesktopRequest::Refresh(FILE_NEST.into())));
    }

    #[test]
    fn blank_filename_is_rejected() {
        let mut host = AppletHost::default();
        let mut pad = pad(false, &mut host);
        answer(&mut pad, &mut host, "   ");
        assert_eq!(
            host.requests(),
            &[DesktopRequest::ShowDialog {
                title: "Error".into(),
                body: "Please enter a filename.".into()
            }]
        );
    }

    #[test]
    fn nested_path_fails_to_save() {
        let mut host = AppletHost::default();
        let mut pad = pad(false, &mut host);
        answer(&mut pad, &mut host, "deep/name.txt");
        assert!(matches!(
            host.requests(),
            [DesktopRequest::ShowDialog { body, .. }] if body.starts_with("Failed to save file")
        ));
    }

    #[test]
    fn read_only_blocks_edits_and_saving() {
        let mut host = AppletHost::default();
        let mut pad = pad(true, &mut host);
        assert!(pad.is_read_only());
        send(&mut pad, &mut host, Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)));
        send(&mut pad, &mut host, Event::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        assert_eq!(pad.text(), "hello");
        assert!(host.requests().is_empty());
    }
}
