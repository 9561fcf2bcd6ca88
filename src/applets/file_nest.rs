//! File Nest: browse the file store and open files in viewers.

use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::layout::Rect;

use super::{
    Applet, AppletArgs, AppletContext, AppletEntry, DesktopRequest, FILE_NEST, GALLERY, TEXT_PAD,
};
use crate::component_context::ComponentContext;
use crate::components::{Component, ListComponent, to_render_space};
use crate::error::AppletError;
use crate::store::{FileStore, extension};
use crate::ui::UiFrame;
use crate::window::OpenOptions;

pub const ENTRY: AppletEntry = AppletEntry {
    name: FILE_NEST,
    icon: "[/]",
    size: (40, 14),
    create,
};

fn create(_args: &AppletArgs) -> Box<dyn Applet> {
    Box::new(FileNest::new())
}

pub const TEXT_EXTENSIONS: [&str; 5] = ["txt", "md", "js", "html", "css"];
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];
const DOUBLE_CLICK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Row {
    Folder,
    File { path: String, name: String },
}

/// Which viewer a file opens in, if any.
pub fn viewer_for(name: &str) -> Option<&'static str> {
    let ext = extension(name)?;
    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        Some(TEXT_PAD)
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(GALLERY)
    } else {
        None
    }
}

#[derive(Debug, Default)]
pub struct FileNest {
    rows: Vec<Row>,
    list: ListComponent,
    last_click: Option<(usize, Instant)>,
    area: Rect,
}

impl FileNest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the listing from the store.
    pub fn load(&mut self, store: &FileStore) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for folder in store.folders() {
            rows.push(Row::Folder);
            labels.push(format!("[{folder}]"));
            for (name, _) in store.files(folder) {
                rows.push(Row::File {
                    path: format!("{folder}/{name}"),
                    name: name.to_string(),
                });
                labels.push(format!("  {name}"));
            }
        }
        self.rows = rows;
        self.list.set_items(labels);
    }

    pub fn labels(&self) -> &[String] {
        self.list.items()
    }

    pub fn select(&mut self, index: usize) {
        self.list.set_selected(index);
    }

    /// Open the file on `index` in its viewer. Folders and unknown file
    /// types do nothing.
    pub fn open(&self, index: usize, cx: &mut AppletContext<'_>) -> bool {
        let Some(Row::File { path, name }) = self.rows.get(index) else {
            return false;
        };
        let Some(app) = viewer_for(name) else {
            tracing::debug!(path, "no viewer for file");
            return false;
        };
        let Some(body) = cx.store().load(path).map(str::to_string) else {
            return false;
        };
        let mut options = OpenOptions::spawned()
            .with_title(name.clone())
            .with_args(AppletArgs::Document {
                name: name.clone(),
                body,
            });
        if app == TEXT_PAD {
            options = options.read_only();
        }
        cx.request(DesktopRequest::Open {
            app: app.to_string(),
            options,
        });
        true
    }

    fn click(&mut self, index: usize, now: Instant) -> bool {
        self.list.set_selected(index);
        let double = matches!(
            self.last_click,
            Some((last, at)) if last == index && now.saturating_duration_since(at) <= DOUBLE_CLICK
        );
        self.last_click = if double { None } else { Some((index, now)) };
        double
    }
}

impl Applet for FileNest {
    fn init(&mut self, cx: &mut AppletContext<'_>) -> Result<(), AppletError> {
        self.load(cx.store());
        Ok(())
    }

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        self.area = area;
        frame.fill(area, ctx.theme().window_body());
        let list = Rect::new(
            area.x + 1,
            area.y,
            area.width.saturating_sub(2),
            area.height,
        )
        .intersection(area);
        self.list.render(frame, list, ctx);
    }

    fn handle_event(&mut self, event: &Event, cx: &mut AppletContext<'_>) -> bool {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release && key.code == KeyCode::Enter => {
                self.open(self.list.selected(), cx)
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (column, row) = to_render_space(self.area, mouse);
                let Some(index) = self.list.item_at(column, row) else {
                    return false;
                };
                if self.click(index, cx.now()) {
                    self.open(index, cx);
                }
                true
            }
            _ => {
                let ctx = ComponentContext::new(cx.theme()).with_focus(true);
                self.list.handle_event(event, &ctx)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applets::{AppletFlags, AppletHost};
    use crate::window::{LaunchSource, WindowHandle};

    fn context(host: &mut AppletHost, now: Instant) -> AppletContext<'_> {
        AppletContext::new(WindowHandle::new(1), AppletFlags::default(), now, true, host)
    }

    fn nest(host: &mut AppletHost) -> FileNest {
        let mut nest = FileNest::new();
        nest.init(&mut context(host, Instant::now())).unwrap();
        nest
    }

    #[test]
    fn lists_folders_then_files() {
        let mut host = AppletHost::default();
        host.store.save("art/cat.png", "drawing 1 1\nr\n").unwrap();
        let nest = nest(&mut host);
        assert_eq!(nest.labels(), &["[art]", "  cat.png", "[notes]", "  welcome.txt"]);
    }

    #[test]
    fn viewers_follow_extension() {
        assert_eq!(viewer_for("a.TXT"), Some(TEXT_PAD));
        assert_eq!(viewer_for("b.css"), Some(TEXT_PAD));
        assert_eq!(viewer_for("c.jpeg"), Some(GALLERY));
        assert_eq!(viewer_for("d.mp3"), None);
        assert_eq!(viewer_for("README"), None);
    }

    #[test]
    fn text_files_open_read_only_and_titled() {
        let mut host = AppletHost::default();
        let nest = nest(&mut host);
        assert!(nest.open(1, &mut context(&mut host, Instant::now())));
        let [DesktopRequest::Open { app, options }] = host.requests() else {
            panic!("expected one open request, got {:?}", host.requests());
        };
        assert_eq!(app, TEXT_PAD);
        assert_eq!(options.title.as_deref(), Some("welcome.txt"));
        assert_eq!(options.source, LaunchSource::Spawned);
        assert!(options.flags.read_only);
        assert!(matches!(&options.args, AppletArgs::Document { body, .. } if body.contains("2007")));
    }

    #[test]
    fn folders_do_not_open() {
        let mut host = AppletHost::default();
        let nest = nest(&mut host);
        assert!(!nest.open(0, &mut context(&mut host, Instant::now())));
        assert!(host.requests().is_empty());
    }

    #[test]
    fn double_click_opens() {
        let now = Instant::now();
        let mut host = AppletHost::default();
        let mut nest = nest(&mut host);
        assert!(!nest.click(1, now));
        assert!(nest.click(1, now + Duration::from_millis(200)));
        assert!(!nest.click(1, now + Duration::from_secs(2)));
    }
}
