//! Gallery: shows one stored drawing. Only ever opened by File Nest.

use ratatui::layout::Rect;

use super::canvas::Drawing;
use super::{Applet, AppletArgs, AppletEntry, GALLERY};
use crate::component_context::ComponentContext;
use crate::ui::{UiFrame, centered_x};

pub const ENTRY: AppletEntry = AppletEntry {
    name: GALLERY,
    icon: "[^]",
    size: (44, 18),
    create,
};

fn create(args: &AppletArgs) -> Box<dyn Applet> {
    Box::new(Gallery::new(args))
}

const PLACEHOLDER: &str = "No file opened";

#[derive(Debug)]
pub struct Gallery {
    drawing: Option<Drawing>,
}

impl Gallery {
    pub fn new(args: &AppletArgs) -> Self {
        let drawing = match args {
            AppletArgs::Document { name, body } => {
                let drawing = Drawing::parse(body);
                if drawing.is_none() {
                    tracing::debug!(name, "gallery cannot read file");
                }
                drawing
            }
            AppletArgs::None => None,
        };
        Self { drawing }
    }

    pub fn drawing(&self) -> Option<&Drawing> {
        self.drawing.as_ref()
    }
}

impl Applet for Gallery {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        let body = ctx.theme().window_body();
        frame.fill(area, body);
        match &self.drawing {
            Some(drawing) => {
                let x = area.x + area.width.saturating_sub(drawing.width()) / 2;
                let y = area.y + area.height.saturating_sub(drawing.height()) / 2;
                let target = Rect::new(x, y, drawing.width(), drawing.height()).intersection(area);
                drawing.render(frame, target);
            }
            None => {
                let y = area.y + area.height / 2;
                frame.text(area, centered_x(area, PLACEHOLDER), y, PLACEHOLDER, ctx.theme().hint());
            }
        }
    }
}
