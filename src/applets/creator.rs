//! Creator: sends the browser to the author's website.

use ratatui::layout::Rect;

use super::{Applet, AppletArgs, AppletContext, AppletEntry, CREATOR};
use crate::component_context::ComponentContext;
use crate::constants::CREATOR_URL;
use crate::error::AppletError;
use crate::ui::{UiFrame, centered_x};

pub const ENTRY: AppletEntry = AppletEntry {
    name: CREATOR,
    icon: "[C]",
    size: (40, 7),
    create,
};

fn create(_args: &AppletArgs) -> Box<dyn Applet> {
    Box::new(Creator)
}

const MESSAGE: &str = "Redirecting to creator's Website...";

#[derive(Debug)]
pub struct Creator;

impl Applet for Creator {
    fn init(&mut self, cx: &mut AppletContext<'_>) -> Result<(), AppletError> {
        cx.open_url(CREATOR_URL);
        Ok(())
    }

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        frame.fill(area, ctx.theme().window_body());
        let y = area.y + area.height / 2;
        frame.text(area, centered_x(area, MESSAGE), y, MESSAGE, ctx.theme().window_body());
    }
}
