use crossterm::event::{Event, MouseEvent};
use ratatui::layout::Rect;

use crate::ui::UiFrame;

pub mod button;
pub mod dialog;
pub mod list;
pub mod text_area;
pub mod text_field;

pub use button::ButtonRow;
pub use dialog::{Dialog, DialogOutcome};
pub use list::ListComponent;
pub use text_area::TextArea;
pub use text_field::TextField;

pub use crate::component_context::ComponentContext;

/// A reusable widget with its own input handling.
///
/// Components remember the rectangle they were last rendered into and
/// hit-test mouse events against it, so mouse coordinates must be in the
/// same space the component was drawn in.
pub trait Component {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>);

    fn handle_event(&mut self, _event: &Event, _ctx: &ComponentContext<'_>) -> bool {
        false
    }
}

/// Translate a mouse event delivered relative to an applet's content
/// origin into the coordinate space the applet was rendered in.
pub fn to_render_space(area: Rect, mouse: &MouseEvent) -> (u16, u16) {
    (
        area.x.saturating_add(mouse.column),
        area.y.saturating_add(mouse.row),
    )
}
