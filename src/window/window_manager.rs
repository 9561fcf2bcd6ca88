use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crossterm::event::{Event, MouseButton, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::prelude::Rect;
use ratatui::style::Modifier;

use crate::applets::{Applet, AppletContext, AppletHost, AppletRegistry, DesktopRequest};
use crate::component_context::ComponentContext;
use crate::config::DesktopConfig;
use crate::constants::{DEFAULT_WINDOW_ORIGIN, FIRST_STACK_INDEX, MIN_FLOATING_VISIBLE_MARGIN};
use crate::error::WmError;
use crate::layout::{clamp_to_bounds, float_rect_visible, rect_contains};
use crate::taskbar::{Taskbar, TaskbarRequest};
use crate::theme::Theme;
use crate::ui::UiFrame;

use super::animation::{AnimationKind, WindowAnimation};
use super::decorator::{HeaderAction, RetroDecorator, WindowDecorator, render_ghost};
use super::drag::{DragState, DragThrottle};
use super::{FloatRect, LaunchSource, OpenOptions, Visibility, Window, WindowHandle, content_rect_of};

/// Tear down applet content. Activity that outlives `teardown` is a leak
/// in the applet; it is logged, the window goes away regardless.
fn release_content(handle: WindowHandle, app: &str, content: &mut dyn Applet) {
    content.teardown();
    if content.is_active() {
        tracing::warn!(window_id = ?handle, app, "applet still active after teardown");
    }
}

/// Owns every live window, the taskbar that mirrors them, and the
/// gestures and animations in flight.
///
/// Stacking is a single monotonically increasing counter: whichever window
/// was most recently opened, focused or restored holds the highest index
/// and is drawn last.
#[derive(Debug)]
pub struct WindowManager {
    registry: AppletRegistry,
    windows: BTreeMap<WindowHandle, Window>,
    taskbar: Taskbar,
    decorator: Box<dyn WindowDecorator>,
    area: Rect,
    next_handle: u64,
    next_stack: u64,
    drag: Option<DragState>,
    throttle: DragThrottle,
    animations: Vec<WindowAnimation>,
    animation_duration: Duration,
    /// Window that received the last body press; it keeps receiving drag
    /// and release events until the button comes up.
    pointer_owner: Option<WindowHandle>,
}

impl WindowManager {
    pub fn new(registry: AppletRegistry) -> Self {
        Self::with_config(registry, &DesktopConfig::default())
    }

    pub fn with_config(registry: AppletRegistry, config: &DesktopConfig) -> Self {
        Self {
            registry,
            windows: BTreeMap::new(),
            taskbar: Taskbar::new(),
            decorator: Box::new(RetroDecorator),
            area: Rect::default(),
            next_handle: 1,
            next_stack: FIRST_STACK_INDEX,
            drag: None,
            throttle: DragThrottle::new(config.drag_throttle),
            animations: Vec::new(),
            animation_duration: config.animation,
            pointer_owner: None,
        }
    }

    pub fn set_decorator(&mut self, decorator: Box<dyn WindowDecorator>) {
        self.decorator = decorator;
    }

    /// Update the desktop area (everything above the taskbar). Windows are
    /// pulled back so their title bars stay reachable.
    pub fn set_area(&mut self, area: Rect) {
        if self.area == area {
            return;
        }
        self.area = area;
        for window in self.windows.values_mut() {
            window.rect = clamp_to_bounds(window.rect, area, MIN_FLOATING_VISIBLE_MARGIN);
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn registry(&self) -> &AppletRegistry {
        &self.registry
    }

    pub fn taskbar(&self) -> &Taskbar {
        &self.taskbar
    }

    pub fn taskbar_mut(&mut self) -> &mut Taskbar {
        &mut self.taskbar
    }

    pub fn window(&self, handle: WindowHandle) -> Option<&Window> {
        self.windows.get(&handle)
    }

    pub fn windows(&self) -> impl Iterator<Item = (WindowHandle, &Window)> {
        self.windows.iter().map(|(h, w)| (*h, w))
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.windows.contains_key(&handle)
    }

    /// Live windows of `app`, in creation order.
    pub fn handles_for(&self, app: &str) -> Vec<WindowHandle> {
        self.windows
            .iter()
            .filter(|(_, w)| w.app == app)
            .map(|(h, _)| *h)
            .collect()
    }

    pub fn is_running(&self, app: &str) -> bool {
        self.windows.values().any(|w| w.app == app)
    }

    /// The index the next focus/open/restore will receive.
    pub fn next_stack_index(&self) -> u64 {
        self.next_stack
    }

    fn take_stack_index(&mut self) -> u64 {
        let index = self.next_stack;
        self.next_stack += 1;
        index
    }

    pub fn drag(&self) -> Option<DragState> {
        self.drag
    }

    pub fn animations(&self) -> &[WindowAnimation] {
        &self.animations
    }

    /// The open window with the highest stacking index.
    pub fn focused(&self) -> Option<WindowHandle> {
        self.windows
            .iter()
            .filter(|(_, w)| !w.is_minimized())
            .max_by_key(|(_, w)| w.stack_index)
            .map(|(h, _)| *h)
    }

    /// Open windows, bottom to top.
    pub fn stacking_order(&self) -> Vec<WindowHandle> {
        let mut open: Vec<_> = self
            .windows
            .iter()
            .filter(|(_, w)| !w.is_minimized())
            .map(|(h, w)| (w.stack_index, *h))
            .collect();
        open.sort_unstable();
        open.into_iter().map(|(_, h)| h).collect()
    }

    /// Whether `handle` is on screen: open, and not waiting for its restore
    /// ghost to land.
    pub fn is_revealed(&self, handle: WindowHandle, now: Instant) -> bool {
        let Some(window) = self.windows.get(&handle) else {
            return false;
        };
        !window.is_minimized()
            && !self.animations.iter().any(|a| {
                a.handle == handle && a.kind == AnimationKind::Restore && !a.finished(now)
            })
    }

    /// Topmost revealed window under the pointer.
    pub fn window_at(&self, column: u16, row: u16, now: Instant) -> Option<WindowHandle> {
        self.stacking_order().into_iter().rev().find(|h| {
            self.is_revealed(*h, now)
                && self
                    .windows
                    .get(h)
                    .is_some_and(|w| rect_contains(float_rect_visible(w.rect, self.area), column, row))
        })
    }

    fn find_unique(&self, app: &str) -> Option<WindowHandle> {
        self.windows
            .iter()
            .find(|(_, w)| w.unique && w.app == app)
            .map(|(h, _)| *h)
    }

    /// Open `app`. A desktop launch of an app that already has a unique
    /// window brings that window back instead of creating another one.
    pub fn open(
        &mut self,
        app: &str,
        options: OpenOptions,
        host: &mut AppletHost,
        now: Instant,
    ) -> Result<WindowHandle, WmError> {
        let entry = *self
            .registry
            .get(app)
            .ok_or_else(|| WmError::UnknownApp(app.to_string()))?;
        let unique = options.source == LaunchSource::Desktop;
        if unique && let Some(existing) = self.find_unique(app) {
            tracing::debug!(window_id = ?existing, app, "app already open, activating");
            if self.windows[&existing].is_minimized() {
                self.restore(existing, now)?;
            } else {
                self.focus(existing)?;
            }
            return Ok(existing);
        }

        let handle = WindowHandle::new(self.next_handle);
        self.next_handle += 1;
        let (x, y) = options.position.unwrap_or((
            self.area.x as i32 + DEFAULT_WINDOW_ORIGIN.0,
            self.area.y as i32 + DEFAULT_WINDOW_ORIGIN.1,
        ));
        let rect = clamp_to_bounds(
            FloatRect::new(x, y, entry.size.0, entry.size.1),
            self.area,
            MIN_FLOATING_VISIBLE_MARGIN,
        );
        let title = options.title.unwrap_or_else(|| app.to_string());
        let content = (entry.create)(&options.args);
        let stack_index = self.take_stack_index();
        self.taskbar.push(handle, title.clone());
        self.windows.insert(
            handle,
            Window {
                app: app.to_string(),
                title,
                stack_index,
                rect,
                visibility: Visibility::Open,
                unique,
                args: options.args,
                flags: options.flags,
                content,
            },
        );
        tracing::debug!(window_id = ?handle, app, seq = stack_index, "opened window");
        self.init_content(handle, host, now);
        Ok(handle)
    }

    fn init_content(&mut self, handle: WindowHandle, host: &mut AppletHost, now: Instant) {
        let focused = self.focused() == Some(handle);
        let Some(window) = self.windows.get_mut(&handle) else {
            return;
        };
        let mut cx = AppletContext::new(handle, window.flags, now, focused, host);
        if let Err(err) = window.content.init(&mut cx) {
            tracing::warn!(window_id = ?handle, app = %window.app, error = %err, "applet init failed");
            host.push(DesktopRequest::ShowDialog {
                title: "Error".to_string(),
                body: format!("{} could not start: {err}", window.app),
            });
        }
    }

    /// Raise `handle` to the top of the stack and return its new index.
    pub fn focus(&mut self, handle: WindowHandle) -> Result<u64, WmError> {
        if !self.windows.contains_key(&handle) {
            return Err(WmError::InvalidHandle(handle));
        }
        let index = self.take_stack_index();
        if let Some(window) = self.windows.get_mut(&handle) {
            window.stack_index = index;
        }
        tracing::trace!(window_id = ?handle, seq = index, "focused window");
        Ok(index)
    }

    /// Bring the bottom-most open window to the top, rotating through all
    /// of them on repeated calls. With `forward == false` the window just
    /// below the top is raised instead.
    pub fn cycle_focus(&mut self, forward: bool) -> Option<WindowHandle> {
        let order = self.stacking_order();
        if order.len() < 2 {
            return order.first().copied();
        }
        let target = if forward {
            order[0]
        } else {
            order[order.len() - 2]
        };
        self.focus(target).ok().map(|_| target)
    }

    /// Start a title-bar drag. Dragging raises the window.
    pub fn begin_drag(&mut self, handle: WindowHandle, column: u16, row: u16) -> Result<(), WmError> {
        self.focus(handle)?;
        self.throttle.cancel();
        self.drag = Some(DragState {
            handle,
            pointer: (column, row),
        });
        tracing::trace!(window_id = ?handle, column, row, "drag started");
        Ok(())
    }

    /// Feed a pointer sample into the active drag. Samples are coalesced:
    /// the window moves at most once per throttle interval, to the latest
    /// sample. Returns false when no drag is active.
    pub fn drag_to(&mut self, column: u16, row: u16, now: Instant) -> bool {
        if self.drag.is_none() {
            return false;
        }
        self.throttle.sample(column, row, now);
        self.flush_drag(now);
        true
    }

    fn flush_drag(&mut self, now: Instant) {
        let Some(drag) = self.drag else {
            return;
        };
        let Some((column, row)) = self.throttle.poll(now) else {
            return;
        };
        let dx = column as i32 - drag.pointer.0 as i32;
        let dy = row as i32 - drag.pointer.1 as i32;
        if let Err(err) = self.move_window(drag.handle, dx, dy) {
            tracing::debug!(error = %err, "dropping drag sample");
        }
        self.drag = Some(DragState {
            handle: drag.handle,
            pointer: (column, row),
        });
    }

    /// Move the window under an active drag by `(dx, dy)`, keeping it
    /// reachable inside the desktop area.
    pub fn move_window(&mut self, handle: WindowHandle, dx: i32, dy: i32) -> Result<(), WmError> {
        let area = self.area;
        let window = self
            .windows
            .get_mut(&handle)
            .ok_or(WmError::InvalidHandle(handle))?;
        if !self.drag.is_some_and(|d| d.handle == handle) {
            return Err(WmError::NoActiveDrag(handle));
        }
        let moved = FloatRect {
            x: window.rect.x + dx,
            y: window.rect.y + dy,
            ..window.rect
        };
        window.rect = clamp_to_bounds(moved, area, MIN_FLOATING_VISIBLE_MARGIN);
        Ok(())
    }

    /// Finish the active drag. Any sample still held by the throttle is
    /// discarded.
    pub fn end_drag(&mut self) -> Option<WindowHandle> {
        self.throttle.cancel();
        let ended = self.drag.take().map(|d| d.handle);
        if let Some(handle) = ended {
            tracing::trace!(window_id = ?handle, "drag ended");
        }
        ended
    }

    fn entry_rect(&self, handle: WindowHandle) -> FloatRect {
        self.taskbar
            .entry_rect(handle)
            .map(FloatRect::from_rect)
            .unwrap_or_else(|| {
                let bar = self.taskbar.area();
                FloatRect::new(bar.x as i32, bar.y as i32, 1, 1)
            })
    }

    /// Hide a window. The window is gone from the screen at once; a ghost
    /// then flies into its taskbar entry. Minimizing a minimized window
    /// does nothing.
    pub fn minimize(&mut self, handle: WindowHandle, now: Instant) -> Result<(), WmError> {
        let to = self.entry_rect(handle);
        let window = self
            .windows
            .get_mut(&handle)
            .ok_or(WmError::InvalidHandle(handle))?;
        if window.is_minimized() {
            return Ok(());
        }
        window.visibility = Visibility::Minimized;
        let from = window.rect;
        self.taskbar.set_minimized(handle, true);
        if self.drag.is_some_and(|d| d.handle == handle) {
            self.end_drag();
        }
        if self.pointer_owner == Some(handle) {
            self.pointer_owner = None;
        }
        self.animations.retain(|a| a.handle != handle);
        self.animations.push(WindowAnimation::minimize(
            handle,
            from,
            to,
            now,
            self.animation_duration,
        ));
        tracing::debug!(window_id = ?handle, "minimized window");
        Ok(())
    }

    /// Show a minimized window again and raise it. The window counts as
    /// open right away but is only drawn once its ghost has grown back into
    /// place. Restoring an open window does nothing.
    pub fn restore(&mut self, handle: WindowHandle, now: Instant) -> Result<(), WmError> {
        let from = self.entry_rect(handle);
        let window = self
            .windows
            .get(&handle)
            .ok_or(WmError::InvalidHandle(handle))?;
        if !window.is_minimized() {
            return Ok(());
        }
        let to = window.rect;
        let index = self.take_stack_index();
        if let Some(window) = self.windows.get_mut(&handle) {
            window.visibility = Visibility::Open;
            window.stack_index = index;
        }
        self.taskbar.set_minimized(handle, false);
        self.animations.retain(|a| a.handle != handle);
        self.animations.push(WindowAnimation::restore(
            handle,
            from,
            to,
            now,
            self.animation_duration,
        ));
        tracing::debug!(window_id = ?handle, seq = index, "restored window");
        Ok(())
    }

    /// Tear down a window and everything that points at it. The handle is
    /// invalid afterwards.
    pub fn close(&mut self, handle: WindowHandle) -> Result<(), WmError> {
        let mut window = self
            .windows
            .remove(&handle)
            .ok_or(WmError::InvalidHandle(handle))?;
        tracing::debug!(window_id = ?handle, app = %window.app, "closing window");
        release_content(handle, &window.app, window.content.as_mut());
        self.taskbar.remove(handle);
        if self.drag.is_some_and(|d| d.handle == handle) {
            self.end_drag();
        }
        if self.pointer_owner == Some(handle) {
            self.pointer_owner = None;
        }
        self.animations.retain(|a| a.handle != handle);
        Ok(())
    }

    pub fn apply_taskbar_request(&mut self, request: TaskbarRequest, now: Instant) -> Result<(), WmError> {
        match request {
            TaskbarRequest::Minimize(handle) => self.minimize(handle, now),
            TaskbarRequest::Restore(handle) => self.restore(handle, now),
            TaskbarRequest::ShowHidden => self.show_hidden(now),
        }
    }

    /// Bring forward a window whose taskbar entry is folded away: the first
    /// minimized one is restored, otherwise focus steps through them.
    fn show_hidden(&mut self, now: Instant) -> Result<(), WmError> {
        let hidden = self.taskbar.hidden();
        let minimized = hidden
            .iter()
            .copied()
            .find(|h| self.windows.get(h).is_some_and(|w| w.is_minimized()));
        if let Some(handle) = minimized {
            return self.restore(handle, now);
        }
        let next = match self
            .focused()
            .and_then(|f| hidden.iter().position(|h| *h == f))
        {
            Some(i) => hidden.get((i + 1) % hidden.len()),
            None => hidden.first(),
        };
        match next {
            Some(handle) => self.focus(*handle).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Rebuild the content of every window of `app` from its launch
    /// arguments. Position, stacking and visibility are kept. Returns how
    /// many windows were refreshed.
    pub fn refresh(&mut self, app: &str, host: &mut AppletHost, now: Instant) -> Result<usize, WmError> {
        if !self.registry.contains(app) {
            return Err(WmError::UnknownApp(app.to_string()));
        }
        let handles = self.handles_for(app);
        for handle in &handles {
            let Some(window) = self.windows.get_mut(handle) else {
                continue;
            };
            let fresh = self.registry.create(app, &window.args)?;
            let mut stale = std::mem::replace(&mut window.content, fresh);
            release_content(*handle, app, stale.as_mut());
            self.init_content(*handle, host, now);
        }
        if !handles.is_empty() {
            tracing::debug!(app, count = handles.len(), "refreshed windows");
        }
        Ok(handles.len())
    }

    /// Hand the answer of a prompt back to the window that asked for it.
    pub fn deliver_prompt(
        &mut self,
        handle: WindowHandle,
        value: &str,
        host: &mut AppletHost,
        now: Instant,
    ) -> Result<(), WmError> {
        let focused = self.focused() == Some(handle);
        let window = self
            .windows
            .get_mut(&handle)
            .ok_or(WmError::InvalidHandle(handle))?;
        let mut cx = AppletContext::new(handle, window.flags, now, focused, host);
        window.content.on_prompt(value, &mut cx);
        Ok(())
    }

    /// Advance time: release a throttled drag sample, drop finished
    /// animations and tick every applet.
    pub fn tick(&mut self, host: &mut AppletHost, now: Instant) {
        self.flush_drag(now);
        self.animations.retain(|a| !a.finished(now));
        let focused = self.focused();
        for (handle, window) in self.windows.iter_mut() {
            let mut cx = AppletContext::new(*handle, window.flags, now, focused == Some(*handle), host);
            window.content.tick(&mut cx);
        }
    }

    fn dispatch(&mut self, handle: WindowHandle, event: &Event, host: &mut AppletHost, now: Instant) -> bool {
        let focused = self.focused() == Some(handle);
        let Some(window) = self.windows.get_mut(&handle) else {
            return false;
        };
        let mut cx = AppletContext::new(handle, window.flags, now, focused, host);
        window.content.handle_event(event, &mut cx)
    }

    fn localize(&self, handle: WindowHandle, mouse: MouseEvent) -> Option<Event> {
        let window = self.windows.get(&handle)?;
        let content = window.content_rect();
        let column = (mouse.column as i32 - content.x).clamp(0, u16::MAX as i32) as u16;
        let row = (mouse.row as i32 - content.y).clamp(0, u16::MAX as i32) as u16;
        Some(Event::Mouse(MouseEvent { column, row, ..mouse }))
    }

    fn forward_mouse(&mut self, handle: WindowHandle, mouse: MouseEvent, host: &mut AppletHost, now: Instant) -> bool {
        match self.localize(handle, mouse) {
            Some(event) => self.dispatch(handle, &event, host, now),
            None => false,
        }
    }

    /// Route an input event. Keys go to the focused window; mouse events
    /// go to the taskbar, window chrome or window content under the
    /// pointer. Returns whether anything consumed the event.
    pub fn handle_event(&mut self, event: &Event, host: &mut AppletHost, now: Instant) -> bool {
        match event {
            Event::Mouse(mouse) => self.handle_mouse(*mouse, host, now),
            Event::Key(_) | Event::Paste(_) => {
                let Some(handle) = self.focused().filter(|h| self.is_revealed(*h, now)) else {
                    return false;
                };
                self.dispatch(handle, event, host, now)
            }
            _ => false,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, host: &mut AppletHost, now: Instant) -> bool {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(request) = self.taskbar.click(mouse.column, mouse.row) {
                    log_ignored(self.apply_taskbar_request(request, now));
                    return true;
                }
                let Some(handle) = self.window_at(mouse.column, mouse.row, now) else {
                    return false;
                };
                let rect = self.windows[&handle].rect;
                let local_x = (mouse.column as i32 - rect.x) as u16;
                let local_y = (mouse.row as i32 - rect.y) as u16;
                match self
                    .decorator
                    .hit_test((rect.width, rect.height), local_x, local_y)
                {
                    HeaderAction::Close => log_ignored(self.close(handle)),
                    HeaderAction::Minimize => log_ignored(self.minimize(handle, now)),
                    HeaderAction::Drag => {
                        log_ignored(self.begin_drag(handle, mouse.column, mouse.row))
                    }
                    HeaderAction::None => {
                        log_ignored(self.focus(handle).map(|_| ()));
                        let content = content_rect_of(rect);
                        let visible = float_rect_visible(content, self.area);
                        if rect_contains(visible, mouse.column, mouse.row) {
                            self.pointer_owner = Some(handle);
                            self.forward_mouse(handle, mouse, host, now);
                        }
                    }
                }
                true
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.drag_to(mouse.column, mouse.row, now) {
                    return true;
                }
                match self.pointer_owner {
                    Some(owner) => {
                        self.forward_mouse(owner, mouse, host, now);
                        true
                    }
                    None => false,
                }
            }
            MouseEventKind::Up(_) => {
                if self.end_drag().is_some() {
                    return true;
                }
                match self.pointer_owner.take() {
                    Some(owner) => {
                        self.forward_mouse(owner, mouse, host, now);
                        true
                    }
                    None => false,
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let Some(handle) = self.window_at(mouse.column, mouse.row, now) else {
                    return false;
                };
                self.forward_mouse(handle, mouse, host, now)
            }
            _ => false,
        }
    }

    /// Draw every revealed window bottom to top, then the minimize/restore
    /// ghosts over them.
    pub fn render(&mut self, frame: &mut UiFrame<'_>, theme: &Theme, now: Instant) {
        let focused = self.focused();
        for handle in self.stacking_order() {
            if !self.is_revealed(handle, now) {
                continue;
            }
            let Some(window) = self.windows.get_mut(&handle) else {
                continue;
            };
            let rect = window.rect;
            if rect.width == 0 || rect.height == 0 {
                continue;
            }
            // Windows can hang off any edge, so render at the origin of a
            // private buffer and blit with signed offsets.
            let local = Rect::new(0, 0, rect.width, rect.height);
            let mut buffer = Buffer::empty(local);
            {
                let mut offscreen = UiFrame::from_parts(local, &mut buffer);
                let is_focused = focused == Some(handle);
                self.decorator.render_window(
                    &mut offscreen,
                    (rect.width, rect.height),
                    &window.title,
                    is_focused,
                    theme,
                );
                let content = Rect::new(
                    1,
                    1,
                    rect.width.saturating_sub(2),
                    rect.height.saturating_sub(2),
                );
                let ctx = ComponentContext::new(theme)
                    .with_focus(is_focused)
                    .with_read_only(window.flags.read_only);
                window.content.render(&mut offscreen, content, &ctx);
            }
            frame.blit_from_signed(&buffer, rect);
        }

        for animation in &self.animations {
            if animation.finished(now) {
                continue;
            }
            let mut style = theme.ghost();
            if animation.faded(now) {
                style = style.add_modifier(Modifier::DIM);
            }
            render_ghost(frame, animation.frame(now), style);
        }
    }
}

fn log_ignored(result: Result<(), WmError>) {
    if let Err(err) = result {
        tracing::debug!(error = %err, "ignored window operation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applets::{Applet, AppletArgs, AppletEntry};
    use crate::error::AppletError;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::cell::RefCell;

    thread_local! {
        static LOG: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    fn record(entry: impl Into<String>) {
        LOG.with(|log| log.borrow_mut().push(entry.into()));
    }

    fn log() -> Vec<String> {
        LOG.with(|log| log.borrow().clone())
    }

    #[derive(Debug)]
    struct Probe;

    impl Applet for Probe {
        fn init(&mut self, cx: &mut AppletContext<'_>) -> Result<(), AppletError> {
            record(format!("init {}", cx.handle()));
            Ok(())
        }

        fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
            frame.text(area, area.x, area.y, "probe", ctx.theme().window_body());
        }

        fn handle_event(&mut self, event: &Event, _cx: &mut AppletContext<'_>) -> bool {
            match event {
                Event::Key(_) => record("key"),
                Event::Mouse(m) => record(format!("mouse {},{}", m.column, m.row)),
                _ => return false,
            }
            true
        }

        fn on_prompt(&mut self, value: &str, _cx: &mut AppletContext<'_>) {
            record(format!("prompt {value}"));
        }

        fn teardown(&mut self) {
            record("teardown");
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl Applet for Broken {
        fn init(&mut self, _cx: &mut AppletContext<'_>) -> Result<(), AppletError> {
            Err(AppletError::Init("no sound card".into()))
        }

        fn render(&mut self, _frame: &mut UiFrame<'_>, _area: Rect, _ctx: &ComponentContext<'_>) {}
    }

    /// Ignores teardown and keeps running.
    #[derive(Debug)]
    struct Stubborn;

    impl Applet for Stubborn {
        fn render(&mut self, _frame: &mut UiFrame<'_>, _area: Rect, _ctx: &ComponentContext<'_>) {}

        fn is_active(&self) -> bool {
            true
        }
    }

    fn registry() -> AppletRegistry {
        let mut registry = AppletRegistry::new();
        registry.register(AppletEntry {
            name: "Probe",
            icon: "[p]",
            size: (20, 8),
            create: |_: &AppletArgs| -> Box<dyn Applet> { Box::new(Probe) },
        });
        registry.register(AppletEntry {
            name: "Other",
            icon: "[o]",
            size: (20, 8),
            create: |_: &AppletArgs| -> Box<dyn Applet> { Box::new(Probe) },
        });
        registry.register(AppletEntry {
            name: "Stubborn",
            icon: "[s]",
            size: (20, 8),
            create: |_: &AppletArgs| -> Box<dyn Applet> { Box::new(Stubborn) },
        });
        registry.register(AppletEntry {
            name: "Broken",
            icon: "[b]",
            size: (20, 8),
            create: |_: &AppletArgs| -> Box<dyn Applet> { Box::new(Broken) },
        });
        registry
    }

    fn setup() -> (WindowManager, AppletHost, Instant) {
        let mut wm = WindowManager::new(registry());
        wm.taskbar_mut().split_area(Rect::new(0, 0, 100, 31));
        wm.set_area(Rect::new(0, 0, 100, 30));
        (wm, AppletHost::default(), Instant::now())
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn open_assigns_rising_stack_indices_and_taskbar_entries() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        let b = wm.open("Other", OpenOptions::desktop(), &mut host, now).unwrap();
        assert_ne!(a, b);
        assert_eq!(wm.window(a).unwrap().stack_index(), FIRST_STACK_INDEX);
        assert_eq!(wm.window(b).unwrap().stack_index(), FIRST_STACK_INDEX + 1);
        assert_eq!(wm.focused(), Some(b));
        let labels: Vec<_> = wm.taskbar().entries().iter().map(|e| e.label.clone()).collect();
        assert_eq!(labels, vec!["Probe", "Other"]);
        assert_eq!(wm.window(a).unwrap().position(), (16, 1));
        assert!(log().contains(&format!("init {a}")));
    }

    #[test]
    fn default_placement_is_offset_from_desktop_and_clamped() {
        let (mut wm, mut host, now) = setup();
        wm.set_area(Rect::new(5, 2, 10, 3));
        let a = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        // 5 + 16 would leave the area; the title bar keeps 4 cells visible.
        assert_eq!(wm.window(a).unwrap().position(), (11, 3));
    }

    #[test]
    fn close_removes_window_even_if_applet_keeps_running() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Stubborn", OpenOptions::desktop(), &mut host, now).unwrap();
        wm.close(a).unwrap();
        assert!(!wm.contains(a));
        assert!(wm.taskbar().is_empty());
        assert_eq!(wm.close(a), Err(WmError::InvalidHandle(a)));
    }

    #[test]
    fn unknown_app_is_rejected() {
        let (mut wm, mut host, now) = setup();
        let err = wm.open("Nope", OpenOptions::desktop(), &mut host, now).unwrap_err();
        assert_eq!(err, WmError::UnknownApp("Nope".into()));
        assert!(wm.is_empty());
        assert!(wm.taskbar().is_empty());
    }

    #[test]
    fn desktop_reopen_focuses_existing_window() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        wm.open("Other", OpenOptions::desktop(), &mut host, now).unwrap();
        let again = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        assert_eq!(again, a);
        assert_eq!(wm.len(), 2);
        assert_eq!(wm.focused(), Some(a));
    }

    #[test]
    fn desktop_reopen_restores_minimized_window() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        wm.minimize(a, now).unwrap();
        let again = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        assert_eq!(again, a);
        assert!(!wm.window(a).unwrap().is_minimized());
        assert!(!wm.taskbar().entry(a).unwrap().minimized);
    }

    #[test]
    fn spawned_windows_are_not_unique() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::spawned(), &mut host, now).unwrap();
        let b = wm.open("Probe", OpenOptions::spawned(), &mut host, now).unwrap();
        assert_ne!(a, b);
        let c = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        assert_ne!(c, a);
        assert_ne!(c, b);
        assert_eq!(wm.len(), 3);
    }

    #[test]
    fn focus_is_monotonic() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        let b = wm.open("Other", OpenOptions::desktop(), &mut host, now).unwrap();
        let first = wm.focus(a).unwrap();
        let second = wm.focus(b).unwrap();
        assert!(second > first);
        assert_eq!(wm.stacking_order(), vec![a, b]);
    }

    #[test]
    fn minimize_and_restore_mirror_taskbar() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        wm.minimize(a, now).unwrap();
        assert!(wm.window(a).unwrap().is_minimized());
        assert!(wm.taskbar().entry(a).unwrap().minimized);
        assert_eq!(wm.focused(), None);
        assert_eq!(wm.animations().len(), 1);
        assert_eq!(wm.animations()[0].kind, AnimationKind::Minimize);

        // Minimizing again changes nothing.
        wm.minimize(a, now).unwrap();
        assert_eq!(wm.animations().len(), 1);

        let before = wm.next_stack_index();
        wm.restore(a, now).unwrap();
        assert_eq!(wm.window(a).unwrap().stack_index(), before);
        assert!(!wm.taskbar().entry(a).unwrap().minimized);
        assert_eq!(wm.animations()[0].kind, AnimationKind::Restore);

        // Restoring an open window changes nothing.
        let index = wm.next_stack_index();
        wm.restore(a, now).unwrap();
        assert_eq!(wm.next_stack_index(), index);
    }

    #[test]
    fn restored_window_is_drawn_after_animation() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        wm.minimize(a, now).unwrap();
        wm.restore(a, now).unwrap();
        assert!(!wm.is_revealed(a, now));
        let later = now + Duration::from_millis(400);
        assert!(wm.is_revealed(a, later));
        wm.tick(&mut host, later);
        assert!(wm.animations().is_empty());
    }

    #[test]
    fn close_invalidates_handle() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        wm.close(a).unwrap();
        assert!(log().contains(&"teardown".to_string()));
        assert!(wm.taskbar().entry(a).is_none());
        assert_eq!(wm.close(a), Err(WmError::InvalidHandle(a)));
        assert_eq!(wm.minimize(a, now), Err(WmError::InvalidHandle(a)));
        assert_eq!(wm.restore(a, now), Err(WmError::InvalidHandle(a)));
        assert_eq!(wm.focus(a), Err(WmError::InvalidHandle(a)));
        assert!(wm.begin_drag(a, 0, 0).is_err());
    }

    #[test]
    fn closing_while_minimized_removes_entry() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        wm.minimize(a, now).unwrap();
        wm.close(a).unwrap();
        assert!(wm.taskbar().is_empty());
        assert!(wm.animations().is_empty());
        // A fresh desktop launch creates a new window.
        let b = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn drag_is_throttled_to_latest_sample() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop().at(10, 5), &mut host, now).unwrap();
        wm.begin_drag(a, 12, 5).unwrap();
        wm.drag_to(13, 5, now);
        wm.drag_to(15, 6, now + Duration::from_millis(10));
        wm.drag_to(20, 8, now + Duration::from_millis(20));
        assert_eq!(wm.window(a).unwrap().position(), (10, 5));
        wm.tick(&mut host, now + Duration::from_millis(50));
        assert_eq!(wm.window(a).unwrap().position(), (18, 8));
        assert_eq!(wm.end_drag(), Some(a));
    }

    #[test]
    fn end_drag_discards_pending_sample() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop().at(10, 5), &mut host, now).unwrap();
        wm.begin_drag(a, 12, 5).unwrap();
        wm.drag_to(30, 9, now);
        wm.end_drag();
        wm.tick(&mut host, now + Duration::from_millis(100));
        assert_eq!(wm.window(a).unwrap().position(), (10, 5));
    }

    #[test]
    fn move_requires_active_drag() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        assert_eq!(wm.move_window(a, 1, 1), Err(WmError::NoActiveDrag(a)));
    }

    #[test]
    fn dragging_keeps_title_bar_reachable() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop().at(10, 5), &mut host, now).unwrap();
        wm.begin_drag(a, 12, 5).unwrap();
        wm.move_window(a, -200, -50).unwrap();
        let rect = wm.window(a).unwrap().rect();
        assert_eq!(rect.y, 0);
        assert_eq!(rect.x, -(rect.width as i32) + MIN_FLOATING_VISIBLE_MARGIN as i32);
    }

    #[test]
    fn drag_raises_window() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        wm.open("Other", OpenOptions::desktop(), &mut host, now).unwrap();
        wm.begin_drag(a, 20, 1).unwrap();
        assert_eq!(wm.focused(), Some(a));
    }

    #[test]
    fn title_bar_buttons_route_through_mouse() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop().at(10, 5), &mut host, now).unwrap();
        // Width 20: minimize at x 12..15, close at x 16..19 (relative).
        assert!(wm.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 23, 5), &mut host, now));
        assert!(wm.window(a).unwrap().is_minimized());
        wm.restore(a, now).unwrap();
        let later = now + Duration::from_secs(1);
        assert!(wm.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 27, 5), &mut host, later));
        assert!(!wm.contains(a));
    }

    #[test]
    fn title_press_then_drag_moves_window() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop().at(10, 5), &mut host, now).unwrap();
        wm.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 12, 5), &mut host, now);
        assert_eq!(wm.drag().map(|d| d.handle), Some(a));
        wm.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 14, 7), &mut host, now);
        wm.tick(&mut host, now + Duration::from_millis(60));
        assert_eq!(wm.window(a).unwrap().position(), (12, 7));
        wm.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), 14, 7), &mut host, now);
        assert!(wm.drag().is_none());
    }

    #[test]
    fn body_press_is_localized_to_content() {
        let (mut wm, mut host, now) = setup();
        wm.open("Probe", OpenOptions::desktop().at(10, 5), &mut host, now).unwrap();
        wm.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 14, 8), &mut host, now);
        wm.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 9, 8), &mut host, now);
        let log = log();
        assert!(log.contains(&"mouse 3,2".to_string()));
        assert!(log.contains(&"mouse 0,2".to_string()));
    }

    #[test]
    fn taskbar_click_toggles_window() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        let entry = wm.taskbar().entry_rect(a).unwrap();
        wm.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), entry.x, entry.y), &mut host, now);
        assert!(wm.window(a).unwrap().is_minimized());
        wm.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), entry.x, entry.y), &mut host, now);
        assert!(!wm.window(a).unwrap().is_minimized());
    }

    #[test]
    fn folded_taskbar_entries_stay_reachable() {
        let (mut wm, mut host, now) = setup();
        let handles: Vec<_> = (0..30)
            .map(|_| wm.open("Probe", OpenOptions::spawned(), &mut host, now).unwrap())
            .collect();
        let hidden = wm.taskbar().hidden();
        assert!(!hidden.is_empty());
        let last = *handles.last().unwrap();
        assert!(hidden.contains(&last));

        wm.minimize(last, now).unwrap();
        let overflow = wm.taskbar().entry_rect(last).unwrap();
        let click = mouse(MouseEventKind::Down(MouseButton::Left), overflow.x, overflow.y);
        assert!(wm.handle_event(&click, &mut host, now));
        assert!(!wm.window(last).unwrap().is_minimized());

        wm.focus(handles[0]).unwrap();
        wm.handle_event(&click, &mut host, now);
        assert_eq!(wm.focused(), Some(hidden[0]));
        wm.handle_event(&click, &mut host, now);
        assert_eq!(wm.focused(), Some(hidden[1]));
    }

    #[test]
    fn keys_go_to_focused_window() {
        let (mut wm, mut host, now) = setup();
        wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        let key = Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        assert!(wm.handle_event(&key, &mut host, now));
        assert!(log().contains(&"key".to_string()));
    }

    #[test]
    fn init_failure_keeps_window_and_reports() {
        let (mut wm, mut host, now) = setup();
        let handle = wm.open("Broken", OpenOptions::desktop(), &mut host, now).unwrap();
        assert!(wm.contains(handle));
        assert!(matches!(
            host.requests().first(),
            Some(DesktopRequest::ShowDialog { title, .. }) if title == "Error"
        ));
    }

    #[test]
    fn refresh_rebuilds_content_in_place() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::spawned().at(30, 4), &mut host, now).unwrap();
        let index = wm.window(a).unwrap().stack_index();
        assert_eq!(wm.refresh("Probe", &mut host, now), Ok(1));
        assert_eq!(wm.window(a).unwrap().position(), (30, 4));
        assert_eq!(wm.window(a).unwrap().stack_index(), index);
        assert_eq!(log().iter().filter(|l| l.starts_with("init")).count(), 2);
        assert_eq!(wm.refresh("Other", &mut host, now), Ok(0));
        assert!(wm.refresh("Nope", &mut host, now).is_err());
    }

    #[test]
    fn prompt_answers_reach_their_window() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::desktop(), &mut host, now).unwrap();
        wm.deliver_prompt(a, "notes.txt", &mut host, now).unwrap();
        assert!(log().contains(&"prompt notes.txt".to_string()));
    }

    #[test]
    fn cycle_focus_rotates() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::spawned(), &mut host, now).unwrap();
        let b = wm.open("Probe", OpenOptions::spawned(), &mut host, now).unwrap();
        let c = wm.open("Probe", OpenOptions::spawned(), &mut host, now).unwrap();
        assert_eq!(wm.cycle_focus(true), Some(a));
        assert_eq!(wm.cycle_focus(true), Some(b));
        assert_eq!(wm.cycle_focus(true), Some(c));
        assert_eq!(wm.cycle_focus(false), Some(b));
    }

    #[test]
    fn render_draws_windows_in_stack_order() {
        let (mut wm, mut host, now) = setup();
        let a = wm.open("Probe", OpenOptions::spawned().at(0, 0).with_title("Lower"), &mut host, now).unwrap();
        wm.open("Probe", OpenOptions::spawned().at(5, 0).with_title("Upper"), &mut host, now).unwrap();
        let area = Rect::new(0, 0, 100, 31);
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        wm.render(&mut frame, &Theme::default(), now);
        let row: String = (0..40u16).map(|x| buf.cell((x, 0)).unwrap().symbol().to_string()).collect();
        assert!(row.contains("Upper"));
        assert!(!row.contains("Lower"));

        wm.focus(a).unwrap();
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        wm.render(&mut frame, &Theme::default(), now);
        let row: String = (0..40u16).map(|x| buf.cell((x, 0)).unwrap().symbol().to_string()).collect();
        assert!(row.contains("Lower"));
    }
}
