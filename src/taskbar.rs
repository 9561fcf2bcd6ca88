//! The taskbar: one entry per live window, in creation order, plus a clock
//! and host name on the right.
//!
//! Entries are a mirror of window state. Only the window manager adds,
//! removes or flags them; a click on an entry produces a [`TaskbarRequest`]
//! for the window manager to carry out.
//!
//! Entries never run into the status text. When the row is crowded labels
//! are shortened, and past that the trailing entries fold into a single
//! `+N` entry.

use ratatui::layout::Rect;

use crate::constants::{TASKBAR_LABEL_MAX, TASKBAR_LABEL_MIN};
use crate::layout::rect_contains;
use crate::theme::Theme;
use crate::ui::{UiFrame, truncate_to_width};
use crate::window::WindowHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskbarEntry {
    pub handle: WindowHandle,
    pub label: String,
    pub minimized: bool,
}

/// What clicking an entry asks of the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskbarRequest {
    Minimize(WindowHandle),
    Restore(WindowHandle),
    /// The `+N` entry was clicked: bring one of the folded windows forward.
    ShowHidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotTarget {
    Entry(WindowHandle),
    Overflow,
}

#[derive(Debug, Clone)]
struct Slot {
    target: SlotTarget,
    rect: Rect,
    text: String,
}

#[derive(Debug, Default)]
pub struct Taskbar {
    entries: Vec<TaskbarEntry>,
    area: Rect,
    hostname: Option<String>,
    status: String,
}

impl Taskbar {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, handle: WindowHandle, label: impl Into<String>) {
        self.entries.push(TaskbarEntry {
            handle,
            label: label.into(),
            minimized: false,
        });
    }

    pub(crate) fn remove(&mut self, handle: WindowHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub(crate) fn set_minimized(&mut self, handle: WindowHandle, minimized: bool) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.handle == handle) {
            entry.minimized = minimized;
        }
    }

    pub fn entries(&self) -> &[TaskbarEntry] {
        &self.entries
    }

    pub fn entry(&self, handle: WindowHandle) -> Option<&TaskbarEntry> {
        self.entries.iter().find(|e| e.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Reserve the bottom row of `area` for the taskbar and return the
    /// desktop area above it.
    pub fn split_area(&mut self, area: Rect) -> Rect {
        let bar_h = 1u16.min(area.height);
        self.area = Rect {
            x: area.x,
            y: area.y.saturating_add(area.height).saturating_sub(bar_h),
            width: area.width,
            height: bar_h,
        };
        Rect {
            height: area.height.saturating_sub(bar_h),
            ..area
        }
    }

    pub fn set_hostname(&mut self, name: impl Into<String>) {
        self.hostname = Some(name.into());
    }

    fn hostname(&mut self) -> &str {
        // Cached to avoid a system call every frame.
        self.hostname.get_or_insert_with(|| {
            hostname::get()
                .ok()
                .and_then(|s| s.into_string().ok())
                .unwrap_or_else(|| "unknown-host".to_string())
        })
    }

    /// Update the status text on the right. Entries are laid out in what
    /// is left of the row.
    pub fn set_clock(&mut self, clock: &str) {
        let host = self.hostname().to_string();
        self.status = format!("{host} · {clock} ");
    }

    /// Column where the status text starts.
    pub fn status_x(&self) -> u16 {
        let width = self.status.chars().count() as u16;
        self.area
            .x
            .saturating_add(self.area.width.saturating_sub(width))
    }

    fn label_text(label: &str, cap: usize) -> String {
        format!(" {} ", truncate_to_width(label, cap))
    }

    fn overflow_text(hidden: usize) -> String {
        format!(" +{hidden} ")
    }

    /// Entry slots in creation order, all left of the status text.
    fn layout(&self) -> Vec<Slot> {
        let start = self.area.x.saturating_add(1);
        // One blank cell before the status text.
        let end = self.status_x().saturating_sub(1).max(start);
        let avail = (end - start) as usize;
        if self.entries.is_empty() || avail == 0 {
            return Vec::new();
        }

        // Each entry costs its label, two cells of padding and one gap.
        let fits = |cap: usize| {
            self.entries
                .iter()
                .map(|e| e.label.chars().count().min(cap) + 3)
                .sum::<usize>()
                <= avail + 1
        };
        if let Some(cap) = (TASKBAR_LABEL_MIN..=TASKBAR_LABEL_MAX).rev().find(|cap| fits(*cap)) {
            let items = self.entries.iter().map(|e| {
                (SlotTarget::Entry(e.handle), Self::label_text(&e.label, cap))
            });
            return self.place(start, end, items);
        }

        let total = self.entries.len();
        let mut shown = total - 1;
        while shown > 0
            && shown * (TASKBAR_LABEL_MIN + 3) + Self::overflow_text(total - shown).chars().count() > avail
        {
            shown -= 1;
        }
        let items = self.entries[..shown]
            .iter()
            .map(|e| {
                (
                    SlotTarget::Entry(e.handle),
                    Self::label_text(&e.label, TASKBAR_LABEL_MIN),
                )
            })
            .chain(std::iter::once((
                SlotTarget::Overflow,
                Self::overflow_text(total - shown),
            )));
        self.place(start, end, items)
    }

    fn place(&self, start: u16, end: u16, items: impl Iterator<Item = (SlotTarget, String)>) -> Vec<Slot> {
        let mut x = start;
        let mut out = Vec::with_capacity(self.entries.len());
        for (target, text) in items {
            let width = (text.chars().count() as u16).min(end.saturating_sub(x));
            if width == 0 {
                break;
            }
            out.push(Slot {
                target,
                rect: Rect::new(x, self.area.y, width, 1),
                text,
            });
            x = x.saturating_add(width + 1);
        }
        out
    }

    fn overflow_rect(slots: &[Slot]) -> Option<Rect> {
        slots
            .iter()
            .find(|s| s.target == SlotTarget::Overflow)
            .map(|s| s.rect)
    }

    /// Where `handle` shows on the bar: its own entry, or the `+N` entry
    /// when it is folded away.
    pub fn entry_rect(&self, handle: WindowHandle) -> Option<Rect> {
        self.entry(handle)?;
        let slots = self.layout();
        slots
            .iter()
            .find(|s| s.target == SlotTarget::Entry(handle))
            .map(|s| s.rect)
            .or_else(|| Self::overflow_rect(&slots))
    }

    /// Windows folded into the `+N` entry, in creation order.
    pub fn hidden(&self) -> Vec<WindowHandle> {
        let slots = self.layout();
        self.entries
            .iter()
            .map(|e| e.handle)
            .filter(|h| !slots.iter().any(|s| s.target == SlotTarget::Entry(*h)))
            .collect()
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Option<WindowHandle> {
        self.layout().into_iter().find_map(|slot| match slot.target {
            SlotTarget::Entry(handle) if rect_contains(slot.rect, column, row) => Some(handle),
            _ => None,
        })
    }

    /// Toggle semantics: a minimized entry asks for restore, an open one
    /// asks for minimize.
    pub fn request_for(&self, handle: WindowHandle) -> Option<TaskbarRequest> {
        self.entry(handle).map(|entry| {
            if entry.minimized {
                TaskbarRequest::Restore(handle)
            } else {
                TaskbarRequest::Minimize(handle)
            }
        })
    }

    pub fn click(&self, column: u16, row: u16) -> Option<TaskbarRequest> {
        let slot = self
            .layout()
            .into_iter()
            .find(|slot| rect_contains(slot.rect, column, row))?;
        match slot.target {
            SlotTarget::Entry(handle) => self.request_for(handle),
            SlotTarget::Overflow => Some(TaskbarRequest::ShowHidden),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut UiFrame<'_>,
        focused: Option<WindowHandle>,
        clock: &str,
        theme: &Theme,
    ) {
        let area = self.area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.set_clock(clock);
        frame.fill(area, theme.taskbar());

        let slots = self.layout();
        for slot in &slots {
            let style = match slot.target {
                SlotTarget::Entry(handle) => {
                    let minimized = self.entry(handle).is_some_and(|e| e.minimized);
                    theme.taskbar_entry(focused == Some(handle), minimized)
                }
                SlotTarget::Overflow => {
                    let hidden = self.hidden();
                    let focused_hidden = focused.is_some_and(|f| hidden.contains(&f));
                    theme.taskbar_entry(focused_hidden, false)
                }
            };
            frame.text(slot.rect, slot.rect.x, slot.rect.y, &slot.text, style);
        }
        let status_x = self.status_x();
        frame.text(area, status_x, area.y, &self.status, theme.taskbar());
    }
}
