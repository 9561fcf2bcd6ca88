//! Shared rendering context
//!
//! `ComponentContext` carries what a component needs to know about its
//! surroundings while drawing: whether its window has focus, whether it is
//! drawn read-only, and the session theme.

use crate::theme::Theme;

#[derive(Debug, Clone, Copy)]
pub struct ComponentContext<'a> {
    focused: bool,
    read_only: bool,
    theme: &'a Theme,
}

impl<'a> ComponentContext<'a> {
    pub const fn new(theme: &'a Theme) -> Self {
        Self {
            focused: false,
            read_only: false,
            theme,
        }
    }

    pub const fn focused(&self) -> bool {
        self.focused
    }

    pub const fn read_only(&self) -> bool {
        self.read_only
    }

    pub const fn theme(&self) -> &'a Theme {
        self.theme
    }

    /// Return a new `ComponentContext` with a modified `focused` flag.
    pub const fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub const fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}
