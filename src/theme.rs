use ratatui::style::{Color, Modifier, Style};

use crate::term_color::Rgb;

// The five colors Tweak can change. Everything else is fixed chrome.
pub const BUTTON_RGB: Rgb = Rgb(0xc0, 0xc0, 0xc0);
pub const TASKBAR_RGB: Rgb = Rgb(0xd2, 0xa4, 0xa4);
pub const WINDOW_TITLE_RGB: Rgb = Rgb(0xf2, 0x42, 0x6b);
pub const CLOSE_BUTTON_RGB: Rgb = Rgb(0xee, 0xeb, 0x12);
pub const MINIMIZE_BUTTON_RGB: Rgb = Rgb(0xc0, 0xc0, 0xc0);

/// Session color scheme. Owned by the desktop and edited by Tweak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub button: Rgb,
    pub taskbar: Rgb,
    pub window_title: Rgb,
    pub close_button: Rgb,
    pub minimize_button: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            button: BUTTON_RGB,
            taskbar: TASKBAR_RGB,
            window_title: WINDOW_TITLE_RGB,
            close_button: CLOSE_BUTTON_RGB,
            minimize_button: MINIMIZE_BUTTON_RGB,
        }
    }
}

impl Theme {
    // Desktop
    pub fn desktop(&self) -> Style {
        Style::default().bg(Color::Indexed(30)).fg(Color::White)
    }

    pub fn icon_label(&self, highlighted: bool) -> Style {
        if highlighted {
            Style::default()
                .bg(Color::Indexed(24))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            self.desktop()
        }
    }

    // Taskbar
    pub fn taskbar(&self) -> Style {
        Style::default().bg(self.taskbar.to_color()).fg(Color::Black)
    }

    pub fn taskbar_entry(&self, focused: bool, minimized: bool) -> Style {
        let base = Style::default().bg(self.button.to_color()).fg(Color::Black);
        if minimized {
            base.add_modifier(Modifier::DIM)
        } else if focused {
            base.add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            base
        }
    }

    // Window chrome
    pub fn title_bar(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .bg(self.window_title.to_color())
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        }
    }

    pub fn close_button(&self) -> Style {
        Style::default()
            .bg(self.close_button.to_color())
            .fg(Color::Black)
    }

    pub fn minimize_button(&self) -> Style {
        Style::default()
            .bg(self.minimize_button.to_color())
            .fg(Color::Black)
    }

    pub fn window_border(&self) -> Style {
        Style::default().fg(Color::Gray).bg(Color::Black)
    }

    pub fn window_body(&self) -> Style {
        Style::default().bg(Color::Black).fg(Color::White)
    }

    pub fn ghost(&self) -> Style {
        Style::default().fg(Color::Gray).add_modifier(Modifier::DIM)
    }

    // Controls
    pub fn button(&self) -> Style {
        Style::default().bg(self.button.to_color()).fg(Color::Black)
    }

    pub fn button_disabled(&self) -> Style {
        self.button().add_modifier(Modifier::DIM)
    }

    pub fn input(&self, focused: bool) -> Style {
        let style = Style::default().bg(Color::Indexed(236)).fg(Color::White);
        if focused {
            style.add_modifier(Modifier::UNDERLINED)
        } else {
            style
        }
    }

    pub fn hint(&self) -> Style {
        Style::default().fg(Color::DarkGray).bg(Color::Black)
    }

    // Dialog
    pub fn dialog(&self) -> Style {
        Style::default().bg(Color::Gray).fg(Color::Black)
    }

    pub fn dialog_title(&self) -> Style {
        self.dialog().add_modifier(Modifier::BOLD)
    }
}
