//! Smooths over platform differences in crossterm key reporting.

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

/// Turns raw terminal events into the ones the desktop expects.
///
/// - Shift+Tab arrives as `BackTab` everywhere.
/// - Key releases are dropped. Windows consoles also report repeats and
///   a held Esc as a stream of presses; only the first press survives.
#[derive(Debug, Default)]
pub struct KeyboardNormalizer {
    esc_held: bool,
}

impl KeyboardNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, event: Event) -> Option<Event> {
        let Event::Key(mut key) = event else {
            return Some(event);
        };
        if key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT) {
            key.code = KeyCode::BackTab;
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
        match key.kind {
            KeyEventKind::Release => {
                if key.code == KeyCode::Esc {
                    self.esc_held = false;
                }
                return None;
            }
            KeyEventKind::Repeat if cfg!(windows) => return None,
            _ => {}
        }
        if cfg!(windows) && key.code == KeyCode::Esc {
            if self.esc_held {
                return None;
            }
            self.esc_held = true;
        } else {
            self.esc_held = false;
        }
        Some(Event::Key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    #[test]
    fn shift_tab_becomes_backtab() {
        let mut norm = KeyboardNormalizer::new();
        let out = norm.normalize(Event::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT)));
        let Some(Event::Key(key)) = out else {
            panic!("expected a key event");
        };
        assert_eq!(key.code, KeyCode::BackTab);
        assert!(!key.modifiers.contains(KeyModifiers::SHIFT));
    }

    #[test]
    fn releases_are_dropped() {
        let mut norm = KeyboardNormalizer::new();
        let mut key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert!(norm.normalize(Event::Key(key)).is_none());
    }

    #[test]
    fn other_events_pass_through() {
        let mut norm = KeyboardNormalizer::new();
        assert_eq!(norm.normalize(Event::Resize(10, 20)), Some(Event::Resize(10, 20)));
        assert_eq!(
            norm.normalize(Event::Paste("hi".into())),
            Some(Event::Paste("hi".into()))
        );
    }
}
