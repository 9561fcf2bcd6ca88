//! Replays a fixed list of events. Used to drive the event loop and the
//! desktop end to end without a terminal.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::Event;

use super::InputDriver;

#[derive(Debug, Default)]
pub struct ScriptedInputDriver {
    events: VecDeque<Event>,
    idle_polls: usize,
    mouse_capture: bool,
}

impl ScriptedInputDriver {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
            idle_polls: 0,
            mouse_capture: false,
        }
    }

    /// Allow `polls` empty polls once the script has run dry before the
    /// driver reports end of input.
    pub fn with_idle_polls(mut self, polls: usize) -> Self {
        self.idle_polls = polls;
        self
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    pub fn mouse_capture(&self) -> bool {
        self.mouse_capture
    }
}

impl InputDriver for ScriptedInputDriver {
    fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
        if !self.events.is_empty() {
            return Ok(true);
        }
        if self.idle_polls == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input script exhausted"));
        }
        self.idle_polls -= 1;
        Ok(false)
    }

    fn read(&mut self) -> io::Result<Event> {
        self.events
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "input script exhausted"))
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        self.mouse_capture = enabled;
        Ok(())
    }
}
