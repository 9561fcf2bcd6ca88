//! NumPad: a four-function calculator.

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::Rect;

use super::{Applet, AppletArgs, AppletContext, AppletEntry, NUMPAD};
use crate::component_context::ComponentContext;
use crate::components::{ButtonRow, to_render_space};
use crate::ui::UiFrame;

pub const ENTRY: AppletEntry = AppletEntry {
    name: NUMPAD,
    icon: "[#]",
    size: (26, 12),
    create,
};

fn create(_args: &AppletArgs) -> Box<dyn Applet> {
    Box::new(NumPad::new())
}

const KEYPAD: [[&str; 4]; 4] = [
    ["7", "8", "9", "+"],
    ["4", "5", "6", "-"],
    ["1", "2", "3", "*"],
    ["0", "C", "=", "/"],
];

/// Calculator state machine. Operators evaluate strictly left to right;
/// there is no precedence.
#[derive(Debug, Clone)]
pub struct Calculator {
    display: String,
    previous: Option<String>,
    operation: Option<char>,
    new_number: bool,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

fn parse(value: &str) -> f64 {
    value.trim().parse().unwrap_or(f64::NAN)
}

fn format_number(value: f64) -> String {
    if value.is_infinite() {
        return if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }
    if value == 0.0 {
        // Collapse negative zero.
        return "0".to_string();
    }
    value.to_string()
}

impl Calculator {
    pub fn new() -> Self {
        Self {
            display: String::new(),
            previous: None,
            operation: None,
            new_number: true,
        }
    }

    pub fn clear(&mut self) -> String {
        *self = Self::new();
        "0".to_string()
    }

    fn calculate(&mut self) -> String {
        let (Some(previous), Some(operation)) = (self.previous.take(), self.operation.take()) else {
            return self.display.clone();
        };
        let prev = parse(&previous);
        let current = parse(&self.display);
        self.new_number = true;
        match operation {
            '+' => format_number(prev + current),
            '-' => format_number(prev - current),
            '*' => format_number(prev * current),
            '/' if current != 0.0 => format_number(prev / current),
            '/' => "Error".to_string(),
            _ => self.display.clone(),
        }
    }

    /// Feed one key (`0`-`9`, `+ - * /`, `=` or `C`) and return what the
    /// display should show.
    pub fn input(&mut self, key: &str) -> String {
        match key {
            "C" => self.clear(),
            "=" => {
                self.display = self.calculate();
                self.display.clone()
            }
            "+" | "-" | "*" | "/" => {
                if self.previous.is_some() {
                    self.display = self.calculate();
                }
                self.previous = Some(self.display.clone());
                self.operation = key.chars().next();
                self.new_number = true;
                self.display.clone()
            }
            digit => {
                if self.new_number {
                    self.display = digit.to_string();
                    self.new_number = false;
                } else {
                    self.display.push_str(digit);
                }
                self.display.clone()
            }
        }
    }
}

#[derive(Debug)]
pub struct NumPad {
    calculator: Calculator,
    shown: String,
    rows: Vec<ButtonRow>,
    area: Rect,
}

impl Default for NumPad {
    fn default() -> Self {
        Self::new()
    }
}

impl NumPad {
    pub fn new() -> Self {
        Self {
            calculator: Calculator::new(),
            shown: "0".to_string(),
            rows: KEYPAD.iter().map(|row| ButtonRow::new(*row)).collect(),
            area: Rect::default(),
        }
    }

    pub fn display(&self) -> &str {
        &self.shown
    }

    pub fn press(&mut self, key: &str) {
        self.shown = self.calculator.input(key);
    }

    fn key_for(code: KeyCode) -> Option<&'static str> {
        let key = match code {
            KeyCode::Char(ch @ '0'..='9') => KEYPAD
                .iter()
                .flatten()
                .find(|k| k.starts_with(ch))
                .copied()?,
            KeyCode::Char('+') => "+",
            KeyCode::Char('-') => "-",
            KeyCode::Char('*') | KeyCode::Char('x') => "*",
            KeyCode::Char('/') => "/",
            KeyCode::Char('=') | KeyCode::Enter => "=",
            KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Esc | KeyCode::Delete => "C",
            _ => return None,
        };
        Some(key)
    }
}

impl Applet for NumPad {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        self.area = area;
        let theme = ctx.theme();
        frame.fill(area, theme.window_body());
        if area.height == 0 {
            return;
        }
        let display = Rect::new(area.x + 1, area.y, area.width.saturating_sub(2), 1).intersection(area);
        frame.fill(display, theme.input(false));
        let shown = self.shown.as_str();
        let x = display
            .right()
            .saturating_sub(shown.chars().count() as u16 + 1)
            .max(display.x);
        frame.text(display, x, display.y, shown, theme.input(false));

        for (i, row) in self.rows.iter_mut().enumerate() {
            let y = area.y.saturating_add(2 + 2 * i as u16);
            let rect = Rect::new(area.x + 1, y, area.width.saturating_sub(1), 1).intersection(area);
            row.render(frame, rect, ctx);
        }
    }

    fn handle_event(&mut self, event: &Event, _cx: &mut AppletContext<'_>) -> bool {
        match event {
            Event::Key(key)
                if key.kind != KeyEventKind::Release
                    && !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                match Self::key_for(key.code) {
                    Some(k) => {
                        self.press(k);
                        true
                    }
                    None => false,
                }
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (column, row) = to_render_space(self.area, mouse);
                let hit = self.rows.iter().enumerate().find_map(|(r, buttons)| {
                    buttons.hit_test(column, row).map(|c| KEYPAD[r][c])
                });
                match hit {
                    Some(k) => {
                        self.press(k);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }
}
