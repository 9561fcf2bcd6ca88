//! Arcade: snake on a 20x20 board.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};

use super::{ARCADE, Applet, AppletArgs, AppletContext, AppletEntry};
use crate::component_context::ComponentContext;
use crate::ui::UiFrame;
use crate::utils::XorShift;

pub const ENTRY: AppletEntry = AppletEntry {
    name: ARCADE,
    icon: "[S]",
    size: (44, 24),
    create,
};

fn create(_args: &AppletArgs) -> Box<dyn Applet> {
    Box::new(Arcade::new(XorShift::from_clock()))
}

pub const BOARD: i32 = 20;
const STEP: Duration = Duration::from_millis(100);
const START: (i32, i32) = (10, 10);
const FIRST_FOOD: (i32, i32) = (15, 15);
const FOOD_POINTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Outcome of advancing the game one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved,
    Ate,
    Crashed,
}

#[derive(Debug)]
pub struct Arcade {
    snake: VecDeque<(i32, i32)>,
    food: (i32, i32),
    direction: Direction,
    score: u32,
    /// Next step deadline; `None` while paused or not started.
    next_step: Option<Instant>,
    rng: XorShift,
}

impl Arcade {
    pub fn new(rng: XorShift) -> Self {
        Self {
            snake: VecDeque::from([START]),
            food: FIRST_FOOD,
            direction: Direction::Right,
            score: 0,
            next_step: None,
            rng,
        }
    }

    pub fn snake(&self) -> &VecDeque<(i32, i32)> {
        &self.snake
    }

    pub fn food(&self) -> (i32, i32) {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_running(&self) -> bool {
        self.next_step.is_some()
    }

    pub fn toggle(&mut self, now: Instant) {
        self.next_step = match self.next_step {
            Some(_) => None,
            None => Some(now + STEP),
        };
    }

    /// Turn, unless that would reverse straight into the snake's neck.
    pub fn steer(&mut self, direction: Direction) {
        if direction != self.direction.opposite() {
            self.direction = direction;
        }
    }

    fn spawn_food(&mut self) {
        loop {
            let food = (
                self.rng.below(BOARD as u64) as i32,
                self.rng.below(BOARD as u64) as i32,
            );
            if !self.snake.contains(&food) {
                self.food = food;
                return;
            }
        }
    }

    pub fn step(&mut self) -> Step {
        let (dx, dy) = self.direction.delta();
        let Some(&(x, y)) = self.snake.front() else {
            return Step::Crashed;
        };
        let head = (x + dx, y + dy);
        let off_board = !(0..BOARD).contains(&head.0) || !(0..BOARD).contains(&head.1);
        if off_board || self.snake.contains(&head) {
            return Step::Crashed;
        }
        self.snake.push_front(head);
        if head == self.food {
            self.score += FOOD_POINTS;
            self.spawn_food();
            Step::Ate
        } else {
            self.snake.pop_back();
            Step::Moved
        }
    }

    pub fn reset(&mut self) {
        self.snake = VecDeque::from([START]);
        self.direction = Direction::Right;
        self.score = 0;
        self.next_step = None;
        self.spawn_food();
    }
}

impl Applet for Arcade {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext<'_>) {
        let body = ctx.theme().window_body();
        frame.fill(area, body);
        if area.height == 0 {
            return;
        }
        let status = if self.is_running() {
            format!("Score: {}", self.score)
        } else {
            format!("Score: {}  SPACE to start/pause, WASD/arrows", self.score)
        };
        frame.text(area, area.x + 1, area.y, &status, body);

        let board = Rect::new(
            area.x + 1,
            area.y.saturating_add(1),
            (BOARD as u16) * 2,
            BOARD as u16,
        )
        .intersection(area);
        frame.fill(board, Style::default().bg(Color::Black));
        let cell = |frame: &mut UiFrame<'_>, (x, y): (i32, i32), glyph: &str, color: Color| {
            let col = board.x.saturating_add(x as u16 * 2);
            let row = board.y.saturating_add(y as u16);
            frame.text(board, col, row, glyph, Style::default().fg(color).bg(Color::Black));
        };
        for segment in &self.snake {
            cell(frame, *segment, "██", Color::LightGreen);
        }
        cell(frame, self.food, "██", Color::Red);
    }

    fn handle_event(&mut self, event: &Event, cx: &mut AppletContext<'_>) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        if key.kind == KeyEventKind::Release {
            return false;
        }
        if key.code == KeyCode::Char(' ') {
            if !cx.focused() {
                return false;
            }
            self.toggle(cx.now());
            return true;
        }
        if !self.is_running() {
            return false;
        }
        let direction = match key.code {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Direction::Up,
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Direction::Down,
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Direction::Left,
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Direction::Right,
            _ => return false,
        };
        self.steer(direction);
        true
    }

    fn tick(&mut self, cx: &mut AppletContext<'_>) {
        let now = cx.now();
        while let Some(due) = self.next_step {
            if now < due {
                break;
            }
            self.next_step = Some(due + STEP);
            if self.step() == Step::Crashed {
                let score = self.score;
                tracing::debug!(score, "arcade game over");
                cx.show_dialog("Game Over!", format!("Your Score: {score}"));
                self.reset();
                break;
            }
        }
    }

    fn teardown(&mut self) {
        self.next_step = None;
    }

    fn is_active(&self) -> bool {
        self.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applets::{AppletFlags, AppletHost, DesktopRequest};
    use crate::window::WindowHandle;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn game() -> Arcade {
        Arcade::new(XorShift::new(7))
    }

    fn key(game: &mut Arcade, host: &mut AppletHost, code: KeyCode, focused: bool) -> bool {
        let mut cx = AppletContext::new(
            WindowHandle::new(1),
            AppletFlags::default(),
            Instant::now(),
            focused,
            host,
        );
        game.handle_event(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)), &mut cx)
    }

    #[test]
    fn starts_heading_right_from_center() {
        let mut game = game();
        assert_eq!(game.snake().front(), Some(&(10, 10)));
        assert_eq!(game.food(), (15, 15));
        assert_eq!(game.step(), Step::Moved);
        assert_eq!(game.snake().front(), Some(&(11, 10)));
        assert_eq!(game.snake().len(), 1);
    }

    #[test]
    fn cannot_reverse() {
        let mut game = game();
        game.steer(Direction::Left);
        assert_eq!(game.direction(), Direction::Right);
        game.steer(Direction::Up);
        assert_eq!(game.direction(), Direction::Up);
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut game = game();
        game.food = (11, 10);
        assert_eq!(game.step(), Step::Ate);
        assert_eq!(game.score(), 10);
        assert_eq!(game.snake().len(), 2);
        assert!(!game.snake().contains(&game.food()));
    }

    #[test]
    fn wall_ends_the_game() {
        let mut game = game();
        for _ in 0..9 {
            assert_ne!(game.step(), Step::Crashed);
        }
        assert_eq!(game.step(), Step::Crashed);
    }

    #[test]
    fn space_needs_focus() {
        let mut host = AppletHost::default();
        let mut game = game();
        assert!(!key(&mut game, &mut host, KeyCode::Char(' '), false));
        assert!(!game.is_running());
        assert!(key(&mut game, &mut host, KeyCode::Char(' '), true));
        assert!(game.is_running());
    }

    #[test]
    fn steering_ignored_until_started() {
        let mut host = AppletHost::default();
        let mut game = game();
        assert!(!key(&mut game, &mut host, KeyCode::Char('w'), true));
        assert_eq!(game.direction(), Direction::Right);
    }

    #[test]
    fn crash_reports_score_and_resets() {
        let mut host = AppletHost::default();
        let mut game = game();
        let now = Instant::now();
        game.food = (0, 19);
        game.toggle(now);
        let mut cx = AppletContext::new(
            WindowHandle::new(1),
            AppletFlags::default(),
            now + Duration::from_secs(2),
            true,
            &mut host,
        );
        game.tick(&mut cx);
        assert_eq!(
            host.requests(),
            &[DesktopRequest::ShowDialog {
                title: "Game Over!".into(),
                body: "Your Score: 0".into()
            }]
        );
        assert!(!game.is_running());
        assert_eq!(game.score(), 0);
        assert_eq!(game.snake().len(), 1);
    }
}
