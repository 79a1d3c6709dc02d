use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Position, Rect};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::delay::{DelayPicker, RandomDelay};
use crate::round_timer::RoundTimer;
use crate::runtime::ReflexEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Toggle,
    Click,
    ResetScores,
    Restart,
    Quit,
}

impl Action {
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Click),
            KeyCode::Char('s') => Some(Action::Toggle),
            KeyCode::Char('r') => Some(Action::ResetScores),
            KeyCode::Char('c') => Some(Action::Restart),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        }
    }
}

/// Everything the event loop and the renderer share
pub struct App<C: Clock = SystemClock, D: DelayPicker = RandomDelay> {
    pub timer: RoundTimer<C, D>,
    /// Where the surface was last drawn, for mouse hit-testing
    pub surface_area: Option<Rect>,
    pub should_quit: bool,
}

impl<C: Clock, D: DelayPicker> App<C, D> {
    pub fn new(timer: RoundTimer<C, D>) -> Self {
        Self {
            timer,
            surface_area: None,
            should_quit: false,
        }
    }

    /// Applies one event. Returns true when the screen needs a redraw.
    pub fn on_event(&mut self, event: ReflexEvent) -> bool {
        match event {
            ReflexEvent::Tick => self.timer.poll(),
            ReflexEvent::Resize => true,
            ReflexEvent::Key(key) => match Action::from_key(&key) {
                Some(action) => {
                    self.apply(action);
                    true
                }
                None => false,
            },
            ReflexEvent::Click { column, row } => {
                let inside = self
                    .surface_area
                    .is_some_and(|area| area.contains(Position::new(column, row)));
                if inside {
                    self.apply(Action::Click);
                    true
                } else {
                    debug!(column, row, "click outside surface");
                    false
                }
            }
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Toggle => {
                self.timer.toggle();
            }
            Action::Click => {
                self.timer.click();
            }
            Action::ResetScores => {
                self.timer.reset_scores();
            }
            Action::Restart => self.timer.restart_visual_only(),
            Action::Quit => {
                self.timer.stop_session();
                self.should_quit = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::delay::FixedDelay;
    use crate::session::{Phase, RoundResult, SessionConfig};

    fn app() -> (App<ManualClock, FixedDelay>, ManualClock) {
        let clock = ManualClock::new();
        let timer = RoundTimer::new(SessionConfig::default(), clock.clone(), FixedDelay(2));
        (App::new(timer), clock)
    }

    fn key(code: KeyCode) -> ReflexEvent {
        ReflexEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn key_bindings() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(Action::from_key(&press(KeyCode::Char(' '))), Some(Action::Click));
        assert_eq!(Action::from_key(&press(KeyCode::Enter)), Some(Action::Click));
        assert_eq!(Action::from_key(&press(KeyCode::Char('s'))), Some(Action::Toggle));
        assert_eq!(Action::from_key(&press(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(Action::from_key(&press(KeyCode::Char('x'))), None);
        assert_eq!(
            Action::from_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn space_during_green_records_result() {
        let (mut app, clock) = app();
        assert!(app.on_event(key(KeyCode::Char('s'))));
        assert_eq!(app.timer.phase(), Phase::RedWait);

        clock.advance(2_000);
        assert!(app.on_event(ReflexEvent::Tick));
        clock.advance(180);
        app.on_event(key(KeyCode::Char(' ')));

        assert_eq!(app.timer.results(), &[RoundResult::Measured(180)]);
    }

    #[test]
    fn mouse_click_must_land_on_surface() {
        let (mut app, clock) = app();
        app.surface_area = Some(Rect::new(10, 5, 20, 10));
        app.on_event(key(KeyCode::Char('s')));
        clock.advance(2_000);
        app.on_event(ReflexEvent::Tick);
        clock.advance(90);

        assert!(!app.on_event(ReflexEvent::Click { column: 0, row: 0 }));
        assert!(app.timer.results().is_empty());

        assert!(app.on_event(ReflexEvent::Click { column: 15, row: 8 }));
        assert_eq!(app.timer.results(), &[RoundResult::Measured(90)]);
    }

    #[test]
    fn idle_tick_needs_no_redraw() {
        let (mut app, clock) = app();
        clock.advance(10_000);
        assert!(!app.on_event(ReflexEvent::Tick));
    }

    #[test]
    fn quit_stops_running_session() {
        let (mut app, _clock) = app();
        app.on_event(key(KeyCode::Char('s')));
        app.on_event(key(KeyCode::Char('q')));

        assert!(app.should_quit);
        assert!(!app.timer.is_running());
        assert_eq!(app.timer.pending_timers(), 0);
    }
}
