use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseButton, MouseEventKind};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum ReflexEvent {
    Key(KeyEvent),
    /// Left mouse press at a terminal cell
    Click { column: u16, row: u16 },
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, mouse, resize)
pub trait ReflexEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<ReflexEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<ReflexEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => Some(ReflexEvent::Key(key)),
                Ok(CtEvent::Mouse(mouse)) => match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => Some(ReflexEvent::Click {
                        column: mouse.column,
                        row: mouse.row,
                    }),
                    _ => None,
                },
                Ok(CtEvent::Resize(_, _)) => Some(ReflexEvent::Resize),
                Ok(_) => None,
                Err(_) => break,
            };

            if let Some(evt) = evt {
                if tx.send(evt).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ReflexEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ReflexEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed event source for tests and headless drivers
pub struct TestEventSource {
    rx: Receiver<ReflexEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<ReflexEvent>) -> Self {
        Self { rx }
    }
}

impl ReflexEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ReflexEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the application one event at a time, yielding `Tick` whenever
/// `tick` passes without input so the round timer gets polled.
pub struct Runner<E: ReflexEventSource> {
    event_source: E,
    tick: Duration,
}

impl<E: ReflexEventSource> Runner<E> {
    pub fn new(event_source: E, tick: Duration) -> Self {
        Self { event_source, tick }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn step(&self) -> ReflexEvent {
        match self.event_source.recv_timeout(self.tick) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                ReflexEvent::Tick
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(1));

        assert_eq!(runner.tick(), Duration::from_millis(1));
        match runner.step() {
            ReflexEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_clicks() {
        let (tx, rx) = mpsc::channel();
        tx.send(ReflexEvent::Click { column: 4, row: 7 }).unwrap();
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(10));

        match runner.step() {
            ReflexEvent::Click { column: 4, row: 7 } => {}
            other => panic!("expected Click event, got {other:?}"),
        }
    }

    #[test]
    fn disconnected_source_keeps_ticking() {
        let (tx, rx) = mpsc::channel::<ReflexEvent>();
        drop(tx);
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(1));

        assert!(matches!(runner.step(), ReflexEvent::Tick));
    }
}
