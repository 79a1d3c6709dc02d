use tracing::{debug, info};

use crate::clock::Clock;
use crate::delay::DelayPicker;
use crate::scheduler::{TimerId, TimerQueue};
use crate::session::{Phase, RoundResult, Session, SessionConfig, SessionEnd, Summary};

/// What the reaction surface currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Surface {
    Neutral,
    Waiting,
    Armed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Go,
    Miss,
}

/// Payload carried by every scheduled timer. `token` identifies the round
/// that scheduled it; a timer whose token no longer matches is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub kind: TimerKind,
    pub token: u64,
}

#[derive(Debug, Clone, Copy)]
struct PendingRound {
    token: u64,
    go: TimerId,
    miss: TimerId,
}

/// State of the two on-screen controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start_label: &'static str,
    pub running: bool,
    pub reset_visible: bool,
}

/// Sequential round controller.
///
/// Each round races a go timer (arms the surface) and a miss deadline against
/// the player's click. Whichever resolves the round first wins; the loser is
/// cancelled and, should it still surface, is ignored because the round token
/// it carries has moved on.
pub struct RoundTimer<C: Clock, D: DelayPicker> {
    config: SessionConfig,
    session: Session,
    clock: C,
    delays: D,
    timers: TimerQueue<TimerEvent>,
    round_token: u64,
    pending: Option<PendingRound>,
    surface: Surface,
    surface_visible: bool,
    summary_visible: bool,
}

impl<C: Clock, D: DelayPicker> RoundTimer<C, D> {
    pub fn new(config: SessionConfig, clock: C, delays: D) -> Self {
        let session = Session::new(config.max_attempts);
        Self {
            config,
            session,
            clock,
            delays,
            timers: TimerQueue::new(),
            round_token: 0,
            pending: None,
            surface: Surface::Neutral,
            surface_visible: true,
            summary_visible: false,
        }
    }

    /// Begins a fresh session. Returns false if one is already running.
    pub fn start_session(&mut self) -> bool {
        if self.session.in_progress {
            debug!("start ignored, session already running");
            return false;
        }

        self.session.clear_scores();
        self.session.ending = None;
        self.session.in_progress = true;
        self.surface_visible = true;
        self.summary_visible = false;
        info!(max_attempts = self.config.max_attempts, "session started");

        self.run_round();
        true
    }

    /// Ends a running session early; results so far stay on display.
    /// Returns false when there was nothing to stop.
    pub fn stop_session(&mut self) -> bool {
        if !self.session.in_progress {
            return false;
        }

        self.cancel_pending();
        self.session.disarm();
        self.session.in_progress = false;
        self.session.ending = Some(SessionEnd::Stopped);
        self.show_summary();
        info!(
            rounds = self.session.results.len(),
            average_ms = %self.summary().average_display(),
            "session stopped"
        );
        true
    }

    /// The start/stop control
    pub fn toggle(&mut self) -> bool {
        if self.session.in_progress {
            self.stop_session()
        } else {
            self.start_session()
        }
    }

    fn run_round(&mut self) {
        if !self.session.rounds_remaining() {
            self.finalize_session();
            return;
        }

        self.round_token += 1;
        self.session.disarm();
        self.surface = Surface::Waiting;

        let delay_secs = self
            .delays
            .pick_secs(self.config.min_delay_secs, self.config.max_delay_secs);
        let go_at = self
            .clock
            .now_ms()
            .saturating_add(delay_secs.saturating_mul(1_000));
        let miss_at = go_at.saturating_add(self.config.miss_window_secs.saturating_mul(1_000));

        let token = self.round_token;
        let go = self.timers.schedule(
            go_at,
            TimerEvent {
                kind: TimerKind::Go,
                token,
            },
        );
        let miss = self.timers.schedule(
            miss_at,
            TimerEvent {
                kind: TimerKind::Miss,
                token,
            },
        );
        self.pending = Some(PendingRound { token, go, miss });

        debug!(
            round = self.session.attempt_index + 1,
            delay_secs, go_at, miss_at, "round scheduled"
        );
    }

    /// Fires every timer that is due by the clock. Returns true if any did.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now_ms();
        let mut fired = false;
        while let Some((_, event)) = self.timers.pop_due(now) {
            fired |= self.handle_timer(event);
        }
        fired
    }

    pub(crate) fn handle_timer(&mut self, event: TimerEvent) -> bool {
        let current = self.pending.map(|p| p.token);
        if !self.session.in_progress || current != Some(event.token) {
            debug!(?event, "stale timer ignored");
            return false;
        }

        match event.kind {
            TimerKind::Go => {
                if self.session.click_armed {
                    return false;
                }
                let now = self.clock.now_ms();
                self.surface = Surface::Armed;
                self.session.armed_at = Some(now);
                self.session.click_armed = true;
                debug!(
                    round = self.session.attempt_index + 1,
                    armed_at = now,
                    surface = %self.surface,
                    "armed"
                );
            }
            TimerKind::Miss => self.resolve(RoundResult::Missed),
        }
        true
    }

    /// A pointer press on the surface. Only counts while armed.
    pub fn click(&mut self) -> bool {
        if !self.session.click_armed || !self.session.in_progress {
            debug!(phase = %self.phase(), "click ignored");
            return false;
        }
        let Some(armed_at) = self.session.armed_at else {
            return false;
        };

        let latency = self.clock.now_ms().saturating_sub(armed_at);
        self.resolve(RoundResult::Measured(latency));
        true
    }

    fn resolve(&mut self, result: RoundResult) {
        self.cancel_pending();
        self.session.disarm();
        self.session.results.push(result);
        self.session.attempt_index += 1;
        self.surface = Surface::Neutral;

        info!(
            round = self.session.attempt_index,
            result = %result,
            "round resolved"
        );

        if self.session.rounds_remaining() {
            self.run_round();
        } else {
            self.finalize_session();
        }
    }

    /// Ends a session that ran all its rounds
    pub fn finalize_session(&mut self) -> Summary {
        self.cancel_pending();
        self.timers.cancel_all();
        self.session.disarm();
        self.session.in_progress = false;
        self.session.ending = Some(SessionEnd::Completed);
        self.show_summary();

        let summary = self.summary();
        info!(
            average_ms = %summary.average_display(),
            measured = summary.measured,
            missed = summary.missed,
            "session finished"
        );
        summary
    }

    /// Clears the scoreboard. Rejected while a session is running.
    pub fn reset_scores(&mut self) -> bool {
        if self.session.in_progress {
            debug!("reset rejected while session is running");
            return false;
        }

        self.session.clear_scores();
        self.session.ending = None;
        self.show_surface();
        true
    }

    /// Clears the scoreboard and repaints the surface without touching the
    /// running session or its timers.
    pub fn restart_visual_only(&mut self) {
        self.session.clear_scores();
        if !self.session.in_progress {
            self.session.ending = None;
        }
        self.show_surface();
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.timers.cancel(pending.go);
            self.timers.cancel(pending.miss);
        }
        self.round_token += 1;
    }

    fn show_summary(&mut self) {
        self.surface = Surface::Neutral;
        self.surface_visible = false;
        self.summary_visible = true;
    }

    fn show_surface(&mut self) {
        self.surface = Surface::Neutral;
        self.surface_visible = true;
        self.summary_visible = false;
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn results(&self) -> &[RoundResult] {
        &self.session.results
    }

    pub fn summary(&self) -> Summary {
        self.session.summary()
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn surface_visible(&self) -> bool {
        self.surface_visible
    }

    pub fn summary_visible(&self) -> bool {
        self.summary_visible
    }

    pub fn is_running(&self) -> bool {
        self.session.in_progress
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn controls(&self) -> Controls {
        let running = self.session.in_progress;
        Controls {
            start_label: if running { "Stop" } else { "Start" },
            running,
            reset_visible: running,
        }
    }
}
