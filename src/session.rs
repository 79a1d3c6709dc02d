use std::fmt;

use crate::util::{mean, std_dev};

/// Outcome of a single round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    Measured(u64),
    Missed,
}

impl RoundResult {
    pub fn latency_ms(&self) -> Option<u64> {
        match self {
            RoundResult::Measured(ms) => Some(*ms),
            RoundResult::Missed => None,
        }
    }
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundResult::Measured(ms) => write!(f, "{ms} ms"),
            RoundResult::Missed => f.write_str("Missed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub max_attempts: usize,
    pub min_delay_secs: u64,
    pub max_delay_secs: u64,
    pub miss_window_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_delay_secs: 1,
            max_delay_secs: 8,
            miss_window_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionEnd {
    Completed,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    RedWait,
    Armed,
    Finished(SessionEnd),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => f.write_str("Idle"),
            Phase::RedWait => f.write_str("RedWait"),
            Phase::Armed => f.write_str("Armed"),
            Phase::Finished(end) => write!(f, "Finished({end})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub attempt_index: usize,
    pub max_attempts: usize,
    pub in_progress: bool,
    pub click_armed: bool,
    pub armed_at: Option<u64>,
    pub results: Vec<RoundResult>,
    pub ending: Option<SessionEnd>,
}

impl Session {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            attempt_index: 0,
            max_attempts,
            in_progress: false,
            click_armed: false,
            armed_at: None,
            results: Vec::new(),
            ending: None,
        }
    }

    pub fn clear_scores(&mut self) {
        self.attempt_index = 0;
        self.results.clear();
    }

    pub fn disarm(&mut self) {
        self.click_armed = false;
        self.armed_at = None;
    }

    pub fn rounds_remaining(&self) -> bool {
        self.attempt_index < self.max_attempts
    }

    pub fn phase(&self) -> Phase {
        match (self.in_progress, self.click_armed, self.ending) {
            (true, true, _) => Phase::Armed,
            (true, false, _) => Phase::RedWait,
            (false, _, Some(end)) => Phase::Finished(end),
            (false, _, None) => Phase::Idle,
        }
    }

    pub fn summary(&self) -> Summary {
        Summary::from_results(&self.results)
    }
}

/// Aggregate figures over a result list; misses are excluded from timings
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub average_ms: f64,
    pub measured: usize,
    pub missed: usize,
    pub best_ms: Option<u64>,
    pub std_dev_ms: f64,
}

impl Summary {
    pub fn from_results(results: &[RoundResult]) -> Self {
        let latencies: Vec<f64> = results
            .iter()
            .filter_map(RoundResult::latency_ms)
            .map(|ms| ms as f64)
            .collect();

        Self {
            average_ms: mean(&latencies).unwrap_or(0.0),
            measured: latencies.len(),
            missed: results.len() - latencies.len(),
            best_ms: results.iter().filter_map(RoundResult::latency_ms).min(),
            std_dev_ms: std_dev(&latencies).unwrap_or(0.0),
        }
    }

    pub fn average_display(&self) -> String {
        crate::util::format_ms(self.average_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_display() {
        assert_eq!(RoundResult::Measured(150).to_string(), "150 ms");
        assert_eq!(RoundResult::Missed.to_string(), "Missed");
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        let summary = Summary::from_results(&[]);
        assert_eq!(summary.average_display(), "0.00");
        assert_eq!(summary.best_ms, None);
    }

    #[test]
    fn summary_skips_misses() {
        let summary = Summary::from_results(&[
            RoundResult::Measured(200),
            RoundResult::Missed,
            RoundResult::Measured(400),
        ]);
        assert_eq!(summary.average_display(), "300.00");
        assert_eq!(summary.measured, 2);
        assert_eq!(summary.missed, 1);
        assert_eq!(summary.best_ms, Some(200));
        assert_eq!(summary.std_dev_ms, 100.0);
    }

    #[test]
    fn all_missed_averages_zero() {
        let summary = Summary::from_results(&[RoundResult::Missed; 5]);
        assert_eq!(summary.average_display(), "0.00");
        assert_eq!(summary.missed, 5);
    }

    #[test]
    fn phase_follows_flags() {
        let mut session = Session::new(5);
        assert_eq!(session.phase(), Phase::Idle);

        session.in_progress = true;
        assert_eq!(session.phase(), Phase::RedWait);

        session.click_armed = true;
        assert_eq!(session.phase(), Phase::Armed);

        session.in_progress = false;
        session.disarm();
        session.ending = Some(SessionEnd::Stopped);
        assert_eq!(session.phase(), Phase::Finished(SessionEnd::Stopped));
        assert_eq!(session.phase().to_string(), "Finished(Stopped)");
    }
}
