use std::collections::BTreeMap;

/// Handle returned by [`TimerQueue::schedule`], used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Single-shot deferred callbacks keyed by deadline.
///
/// Nothing fires on its own: the owner polls with the current time and
/// receives due payloads one at a time, earliest deadline first. Timers with
/// equal deadlines come out in the order they were scheduled.
#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    entries: BTreeMap<(u64, TimerId), T>,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: BTreeMap::new(),
        }
    }

    pub fn schedule(&mut self, deadline_ms: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert((deadline_ms, id), payload);
        id
    }

    /// Returns false if the timer already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.entries.keys().find(|(_, tid)| *tid == id).copied();
        match key {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Removes and returns the earliest timer whose deadline is `<= now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerId, T)> {
        let (&(deadline, _), _) = self.entries.first_key_value()?;
        if deadline > now_ms {
            return None;
        }
        self.entries.pop_first().map(|((_, id), payload)| (id, payload))
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self, id: TimerId) -> bool {
        self.entries.keys().any(|(_, tid)| *tid == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(7_000, "miss");
        q.schedule(2_000, "go");

        assert_eq!(q.next_deadline(), Some(2_000));
        assert!(q.pop_due(1_999).is_none());
        assert_eq!(q.pop_due(10_000).map(|(_, p)| p), Some("go"));
        assert_eq!(q.pop_due(10_000).map(|(_, p)| p), Some("miss"));
        assert!(q.is_empty());
    }

    #[test]
    fn equal_deadlines_keep_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(100, 1);
        q.schedule(100, 2);
        q.schedule(100, 3);

        let fired: Vec<i32> = std::iter::from_fn(|| q.pop_due(100).map(|(_, p)| p)).collect();
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut q = TimerQueue::new();
        let go = q.schedule(2_000, "go");
        let miss = q.schedule(7_000, "miss");

        assert!(q.cancel(miss));
        assert!(!q.cancel(miss));
        assert!(q.is_pending(go));
        assert!(!q.is_pending(miss));

        assert_eq!(q.pop_due(u64::MAX).map(|(id, _)| id), Some(go));
        assert!(q.pop_due(u64::MAX).is_none());
    }

    #[test]
    fn cancel_all_empties_queue() {
        let mut q = TimerQueue::new();
        q.schedule(1, ());
        q.schedule(2, ());
        assert_eq!(q.len(), 2);

        q.cancel_all();
        assert!(q.is_empty());
        assert_eq!(q.next_deadline(), None);
    }
}
