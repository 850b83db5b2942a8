//! Owned one-shot timers
//!
//! Delayed sub-phase transitions (wheel swap, penalty pause, level pause...)
//! are deadlines in simulation milliseconds owned by the game instance, so a
//! reset or teardown cancels them all at once and nothing can fire into a
//! game that no longer exists.

/// A pending deadline
#[derive(Debug, Clone)]
struct Timer<K> {
    key: K,
    due_ms: f64,
    seq: u64,
}

/// Set of pending timers keyed by a per-game enum
#[derive(Debug, Clone)]
pub struct TimerSet<K> {
    pending: Vec<Timer<K>>,
    next_seq: u64,
}

impl<K> Default for TimerSet<K> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<K: Clone + PartialEq> TimerSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `key` once `delay_ms` has passed after `now_ms`
    pub fn schedule(&mut self, key: K, now_ms: f64, delay_ms: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Timer {
            key,
            due_ms: now_ms + delay_ms.max(0.0),
            seq,
        });
    }

    /// Like [`schedule`](Self::schedule) but drops any pending timer with the same key first
    pub fn schedule_replacing(&mut self, key: K, now_ms: f64, delay_ms: f64) {
        self.cancel(&key);
        self.schedule(key, now_ms, delay_ms);
    }

    pub fn cancel(&mut self, key: &K) {
        self.pending.retain(|t| &t.key != key);
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.iter().any(|t| &t.key == key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every timer due at `now_ms`
    ///
    /// Ordered by deadline, ties broken by scheduling order.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<K> {
        let mut due: Vec<Timer<K>> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due_ms <= now_ms {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| {
            a.due_ms
                .partial_cmp(&b.due_ms)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });
        due.into_iter().map(|t| t.key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Key {
        A,
        B,
        C,
    }

    #[test]
    fn test_drain_due_orders_by_deadline() {
        let mut timers = TimerSet::new();
        timers.schedule(Key::A, 0.0, 300.0);
        timers.schedule(Key::B, 0.0, 100.0);
        timers.schedule(Key::C, 0.0, 100.0);

        assert!(timers.drain_due(50.0).is_empty());
        assert_eq!(timers.drain_due(150.0), vec![Key::B, Key::C]);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.drain_due(300.0), vec![Key::A]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_cancel_all_drops_everything() {
        let mut timers = TimerSet::new();
        timers.schedule(Key::A, 0.0, 10.0);
        timers.schedule(Key::B, 0.0, 20.0);
        timers.cancel_all();
        assert!(timers.drain_due(1_000.0).is_empty());
    }

    #[test]
    fn test_schedule_replacing() {
        let mut timers = TimerSet::new();
        timers.schedule(Key::A, 0.0, 10.0);
        timers.schedule_replacing(Key::A, 0.0, 500.0);
        assert_eq!(timers.len(), 1);
        assert!(timers.drain_due(100.0).is_empty());
        assert!(timers.is_pending(&Key::A));
    }
}
