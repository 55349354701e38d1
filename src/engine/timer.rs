use std::{collections::VecDeque, time::Duration};

use log::{debug, trace};

use super::ops::OpList;

/// Ops to run when the timer counter reaches `tick`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimedOp {
    pub tick: u32,
    pub ops: OpList,
}

impl TimedOp {
    pub fn new(tick: u32, ops: OpList) -> Self {
        TimedOp { tick, ops }
    }
}

/// Drives a queue of `TimedOp`s from frame time.
///
/// Every elapsed interval advances a counter by one, and the entries at the
/// front of the queue whose tick equals the counter fire. Intervals that
/// elapse while a frame is late are dropped, not replayed.
#[derive(Clone, Debug)]
pub struct SceneTimer {
    queue: VecDeque<TimedOp>,
    count: u32,
    interval: Duration,
    elapsed: Duration,
    suspended: bool,
}

impl SceneTimer {
    pub fn new(interval: Duration, mut ops: Vec<TimedOp>) -> Self {
        // Stable, so entries sharing a tick keep their authored order.
        ops.sort_by_key(|op| op.tick);

        SceneTimer {
            queue: ops.into(),
            count: 0,
            interval,
            elapsed: Duration::from_millis(0),
            suspended: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[cfg(test)]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether every timed op has fired.
    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    #[cfg(test)]
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn suspend(&mut self) {
        trace!("timer suspended at count {}", self.count);
        self.suspended = true;
    }

    /// Resumes counting. The time spent suspended does not count.
    pub fn resume(&mut self) {
        trace!("timer resumed at count {}", self.count);
        self.suspended = false;
        self.elapsed = Duration::from_millis(0);
    }

    /// Advances the counter by one and returns what fires on this tick.
    pub fn tick(&mut self) -> Vec<TimedOp> {
        let count = self.count;
        self.count += 1;

        let mut fired = Vec::new();
        while self.queue.front().map(|op| op.tick) == Some(count) {
            if let Some(op) = self.queue.pop_front() {
                fired.push(op);
            }
        }
        if !fired.is_empty() {
            debug!("timer tick {}: {} entries fire", count, fired.len());
        }

        fired
    }

    /// Accounts for `frame` worth of time and ticks at most once.
    pub fn advance(&mut self, frame: Duration) -> Vec<TimedOp> {
        if self.suspended || self.queue.is_empty() {
            return Vec::new();
        }

        self.elapsed += frame;
        if self.elapsed < self.interval {
            return Vec::new();
        }
        self.elapsed = Duration::from_millis(0);

        self.tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ops::Op;

    fn numbered(ticks: &[u32]) -> Vec<TimedOp> {
        ticks
            .iter()
            .map(|&t| TimedOp::new(t, vec![Op::dialog(&t.to_string(), "test")]))
            .collect()
    }

    #[test]
    fn ticks_fire_in_order() {
        let mut timer = SceneTimer::new(Duration::from_millis(100), numbered(&[1, 2, 3, 4, 5, 6, 7, 8, 9]));
        let mut fired = Vec::new();
        for _ in 0..20 {
            fired.extend(timer.tick().into_iter().map(|op| op.tick));
        }
        assert_eq!(fired, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert!(timer.is_finished());
    }

    #[test]
    fn exact_equality_with_counter() {
        let mut timer = SceneTimer::new(Duration::from_millis(1), numbered(&[2]));
        assert!(timer.tick().is_empty()); // 0
        assert!(timer.tick().is_empty()); // 1
        assert_eq!(timer.tick().len(), 1); // 2
    }

    #[test]
    fn unsorted_ticks_never_fire_backwards() {
        let mut timer = SceneTimer::new(Duration::from_millis(1), numbered(&[3, 1, 2]));
        let mut fired = Vec::new();
        for _ in 0..5 {
            fired.extend(timer.tick().into_iter().map(|op| op.tick));
        }
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn shared_tick_fires_together() {
        let mut timer = SceneTimer::new(Duration::from_millis(1), numbered(&[1, 1]));
        timer.tick();
        assert_eq!(timer.tick().len(), 2);
    }

    #[test]
    fn advance_waits_for_interval_and_drops_missed_ticks() {
        let mut timer = SceneTimer::new(Duration::from_millis(100), numbered(&[0, 1, 2]));
        assert!(timer.advance(Duration::from_millis(60)).is_empty());
        assert_eq!(timer.advance(Duration::from_millis(60))[0].tick, 0);

        // A very late frame still only ticks once.
        assert_eq!(timer.advance(Duration::from_millis(1000))[0].tick, 1);
        assert_eq!(timer.count(), 2);
    }

    #[test]
    fn suspended_timer_does_not_advance() {
        let mut timer = SceneTimer::new(Duration::from_millis(10), numbered(&[0]));
        timer.suspend();
        assert!(timer.advance(Duration::from_millis(50)).is_empty());
        assert_eq!(timer.count(), 0);

        timer.resume();
        assert!(timer.advance(Duration::from_millis(5)).is_empty());
        assert_eq!(timer.advance(Duration::from_millis(5)).len(), 1);
    }
}
