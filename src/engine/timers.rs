use std::time::{Duration, Instant};

/// Delayed state changes used for pacing narration and animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimedTransition {
    RetryLevel { level: u32 },
    EnemyFalls,
    Triumph,
    Defeat,
}

#[derive(Debug, Clone)]
struct Scheduled {
    due: Instant,
    generation: u64,
    seq: u64,
    transition: TimedTransition,
}

/// Pending transitions, each stamped with the engine generation that
/// scheduled it. The engine decides whether a fired entry is still current.
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: Vec<Scheduled>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(
        &mut self,
        now: Instant,
        delay: Duration,
        generation: u64,
        transition: TimedTransition,
    ) {
        self.entries.push(Scheduled {
            due: now + delay,
            generation,
            seq: self.next_seq,
            transition,
        });
        self.next_seq += 1;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Removes and returns everything due at `now`, earliest first; entries
    /// with equal deadlines keep scheduling order.
    pub fn take_due(&mut self, now: Instant) -> Vec<(u64, TimedTransition)> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| e.due <= now);
        self.entries = pending;

        due.sort_by_key(|e| (e.due, e.seq));
        due.into_iter()
            .map(|e| (e.generation, e.transition))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
