//! Phase Timers
//!
//! Countdown steps and feedback delays are scheduled tasks on the session
//! clock. Each task carries the generation it was scheduled under; bumping
//! the generation cancels everything pending, and a task from an older
//! generation is discarded when it comes due instead of firing.

use std::time::Duration;
use serde::{Serialize, Deserialize};
use tracing::debug;

/// What a timer does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    /// Show the next countdown number, or start the round after the last
    CountdownStep,
    /// Leave the success/fail screen for the next round
    AdvanceRound,
}

#[derive(Clone, Debug)]
struct ScheduledTask {
    due: Duration,
    seq: u64,
    generation: u64,
    action: TimerAction,
}

/// Session clock plus pending tasks.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    now: Duration,
    generation: u64,
    next_seq: u64,
    pending: Vec<ScheduledTask>,
}

impl Scheduler {
    /// Empty scheduler at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session time.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Current generation.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Schedule `action` to fire `delay` from now under the current generation.
    pub fn schedule(&mut self, delay: Duration, action: TimerAction) {
        let task = ScheduledTask {
            due: self.now + delay,
            seq: self.next_seq,
            generation: self.generation,
            action,
        };
        self.next_seq += 1;
        self.pending.push(task);
    }

    /// Invalidate every pending task.
    pub fn cancel_all(&mut self) {
        self.generation += 1;
    }

    /// Live tasks still waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.pending
            .iter()
            .filter(|t| t.generation == self.generation)
            .count()
    }

    /// Fire the earliest task due at or before `until`.
    ///
    /// Moves the clock to the task's due time. Stale tasks found on the way
    /// are dropped without touching the clock. Returns `None` when nothing
    /// live is due.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerAction> {
        loop {
            let index = self
                .pending
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due <= until)
                .min_by_key(|(_, t)| (t.due, t.seq))
                .map(|(i, _)| i)?;

            let task = self.pending.swap_remove(index);

            if task.generation != self.generation {
                debug!(
                    action = ?task.action,
                    task_generation = task.generation,
                    current_generation = self.generation,
                    "discarding stale timer"
                );
                continue;
            }
            self.now = self.now.max(task.due);
            return Some(task.action);
        }
    }

    /// Move the clock forward without firing anything.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut timers = Scheduler::new();
        timers.schedule(ms(200), TimerAction::AdvanceRound);
        timers.schedule(ms(100), TimerAction::CountdownStep);

        assert_eq!(timers.pop_due(ms(50)), None);
        assert_eq!(timers.pop_due(ms(500)), Some(TimerAction::CountdownStep));
        assert_eq!(timers.now(), ms(100));
        assert_eq!(timers.pop_due(ms(500)), Some(TimerAction::AdvanceRound));
        assert_eq!(timers.now(), ms(200));
        assert_eq!(timers.pop_due(ms(500)), None);
    }

    #[test]
    fn test_cancelled_tasks_never_fire() {
        let mut timers = Scheduler::new();
        timers.schedule(ms(100), TimerAction::AdvanceRound);
        assert_eq!(timers.generation(), 0);
        timers.cancel_all();
        assert_eq!(timers.generation(), 1);
        assert_eq!(timers.pending_count(), 0);

        timers.schedule(ms(300), TimerAction::CountdownStep);
        assert_eq!(timers.pop_due(ms(1000)), Some(TimerAction::CountdownStep));
        assert_eq!(timers.now(), ms(300));
        assert_eq!(timers.pop_due(ms(1000)), None);
        assert_eq!(timers.now(), ms(300));
    }

    #[test]
    fn test_schedule_relative_to_fire_time() {
        let mut timers = Scheduler::new();
        timers.schedule(ms(800), TimerAction::CountdownStep);
        assert!(timers.pop_due(ms(5000)).is_some());
        timers.schedule(ms(800), TimerAction::CountdownStep);
        assert!(timers.pop_due(ms(1500)).is_none());
        assert!(timers.pop_due(ms(1600)).is_some());
        timers.advance_to(ms(5000));
        assert_eq!(timers.now(), ms(5000));
    }
}
