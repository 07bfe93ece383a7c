//! Tick scheduling for the event loop
//!
//! Each timer fires once and stays off until the game asks for it again,
//! so a terminal session simply stops requesting ticks.

use crate::session::{Command, Event, ADVANCE_INTERVAL, SPAWN_INTERVAL};
use std::time::{Duration, Instant};

/// Deadlines for the advance and spawn ticks
#[derive(Clone, Debug)]
pub struct TickClock {
    next_advance: Option<Instant>,
    next_spawn: Option<Instant>,
}

impl TickClock {
    /// Both timers armed from `now`
    pub fn start(now: Instant) -> Self {
        TickClock {
            next_advance: Some(now + ADVANCE_INTERVAL),
            next_spawn: Some(now + SPAWN_INTERVAL),
        }
    }

    /// Re-arm a timer if the command asks for it
    pub fn apply(&mut self, command: Command, now: Instant) {
        match command {
            Command::ScheduleAdvance => self.next_advance = Some(now + ADVANCE_INTERVAL),
            Command::ScheduleSpawn => self.next_spawn = Some(now + SPAWN_INTERVAL),
            Command::Idle | Command::Exit => {}
        }
    }

    /// How long the loop may wait for input before the next deadline.
    /// Capped at `max_wait` so the screen keeps refreshing with no timers armed.
    pub fn time_until_next(&self, now: Instant, max_wait: Duration) -> Duration {
        [self.next_advance, self.next_spawn]
            .into_iter()
            .flatten()
            .map(|deadline| deadline.saturating_duration_since(now))
            .min()
            .unwrap_or(max_wait)
            .min(max_wait)
    }

    /// Tick events that are due, disarming their timers
    pub fn take_due(&mut self, now: Instant) -> Vec<Event> {
        let mut due = Vec::new();
        if self.next_advance.is_some_and(|t| t <= now) {
            self.next_advance = None;
            due.push(Event::AdvanceTick);
        }
        if self.next_spawn.is_some_and(|t| t <= now) {
            self.next_spawn = None;
            due.push(Event::SpawnTick);
        }
        due
    }

    #[allow(dead_code)]
    pub fn is_idle(&self) -> bool {
        self.next_advance.is_none() && self.next_spawn.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_WAIT: Duration = Duration::from_millis(250);

    #[test]
    fn test_nothing_due_before_deadline() {
        let start = Instant::now();
        let mut clock = TickClock::start(start);
        assert!(clock.take_due(start).is_empty());
        assert_eq!(clock.time_until_next(start, MAX_WAIT), ADVANCE_INTERVAL);
    }

    #[test]
    fn test_fired_timer_stays_off_until_rescheduled() {
        let start = Instant::now();
        let mut clock = TickClock::start(start);
        let later = start + ADVANCE_INTERVAL;

        assert_eq!(clock.take_due(later), vec![Event::AdvanceTick]);
        assert!(clock.take_due(later + ADVANCE_INTERVAL).is_empty());

        clock.apply(Command::ScheduleAdvance, later);
        assert_eq!(
            clock.take_due(later + ADVANCE_INTERVAL),
            vec![Event::AdvanceTick]
        );
    }

    #[test]
    fn test_both_due_and_idle() {
        let start = Instant::now();
        let mut clock = TickClock::start(start);
        let later = start + SPAWN_INTERVAL;

        assert_eq!(
            clock.take_due(later),
            vec![Event::AdvanceTick, Event::SpawnTick]
        );
        assert!(clock.is_idle());
        assert_eq!(clock.time_until_next(later, MAX_WAIT), MAX_WAIT);

        clock.apply(Command::Idle, later);
        clock.apply(Command::Exit, later);
        assert!(clock.is_idle());
    }

    #[test]
    fn test_overdue_waits_zero() {
        let start = Instant::now();
        let clock = TickClock::start(start);
        assert_eq!(
            clock.time_until_next(start + SPAWN_INTERVAL, MAX_WAIT),
            Duration::ZERO
        );
    }
}
