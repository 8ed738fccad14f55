//! Timer schedule for the console loop
//!
//! Before the start request the console runs a slot assignment pass every
//! setup interval. After it, ticks begin once the start delay has passed and
//! then repeat every tick period. The loop polls with the current instant and
//! runs whatever is due.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;

use crate::config::ConsoleConfig;

/// Work that became due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duty {
    AssignSlots,
    Tick,
}

#[derive(Debug, Clone)]
pub struct Schedule {
    setup_interval: Duration,
    tick: Duration,
    start_delay: Duration,
    next_setup: Option<Instant>,
    next_tick: Option<Instant>,
}

impl Schedule {
    /// The first assignment pass is due immediately
    pub fn new(config: &ConsoleConfig, now: Instant) -> Self {
        Self {
            setup_interval: config.setup_interval(),
            tick: config.tick(),
            start_delay: config.start_delay(),
            next_setup: Some(now),
            next_tick: None,
        }
    }

    /// Stop assignment passes and schedule the first tick
    pub fn start(&mut self, now: Instant) {
        self.next_setup = None;
        if self.next_tick.is_none() {
            self.next_tick = Some(now + self.start_delay);
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Duties due at `now`, at most one of each.
    ///
    /// A late tick does not queue up missed ticks; the cadence restarts from `now`.
    pub fn poll(&mut self, now: Instant) -> ArrayVec<Duty, 2> {
        let mut due = ArrayVec::new();

        if let Some(at) = self.next_setup {
            if now >= at {
                due.push(Duty::AssignSlots);
                self.next_setup = Some(now + self.setup_interval);
            }
        }

        if let Some(at) = self.next_tick {
            if now >= at {
                due.push(Duty::Tick);
                let next = at + self.tick;
                self.next_tick = Some(if next <= now { now + self.tick } else { next });
            }
        }

        due
    }

    /// Time until the next duty, if any is scheduled
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        [self.next_setup, self.next_tick]
            .into_iter()
            .flatten()
            .min()
            .map(|at| at.saturating_duration_since(now))
    }
}
