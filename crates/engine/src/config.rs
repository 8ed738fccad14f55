//! Console configuration, read from the environment.

use std::env;
use std::time::Duration;

use crate::types::{MAX_PLAYERS, SETUP_INTERVAL_MS, START_DELAY_MS, TICK_MS};

/// Console timing and capacity settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Simulation tick period
    pub tick_ms: u64,
    /// Interval between slot assignment passes before the game starts
    pub setup_interval_ms: u64,
    /// Delay between the start request and the first tick
    pub start_delay_ms: u64,
    /// Concurrent games (one per assigned controller)
    pub max_players: usize,
    /// Per-player action queue cap; `None` is unbounded
    pub queue_cap: Option<usize>,
    /// Seed for piece selection; `None` derives one from the clock
    pub seed: Option<u32>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            setup_interval_ms: SETUP_INTERVAL_MS,
            start_delay_ms: START_DELAY_MS,
            max_players: MAX_PLAYERS,
            queue_cap: None,
            seed: None,
        }
    }
}

impl ConsoleConfig {
    /// Create from `BLOCK_BASH_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create from any key/value source.
    ///
    /// Zero periods, a zero queue cap and player counts outside `1..=255`
    /// are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            tick_ms: parse_var(lookup("BLOCK_BASH_TICK_MS"))
                .filter(|&ms: &u64| ms > 0)
                .unwrap_or(defaults.tick_ms),
            setup_interval_ms: parse_var(lookup("BLOCK_BASH_SETUP_MS"))
                .filter(|&ms: &u64| ms > 0)
                .unwrap_or(defaults.setup_interval_ms),
            start_delay_ms: parse_var(lookup("BLOCK_BASH_START_DELAY_MS"))
                .unwrap_or(defaults.start_delay_ms),
            max_players: parse_var(lookup("BLOCK_BASH_MAX_PLAYERS"))
                .filter(|&n: &usize| (1..=u8::MAX as usize).contains(&n))
                .unwrap_or(defaults.max_players),
            queue_cap: parse_var(lookup("BLOCK_BASH_QUEUE_CAP")).filter(|&n: &usize| n > 0),
            seed: parse_var(lookup("BLOCK_BASH_SEED")),
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn setup_interval(&self) -> Duration {
        Duration::from_millis(self.setup_interval_ms)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    /// Configured seed, or one taken from the wall clock
    pub fn resolve_seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
    }
}

fn parse_var<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_reference_console() {
        let c = ConsoleConfig::default();
        assert_eq!(c.tick(), Duration::from_secs(1));
        assert_eq!(c.setup_interval(), Duration::from_secs(2));
        assert_eq!(c.start_delay(), Duration::from_secs(5));
        assert_eq!(c.max_players, 3);
        assert_eq!(c.queue_cap, None);
    }

    #[test]
    fn fixed_seed_is_used() {
        let c = ConsoleConfig {
            seed: Some(99),
            ..ConsoleConfig::default()
        };
        assert_eq!(c.resolve_seed(), 99);
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_source_gives_defaults() {
        assert_eq!(ConsoleConfig::from_lookup(lookup(&[])), ConsoleConfig::default());
    }

    #[test]
    fn values_are_parsed_and_trimmed() {
        let c = ConsoleConfig::from_lookup(lookup(&[
            ("BLOCK_BASH_TICK_MS", "250"),
            ("BLOCK_BASH_SETUP_MS", " 500 "),
            ("BLOCK_BASH_START_DELAY_MS", "0"),
            ("BLOCK_BASH_MAX_PLAYERS", "4"),
            ("BLOCK_BASH_QUEUE_CAP", "16"),
            ("BLOCK_BASH_SEED", "42"),
        ]));
        assert_eq!(c.tick_ms, 250);
        assert_eq!(c.setup_interval_ms, 500);
        assert_eq!(c.start_delay_ms, 0);
        assert_eq!(c.max_players, 4);
        assert_eq!(c.queue_cap, Some(16));
        assert_eq!(c.seed, Some(42));
    }

    #[test]
    fn zero_periods_fall_back() {
        let c = ConsoleConfig::from_lookup(lookup(&[
            ("BLOCK_BASH_TICK_MS", "0"),
            ("BLOCK_BASH_SETUP_MS", "0"),
        ]));
        assert_eq!(c.tick_ms, TICK_MS);
        assert_eq!(c.setup_interval_ms, SETUP_INTERVAL_MS);
    }

    #[test]
    fn zero_queue_cap_is_unbounded() {
        let c = ConsoleConfig::from_lookup(lookup(&[("BLOCK_BASH_QUEUE_CAP", "0")]));
        assert_eq!(c.queue_cap, None);
    }

    #[test]
    fn player_count_outside_slot_range_falls_back() {
        for bad in ["0", "256", "-1", "three"] {
            let c = ConsoleConfig::from_lookup(lookup(&[("BLOCK_BASH_MAX_PLAYERS", bad)]));
            assert_eq!(c.max_players, MAX_PLAYERS, "{bad}");
        }
        let c = ConsoleConfig::from_lookup(lookup(&[("BLOCK_BASH_MAX_PLAYERS", "255")]));
        assert_eq!(c.max_players, 255);
    }

    #[test]
    fn garbage_seed_is_ignored() {
        let c = ConsoleConfig::from_lookup(lookup(&[("BLOCK_BASH_SEED", "abc")]));
        assert_eq!(c.seed, None);
    }
}
