//! World Clock
//!
//! Handles simulation time with both tick-based and human-readable formats.
//! Days are the unit of memory compaction and rumor expiry; the tick is the
//! unit everything else counts in.
//!
//! # Example
//!
//! ```
//! use npc_events::WorldClock;
//!
//! let mut clock = WorldClock::start();
//! clock.advance_by(24_000);
//! assert_eq!(clock.day(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of ticks in one simulated day.
pub const TICKS_PER_DAY: u64 = 24_000;

/// Number of ticks in one simulated hour.
pub const TICKS_PER_HOUR: u64 = 1_000;

/// Time of day at which night begins.
pub const NIGHT_START_TICK: u64 = 13_000;

/// Time of day at which night ends.
pub const NIGHT_END_TICK: u64 = 23_000;

/// A point in simulation time.
///
/// Contains a single monotonic tick counter; day, hour, and night status are
/// derived. Serializes as a plain struct so hosts can persist it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorldClock {
    /// Monotonically increasing simulation tick.
    pub tick: u64,
}

impl WorldClock {
    /// Creates a clock at tick zero (dawn of day 0).
    pub fn start() -> Self {
        Self { tick: 0 }
    }

    /// Creates a clock at an arbitrary tick.
    pub fn at_tick(tick: u64) -> Self {
        Self { tick }
    }

    /// Advances the clock by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
    }

    /// Advances the clock by `ticks` at once.
    pub fn advance_by(&mut self, ticks: u64) {
        self.tick += ticks;
    }

    /// Returns the current day number.
    pub fn day(&self) -> u64 {
        self.tick / TICKS_PER_DAY
    }

    /// Returns the tick within the current day.
    pub fn time_of_day(&self) -> u64 {
        self.tick % TICKS_PER_DAY
    }

    /// Returns the hour of the day in 0..24.
    pub fn hour(&self) -> u64 {
        self.time_of_day() / TICKS_PER_HOUR
    }

    /// Returns true while the time of day falls in the night window.
    pub fn is_night(&self) -> bool {
        let t = self.time_of_day();
        (NIGHT_START_TICK..NIGHT_END_TICK).contains(&t)
    }
}

impl fmt::Display for WorldClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day_{} {:02}:00", self.day(), self.hour())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        let clock = WorldClock::start();
        assert_eq!(clock.tick, 0);
        assert_eq!(clock.day(), 0);
        assert_eq!(clock.hour(), 0);
    }

    #[test]
    fn test_advance_single_tick() {
        let mut clock = WorldClock::start();
        clock.advance();
        assert_eq!(clock.tick, 1);
        assert_eq!(clock.day(), 0);
    }

    #[test]
    fn test_day_rollover() {
        let mut clock = WorldClock::start();
        clock.advance_by(TICKS_PER_DAY - 1);
        assert_eq!(clock.day(), 0);
        clock.advance();
        assert_eq!(clock.day(), 1);
        assert_eq!(clock.time_of_day(), 0);
    }

    #[test]
    fn test_hour_derivation() {
        let clock = WorldClock::at_tick(6 * TICKS_PER_HOUR + 500);
        assert_eq!(clock.hour(), 6);
    }

    #[test]
    fn test_night_window() {
        assert!(!WorldClock::at_tick(0).is_night());
        assert!(!WorldClock::at_tick(12_999).is_night());
        assert!(WorldClock::at_tick(13_000).is_night());
        assert!(WorldClock::at_tick(20_000).is_night());
        assert!(!WorldClock::at_tick(23_000).is_night());
    }

    #[test]
    fn test_night_window_second_day() {
        let clock = WorldClock::at_tick(TICKS_PER_DAY + 15_000);
        assert!(clock.is_night());
        assert_eq!(clock.day(), 1);
    }

    #[test]
    fn test_display_format() {
        let clock = WorldClock::at_tick(TICKS_PER_DAY * 3 + 14 * TICKS_PER_HOUR);
        assert_eq!(clock.to_string(), "day_3 14:00");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let clock = WorldClock::at_tick(84_729);
        let json = serde_json::to_string(&clock).unwrap();
        assert_eq!(json, r#"{"tick":84729}"#);
        let parsed: WorldClock = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, clock);
    }
}
