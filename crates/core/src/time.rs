//! Deterministic simulation time and day/night cycle.
//!
//! The aurora host only cares about two things: which in-game day it is (auroras
//! are seeded per night) and whether the sun is below the horizon.

use crate::SimTick;
use serde::{Deserialize, Serialize};

/// Default ticks per in-game day (20 minutes real-time at 20 TPS).
const DEFAULT_TICKS_PER_DAY: u64 = 24_000;

/// Simulation time state tracking day/night cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current simulation tick.
    pub tick: SimTick,
    /// Ticks per in-game day.
    pub ticks_per_day: u64,
}

impl SimTime {
    /// Create a new SimTime starting at tick 0.
    pub fn new(ticks_per_day: u64) -> Self {
        Self {
            tick: SimTick::ZERO,
            ticks_per_day: ticks_per_day.max(1),
        }
    }

    /// Start the clock at an explicit tick.
    pub fn starting_at(tick: SimTick) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// Advance time by one tick.
    pub fn advance(&mut self) {
        self.tick = self.tick.advance(1);
    }

    /// Get the current time of day as a fraction (0.0 = midnight, 0.5 = noon, 1.0 = next midnight).
    pub fn time_of_day(&self) -> f64 {
        let tick_in_day = self.tick.0 % self.ticks_per_day;
        tick_in_day as f64 / self.ticks_per_day as f64
    }

    /// Index of the current in-game day.
    pub fn day(&self) -> u64 {
        self.tick.0 / self.ticks_per_day
    }

    /// Compute sun elevation angle in radians (-π/2 to π/2).
    /// Returns 0.0 at sunrise/sunset, π/2 at noon, -π/2 at midnight.
    pub fn sun_elevation(&self) -> f64 {
        let angle = (self.time_of_day() - 0.25) * 2.0 * std::f64::consts::PI;
        (angle.sin() * std::f64::consts::FRAC_PI_2)
            .clamp(-std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2)
    }

    /// Whether the sun is below the horizon.
    pub fn is_night(&self) -> bool {
        self.sun_elevation() < 0.0
    }

    /// Identifier of the night currently in progress.
    ///
    /// Nights run from sunset (0.75 of a day) to the following sunrise, so an
    /// evening and the next morning share an index. The darkness before the first
    /// sunrise is night 0, and the first full night is night 1.
    pub fn night(&self) -> u64 {
        (self.tick.0 + self.ticks_per_day / 4) / self.ticks_per_day
    }
}

impl Default for SimTime {
    fn default() -> Self {
        Self::new(DEFAULT_TICKS_PER_DAY)
    }
}
