//! Phase accumulator for the intermediate-frequency carrier.

use std::f64::consts::TAU;

/// Running carrier phase, kept in `[0, 2*pi)`.
///
/// One accumulator belongs to one synthesis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseAccumulator {
    phase: f64,
    increment: f64,
}

impl PhaseAccumulator {
    /// Creates an accumulator starting at phase 0.
    ///
    /// # Arguments
    /// * `increment` - Phase advance per tick in radians (may be negative)
    pub fn new(increment: f64) -> Self {
        Self {
            phase: 0.0,
            increment,
        }
    }

    /// Creates an accumulator for a carrier of `frequency` Hz sampled at `sample_rate` Hz.
    pub fn for_frequency(frequency: f64, sample_rate: f64) -> Self {
        Self::new(TAU * frequency / sample_rate)
    }

    /// Returns the current phase and advances by one tick.
    #[inline]
    pub fn advance(&mut self) -> f64 {
        let current = self.phase;
        self.phase = wrap(self.phase + self.increment);
        current
    }

    /// Current phase in radians.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Phase advance per tick in radians.
    pub fn increment(&self) -> f64 {
        self.increment
    }
}

/// Wraps an angle into `[0, 2*pi)`.
#[inline]
pub fn wrap(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
