//! Waveform synthesizer.
//!
//! Turns an interval sequence into an on/off keyed carrier at the
//! intermediate frequency. Samples are produced lazily by [`Synthesizer`],
//! so memory use does not depend on the capture length.
//!
//! The carrier phase advances on every tick, including carrier-off ticks, so
//! the tone resumes after a gap exactly where a continuous oscillator would
//! be. Only the amplitude is keyed.

mod phase;

#[cfg(test)]
mod tests;

use std::iter::FusedIterator;

use crate::params::SynthesisConfig;
use crate::timing::{Polarity, PulseInterval};

pub use phase::{wrap as wrap_phase, PhaseAccumulator};

/// One complex baseband sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComplexSample {
    /// In-phase component.
    pub i: f64,
    /// Quadrature component.
    pub q: f64,
}

impl ComplexSample {
    /// The zero sample.
    pub const ZERO: Self = Self { i: 0.0, q: 0.0 };

    /// Creates a sample from its components.
    pub fn new(i: f64, q: f64) -> Self {
        Self { i, q }
    }

    /// Creates a sample of the given magnitude and phase.
    #[inline]
    pub fn from_polar(magnitude: f64, phase: f64) -> Self {
        let (sin, cos) = phase.sin_cos();
        Self {
            i: cos * magnitude,
            q: sin * magnitude,
        }
    }

    /// Magnitude `sqrt(i^2 + q^2)`.
    pub fn magnitude(&self) -> f64 {
        self.i.hypot(self.q)
    }

    /// Phase angle in radians, in `(-pi, pi]`.
    pub fn arg(&self) -> f64 {
        self.q.atan2(self.i)
    }
}

/// Number of samples for an interval, `round(duration_us * sample_rate / 1e6)`.
///
/// Computed exactly in integer arithmetic with ties rounded to even, so long
/// captures do not drift in one direction.
pub fn samples_for_duration(duration_us: u32, sample_rate_hz: u32) -> u64 {
    const MICROS: u64 = 1_000_000;

    let product = duration_us as u64 * sample_rate_hz as u64;
    let quotient = product / MICROS;
    let remainder = product % MICROS;

    match (remainder * 2).cmp(&MICROS) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => quotient + (quotient & 1),
    }
}

/// Total number of samples a sequence produces.
pub fn total_samples(intervals: &[PulseInterval], config: &SynthesisConfig) -> u64 {
    intervals
        .iter()
        .map(|interval| config.samples_for(interval.duration_us))
        .sum()
}

/// Lazy sample producer for one synthesis run.
///
/// Not resumable: the phase depends on every preceding tick, so a new run
/// must start from the first interval.
#[derive(Debug, Clone)]
pub struct Synthesizer<'a> {
    intervals: &'a [PulseInterval],
    config: SynthesisConfig,
    phase: PhaseAccumulator,
    next_interval: usize,
    polarity: Polarity,
    remaining: u64,
    emitted: u64,
    total: u64,
}

impl<'a> Synthesizer<'a> {
    /// Starts a synthesis run.
    ///
    /// # Panics
    /// Panics if the configuration holds a zero sample rate or a non-finite
    /// frequency or amplitude. [`crate::params::resolve`] never produces one.
    pub fn new(intervals: &'a [PulseInterval], config: SynthesisConfig) -> Self {
        assert!(
            config.sample_rate_hz > 0
                && config.intermediate_freq_hz.is_finite()
                && config.amplitude_fraction.is_finite(),
            "synthesis config must be finite with a positive sample rate: {:?}",
            config
        );

        Self {
            intervals,
            config,
            phase: PhaseAccumulator::new(config.phase_increment()),
            next_interval: 0,
            polarity: Polarity::Off,
            remaining: 0,
            emitted: 0,
            total: total_samples(intervals, &config),
        }
    }

    /// Configuration of this run.
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Phase that the next emitted sample will use.
    pub fn phase(&self) -> f64 {
        self.phase.phase()
    }

    /// Samples emitted so far.
    pub fn samples_emitted(&self) -> u64 {
        self.emitted
    }

    /// Total samples this run produces.
    pub fn total_samples(&self) -> u64 {
        self.total
    }

    /// Number of intervals started so far.
    pub fn interval_index(&self) -> usize {
        self.next_interval
    }
}

impl Iterator for Synthesizer<'_> {
    type Item = ComplexSample;

    fn next(&mut self) -> Option<ComplexSample> {
        while self.remaining == 0 {
            let interval = self.intervals.get(self.next_interval)?;
            self.next_interval += 1;
            self.polarity = interval.polarity;
            self.remaining = self.config.samples_for(interval.duration_us);
        }

        self.remaining -= 1;
        self.emitted += 1;

        let phase = self.phase.advance();
        let sample = match self.polarity {
            Polarity::On => ComplexSample::from_polar(self.config.amplitude_fraction, phase),
            Polarity::Off => ComplexSample::ZERO,
        };
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.emitted;
        match usize::try_from(left) {
            Ok(left) => (left, Some(left)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Synthesizer<'_> {}

/// Starts a synthesis run over `intervals`.
pub fn synthesize(intervals: &[PulseInterval], config: SynthesisConfig) -> Synthesizer<'_> {
    Synthesizer::new(intervals, config)
}
