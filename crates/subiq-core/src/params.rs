//! Synthesis parameter resolution.
//!
//! Every field of [`SynthesisConfig`] is resolved independently:
//!
//! 1. an explicit override always wins,
//! 2. otherwise, with `auto` enabled, a value derived from the capture,
//! 3. otherwise the documented default.
//!
//! Overrides are validated before anything else so that a bad value aborts
//! the run before any synthesis work starts.

use std::fmt;

use serde::Serialize;

use crate::error::{ConfigError, ConfigField};
use crate::synth::samples_for_duration;
use crate::timing::IntervalStats;

/// Default output sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 500_000;

/// Intermediate frequency used by auto detection when the capture gives no hint.
pub const DEFAULT_INTERMEDIATE_FREQ: f64 = 5_000.0;

/// Without auto detection the intermediate frequency is `sample_rate / DEFAULT_IF_DIVISOR`.
pub const DEFAULT_IF_DIVISOR: u32 = 100;

/// Default peak amplitude (full scale).
pub const DEFAULT_AMPLITUDE: f64 = 1.0;

/// Auto detection targets at least this many samples in the shortest interval.
pub const MIN_SAMPLES_PER_PULSE: u64 = 10;

/// Auto detection keeps at least this many samples per intermediate-frequency cycle.
pub const MIN_SAMPLES_PER_IF_CYCLE: f64 = 4.0;

/// Auto-detected sample rates are rounded up to a multiple of this step.
pub const AUTO_SAMPLE_RATE_STEP: u64 = 100_000;

/// Upper bound for auto-detected sample rates.
pub const MAX_AUTO_SAMPLE_RATE: u32 = 20_000_000;

/// Auto intermediate frequency is `carrier / CARRIER_TO_IF_DIVISOR`, capped at the default.
pub const CARRIER_TO_IF_DIVISOR: u64 = 100;

/// Caller-supplied parameter overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParamOverrides {
    /// Output sample rate in Hz.
    pub sample_rate: Option<u32>,
    /// Intermediate frequency in Hz.
    pub intermediate_freq: Option<f64>,
    /// Peak amplitude as a fraction of full scale, in (0, 1].
    pub amplitude: Option<f64>,
    /// Derive unset fields from the capture instead of using fixed defaults.
    pub auto: bool,
}

impl ParamOverrides {
    /// Overrides with nothing set and auto detection disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables auto detection.
    pub fn auto(mut self) -> Self {
        self.auto = true;
        self
    }

    /// Sets the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Sets the intermediate frequency.
    pub fn with_intermediate_freq(mut self, intermediate_freq: f64) -> Self {
        self.intermediate_freq = Some(intermediate_freq);
        self
    }

    /// Sets the amplitude fraction.
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = Some(amplitude);
        self
    }

    /// Checks every explicit override against its valid domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(rate) = self.sample_rate {
            if rate == 0 {
                return Err(ConfigError::out_of_range(ConfigField::SampleRate, 0.0));
            }
        }
        if let Some(freq) = self.intermediate_freq {
            // The phase increment divides by a rate of at least 1 Hz, so it
            // is finite whenever this product is.
            if !(std::f64::consts::TAU * freq).is_finite() {
                return Err(ConfigError::out_of_range(
                    ConfigField::IntermediateFrequency,
                    freq,
                ));
            }
        }
        if let Some(amplitude) = self.amplitude {
            if !(amplitude > 0.0 && amplitude <= 1.0) {
                return Err(ConfigError::out_of_range(ConfigField::Amplitude, amplitude));
            }
        }
        Ok(())
    }
}

/// Resolved synthesis parameters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SynthesisConfig {
    /// Output sample rate in Hz.
    pub sample_rate_hz: u32,
    /// Carrier frequency of the synthesized tone in Hz.
    pub intermediate_freq_hz: f64,
    /// Peak amplitude as a fraction of full scale.
    pub amplitude_fraction: f64,
}

impl SynthesisConfig {
    /// Phase advance per sample tick in radians.
    pub fn phase_increment(&self) -> f64 {
        std::f64::consts::TAU * self.intermediate_freq_hz / self.sample_rate_hz as f64
    }

    /// Returns true if the sample rate is at least twice the intermediate frequency.
    pub fn satisfies_nyquist(&self) -> bool {
        self.sample_rate_hz as f64 >= 2.0 * self.intermediate_freq_hz.abs()
    }

    /// Number of samples an interval of `duration_us` occupies.
    pub fn samples_for(&self, duration_us: u32) -> u64 {
        samples_for_duration(duration_us, self.sample_rate_hz)
    }
}

/// Condition worth reporting that does not stop the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigWarning {
    /// The sample rate is below twice the intermediate frequency.
    Aliasing {
        /// Resolved sample rate.
        sample_rate_hz: u32,
        /// Resolved intermediate frequency.
        intermediate_freq_hz: f64,
    },
    /// The shortest interval maps to fewer than two samples.
    UnderSampledPulse {
        /// Shortest interval in microseconds.
        shortest_us: u32,
        /// Samples it occupies at the resolved rate.
        samples: u64,
    },
    /// A sampled input carries its own rate, which replaced the override.
    SampleRateIgnored {
        /// The override that was dropped.
        requested_hz: u32,
        /// Rate taken from the input.
        used_hz: u32,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::Aliasing {
                sample_rate_hz,
                intermediate_freq_hz,
            } => write!(
                f,
                "sample rate {} Hz is below twice the intermediate frequency {} Hz; output will alias",
                sample_rate_hz, intermediate_freq_hz
            ),
            ConfigWarning::UnderSampledPulse {
                shortest_us,
                samples,
            } => write!(
                f,
                "shortest interval ({} us) spans only {} sample(s)",
                shortest_us, samples
            ),
            ConfigWarning::SampleRateIgnored {
                requested_hz,
                used_hz,
            } => write!(
                f,
                "sample rate override {} Hz ignored; the input is sampled at {} Hz",
                requested_hz, used_hz
            ),
        }
    }
}

/// Resolved configuration plus any warnings raised while resolving it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The configuration to synthesize with.
    pub config: SynthesisConfig,
    /// Non-fatal conditions.
    pub warnings: Vec<ConfigWarning>,
}

/// Resolves the synthesis configuration for one capture.
///
/// # Arguments
/// * `overrides` - Explicit values and the auto flag
/// * `stats` - Statistics of the parsed interval sequence
/// * `carrier_hz` - RF carrier frequency from the capture header, if known
pub fn resolve(
    overrides: &ParamOverrides,
    stats: &IntervalStats,
    carrier_hz: Option<u64>,
) -> Result<Resolution, ConfigError> {
    overrides.validate()?;

    let sample_rate_hz = match overrides.sample_rate {
        Some(rate) => rate,
        None if overrides.auto => auto_sample_rate(stats, overrides.intermediate_freq),
        None => DEFAULT_SAMPLE_RATE,
    };

    let intermediate_freq_hz = match overrides.intermediate_freq {
        Some(freq) => freq,
        None if overrides.auto => auto_intermediate_freq(carrier_hz),
        None => (sample_rate_hz / DEFAULT_IF_DIVISOR) as f64,
    };

    let amplitude_fraction = overrides.amplitude.unwrap_or(DEFAULT_AMPLITUDE);

    let config = SynthesisConfig {
        sample_rate_hz,
        intermediate_freq_hz,
        amplitude_fraction,
    };

    let mut warnings = Vec::new();
    if !config.satisfies_nyquist() {
        warnings.push(ConfigWarning::Aliasing {
            sample_rate_hz,
            intermediate_freq_hz,
        });
    }
    if !stats.is_empty() {
        let samples = config.samples_for(stats.shortest_us);
        if samples < 2 {
            warnings.push(ConfigWarning::UnderSampledPulse {
                shortest_us: stats.shortest_us,
                samples,
            });
        }
    }

    Ok(Resolution { config, warnings })
}

/// Resolves the configuration for an already sampled input.
///
/// The sample rate comes from the input, then the override, then the
/// default. An override that differs from the input's own rate is dropped
/// with a [`ConfigWarning::SampleRateIgnored`]. The intermediate frequency
/// is always zero since no carrier is synthesized; the amplitude override
/// scales the samples.
pub fn resolve_sampled(
    overrides: &ParamOverrides,
    stream_rate: Option<u32>,
) -> Result<Resolution, ConfigError> {
    overrides.validate()?;

    let sample_rate_hz = stream_rate
        .or(overrides.sample_rate)
        .unwrap_or(DEFAULT_SAMPLE_RATE);
    if sample_rate_hz == 0 {
        return Err(ConfigError::out_of_range(ConfigField::SampleRate, 0.0));
    }

    let mut warnings = Vec::new();
    if let (Some(requested_hz), Some(used_hz)) = (overrides.sample_rate, stream_rate) {
        if requested_hz != used_hz {
            warnings.push(ConfigWarning::SampleRateIgnored {
                requested_hz,
                used_hz,
            });
        }
    }

    let config = SynthesisConfig {
        sample_rate_hz,
        intermediate_freq_hz: 0.0,
        amplitude_fraction: overrides.amplitude.unwrap_or(DEFAULT_AMPLITUDE),
    };
    Ok(Resolution { config, warnings })
}

/// Sample rate giving the shortest interval at least [`MIN_SAMPLES_PER_PULSE`]
/// samples, never below the default and never above [`MAX_AUTO_SAMPLE_RATE`].
fn auto_sample_rate(stats: &IntervalStats, explicit_if: Option<f64>) -> u32 {
    let mut rate = DEFAULT_SAMPLE_RATE as u64;

    if stats.shortest_us > 0 {
        let needed = (MIN_SAMPLES_PER_PULSE * 1_000_000).div_ceil(stats.shortest_us as u64);
        rate = rate.max(round_up_to_step(needed));
    }

    if let Some(freq) = explicit_if {
        let needed = (freq.abs() * MIN_SAMPLES_PER_IF_CYCLE).ceil() as u64;
        rate = rate.max(round_up_to_step(needed));
    }

    rate.min(MAX_AUTO_SAMPLE_RATE as u64) as u32
}

fn round_up_to_step(rate: u64) -> u64 {
    rate.div_ceil(AUTO_SAMPLE_RATE_STEP)
        .saturating_mul(AUTO_SAMPLE_RATE_STEP)
}

fn auto_intermediate_freq(carrier_hz: Option<u64>) -> f64 {
    match carrier_hz {
        Some(carrier) => ((carrier / CARRIER_TO_IF_DIVISOR) as f64).min(DEFAULT_INTERMEDIATE_FREQ),
        None => DEFAULT_INTERMEDIATE_FREQ,
    }
}
