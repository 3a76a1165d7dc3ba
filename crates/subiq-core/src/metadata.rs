//! Sidecar metadata for `.c16` streams.
//!
//! The sidecar is plain `key=value` text, one pair per line, in a fixed key
//! order. `sample_rate` and `center_frequency` use the key names HackRF and
//! PortaPack tools expect next to a `.c16` capture.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::error::StageError;
use crate::sampled::Source;

/// Key names in output order.
pub const KEYS: [&str; 10] = [
    "sample_rate",
    "center_frequency",
    "intermediate_frequency",
    "amplitude",
    "protocol",
    "interval_count",
    "sample_count",
    "source_duration_us",
    "output_duration_us",
    "clamped_samples",
];

/// Description of one converted stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    /// Output sample rate in Hz.
    pub sample_rate_hz: u32,
    /// RF carrier frequency from the capture, when known.
    pub center_frequency_hz: Option<u64>,
    /// Intermediate frequency of the synthesized tone in Hz.
    pub intermediate_freq_hz: f64,
    /// Peak amplitude fraction.
    pub amplitude_fraction: f64,
    /// Input kind.
    pub protocol: Source,
    /// Number of intervals in the capture (0 for sampled inputs).
    pub interval_count: usize,
    /// Complex samples in the stream.
    pub sample_count: u64,
    /// Duration described by the input in microseconds.
    pub source_duration_us: u64,
    /// Duration of the output stream in microseconds.
    pub output_duration_us: u64,
    /// I or Q components clamped during quantization.
    pub clamped_samples: u64,
}

impl Metadata {
    /// Duration of `sample_count` samples at `sample_rate_hz`, rounded to
    /// the nearest microsecond.
    pub fn duration_us(sample_count: u64, sample_rate_hz: u32) -> u64 {
        if sample_rate_hz == 0 {
            return 0;
        }
        let rate = sample_rate_hz as u128;
        ((sample_count as u128 * 1_000_000 + rate / 2) / rate) as u64
    }

    /// Signed difference between output and source duration.
    pub fn duration_drift_us(&self) -> i64 {
        self.output_duration_us as i64 - self.source_duration_us as i64
    }

    /// Formats the sidecar text.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Parses sidecar text.
    ///
    /// Blank lines and unknown keys are ignored. `center_frequency` is
    /// optional; every other key is required.
    pub fn parse(text: &str) -> Result<Self, MetadataError> {
        let mut fields = Fields::default();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or(MetadataError::MalformedLine {
                line: index + 1,
            })?;
            fields.set(key.trim(), value.trim())?;
        }

        fields.finish()
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sample_rate={}", self.sample_rate_hz)?;
        if let Some(center) = self.center_frequency_hz {
            writeln!(f, "center_frequency={}", center)?;
        }
        writeln!(f, "intermediate_frequency={}", self.intermediate_freq_hz)?;
        writeln!(f, "amplitude={}", self.amplitude_fraction)?;
        writeln!(f, "protocol={}", self.protocol)?;
        writeln!(f, "interval_count={}", self.interval_count)?;
        writeln!(f, "sample_count={}", self.sample_count)?;
        writeln!(f, "source_duration_us={}", self.source_duration_us)?;
        writeln!(f, "output_duration_us={}", self.output_duration_us)?;
        writeln!(f, "clamped_samples={}", self.clamped_samples)
    }
}

impl FromStr for Metadata {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Errors produced while reading sidecar text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// A non-blank line has no `=`.
    #[error("line {line} is not a key=value pair")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
    },

    /// A required key is absent.
    #[error("missing key '{0}'")]
    MissingKey(&'static str),

    /// A value does not parse as the key's type.
    #[error("invalid value '{value}' for key '{key}'")]
    InvalidValue {
        /// The key.
        key: String,
        /// The rejected value.
        value: String,
    },
}

impl StageError for MetadataError {
    fn code(&self) -> &'static str {
        match self {
            MetadataError::MalformedLine { .. } => "META_001",
            MetadataError::MissingKey(_) => "META_002",
            MetadataError::InvalidValue { .. } => "META_003",
        }
    }

    fn category(&self) -> &'static str {
        "metadata"
    }
}

#[derive(Default)]
struct Fields {
    sample_rate: Option<u32>,
    center_frequency: Option<u64>,
    intermediate_frequency: Option<f64>,
    amplitude: Option<f64>,
    protocol: Option<Source>,
    interval_count: Option<usize>,
    sample_count: Option<u64>,
    source_duration_us: Option<u64>,
    output_duration_us: Option<u64>,
    clamped_samples: Option<u64>,
}

fn value<T: FromStr>(key: &str, raw: &str) -> Result<T, MetadataError> {
    raw.parse().map_err(|_| MetadataError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

impl Fields {
    fn set(&mut self, key: &str, raw: &str) -> Result<(), MetadataError> {
        match key {
            "sample_rate" => self.sample_rate = Some(value(key, raw)?),
            "center_frequency" => self.center_frequency = Some(value(key, raw)?),
            "intermediate_frequency" => self.intermediate_frequency = Some(value(key, raw)?),
            "amplitude" => self.amplitude = Some(value(key, raw)?),
            "protocol" => {
                let source = Source::from_name(raw).ok_or_else(|| MetadataError::InvalidValue {
                    key: key.to_string(),
                    value: raw.to_string(),
                })?;
                self.protocol = Some(source);
            }
            "interval_count" => self.interval_count = Some(value(key, raw)?),
            "sample_count" => self.sample_count = Some(value(key, raw)?),
            "source_duration_us" => self.source_duration_us = Some(value(key, raw)?),
            "output_duration_us" => self.output_duration_us = Some(value(key, raw)?),
            "clamped_samples" => self.clamped_samples = Some(value(key, raw)?),
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<Metadata, MetadataError> {
        Ok(Metadata {
            sample_rate_hz: self.sample_rate.ok_or(MetadataError::MissingKey("sample_rate"))?,
            center_frequency_hz: self.center_frequency,
            intermediate_freq_hz: self
                .intermediate_frequency
                .ok_or(MetadataError::MissingKey("intermediate_frequency"))?,
            amplitude_fraction: self.amplitude.ok_or(MetadataError::MissingKey("amplitude"))?,
            protocol: self.protocol.ok_or(MetadataError::MissingKey("protocol"))?,
            interval_count: self
                .interval_count
                .ok_or(MetadataError::MissingKey("interval_count"))?,
            sample_count: self
                .sample_count
                .ok_or(MetadataError::MissingKey("sample_count"))?,
            source_duration_us: self
                .source_duration_us
                .ok_or(MetadataError::MissingKey("source_duration_us"))?,
            output_duration_us: self
                .output_duration_us
                .ok_or(MetadataError::MissingKey("output_duration_us"))?,
            clamped_samples: self
                .clamped_samples
                .ok_or(MetadataError::MissingKey("clamped_samples"))?,
        })
    }
}
