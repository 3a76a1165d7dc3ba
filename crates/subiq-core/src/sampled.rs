//! Already-sampled waveform inputs.
//!
//! Recordings that are sampled waveforms rather than pulse timings skip the
//! parser and the synthesizer and go straight to the encoder.

use std::fmt;

use serde::Serialize;

use crate::synth::ComplexSample;
use crate::timing::Protocol;

/// Kind of input a stream was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Source {
    /// RAW pulse-timing capture.
    #[serde(rename = "RAW")]
    Raw,
    /// BinRAW pulse-timing capture.
    #[serde(rename = "BinRAW")]
    BinRaw,
    /// WAV recording.
    #[serde(rename = "WAV")]
    Wav,
    /// Interleaved signed 16-bit I/Q.
    #[serde(rename = "IQ")]
    Iq,
    /// Interleaved unsigned 8-bit I/Q.
    #[serde(rename = "BIN")]
    Bin,
}

impl Source {
    /// Name written to the metadata `protocol` key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Raw => "RAW",
            Source::BinRaw => "BinRAW",
            Source::Wav => "WAV",
            Source::Iq => "IQ",
            Source::Bin => "BIN",
        }
    }

    /// Parses a name produced by [`Source::as_str`], ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Source::Raw,
            Source::BinRaw,
            Source::Wav,
            Source::Iq,
            Source::Bin,
        ]
        .into_iter()
        .find(|source| source.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Returns true for pulse-timing sources.
    pub fn is_timing(&self) -> bool {
        matches!(self, Source::Raw | Source::BinRaw)
    }
}

impl From<Protocol> for Source {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Raw => Source::Raw,
            Protocol::BinRaw => Source::BinRaw,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A waveform that is already sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledStream {
    /// Input kind.
    pub source: Source,
    /// Sample rate recorded in the input, if it carries one.
    pub sample_rate: Option<u32>,
    /// Samples, nominally within the unit circle.
    pub samples: Vec<ComplexSample>,
}

impl SampledStream {
    /// Creates a stream without a known sample rate.
    pub fn new(source: Source, samples: Vec<ComplexSample>) -> Self {
        Self {
            source,
            sample_rate: None,
            samples,
        }
    }

    /// Sets the sample rate carried by the input.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the stream holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
