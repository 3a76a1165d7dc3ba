//! End-to-end conversion of one input into a `.c16` stream.
//!
//! Parsing and parameter resolution both finish before the first byte is
//! written, so a bad capture or a bad override never produces partial
//! output through this module.

use std::fmt;
use std::io::Write;

use crate::error::{ConvertResult, EncodeWarning};
use crate::iq::{EncodeReport, IqWriter};
use crate::metadata::Metadata;
use crate::params::{resolve, resolve_sampled, ConfigWarning, ParamOverrides, SynthesisConfig};
use crate::sampled::{SampledStream, Source};
use crate::synth::{synthesize, ComplexSample};
use crate::timing::{parse, Capture, IntervalStats, Protocol};

/// Progress of a running conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Samples written so far.
    pub samples_written: u64,
    /// Samples the run will write in total.
    pub total_samples: u64,
}

impl Progress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total_samples == 0 {
            1.0
        } else {
            self.samples_written as f64 / self.total_samples as f64
        }
    }
}

/// Non-fatal condition raised during a conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConversionWarning {
    /// Raised by the parameter resolver.
    Config(ConfigWarning),
    /// Raised by the sample encoder.
    Encode(EncodeWarning),
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionWarning::Config(w) => write!(f, "{}", w),
            ConversionWarning::Encode(w) => write!(f, "{}", w),
        }
    }
}

/// Outcome of one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    /// Input kind.
    pub protocol: Source,
    /// Parameters the stream was synthesized with.
    pub config: SynthesisConfig,
    /// Statistics of the interval sequence (empty for sampled inputs).
    pub stats: IntervalStats,
    /// Encoder summary.
    pub encode: EncodeReport,
    /// Non-fatal conditions in the order they were raised.
    pub warnings: Vec<ConversionWarning>,
    /// RF carrier frequency from the capture header.
    pub center_frequency_hz: Option<u64>,
    /// Sidecar content.
    pub metadata: Metadata,
}

impl ConversionReport {
    /// Sidecar text for this stream.
    pub fn metadata_text(&self) -> String {
        self.metadata.to_text()
    }

    /// Warning messages, formatted.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

type ProgressFn<'a> = Box<dyn FnMut(Progress) + 'a>;

/// Conversion runner with optional progress reporting.
///
/// # Example
/// ```
/// use subiq_core::params::ParamOverrides;
/// use subiq_core::pipeline::Converter;
///
/// let capture = b"Filetype: Flipper SubGhz RAW File\nProtocol: RAW\nRAW_Data: 100 -200 100\n";
/// let mut output = Vec::new();
/// let report = Converter::new(ParamOverrides::new().with_sample_rate(1_000_000))
///     .convert_capture(capture, None, &mut output)
///     .unwrap();
/// assert_eq!(report.encode.samples, 400);
/// assert_eq!(output.len(), 1600);
/// ```
pub struct Converter<'a> {
    overrides: ParamOverrides,
    progress: Option<(u64, ProgressFn<'a>)>,
}

impl<'a> Converter<'a> {
    /// Creates a converter with the given overrides.
    pub fn new(overrides: ParamOverrides) -> Self {
        Self {
            overrides,
            progress: None,
        }
    }

    /// Calls `callback` every `every_n_samples` samples and once more at the
    /// end if the last call did not already cover the final sample.
    pub fn with_progress<F>(mut self, every_n_samples: u64, callback: F) -> Self
    where
        F: FnMut(Progress) + 'a,
    {
        self.progress = Some((every_n_samples.max(1), Box::new(callback)));
        self
    }

    /// Overrides used by this converter.
    pub fn overrides(&self) -> &ParamOverrides {
        &self.overrides
    }

    /// Parses `raw`, resolves parameters and writes the `.c16` stream.
    pub fn convert_capture<W: Write>(
        &mut self,
        raw: &[u8],
        declared: Option<Protocol>,
        writer: W,
    ) -> ConvertResult<ConversionReport> {
        let capture = parse(raw, declared)?;
        self.convert_parsed(&capture, writer)
    }

    /// Resolves parameters for an already parsed capture and writes the stream.
    pub fn convert_parsed<W: Write>(
        &mut self,
        capture: &Capture,
        writer: W,
    ) -> ConvertResult<ConversionReport> {
        let stats = capture.stats();
        let resolution = resolve(&self.overrides, &stats, capture.frequency_hz)?;
        let config = resolution.config;

        let samples = synthesize(&capture.intervals, config);
        let total = samples.total_samples();
        let encode = self.write_stream(samples, total, writer)?;

        let mut warnings: Vec<ConversionWarning> = resolution
            .warnings
            .into_iter()
            .map(ConversionWarning::Config)
            .collect();
        warnings.extend(encode.warning().map(ConversionWarning::Encode));

        let metadata = Metadata {
            sample_rate_hz: config.sample_rate_hz,
            center_frequency_hz: capture.frequency_hz,
            intermediate_freq_hz: config.intermediate_freq_hz,
            amplitude_fraction: config.amplitude_fraction,
            protocol: capture.protocol.into(),
            interval_count: capture.intervals.len(),
            sample_count: encode.samples,
            source_duration_us: stats.total_us(),
            output_duration_us: Metadata::duration_us(encode.samples, config.sample_rate_hz),
            clamped_samples: encode.clamped,
        };

        Ok(ConversionReport {
            protocol: capture.protocol.into(),
            config,
            stats,
            encode,
            warnings,
            center_frequency_hz: capture.frequency_hz,
            metadata,
        })
    }

    /// Encodes an already sampled waveform.
    ///
    /// The sample rate comes from the stream, then the override, then the
    /// default. Samples are scaled by the amplitude override and written
    /// without synthesis.
    pub fn convert_sampled<W: Write>(
        &mut self,
        stream: &SampledStream,
        writer: W,
    ) -> ConvertResult<ConversionReport> {
        let resolution = resolve_sampled(&self.overrides, stream.sample_rate)?;
        let config = resolution.config;

        let gain = config.amplitude_fraction;
        let samples = stream
            .samples
            .iter()
            .map(|s| ComplexSample::new(s.i * gain, s.q * gain));
        let encode = self.write_stream(samples, stream.len() as u64, writer)?;

        let duration_us = Metadata::duration_us(encode.samples, config.sample_rate_hz);
        let metadata = Metadata {
            sample_rate_hz: config.sample_rate_hz,
            center_frequency_hz: None,
            intermediate_freq_hz: 0.0,
            amplitude_fraction: config.amplitude_fraction,
            protocol: stream.source,
            interval_count: 0,
            sample_count: encode.samples,
            source_duration_us: duration_us,
            output_duration_us: duration_us,
            clamped_samples: encode.clamped,
        };

        Ok(ConversionReport {
            protocol: stream.source,
            config,
            stats: IntervalStats::default(),
            warnings: resolution
                .warnings
                .into_iter()
                .map(ConversionWarning::Config)
                .chain(encode.warning().map(ConversionWarning::Encode))
                .collect(),
            encode,
            center_frequency_hz: None,
            metadata,
        })
    }

    fn write_stream<I, W>(&mut self, samples: I, total: u64, writer: W) -> ConvertResult<EncodeReport>
    where
        I: IntoIterator<Item = ComplexSample>,
        W: Write,
    {
        let mut iq = IqWriter::new(writer);

        match self.progress.as_mut() {
            None => iq.write_samples(samples)?,
            Some((every, callback)) => {
                for sample in samples {
                    iq.write_sample(sample)?;
                    if iq.samples_written() % *every == 0 {
                        callback(Progress {
                            samples_written: iq.samples_written(),
                            total_samples: total,
                        });
                    }
                }
                let written = iq.samples_written();
                if written == 0 || written % *every != 0 {
                    callback(Progress {
                        samples_written: written,
                        total_samples: total,
                    });
                }
            }
        }

        let (_, report) = iq.finish()?;
        Ok(report)
    }
}

/// Converts one pulse-timing capture with the given overrides.
///
/// # Arguments
/// * `raw` - Capture file contents
/// * `declared` - Protocol to use instead of the `Protocol:` header
/// * `overrides` - Explicit synthesis parameters
/// * `writer` - Destination of the `.c16` bytes
pub fn convert_capture<W: Write>(
    raw: &[u8],
    declared: Option<Protocol>,
    overrides: &ParamOverrides,
    writer: W,
) -> ConvertResult<ConversionReport> {
    Converter::new(*overrides).convert_capture(raw, declared, writer)
}

/// Encodes an already sampled waveform with the given overrides.
pub fn convert_sampled<W: Write>(
    stream: &SampledStream,
    overrides: &ParamOverrides,
    writer: W,
) -> ConvertResult<ConversionReport> {
    Converter::new(*overrides).convert_sampled(stream, writer)
}
