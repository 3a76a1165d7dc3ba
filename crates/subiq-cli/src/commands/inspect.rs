//! Inspect command implementation
//!
//! Parses an input and shows what a conversion would produce, without
//! writing anything.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use subiq_core::iq::BYTES_PER_SAMPLE;
use subiq_core::metadata::Metadata;
use subiq_core::params::resolve_sampled;
use subiq_core::synth::total_samples;
use subiq_core::timing::IntervalStats;
use subiq_core::{parse, resolve, ParamOverrides, Protocol, Source, SynthesisConfig};

use super::reporting::{print_banner, print_config, print_field, print_warnings};
use crate::input::{load_input, Input, InputKind};

/// One capture header line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderEntry {
    /// Header key as written.
    pub key: String,
    /// Header value.
    pub value: String,
}

/// What a conversion of one input would produce.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    /// Path of the input file
    pub input: String,
    /// Input format
    pub kind: InputKind,
    /// Protocol or sampled source
    pub source: Source,
    /// BLAKE3 hash of the input file
    pub source_hash: String,
    /// Capture headers in file order (empty for sampled inputs)
    pub headers: Vec<HeaderEntry>,
    /// RF carrier frequency from the capture header
    pub center_frequency_hz: Option<u64>,
    /// Interval statistics (captures only)
    pub stats: Option<IntervalStats>,
    /// Resolved synthesis parameters
    pub config: SynthesisConfig,
    /// Complex samples the stream would hold
    pub total_samples: u64,
    /// Stream size in bytes
    pub stream_bytes: u64,
    /// Stream duration in microseconds
    pub output_duration_us: u64,
    /// Non-fatal conditions
    pub warnings: Vec<String>,
}

/// Run the inspect command
///
/// # Arguments
/// * `path` - Input file to inspect
/// * `overrides` - Synthesis parameter overrides to resolve with
/// * `protocol` - Protocol to assume instead of the capture header
/// * `json` - Print the report as JSON
pub fn run(
    path: &Path,
    overrides: &ParamOverrides,
    protocol: Option<Protocol>,
    json: bool,
) -> Result<ExitCode> {
    let report = inspect_file(path, overrides, protocol)?;

    if json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
        return Ok(ExitCode::SUCCESS);
    }

    print_banner("subiq inspect");
    print_field("Input", &report.input);
    print_field("Source", report.source);
    if let Some(center) = report.center_frequency_hz {
        print_field("Center frequency", format!("{} Hz", center));
    }
    if !report.headers.is_empty() {
        println!("{}", "Headers:".blue().bold());
        for header in &report.headers {
            println!("  {}: {}", header.key, header.value.dimmed());
        }
    }
    if let Some(stats) = &report.stats {
        print_field(
            "Intervals",
            format!(
                "{} ({} on, {} off)",
                stats.count, stats.on_count, stats.off_count
            ),
        );
        print_field(
            "Interval range",
            format!("{}..{} us", stats.shortest_us, stats.longest_us),
        );
        print_field("Capture duration", format!("{} us", stats.total_us()));
    }
    println!();
    print_config(&report.config);
    print_field("Samples", report.total_samples);
    print_field("Stream size", format!("{} bytes", report.stream_bytes));
    print_field("Stream duration", format!("{} us", report.output_duration_us));

    if !report.warnings.is_empty() {
        println!();
        println!("{}", "Warnings:".yellow().bold());
        print_warnings(&report.warnings);
    }

    Ok(ExitCode::SUCCESS)
}

/// Builds the inspect report for one input.
pub fn inspect_file(
    path: &Path,
    overrides: &ParamOverrides,
    protocol: Option<Protocol>,
) -> Result<InspectReport> {
    let loaded = load_input(path).with_context(|| format!("Failed to load {}", path.display()))?;
    let mut warnings = loaded.warnings;

    let report = match &loaded.input {
        Input::Capture(bytes) => {
            let capture = parse(bytes, protocol)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            let stats = capture.stats();
            let resolution = resolve(overrides, &stats, capture.frequency_hz)
                .with_context(|| format!("Invalid parameters for {}", path.display()))?;
            warnings.extend(resolution.warnings.iter().map(ToString::to_string));

            let config = resolution.config;
            let samples = total_samples(&capture.intervals, &config);
            InspectReport {
                input: path.display().to_string(),
                kind: loaded.kind,
                source: capture.protocol.into(),
                source_hash: loaded.source_hash.clone(),
                headers: capture
                    .headers
                    .iter()
                    .map(|(key, value)| HeaderEntry {
                        key: key.clone(),
                        value: value.clone(),
                    })
                    .collect(),
                center_frequency_hz: capture.frequency_hz,
                stats: Some(stats),
                config,
                total_samples: samples,
                stream_bytes: samples * BYTES_PER_SAMPLE as u64,
                output_duration_us: Metadata::duration_us(samples, config.sample_rate_hz),
                warnings,
            }
        }
        Input::Sampled(stream) => {
            let resolution = resolve_sampled(overrides, stream.sample_rate)
                .with_context(|| format!("Invalid parameters for {}", path.display()))?;
            warnings.extend(resolution.warnings.iter().map(ToString::to_string));

            let config = resolution.config;
            let samples = stream.len() as u64;
            InspectReport {
                input: path.display().to_string(),
                kind: loaded.kind,
                source: stream.source,
                source_hash: loaded.source_hash.clone(),
                headers: Vec::new(),
                center_frequency_hz: None,
                stats: None,
                config,
                total_samples: samples,
                stream_bytes: samples * BYTES_PER_SAMPLE as u64,
                output_duration_us: Metadata::duration_us(samples, config.sample_rate_hz),
                warnings,
            }
        }
    };

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_inspect_capture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.sub");
        fs::write(
            &path,
            "Filetype: Flipper SubGhz RAW File\nFrequency: 433920000\nProtocol: RAW\nRAW_Data: 350 -1050 350\n",
        )
        .unwrap();

        let report = inspect_file(&path, &ParamOverrides::new(), None).unwrap();
        assert_eq!(report.kind, InputKind::Capture);
        assert_eq!(report.source, Source::Raw);
        assert_eq!(report.center_frequency_hz, Some(433_920_000));
        assert_eq!(report.headers.len(), 3);
        assert_eq!(report.headers[0].key, "Filetype");
        assert_eq!(report.stats.as_ref().unwrap().count, 3);
        // 1750 us at 500 kHz
        assert_eq!(report.total_samples, 875);
        assert_eq!(report.stream_bytes, 3500);
        assert_eq!(report.output_duration_us, 1750);
    }

    #[test]
    fn test_inspect_sampled_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("burst.bin");
        fs::write(&path, [128u8, 128, 255, 0, 1]).unwrap();

        let report = inspect_file(&path, &ParamOverrides::new(), None).unwrap();
        assert_eq!(report.source, Source::Bin);
        assert_eq!(report.total_samples, 2);
        assert!(report.stats.is_none());
        assert_eq!(report.warnings, vec!["ignored 1 trailing byte(s)".to_string()]);
    }

    #[test]
    fn test_inspect_wav_keeps_recorded_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("burst.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [1000i16, -1000, 0, 0] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let overrides = ParamOverrides::new().with_sample_rate(2_000_000);
        let report = inspect_file(&path, &overrides, None).unwrap();
        assert_eq!(report.config.sample_rate_hz, 48_000);
        assert_eq!(report.total_samples, 2);
        assert_eq!(
            report.warnings,
            vec!["sample rate override 2000000 Hz ignored; the input is sampled at 48000 Hz".to_string()]
        );
    }

    #[test]
    fn test_inspect_rejects_bad_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.sub");
        fs::write(&path, "Protocol: RAW\nRAW_Data: 350 -1050\n").unwrap();

        let overrides = ParamOverrides::new().with_amplitude(1.5);
        let err = inspect_file(&path, &overrides, None).unwrap_err();
        assert!(format!("{:#}", err).contains("amplitude"));
    }
}
