//! Convert command implementation
//!
//! Converts pulse-timing captures and sampled recordings into `.c16` I/Q
//! streams with a `.txt` metadata sidecar. Directories are scanned for
//! supported inputs, and a failing file never stops the rest of the batch.

use std::collections::HashMap;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use serde::Serialize;
use subiq_core::{ConversionReport, Converter, ParamOverrides, Protocol, Source};
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

use super::reporting::{error_code, print_banner, print_field, print_warnings};
use crate::input::{is_supported, load_input, Input};
use crate::output::{commit_pair, stage_bytes, stage_for, OutputLocation, OutputPaths};

/// Samples between progress events.
const PROGRESS_INTERVAL: u64 = 1 << 20;

/// Options shared by every file of a run.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Where artifacts are written (default: next to each input).
    pub output: OutputLocation,
    /// Synthesis parameter overrides.
    pub overrides: ParamOverrides,
    /// Protocol to assume for captures instead of their header.
    pub protocol: Option<Protocol>,
    /// Descend into subdirectories when an input is a directory.
    pub recursive: bool,
    /// Print a JSON summary instead of colored status lines.
    pub json: bool,
}

/// Outcome of converting one file.
#[derive(Debug)]
pub struct Converted {
    /// Where the artifacts were written.
    pub paths: OutputPaths,
    /// Conversion report from the core.
    pub report: ConversionReport,
    /// Warnings raised while loading the input.
    pub input_warnings: Vec<String>,
}

impl Converted {
    /// Input and conversion warnings, formatted.
    pub fn warnings(&self) -> Vec<String> {
        self.input_warnings
            .iter()
            .cloned()
            .chain(self.report.warning_messages())
            .collect()
    }
}

/// Result of converting a single file, as reported in the summary.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    /// Path of the input file
    pub input: String,
    /// Whether conversion succeeded
    pub success: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Stable error code if the failure came from the core
    pub error_code: Option<String>,
    /// Input kind
    pub source: Option<Source>,
    /// Path of the written stream
    pub stream_path: Option<String>,
    /// Path of the written sidecar
    pub metadata_path: Option<String>,
    /// Output sample rate
    pub sample_rate_hz: Option<u32>,
    /// Complex samples written
    pub samples: Option<u64>,
    /// BLAKE3 hash of the stream
    pub iq_hash: Option<String>,
    /// Non-fatal conditions
    pub warnings: Vec<String>,
    /// Conversion time in milliseconds
    pub duration_ms: u64,
}

/// Summary report for a run.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertSummary {
    /// Files processed
    pub total: usize,
    /// Successful conversions
    pub successful: usize,
    /// Failed conversions
    pub failed: usize,
    /// Total runtime in seconds
    pub runtime_seconds: f64,
    /// Results for each file
    pub files: Vec<FileResult>,
}

/// Output paths already written during a run, and the input behind each.
#[derive(Debug, Default)]
pub struct OutputClaims {
    owners: HashMap<PathBuf, PathBuf>,
}

impl OutputClaims {
    /// Fails if either artifact of `paths` was already written this run.
    pub fn check(&self, paths: &OutputPaths) -> Result<()> {
        for target in [&paths.stream, &paths.metadata] {
            if let Some(owner) = self.owners.get(target) {
                return Err(anyhow!(
                    "Output {} was already written from {}",
                    target.display(),
                    owner.display()
                ));
            }
        }
        Ok(())
    }

    /// Records that `input` wrote `paths`.
    pub fn claim(&mut self, paths: &OutputPaths, input: &Path) {
        self.owners.insert(paths.stream.clone(), input.to_path_buf());
        self.owners.insert(paths.metadata.clone(), input.to_path_buf());
    }
}

impl ConvertSummary {
    fn from_results(files: Vec<FileResult>, runtime_seconds: f64) -> Self {
        let successful = files.iter().filter(|f| f.success).count();
        Self {
            total: files.len(),
            successful,
            failed: files.len() - successful,
            runtime_seconds,
            files,
        }
    }
}

/// Run the convert command
///
/// # Arguments
/// * `inputs` - Files or directories to convert
/// * `options` - Output location, overrides and reporting mode
///
/// # Returns
/// Exit code: 0 success, 1 if any file failed
pub fn run(inputs: &[PathBuf], options: &ConvertOptions) -> Result<ExitCode> {
    let start = Instant::now();

    let files = collect_inputs(inputs, options.recursive);
    if files.is_empty() {
        anyhow::bail!("No supported input files found (expected .sub, .wav, .iq or .bin)");
    }

    if !options.json {
        print_banner("subiq convert");
        print_field("Inputs", files.len());
        match &options.output {
            OutputLocation::NextToInput => {}
            OutputLocation::Dir(dir) => print_field("Output directory", dir.display()),
            OutputLocation::Base(base) => print_field("Output", base.display()),
        }
        println!();
    }

    let mut claims = OutputClaims::default();
    let mut results = Vec::with_capacity(files.len());
    for file in &files {
        let result = process_file(file, options, &mut claims);

        if !options.json {
            if result.success {
                println!(
                    "  {} {} ({} samples @ {} Hz, {}ms)",
                    "SUCCESS".green(),
                    result.input,
                    result.samples.unwrap_or(0),
                    result.sample_rate_hz.unwrap_or(0),
                    result.duration_ms
                );
            } else {
                println!(
                    "  {} {} - {}",
                    "FAILED".red(),
                    result.input,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            print_warnings(&result.warnings);
        }

        results.push(result);
    }

    let summary = ConvertSummary::from_results(results, start.elapsed().as_secs_f64());

    if options.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{}", json);
    } else {
        print_summary(&summary);
    }

    if summary.failed > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Expands directories into the supported files they contain.
///
/// Explicit file arguments are kept as given, supported or not, so that a
/// bad argument is reported as a failed file. Directory contents are sorted
/// for a deterministic order.
pub fn collect_inputs(inputs: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let max_depth = if recursive { usize::MAX } else { 1 };
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .min_depth(1)
                .max_depth(max_depth)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_supported(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            debug!(dir = %input.display(), count = found.len(), "scanned directory");
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }

    files
}

/// Converts one file and writes its `.c16` and `.txt`.
///
/// Both artifacts are staged next to their final paths and renamed only
/// after they have been completely written. On error nothing is left at
/// either final path.
pub fn convert_file(path: &Path, options: &ConvertOptions) -> Result<Converted> {
    let loaded = load_input(path).with_context(|| format!("Failed to load {}", path.display()))?;
    debug!(
        path = %path.display(),
        kind = %loaded.kind,
        hash = %loaded.source_hash,
        "loaded input"
    );

    let paths = options.output.paths_for(path);
    let mut staged = stage_for(&paths.stream)?;

    let report = {
        let mut writer = BufWriter::new(staged.as_file_mut());
        let mut converter =
            Converter::new(options.overrides).with_progress(PROGRESS_INTERVAL, |p| {
                trace!(
                    written = p.samples_written,
                    total = p.total_samples,
                    "progress"
                )
            });
        let result = match &loaded.input {
            Input::Capture(bytes) => {
                converter.convert_capture(bytes, options.protocol, &mut writer)
            }
            Input::Sampled(stream) => converter.convert_sampled(stream, &mut writer),
        };
        result.with_context(|| format!("Failed to convert {}", path.display()))?
    };

    let sidecar = stage_bytes(&paths.metadata, report.metadata_text().as_bytes())?;
    commit_pair(staged, sidecar, &paths)?;

    let converted = Converted {
        paths,
        report,
        input_warnings: loaded.warnings,
    };
    for warning in converted.warnings() {
        warn!(path = %path.display(), "{}", warning);
    }
    if let Some(range) = converted.report.encode.range {
        debug!(
            path = %path.display(),
            min_i = range.min_i,
            max_i = range.max_i,
            min_q = range.min_q,
            max_q = range.max_q,
            "stream extremes"
        );
    }
    info!(
        path = %path.display(),
        samples = converted.report.encode.samples,
        hash = %converted.report.encode.iq_hash,
        "converted"
    );

    Ok(converted)
}

fn process_file(path: &Path, options: &ConvertOptions, claims: &mut OutputClaims) -> FileResult {
    let start = Instant::now();

    let mut result = FileResult {
        input: path.display().to_string(),
        success: false,
        error: None,
        error_code: None,
        source: None,
        stream_path: None,
        metadata_path: None,
        sample_rate_hz: None,
        samples: None,
        iq_hash: None,
        warnings: Vec::new(),
        duration_ms: 0,
    };

    let outcome = claims
        .check(&options.output.paths_for(path))
        .and_then(|()| convert_file(path, options));

    match outcome {
        Ok(converted) => {
            claims.claim(&converted.paths, path);
            result.success = true;
            result.warnings = converted.warnings();
            result.source = Some(converted.report.protocol);
            result.stream_path = Some(converted.paths.stream.display().to_string());
            result.metadata_path = Some(converted.paths.metadata.display().to_string());
            result.sample_rate_hz = Some(converted.report.config.sample_rate_hz);
            result.samples = Some(converted.report.encode.samples);
            result.iq_hash = Some(converted.report.encode.iq_hash);
        }
        Err(e) => {
            result.error_code = error_code(&e).map(str::to_string);
            result.error = Some(format!("{:#}", e));
        }
    }

    result.duration_ms = start.elapsed().as_millis() as u64;
    result
}

fn print_summary(summary: &ConvertSummary) {
    println!();
    print_banner("Conversion Summary");
    print_field("Total files", summary.total);
    println!("{} {}", "Successful:".green().bold(), summary.successful);
    println!("{} {}", "Failed:".red().bold(), summary.failed);
    println!(
        "{} {:.2}s",
        "Total runtime:".blue().bold(),
        summary.runtime_seconds
    );
    println!();

    let written: Vec<_> = summary.files.iter().filter(|f| f.success).collect();
    if !written.is_empty() {
        println!("{}", "Written streams with BLAKE3 hashes:".green().bold());
        for file in written {
            println!(
                "  {}: {}",
                file.stream_path.as_deref().unwrap_or("unknown"),
                file.iq_hash.as_deref().unwrap_or("unknown").dimmed()
            );
        }
        println!();
    }

    let failed: Vec<_> = summary.files.iter().filter(|f| !f.success).collect();
    if !failed.is_empty() {
        println!("{}", "Failed files:".red().bold());
        for file in failed {
            println!(
                "  - {}: {}",
                file.input,
                file.error.as_deref().unwrap_or("unknown error")
            );
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_collect_inputs_filters_and_sorts_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.sub"), "").unwrap();
        fs::write(dir.path().join("a.iq"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.sub"), "").unwrap();

        let flat = collect_inputs(&[dir.path().to_path_buf()], false);
        assert_eq!(
            flat,
            vec![dir.path().join("a.iq"), dir.path().join("b.sub")]
        );

        let deep = collect_inputs(&[dir.path().to_path_buf()], true);
        assert_eq!(deep.len(), 3);
        assert!(deep.contains(&dir.path().join("nested").join("c.sub")));
    }

    #[test]
    fn test_collect_inputs_keeps_explicit_files() {
        let inputs = vec![PathBuf::from("missing.sub"), PathBuf::from("odd.flac")];
        assert_eq!(collect_inputs(&inputs, false), inputs);
    }

    #[test]
    fn test_convert_file_writes_stream_and_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("remote.sub");
        fs::write(&input, "Protocol: RAW\nRAW_Data: 100 -200 100\n").unwrap();

        let options = ConvertOptions {
            overrides: ParamOverrides::new().with_sample_rate(1_000_000),
            ..Default::default()
        };
        let converted = convert_file(&input, &options).unwrap();

        assert_eq!(converted.paths.stream, dir.path().join("remote.c16"));
        assert_eq!(fs::read(&converted.paths.stream).unwrap().len(), 1600);
        let sidecar = fs::read_to_string(&converted.paths.metadata).unwrap();
        assert!(sidecar.starts_with("sample_rate=1000000\n"));
    }

    #[test]
    fn test_process_file_reports_core_error_code() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.sub");
        fs::write(&input, "Protocol: RAW\nRAW_Data: 100 abc 200\n").unwrap();

        let mut claims = OutputClaims::default();
        let result = process_file(&input, &ConvertOptions::default(), &mut claims);
        assert!(!result.success);
        assert_eq!(result.error_code.as_deref(), Some("PARSE_002"));
        assert!(result.error.unwrap().contains("abc"));
        assert!(!dir.path().join("broken.c16").exists());
        assert!(!dir.path().join("broken.txt").exists());
    }

    #[test]
    fn test_convert_file_leaves_nothing_when_sidecar_is_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("remote.sub");
        fs::write(&input, "Protocol: RAW\nRAW_Data: 100 -200 100\n").unwrap();
        fs::create_dir(dir.path().join("remote.txt")).unwrap();
        fs::write(dir.path().join("remote.txt").join("notes"), "keep").unwrap();

        assert!(convert_file(&input, &ConvertOptions::default()).is_err());
        assert!(!dir.path().join("remote.c16").exists());
        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["remote.sub", "remote.txt"]);
    }

    #[test]
    fn test_convert_file_to_output_base() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("remote.sub");
        fs::write(&input, "Protocol: RAW\nRAW_Data: 100 -200 100\n").unwrap();

        let options = ConvertOptions {
            output: OutputLocation::Base(dir.path().join("hackrf").join("garage.c16")),
            ..Default::default()
        };
        let converted = convert_file(&input, &options).unwrap();

        assert_eq!(converted.paths.stream, dir.path().join("hackrf").join("garage.c16"));
        assert_eq!(converted.paths.metadata, dir.path().join("hackrf").join("garage.txt"));
        assert!(converted.paths.metadata.is_file());
        assert!(!dir.path().join("remote.c16").exists());
    }

    #[test]
    fn test_process_file_refuses_claimed_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("door.iq");
        let second = dir.path().join("door.sub");
        fs::write(&first, [0xFFu8, 0x7F, 0x00, 0x80]).unwrap();
        fs::write(&second, "Protocol: RAW\nRAW_Data: 100 -200 100\n").unwrap();

        let options = ConvertOptions::default();
        let mut claims = OutputClaims::default();
        assert!(process_file(&first, &options, &mut claims).success);
        let written = fs::read(dir.path().join("door.c16")).unwrap();

        let result = process_file(&second, &options, &mut claims);
        assert!(!result.success);
        assert!(result.error_code.is_none());
        let error = result.error.unwrap();
        assert!(error.contains("already written from"));
        assert!(error.contains("door.iq"));
        assert_eq!(fs::read(dir.path().join("door.c16")).unwrap(), written);
    }

    #[test]
    fn test_failed_file_does_not_claim_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("door.iq");
        let good = dir.path().join("door.sub");
        fs::write(&good, "Protocol: RAW\nRAW_Data: 100 -200 100\n").unwrap();

        let options = ConvertOptions::default();
        let mut claims = OutputClaims::default();
        // Missing file fails to load.
        assert!(!process_file(&broken, &options, &mut claims).success);
        assert!(process_file(&good, &options, &mut claims).success);
        assert!(dir.path().join("door.c16").is_file());
    }
}
