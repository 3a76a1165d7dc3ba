//! Test fixture utilities for building captures and input directories.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use subiq_core::timing::{encode_binraw_records, to_hex_bytes, to_raw_tokens};
use subiq_core::PulseInterval;
use tempfile::TempDir;

/// Tokens per `RAW_Data:` line, as the device writes them.
pub const TOKENS_PER_LINE: usize = 512;

/// Records per `Data_RAW:` line.
pub const RECORDS_PER_LINE: usize = 64;

/// The on/off/on scenario: 100 us on, 200 us off, 100 us on.
pub const ON_OFF_ON: &str = "Filetype: Flipper SubGhz RAW File\n\
Version: 1\n\
Frequency: 433920000\n\
Preset: FuriHalSubGhzPresetOok650Async\n\
Protocol: RAW\n\
RAW_Data: 100 -200 100\n";

/// A capture with a malformed second token.
pub const MALFORMED: &str = "Filetype: Flipper SubGhz RAW File\n\
Version: 1\n\
Frequency: 433920000\n\
Protocol: RAW\n\
RAW_Data: 100 abc 200\n";

/// A short fixed-code remote burst with a repeated preamble.
pub fn garage_remote_intervals() -> Vec<PulseInterval> {
    let mut signed: Vec<i64> = vec![-12_000];
    for _ in 0..3 {
        signed.extend([400, -400].repeat(6));
        signed.push(-4_000);
        for bit in [1, 0, 1, 1, 0, 0, 1, 0, 1, 1, 1, 0] {
            if bit == 1 {
                signed.extend([1_200, -400]);
            } else {
                signed.extend([400, -1_200]);
            }
        }
        signed.push(-10_000);
    }
    signed
        .into_iter()
        .map(|d| PulseInterval::from_signed(d).expect("fixture durations are non-zero"))
        .collect()
}

/// Renders intervals as a RAW capture file.
pub fn raw_capture(intervals: &[PulseInterval], frequency_hz: Option<u64>) -> String {
    let mut text = header("RAW", frequency_hz);
    for chunk in intervals.chunks(TOKENS_PER_LINE) {
        text.push_str("RAW_Data: ");
        text.push_str(&to_raw_tokens(chunk));
        text.push('\n');
    }
    text
}

/// Renders intervals as a BinRAW capture file.
pub fn binraw_capture(intervals: &[PulseInterval], frequency_hz: Option<u64>) -> String {
    let mut text = header("BinRAW", frequency_hz);
    for chunk in intervals.chunks(RECORDS_PER_LINE) {
        text.push_str("Data_RAW: ");
        text.push_str(&to_hex_bytes(&encode_binraw_records(chunk)));
        text.push('\n');
    }
    text
}

fn header(protocol: &str, frequency_hz: Option<u64>) -> String {
    let mut text = String::from("Filetype: Flipper SubGhz RAW File\nVersion: 1\n");
    if let Some(frequency) = frequency_hz {
        text.push_str(&format!("Frequency: {}\n", frequency));
    }
    text.push_str("Preset: FuriHalSubGhzPresetOok650Async\n");
    text.push_str(&format!("Protocol: {}\n", protocol));
    text
}

/// Encodes i16 samples as a 16-bit PCM WAV.
pub fn wav_bytes(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("Failed to create WAV");
        for &sample in samples {
            writer.write_sample(sample).expect("Failed to write sample");
        }
        writer.finalize().expect("Failed to finalize WAV");
    }
    cursor.into_inner()
}

/// A temporary directory of input files.
pub struct InputDir {
    pub root: TempDir,
}

impl Default for InputDir {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDir {
    /// Create a new empty input directory.
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Get the directory path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Add a file with the given name and content.
    pub fn add(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        fs::write(&path, content).expect("Failed to write fixture file");
        path
    }

    /// Names of every file directly in the directory, sorted.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .expect("Failed to read fixture dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
