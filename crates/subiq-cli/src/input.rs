//! Input loading for captures and sampled recordings.
//!
//! Dispatches by file extension and returns either the raw capture bytes
//! (parsed later by the core) or an already decoded [`SampledStream`].

use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;
use subiq_core::iq::{dequantize, read_pairs};
use subiq_core::{ComplexSample, SampledStream, Source};

/// Pulse-timing capture extensions.
pub const CAPTURE_EXTENSIONS: &[&str] = &["sub"];

/// WAV recording extensions.
pub const WAV_EXTENSIONS: &[&str] = &["wav"];

/// Signed 16-bit I/Q extensions.
pub const IQ_EXTENSIONS: &[&str] = &["iq"];

/// Unsigned 8-bit I/Q extensions.
pub const BIN_EXTENSIONS: &[&str] = &["bin"];

/// Offset and scale of unsigned 8-bit samples.
const U8_CENTER: f64 = 127.5;

/// Identifies the format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Flipper `.sub` pulse-timing capture.
    Capture,
    /// WAV recording.
    Wav,
    /// Interleaved i16 I/Q.
    Iq,
    /// Interleaved u8 I/Q.
    Bin,
}

impl InputKind {
    /// Determines the kind from a path's extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())?;
        Self::from_extension(&extension)
    }

    fn from_extension(extension: &str) -> Option<Self> {
        if CAPTURE_EXTENSIONS.contains(&extension) {
            Some(InputKind::Capture)
        } else if WAV_EXTENSIONS.contains(&extension) {
            Some(InputKind::Wav)
        } else if IQ_EXTENSIONS.contains(&extension) {
            Some(InputKind::Iq)
        } else if BIN_EXTENSIONS.contains(&extension) {
            Some(InputKind::Bin)
        } else {
            None
        }
    }

    /// Returns the string representation for reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Capture => "capture",
            InputKind::Wav => "wav",
            InputKind::Iq => "iq",
            InputKind::Bin => "bin",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns true if the path has a recognized input extension.
pub fn is_supported(path: &Path) -> bool {
    InputKind::from_path(path).is_some()
}

/// Content of a loaded input.
#[derive(Debug, Clone)]
pub enum Input {
    /// Capture text, not yet parsed.
    Capture(Vec<u8>),
    /// Decoded waveform.
    Sampled(SampledStream),
}

/// Result of loading an input file.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// Loaded content.
    pub input: Input,
    /// Input format.
    pub kind: InputKind,
    /// BLAKE3 hash of the file content (hex string).
    pub source_hash: String,
    /// Non-fatal conditions found while decoding.
    pub warnings: Vec<String>,
}

/// Errors that can occur while loading an input.
#[derive(Debug)]
pub enum InputError {
    /// File could not be read.
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Unknown file extension.
    UnknownExtension { extension: Option<String> },

    /// WAV decoding failed.
    Wav { source: hound::Error },

    /// WAV file with a channel count other than 1 or 2.
    UnsupportedChannels { channels: u16 },

    /// Raw sample data could not be decoded.
    Decode {
        kind: InputKind,
        source: std::io::Error,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::FileRead { path, source } => {
                write!(f, "failed to read file '{}': {}", path.display(), source)
            }
            InputError::UnknownExtension { extension } => match extension {
                Some(ext) => write!(
                    f,
                    "unknown file extension '.{}' (expected .sub, .wav, .iq or .bin)",
                    ext
                ),
                None => write!(f, "file has no extension (expected .sub, .wav, .iq or .bin)"),
            },
            InputError::Wav { source } => write!(f, "WAV decode error: {}", source),
            InputError::UnsupportedChannels { channels } => write!(
                f,
                "WAV has {} channels (expected 1 for I or 2 for I/Q)",
                channels
            ),
            InputError::Decode { kind, source } => {
                write!(f, "failed to decode {} samples: {}", kind, source)
            }
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::FileRead { source, .. } => Some(source),
            InputError::Wav { source } => Some(source),
            InputError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<hound::Error> for InputError {
    fn from(source: hound::Error) -> Self {
        InputError::Wav { source }
    }
}

/// Load an input file, dispatching by extension.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use subiq_cli::input::load_input;
///
/// let result = load_input(Path::new("garage.sub")).unwrap();
/// println!("Loaded {} input", result.kind);
/// ```
pub fn load_input(path: &Path) -> Result<LoadResult, InputError> {
    let kind = InputKind::from_path(path).ok_or_else(|| InputError::UnknownExtension {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase()),
    })?;

    let bytes = std::fs::read(path).map_err(|e| InputError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let source_hash = blake3::hash(&bytes).to_hex().to_string();

    let mut warnings = Vec::new();
    let input = match kind {
        InputKind::Capture => Input::Capture(bytes),
        InputKind::Wav => Input::Sampled(read_wav(Cursor::new(bytes))?),
        InputKind::Iq => {
            let (stream, trailing) = read_iq(bytes.as_slice())?;
            if trailing > 0 {
                warnings.push(format!("ignored {} trailing byte(s)", trailing));
            }
            Input::Sampled(stream)
        }
        InputKind::Bin => {
            let (stream, trailing) = read_bin(&bytes);
            if trailing > 0 {
                warnings.push(format!("ignored {} trailing byte(s)", trailing));
            }
            Input::Sampled(stream)
        }
    };

    Ok(LoadResult {
        input,
        kind,
        source_hash,
        warnings,
    })
}

/// Decodes a WAV recording.
///
/// Stereo files are read as (I, Q), mono files as I with Q = 0. Integer
/// samples are normalized by `2^(bits-1) - 1`, so 16-bit input re-encodes
/// without loss.
pub fn read_wav<R: Read>(reader: R) -> Result<SampledStream, InputError> {
    let reader = hound::WavReader::new(reader)?;
    let spec = reader.spec();
    if spec.channels == 0 || spec.channels > 2 {
        return Err(InputError::UnsupportedChannels {
            channels: spec.channels,
        });
    }

    let values: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f64 / max_val))
                .collect::<Result<_, _>>()?
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()?,
    };

    let samples = if spec.channels == 2 {
        values
            .chunks_exact(2)
            .map(|pair| ComplexSample::new(pair[0], pair[1]))
            .collect()
    } else {
        values
            .into_iter()
            .map(|i| ComplexSample::new(i, 0.0))
            .collect()
    };

    Ok(SampledStream::new(Source::Wav, samples).with_sample_rate(spec.sample_rate))
}

/// Decodes interleaved little-endian i16 I/Q.
///
/// Returns the stream and the number of trailing bytes that did not form a
/// complete sample.
pub fn read_iq<R: Read>(reader: R) -> Result<(SampledStream, usize), InputError> {
    let (pairs, trailing) = read_pairs(reader).map_err(|source| InputError::Decode {
        kind: InputKind::Iq,
        source,
    })?;
    let samples = pairs
        .into_iter()
        .map(|(i, q)| ComplexSample::new(dequantize(i), dequantize(q)))
        .collect();
    Ok((SampledStream::new(Source::Iq, samples), trailing))
}

/// Decodes interleaved unsigned 8-bit I/Q as recorded by RTL-SDR tools.
///
/// Returns the stream and the number of trailing bytes that did not form a
/// complete sample.
pub fn read_bin(bytes: &[u8]) -> (SampledStream, usize) {
    let samples = bytes
        .chunks_exact(2)
        .map(|pair| {
            ComplexSample::new(
                (pair[0] as f64 - U8_CENTER) / U8_CENTER,
                (pair[1] as f64 - U8_CENTER) / U8_CENTER,
            )
        })
        .collect();
    (SampledStream::new(Source::Bin, samples), bytes.len() % 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::io;
    use subiq_core::iq::quantize;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device unplugged"))
        }
    }

    fn wav_bytes(spec: hound::WavSpec, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn int_spec(channels: u16) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            InputKind::from_path(Path::new("a/b/Garage.SUB")),
            Some(InputKind::Capture)
        );
        assert_eq!(InputKind::from_path(Path::new("x.wav")), Some(InputKind::Wav));
        assert_eq!(InputKind::from_path(Path::new("x.iq")), Some(InputKind::Iq));
        assert_eq!(InputKind::from_path(Path::new("x.bin")), Some(InputKind::Bin));
        assert_eq!(InputKind::from_path(Path::new("x.c16")), None);
        assert_eq!(InputKind::from_path(Path::new("noext")), None);
        assert!(is_supported(Path::new("y.Wav")));
    }

    #[test]
    fn test_stereo_wav_is_iq() {
        let bytes = wav_bytes(int_spec(2), &[32767, 0, -32767, 16384]);
        let stream = read_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(stream.source, Source::Wav);
        assert_eq!(stream.sample_rate, Some(48_000));
        assert_eq!(stream.samples.len(), 2);
        assert_eq!(stream.samples[0], ComplexSample::new(1.0, 0.0));
        assert_eq!(quantize(stream.samples[1].i).value, -32767);
        assert_eq!(quantize(stream.samples[1].q).value, 16384);
    }

    #[test]
    fn test_mono_wav_has_zero_q() {
        let bytes = wav_bytes(int_spec(1), &[1000, -1000, 0]);
        let stream = read_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(stream.samples.len(), 3);
        assert!(stream.samples.iter().all(|s| s.q == 0.0));
        assert_eq!(quantize(stream.samples[0].i).value, 1000);
    }

    #[test]
    fn test_wav_with_too_many_channels() {
        let bytes = wav_bytes(int_spec(4), &[0, 0, 0, 0]);
        let err = read_wav(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, InputError::UnsupportedChannels { channels: 4 }));
    }

    #[test]
    fn test_iq_is_exact_pass_through() {
        let bytes = [0xFF, 0x7F, 0x00, 0x80, 0x10, 0x00, 0xF0, 0xFF, 0xAA];
        let (stream, trailing) = read_iq(&bytes[..]).unwrap();
        assert_eq!(trailing, 1);
        let values: Vec<(i16, i16)> = stream
            .samples
            .iter()
            .map(|s| (quantize(s.i).value, quantize(s.q).value))
            .collect();
        assert_eq!(values, vec![(32767, -32768), (16, -16)]);
    }

    #[test]
    fn test_iq_read_error_names_the_format() {
        let err = read_iq(FailingReader).unwrap_err();
        assert!(matches!(
            err,
            InputError::Decode {
                kind: InputKind::Iq,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "failed to decode iq samples: device unplugged"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_bin_centers_unsigned_samples() {
        let (stream, trailing) = read_bin(&[255, 0, 127, 128, 7]);
        assert_eq!(trailing, 1);
        assert_eq!(stream.source, Source::Bin);
        assert_eq!(stream.sample_rate, None);
        assert_eq!(stream.samples[0], ComplexSample::new(1.0, -1.0));
        assert!(stream.samples[1].i < 0.0 && stream.samples[1].q > 0.0);
    }

    #[test]
    fn test_load_input_unknown_extension() {
        let err = load_input(Path::new("capture.flac")).unwrap_err();
        assert!(err.to_string().contains(".flac"));
    }

    #[test]
    fn test_load_input_reads_capture_and_hashes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote.sub");
        let content = b"Protocol: RAW\nRAW_Data: 350 -1050\n";
        fs::write(&path, content).unwrap();

        let result = load_input(&path).unwrap();
        assert_eq!(result.kind, InputKind::Capture);
        assert_eq!(result.source_hash, blake3::hash(content).to_hex().to_string());
        match result.input {
            Input::Capture(bytes) => assert_eq!(bytes, content.to_vec()),
            Input::Sampled(_) => panic!("expected capture"),
        }
    }

    #[test]
    fn test_load_input_missing_file() {
        let err = load_input(Path::new("/nonexistent/dir/remote.sub")).unwrap_err();
        assert!(matches!(err, InputError::FileRead { .. }));
    }
}
