//! subiq core
//!
//! Converts radio pulse-timing captures (Flipper `.sub` RAW and BinRAW) into
//! interleaved signed 16-bit I/Q streams (`.c16`) for SDR playback, plus the
//! `key=value` sidecar describing how the stream was synthesized.
//!
//! # Overview
//!
//! A conversion runs four stages, leaf first:
//!
//! - **Timing parser** - capture text to an ordered sequence of on/off intervals
//! - **Parameter resolver** - overrides, auto detection and defaults to a
//!   [`SynthesisConfig`]
//! - **Waveform synthesizer** - lazy, phase-continuous on/off keyed carrier
//! - **Sample encoder** - quantization to little-endian i16 I/Q pairs
//!
//! Inputs that are already sampled ([`SampledStream`]) skip the first three
//! stages.
//!
//! # Determinism
//!
//! Output is a pure function of the input bytes and the resolved
//! configuration. The encoder hashes every stream with BLAKE3, so two runs
//! can be compared by [`EncodeReport::iq_hash`].
//!
//! # Example
//!
//! ```
//! use subiq_core::{convert_capture, ParamOverrides};
//!
//! let capture = b"Protocol: RAW\nRAW_Data: 100 -200 100\n";
//! let overrides = ParamOverrides::new()
//!     .with_sample_rate(1_000_000)
//!     .with_intermediate_freq(0.0);
//!
//! let mut c16 = Vec::new();
//! let report = convert_capture(capture, None, &overrides, &mut c16)?;
//!
//! assert_eq!(report.encode.samples, 400);
//! assert!(report.metadata_text().starts_with("sample_rate=1000000\n"));
//! # Ok::<(), subiq_core::ConvertError>(())
//! ```
//!
//! # Crate Structure
//!
//! - [`timing`] - Capture parsing and interval types
//! - [`params`] - Parameter resolution and documented defaults
//! - [`synth`] - Phase accumulator and sample synthesizer
//! - [`iq`] - Quantization and the `.c16` writer
//! - [`metadata`] - Sidecar text
//! - [`sampled`] - Already-sampled inputs
//! - [`pipeline`] - End-to-end conversion

pub mod error;
pub mod iq;
pub mod metadata;
pub mod params;
pub mod pipeline;
pub mod sampled;
pub mod synth;
pub mod timing;

// Re-export main types at crate root
pub use error::{
    ConfigError, ConfigField, ConvertError, ConvertResult, EncodeWarning, ParseError, StageError,
};
pub use iq::{EncodeReport, IqWriter};
pub use metadata::Metadata;
pub use params::{resolve, resolve_sampled, ParamOverrides, SynthesisConfig};
pub use pipeline::{
    convert_capture, convert_sampled, ConversionReport, ConversionWarning, Converter, Progress,
};
pub use sampled::{SampledStream, Source};
pub use synth::{synthesize, ComplexSample, Synthesizer};
pub use timing::{parse, Capture, Protocol, PulseInterval};
