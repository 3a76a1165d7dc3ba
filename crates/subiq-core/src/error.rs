//! Error types for the conversion pipeline.

use std::fmt;

use thiserror::Error;

/// Common interface for errors raised by a pipeline stage.
///
/// Codes are stable and meant for programmatic handling by batch front ends.
pub trait StageError: std::error::Error {
    /// Stable error code, e.g. `"PARSE_002"`.
    fn code(&self) -> &'static str;

    /// Human-readable message. Defaults to the `Display` output.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Stage the error belongs to ("parse", "config", "convert").
    fn category(&self) -> &'static str;
}

/// Errors produced while parsing a pulse-timing capture.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The protocol header is missing or names an unsupported protocol.
    #[error("{}", describe_protocol(.0))]
    UnknownProtocol(Option<String>),

    /// A data token could not be decoded.
    #[error("malformed token '{token}' at position {index} (line {line})")]
    MalformedToken {
        /// 0-based token position within the data section.
        index: usize,
        /// 1-based line number in the input.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// A BinRAW record was cut short.
    #[error("truncated record at byte {offset}: {remaining} byte(s) left, record needs 4")]
    TruncatedRecord {
        /// Byte offset of the incomplete record within the decoded data.
        offset: usize,
        /// Number of bytes available for the record.
        remaining: usize,
    },

    /// An interval has a duration of zero.
    #[error("zero-length interval at position {index}")]
    ZeroDuration {
        /// 0-based interval position.
        index: usize,
    },

    /// The capture contains no intervals.
    #[error("capture contains no intervals")]
    Empty,
}

fn describe_protocol(found: &Option<String>) -> String {
    match found {
        Some(found) => format!("unsupported protocol '{}' (expected RAW or BinRAW)", found),
        None => "no protocol header found (expected RAW or BinRAW)".to_string(),
    }
}

impl StageError for ParseError {
    fn code(&self) -> &'static str {
        match self {
            ParseError::UnknownProtocol(_) => "PARSE_001",
            ParseError::MalformedToken { .. } => "PARSE_002",
            ParseError::TruncatedRecord { .. } => "PARSE_003",
            ParseError::ZeroDuration { .. } => "PARSE_004",
            ParseError::Empty => "PARSE_005",
        }
    }

    fn category(&self) -> &'static str {
        "parse"
    }
}

/// Synthesis parameter that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    /// Output sample rate.
    SampleRate,
    /// Intermediate (carrier) frequency.
    IntermediateFrequency,
    /// Peak amplitude fraction.
    Amplitude,
}

impl ConfigField {
    /// Returns the field name as used in metadata and CLI messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigField::SampleRate => "sample_rate",
            ConfigField::IntermediateFrequency => "intermediate_frequency",
            ConfigField::Amplitude => "amplitude",
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors produced while resolving synthesis parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// An explicit override is outside its valid domain.
    #[error("{field} out of range: {value}")]
    OutOfRange {
        /// The offending field.
        field: ConfigField,
        /// The rejected value.
        value: f64,
    },
}

impl ConfigError {
    /// Creates an out-of-range error.
    pub fn out_of_range(field: ConfigField, value: f64) -> Self {
        Self::OutOfRange { field, value }
    }

    /// Returns the field that failed validation.
    pub fn field(&self) -> ConfigField {
        match self {
            ConfigError::OutOfRange { field, .. } => *field,
        }
    }
}

impl StageError for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            ConfigError::OutOfRange { field, .. } => match field {
                ConfigField::SampleRate => "CONFIG_001",
                ConfigField::IntermediateFrequency => "CONFIG_002",
                ConfigField::Amplitude => "CONFIG_003",
            },
        }
    }

    fn category(&self) -> &'static str {
        "config"
    }
}

/// Non-fatal condition raised by the sample encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeWarning {
    /// Sample components fell outside the i16 range and were clamped.
    Clamped {
        /// Number of clamped I or Q components.
        count: u64,
    },
}

impl fmt::Display for EncodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeWarning::Clamped { count } => {
                write!(f, "{} sample component(s) clamped to the 16-bit range", count)
            }
        }
    }
}

/// Errors from a complete conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The capture could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The synthesis parameters are invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Writing the output stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StageError for ConvertError {
    fn code(&self) -> &'static str {
        match self {
            ConvertError::Parse(e) => e.code(),
            ConvertError::Config(e) => e.code(),
            ConvertError::Io(_) => "CONVERT_001",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            ConvertError::Parse(e) => e.category(),
            ConvertError::Config(e) => e.category(),
            ConvertError::Io(_) => "convert",
        }
    }
}

/// Result type for conversion runs.
pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_protocol_messages() {
        let err = ParseError::UnknownProtocol(Some("Princeton".to_string()));
        assert!(err.to_string().contains("Princeton"));

        let err = ParseError::UnknownProtocol(None);
        assert!(err.to_string().contains("no protocol header"));
    }

    #[test]
    fn test_out_of_range_helper() {
        let err = ConfigError::out_of_range(ConfigField::Amplitude, 1.5);
        assert_eq!(err.field(), ConfigField::Amplitude);
        assert!(err.to_string().contains("amplitude"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ParseError::Empty.code(), "PARSE_005");
        assert_eq!(
            ConfigError::out_of_range(ConfigField::SampleRate, 0.0).code(),
            "CONFIG_001"
        );
        let wrapped = ConvertError::from(ParseError::Empty);
        assert_eq!(wrapped.code(), "PARSE_005");
        assert_eq!(wrapped.category(), "parse");
    }

    #[test]
    fn test_clamped_warning_display() {
        let warning = EncodeWarning::Clamped { count: 3 };
        assert!(warning.to_string().starts_with("3 sample"));
    }
}
