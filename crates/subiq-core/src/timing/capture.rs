//! Capture file scanning, header collection and protocol detection.

use std::fmt;

use serde::Serialize;

use crate::error::ParseError;

use super::interval::{IntervalStats, PulseInterval};
use super::{binraw, raw};

/// Marker that opens the RAW data section.
pub const RAW_DATA_MARKER: &str = "RAW_Data:";

/// Marker that opens the BinRAW data section.
pub const BINRAW_DATA_MARKER: &str = "Data_RAW:";

/// Lines starting with this character are comments.
pub const COMMENT_MARKER: char = '#';

/// Encoding of the interval data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Protocol {
    /// Signed decimal tokens.
    #[serde(rename = "RAW")]
    Raw,
    /// Fixed-width binary records, hex-encoded.
    #[serde(rename = "BinRAW")]
    BinRaw,
}

impl Protocol {
    /// Returns the canonical header spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Raw => "RAW",
            Protocol::BinRaw => "BinRAW",
        }
    }

    /// Matches a `Protocol:` header value, ignoring ASCII case.
    pub fn from_header(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("RAW") {
            Some(Protocol::Raw)
        } else if value.eq_ignore_ascii_case("BinRAW") {
            Some(Protocol::BinRaw)
        } else {
            None
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed pulse-timing capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Protocol the data section was decoded with.
    pub protocol: Protocol,
    /// RF carrier frequency from the `Frequency:` header, if present and numeric.
    pub frequency_hz: Option<u64>,
    /// Header key/value pairs in file order.
    pub headers: Vec<(String, String)>,
    /// Intervals in playback order.
    pub intervals: Vec<PulseInterval>,
}

impl Capture {
    /// Looks up a header value, ignoring ASCII case in the key.
    pub fn header(&self, key: &str) -> Option<&str> {
        find_header(&self.headers, key)
    }

    /// Computes interval statistics.
    pub fn stats(&self) -> IntervalStats {
        IntervalStats::from_intervals(&self.intervals)
    }
}

/// One non-blank line of the data section.
#[derive(Debug, Clone, Copy)]
pub(super) struct DataLine<'a> {
    /// 1-based line number.
    pub number: usize,
    /// Line content with any data marker removed.
    pub content: &'a str,
}

struct Sections<'a> {
    headers: Vec<(String, String)>,
    data: Vec<DataLine<'a>>,
}

/// Parses a capture.
///
/// `declared` forces the protocol; otherwise it is taken from the `Protocol:`
/// header. Detection happens once, before any data token is interpreted.
pub fn parse(raw_bytes: &[u8], declared: Option<Protocol>) -> Result<Capture, ParseError> {
    let text = String::from_utf8_lossy(raw_bytes);
    let sections = split_sections(&text);
    let protocol = detect_protocol(&sections.headers, declared)?;

    let intervals = match protocol {
        Protocol::Raw => raw::decode(&sections.data)?,
        Protocol::BinRaw => binraw::decode(&sections.data)?,
    };

    let frequency_hz =
        find_header(&sections.headers, "Frequency").and_then(|v| v.trim().parse::<u64>().ok());

    Ok(Capture {
        protocol,
        frequency_hz,
        headers: sections.headers,
        intervals,
    })
}

/// Parses a capture and returns only its intervals.
pub fn parse_intervals(
    raw_bytes: &[u8],
    declared: Option<Protocol>,
) -> Result<Vec<PulseInterval>, ParseError> {
    parse(raw_bytes, declared).map(|capture| capture.intervals)
}

fn detect_protocol(
    headers: &[(String, String)],
    declared: Option<Protocol>,
) -> Result<Protocol, ParseError> {
    if let Some(protocol) = declared {
        return Ok(protocol);
    }
    match find_header(headers, "Protocol") {
        Some(value) => Protocol::from_header(value)
            .ok_or_else(|| ParseError::UnknownProtocol(Some(value.trim().to_string()))),
        None => Err(ParseError::UnknownProtocol(None)),
    }
}

fn find_header<'a>(headers: &'a [(String, String)], key: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}

fn split_sections(text: &str) -> Sections<'_> {
    let mut headers = Vec::new();
    let mut data = Vec::new();
    let mut in_data = false;

    for (idx, line) in text.lines().enumerate() {
        let number = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }

        if let Some(content) = strip_data_marker(line) {
            in_data = true;
            data.push(DataLine { number, content });
            continue;
        }

        if !in_data {
            if let Some((key, value)) = split_header(line) {
                headers.push((key.to_string(), value.to_string()));
                continue;
            }
            // Bare data without a marker.
            in_data = true;
        }

        data.push(DataLine {
            number,
            content: line,
        });
    }

    Sections { headers, data }
}

fn strip_data_marker(line: &str) -> Option<&str> {
    line.strip_prefix(RAW_DATA_MARKER)
        .or_else(|| line.strip_prefix(BINRAW_DATA_MARKER))
        .map(str::trim)
}

fn split_header(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    let is_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ' ');
    is_key.then(|| (key, value.trim()))
}
