//! BinRAW protocol: fixed-width binary interval records.
//!
//! Data lines carry hex-encoded bytes. Every record is 4 bytes, big-endian:
//! bit 31 holds the polarity (1 = carrier on) and bits 0-30 the duration in
//! microseconds.

use byteorder::{BigEndian, ByteOrder};

use crate::error::ParseError;

use super::capture::DataLine;
use super::interval::{Polarity, PulseInterval};

/// Size of one BinRAW record in bytes.
pub const RECORD_SIZE: usize = 4;

/// Largest duration a record can carry.
pub const MAX_RECORD_DURATION_US: u32 = 0x7FFF_FFFF;

const POLARITY_BIT: u32 = 0x8000_0000;

/// Decodes BinRAW data lines into intervals.
pub(super) fn decode(lines: &[DataLine<'_>]) -> Result<Vec<PulseInterval>, ParseError> {
    let bytes = decode_hex(lines)?;

    let chunks = bytes.chunks_exact(RECORD_SIZE);
    let remaining = chunks.remainder().len();

    let mut intervals = Vec::with_capacity(bytes.len() / RECORD_SIZE);
    for (index, record) in chunks.enumerate() {
        let word = BigEndian::read_u32(record);
        let duration_us = word & MAX_RECORD_DURATION_US;
        if duration_us == 0 {
            return Err(ParseError::ZeroDuration { index });
        }
        let polarity = if word & POLARITY_BIT != 0 {
            Polarity::On
        } else {
            Polarity::Off
        };
        intervals.push(PulseInterval {
            duration_us,
            polarity,
        });
    }

    if remaining != 0 {
        return Err(ParseError::TruncatedRecord {
            offset: bytes.len() - remaining,
            remaining,
        });
    }

    if intervals.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(intervals)
}

fn decode_hex(lines: &[DataLine<'_>]) -> Result<Vec<u8>, ParseError> {
    let mut bytes = Vec::new();
    let mut index = 0;

    for line in lines {
        for token in line.content.split_whitespace() {
            let malformed = || ParseError::MalformedToken {
                index,
                line: line.number,
                token: token.to_string(),
            };

            if token.len() % 2 != 0 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(malformed());
            }

            for pair in token.as_bytes().chunks_exact(2) {
                let digits = std::str::from_utf8(pair).map_err(|_| malformed())?;
                let byte = u8::from_str_radix(digits, 16).map_err(|_| malformed())?;
                bytes.push(byte);
            }
            index += 1;
        }
    }

    Ok(bytes)
}

/// Encodes intervals as BinRAW record bytes.
///
/// Durations above [`MAX_RECORD_DURATION_US`] are saturated.
pub fn encode_records(intervals: &[PulseInterval]) -> Vec<u8> {
    let mut bytes = vec![0u8; intervals.len() * RECORD_SIZE];
    for (interval, record) in intervals.iter().zip(bytes.chunks_exact_mut(RECORD_SIZE)) {
        let mut word = interval.duration_us.min(MAX_RECORD_DURATION_US);
        if interval.is_on() {
            word |= POLARITY_BIT;
        }
        BigEndian::write_u32(record, word);
    }
    bytes
}

/// Formats record bytes as space-separated upper-case hex.
pub fn to_hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
