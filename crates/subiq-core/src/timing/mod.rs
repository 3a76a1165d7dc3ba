//! Timing parser for pulse-timing captures.
//!
//! A capture is a text file made of optional `#` comments, `Key: value`
//! header lines and a data section. The `Protocol:` header selects how the
//! data section is decoded:
//!
//! - `RAW` - signed decimal microsecond tokens (`RAW_Data: 350 -1050 ...`)
//! - `BinRAW` - hex-encoded 4-byte records (`Data_RAW: 80 00 01 5E ...`)
//!
//! Positive durations (or a set polarity bit) mean carrier on, negative
//! durations carrier off. Intervals are never merged or reordered.

mod binraw;
mod capture;
mod interval;
mod raw;

#[cfg(test)]
mod tests;

pub use binraw::{
    encode_records as encode_binraw_records, to_hex_bytes, MAX_RECORD_DURATION_US, RECORD_SIZE,
};
pub use capture::{
    parse, parse_intervals, Capture, Protocol, BINRAW_DATA_MARKER, COMMENT_MARKER,
    RAW_DATA_MARKER,
};
pub use interval::{IntervalStats, Polarity, PulseInterval};
pub use raw::to_raw_tokens;
