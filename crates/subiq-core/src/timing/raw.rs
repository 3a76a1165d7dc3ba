//! RAW protocol: signed decimal tokens separated by whitespace.

use crate::error::ParseError;

use super::capture::DataLine;
use super::interval::PulseInterval;

/// Decodes RAW data lines into intervals.
pub(super) fn decode(lines: &[DataLine<'_>]) -> Result<Vec<PulseInterval>, ParseError> {
    let mut intervals = Vec::new();
    let mut index = 0;

    for line in lines {
        for token in line.content.split_whitespace() {
            let value: i64 = token.parse().map_err(|_| ParseError::MalformedToken {
                index,
                line: line.number,
                token: token.to_string(),
            })?;

            if value == 0 {
                return Err(ParseError::ZeroDuration { index });
            }

            let interval =
                PulseInterval::from_signed(value).ok_or_else(|| ParseError::MalformedToken {
                    index,
                    line: line.number,
                    token: token.to_string(),
                })?;

            intervals.push(interval);
            index += 1;
        }
    }

    if intervals.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(intervals)
}

/// Serializes intervals back to RAW tokens separated by single spaces.
pub fn to_raw_tokens(intervals: &[PulseInterval]) -> String {
    intervals
        .iter()
        .map(|interval| interval.signed_us().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
