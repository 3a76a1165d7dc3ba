//! Tests for the timing parser.

use pretty_assertions::assert_eq;

use crate::error::ParseError;

use super::*;

const GARAGE_SUB: &str = "\
Filetype: Flipper SubGhz RAW File
Version: 1
Frequency: 433920000
Preset: FuriHalSubGhzPresetOok650Async
Protocol: RAW
RAW_Data: 350 -1050 350 -1050 1050 -350
RAW_Data: 350 -10500
";

// =========================================================================
// RAW decoding
// =========================================================================

#[test]
fn test_parse_raw_capture() {
    let capture = parse(GARAGE_SUB.as_bytes(), None).unwrap();

    assert_eq!(capture.protocol, Protocol::Raw);
    assert_eq!(capture.frequency_hz, Some(433_920_000));
    assert_eq!(capture.header("preset"), Some("FuriHalSubGhzPresetOok650Async"));
    assert_eq!(capture.headers.len(), 5);
    assert_eq!(
        capture.intervals,
        vec![
            PulseInterval::on(350),
            PulseInterval::off(1050),
            PulseInterval::on(350),
            PulseInterval::off(1050),
            PulseInterval::on(1050),
            PulseInterval::off(350),
            PulseInterval::on(350),
            PulseInterval::off(10500),
        ]
    );
}

#[test]
fn test_comments_are_stripped() {
    let input = "# captured at the gate\n# second comment\nProtocol: RAW\nRAW_Data: 100 -200\n";
    let intervals = parse_intervals(input.as_bytes(), None).unwrap();
    assert_eq!(intervals, vec![PulseInterval::on(100), PulseInterval::off(200)]);
}

#[test]
fn test_continuation_lines_without_marker() {
    let input = "Protocol: RAW\nRAW_Data: 100 -200\n300 -400\n\n500\n";
    let intervals = parse_intervals(input.as_bytes(), None).unwrap();
    assert_eq!(intervals.len(), 5);
    assert_eq!(intervals[4], PulseInterval::on(500));
}

#[test]
fn test_same_polarity_intervals_are_not_merged() {
    let input = "Protocol: RAW\nRAW_Data: 100 200 -50 -50\n";
    let intervals = parse_intervals(input.as_bytes(), None).unwrap();
    assert_eq!(
        intervals,
        vec![
            PulseInterval::on(100),
            PulseInterval::on(200),
            PulseInterval::off(50),
            PulseInterval::off(50),
        ]
    );
}

#[test]
fn test_declared_protocol_without_header() {
    let intervals = parse_intervals(b"100 -200 100", Some(Protocol::Raw)).unwrap();
    assert_eq!(
        intervals,
        vec![PulseInterval::on(100), PulseInterval::off(200), PulseInterval::on(100)]
    );
}

#[test]
fn test_protocol_value_is_case_insensitive() {
    let input = "protocol: raw\nRAW_Data: 5 -5\n";
    let capture = parse(input.as_bytes(), None).unwrap();
    assert_eq!(capture.protocol, Protocol::Raw);
}

#[test]
fn test_non_numeric_frequency_is_ignored() {
    let input = "Frequency: unknown\nProtocol: RAW\nRAW_Data: 5 -5\n";
    let capture = parse(input.as_bytes(), None).unwrap();
    assert_eq!(capture.frequency_hz, None);
}

// =========================================================================
// RAW errors
// =========================================================================

#[test]
fn test_malformed_token_position() {
    let err = parse_intervals(b"100 abc 200", Some(Protocol::Raw)).unwrap_err();
    assert_eq!(
        err,
        ParseError::MalformedToken {
            index: 1,
            line: 1,
            token: "abc".to_string(),
        }
    );
}

#[test]
fn test_malformed_token_on_later_line() {
    let input = "Protocol: RAW\nRAW_Data: 1 -2 3\nRAW_Data: -4 5x\n";
    let err = parse_intervals(input.as_bytes(), None).unwrap_err();
    assert_eq!(
        err,
        ParseError::MalformedToken {
            index: 4,
            line: 3,
            token: "5x".to_string(),
        }
    );
}

#[test]
fn test_oversized_token_is_malformed() {
    let err = parse_intervals(b"100 -99999999999", Some(Protocol::Raw)).unwrap_err();
    assert!(matches!(err, ParseError::MalformedToken { index: 1, .. }));
}

#[test]
fn test_zero_duration_rejected() {
    let err = parse_intervals(b"100 0 -100", Some(Protocol::Raw)).unwrap_err();
    assert_eq!(err, ParseError::ZeroDuration { index: 1 });
}

#[test]
fn test_empty_data_section() {
    let err = parse_intervals(b"Protocol: RAW\nRAW_Data:\n", None).unwrap_err();
    assert_eq!(err, ParseError::Empty);

    let err = parse_intervals(b"Protocol: RAW\n", None).unwrap_err();
    assert_eq!(err, ParseError::Empty);
}

#[test]
fn test_unknown_protocol() {
    let input = "Protocol: Princeton\nKey: 00 00 00 00 00 95 D5 D4\n";
    let err = parse(input.as_bytes(), None).unwrap_err();
    assert_eq!(err, ParseError::UnknownProtocol(Some("Princeton".to_string())));
}

#[test]
fn test_missing_protocol_header() {
    let err = parse(b"# only a comment\n100 -100\n", None).unwrap_err();
    assert_eq!(err, ParseError::UnknownProtocol(None));
}

// =========================================================================
// BinRAW
// =========================================================================

#[test]
fn test_parse_binraw() {
    // On 350, Off 1050, On 1
    let input = "Protocol: BinRAW\nData_RAW: 80 00 01 5E 00 00 04 1A\nData_RAW: 80000001\n";
    let capture = parse(input.as_bytes(), None).unwrap();
    assert_eq!(capture.protocol, Protocol::BinRaw);
    assert_eq!(
        capture.intervals,
        vec![PulseInterval::on(350), PulseInterval::off(1050), PulseInterval::on(1)]
    );
}

#[test]
fn test_binraw_truncated_record() {
    let input = "Protocol: BinRAW\nData_RAW: 80 00 01 5E 00 00\n";
    let err = parse(input.as_bytes(), None).unwrap_err();
    assert_eq!(
        err,
        ParseError::TruncatedRecord {
            offset: 4,
            remaining: 2,
        }
    );
}

#[test]
fn test_binraw_zero_record() {
    let input = "Protocol: BinRAW\nData_RAW: 80 00 00 10 80 00 00 00\n";
    let err = parse(input.as_bytes(), None).unwrap_err();
    assert_eq!(err, ParseError::ZeroDuration { index: 1 });
}

#[test]
fn test_binraw_bad_hex() {
    let input = "Protocol: BinRAW\nData_RAW: 80 0G\n";
    let err = parse(input.as_bytes(), None).unwrap_err();
    assert!(matches!(err, ParseError::MalformedToken { index: 1, line: 2, .. }));

    let input = "Protocol: BinRAW\nData_RAW: 800\n";
    let err = parse(input.as_bytes(), None).unwrap_err();
    assert!(matches!(err, ParseError::MalformedToken { index: 0, .. }));
}

#[test]
fn test_binraw_records_round_trip() {
    let intervals = vec![
        PulseInterval::on(350),
        PulseInterval::off(70_000),
        PulseInterval::on(MAX_RECORD_DURATION_US),
    ];
    let bytes = encode_binraw_records(&intervals);
    assert_eq!(bytes.len(), intervals.len() * RECORD_SIZE);

    let text = format!("Protocol: BinRAW\nData_RAW: {}\n", to_hex_bytes(&bytes));
    assert_eq!(parse_intervals(text.as_bytes(), None).unwrap(), intervals);
}

// =========================================================================
// Serialization
// =========================================================================

#[test]
fn test_to_raw_tokens() {
    let intervals = parse_intervals(GARAGE_SUB.as_bytes(), None).unwrap();
    assert_eq!(
        to_raw_tokens(&intervals),
        "350 -1050 350 -1050 1050 -350 350 -10500"
    );
}
