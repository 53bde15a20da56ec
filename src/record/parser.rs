//! Line-to-record parsing.
//!
//! Device lines look like `b"D1 D2 .. Dn\n\r"`. Parsing never fails: a line
//! that is not valid UTF-8 turns into the timestamp-only record, which the
//! acquisition loop treats the same as a read timeout.

use super::Record;

/// Fractional digits kept in the timestamp.
const TIMESTAMP_PRECISION: usize = 2;

/// Current wall-clock time as fractional seconds since the Unix epoch.
pub fn capture_time() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Render `capture_time` with exactly two fractional digits, truncating.
///
/// `1000.0` becomes `"1000.00"` and `1700000000.129` becomes
/// `"1700000000.12"`. Digits are cut from the shortest decimal form of the
/// float, so nothing is ever rounded up into the kept digits.
pub fn format_timestamp(capture_time: f64) -> String {
    let value = if capture_time.is_finite() {
        capture_time.max(0.0)
    } else {
        0.0
    };
    let text = value.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let mut fraction: String = fraction.chars().take(TIMESTAMP_PRECISION).collect();
    while fraction.len() < TIMESTAMP_PRECISION {
        fraction.push('0');
    }
    format!("{}.{}", whole, fraction)
}

/// Turn one raw line into a timestamped record.
///
/// Tokens are split on runs of whitespace, which also drops the `\n\r`
/// terminator. Token contents are not inspected.
pub fn parse_line(raw_line: &[u8], capture_time: f64) -> Record {
    let timestamp = format_timestamp(capture_time);
    match std::str::from_utf8(raw_line) {
        Ok(text) => Record::new(timestamp, text.split_whitespace()),
        Err(_) => Record::timestamp_only(timestamp),
    }
}
