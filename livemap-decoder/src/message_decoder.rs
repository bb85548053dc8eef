//! Line and payload decoding
//!
//! Turns raw text lines from the log tool into `LogRecord`s and extracts the
//! numeric value carried in a record's message. Both operations are best effort:
//! a line that does not decode is skipped, a payload that does not decode is zero.

use crate::types::{timestamp_from_parts, LogPriority, LogRecord};

/// Decoder for `logcat -v epoch` lines and numeric payloads
pub struct MessageDecoder;

impl MessageDecoder {
    /// Decode one line in `logcat -v epoch` format
    ///
    /// Expected layout: `<sec>.<frac> <pid> <tid> <P> <tag>: <message>`.
    ///
    /// # Returns
    /// * `Some(LogRecord)` if the line carries a record
    /// * `None` for banner lines (`--------- beginning of main`), blank lines and garbage
    pub fn decode_line(line: &str) -> Option<LogRecord> {
        let line = line.trim_end_matches(['\r', '\n']);
        let rest = line.trim_start();

        let (time_field, rest) = split_field(rest)?;
        let timestamp = Self::decode_epoch(time_field)?;

        let (pid_field, rest) = split_field(rest)?;
        let pid = pid_field.parse::<u32>().ok()?;

        let (tid_field, rest) = split_field(rest)?;
        let tid = tid_field.parse::<u32>().ok()?;

        let (priority_field, rest) = split_field(rest)?;
        let mut letters = priority_field.chars();
        let priority = match (letters.next(), letters.next()) {
            (Some(letter), None) => LogPriority::from_letter(letter),
            _ => return None,
        };

        // Tag runs up to the first ": " (or a trailing ':' when the message is empty)
        let (tag, message) = match rest.find(": ") {
            Some(idx) => (&rest[..idx], &rest[idx + 2..]),
            None => (rest.strip_suffix(':')?, ""),
        };
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }

        Some(LogRecord {
            timestamp,
            pid,
            tid,
            priority,
            tag: tag.to_string(),
            message: message.to_string(),
        })
    }

    /// Decode an epoch time field such as `1600000000.123` or `1600000000.123456789`
    fn decode_epoch(field: &str) -> Option<crate::types::Timestamp> {
        let (secs, frac) = match field.split_once('.') {
            Some((secs, frac)) => (secs, frac),
            None => (field, ""),
        };
        if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let secs = secs.parse::<i64>().ok()?;
        let nsecs = if frac.is_empty() {
            0
        } else {
            // Right-pad to nanoseconds: ".123" is 123_000_000 ns
            let scale = 10u32.pow(9 - frac.len() as u32);
            frac.parse::<u32>().ok()? * scale
        };

        timestamp_from_parts(secs, nsecs)
    }

    /// Extract the integer carried in a message, the way C `atoi` reads it
    ///
    /// Leading whitespace is skipped, an optional sign is accepted, then the longest
    /// run of decimal digits is read. Anything else yields 0. Values outside the
    /// `i32` range saturate instead of wrapping.
    pub fn payload_value(message: &str) -> i32 {
        let text = message.trim_start();
        let (negative, digits) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let mut value: i64 = 0;
        for byte in digits.bytes() {
            if !byte.is_ascii_digit() {
                break;
            }
            value = value * 10 + i64::from(byte - b'0');
            if value > i64::from(i32::MAX) + 1 {
                break;
            }
        }

        let value = if negative { -value } else { value };
        value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    /// Payload value as the `f32` the snapshot stores
    pub fn payload_f32(message: &str) -> f32 {
        Self::payload_value(message) as f32
    }
}

/// Split off the next whitespace-delimited field, returning it and the remainder
/// with leading whitespace removed
fn split_field(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    match text.find(char::is_whitespace) {
        Some(idx) => Some((&text[..idx], text[idx..].trim_start())),
        None => Some((text, "")),
    }
}
