//! Core types for the live map decoder library
//!
//! This module defines the fundamental values that flow through the daemon: log records
//! as read from the system log, their priority, and the library error type.

use chrono::{DateTime, Utc};
use std::fmt;

/// Timestamp type used throughout the decoder
pub type Timestamp = DateTime<Utc>;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Build a timestamp from a seconds / nanoseconds pair as stored by the system log
pub fn timestamp_from_parts(secs: i64, nsecs: u32) -> Option<Timestamp> {
    DateTime::from_timestamp(secs, nsecs)
}

/// Nanoseconds since the Unix epoch, saturating at the `i64` range
pub fn timestamp_nanos(ts: &Timestamp) -> i64 {
    ts.timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Android log priority letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogPriority {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Silent,
    /// Any letter the log tool emits that is not in the known set
    Unknown,
}

impl LogPriority {
    /// Map a logcat priority letter to a priority
    pub fn from_letter(letter: char) -> Self {
        match letter {
            'V' => LogPriority::Verbose,
            'D' => LogPriority::Debug,
            'I' => LogPriority::Info,
            'W' => LogPriority::Warn,
            'E' => LogPriority::Error,
            'F' | 'A' => LogPriority::Fatal,
            'S' => LogPriority::Silent,
            _ => LogPriority::Unknown,
        }
    }

    /// The letter logcat prints for this priority
    pub fn letter(&self) -> char {
        match self {
            LogPriority::Verbose => 'V',
            LogPriority::Debug => 'D',
            LogPriority::Info => 'I',
            LogPriority::Warn => 'W',
            LogPriority::Error => 'E',
            LogPriority::Fatal => 'F',
            LogPriority::Silent => 'S',
            LogPriority::Unknown => '?',
        }
    }
}

impl fmt::Display for LogPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A single decoded entry from the system log stream
///
/// Records are produced by a log source, consumed once by the signal engine,
/// and never retained.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Time the entry was written to the log
    pub timestamp: Timestamp,
    /// Writer process ID
    pub pid: u32,
    /// Writer thread ID
    pub tid: u32,
    /// Entry priority
    pub priority: LogPriority,
    /// Log tag, e.g. "opkrspdlimit"
    pub tag: String,
    /// Free-text payload
    pub message: String,
}

impl LogRecord {
    /// Create a record with only the fields the engine looks at
    pub fn new(timestamp: Timestamp, tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            pid: 0,
            tid: 0,
            priority: LogPriority::Info,
            tag: tag.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:09} {:>5} {:>5} {} {}: {}",
            self.timestamp.timestamp(),
            self.timestamp.timestamp_subsec_nanos(),
            self.pid,
            self.tid,
            self.priority,
            self.tag,
            self.message
        )
    }
}

/// Errors that can occur while reading, decoding or republishing log signals
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Log source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Failed to run log command: {0}")]
    CommandFailed(String),

    #[error("Parameter store error for key {key}: {source}")]
    ParamStore {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to publish on {topic}: {reason}")]
    PublishFailed { topic: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
