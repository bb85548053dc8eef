//! Log sources (logcat, replay file, in-memory)
//!
//! A source hands out short-lived handles. Each handle yields the records
//! currently available and then reports `Exhausted`; it never waits for new
//! records. A handle that can no longer be read reports `Invalid` and the
//! caller opens a fresh one from the last record it saw.

use crate::types::{LogRecord, Result, Timestamp};

pub mod file;
pub mod logcat;
pub mod memory;

// Re-export source types
pub use file::{FileHandle, FileSource};
pub use logcat::{LogcatHandle, LogcatSource};
pub use memory::{MemoryHandle, MemorySource, ScriptedOpen};

/// Result of polling a handle for the next record
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// A decoded record
    Record(LogRecord),
    /// Nothing more is available right now
    Exhausted,
    /// The handle is unusable and must be reopened
    Invalid,
}

/// Common trait for everything the daemon can read log records from
pub trait LogSource {
    type Handle: LogHandle;

    /// Open a handle positioned after `resume_from`
    ///
    /// `None` means no record has been read yet.
    fn open(&mut self, resume_from: Option<Timestamp>) -> Result<Self::Handle>;
}

/// An open, non-blocking read position in a log stream
pub trait LogHandle {
    fn next_record(&mut self) -> ReadOutcome;
}

/// Whether a record lies strictly after the resume point
///
/// Time filters of the log tool are inclusive, so the record the resume point
/// came from would otherwise be delivered twice.
pub(crate) fn is_after(record: &LogRecord, resume_from: Option<&Timestamp>) -> bool {
    match resume_from {
        Some(ts) => record.timestamp > *ts,
        None => true,
    }
}

/// Handles terminate once; later polls repeat the terminal outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum End {
    Exhausted,
    Invalid,
}

impl From<End> for ReadOutcome {
    fn from(end: End) -> Self {
        match end {
            End::Exhausted => ReadOutcome::Exhausted,
            End::Invalid => ReadOutcome::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::timestamp_from_parts;

    #[test]
    fn test_is_after_is_strict() {
        let ts = timestamp_from_parts(100, 0).unwrap();
        let same = LogRecord::new(ts, "tag", "");
        let later = LogRecord::new(timestamp_from_parts(100, 1).unwrap(), "tag", "");

        assert!(!is_after(&same, Some(&ts)));
        assert!(is_after(&later, Some(&ts)));
        assert!(is_after(&same, None));
    }
}
