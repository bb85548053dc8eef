//! In-memory scripted source
//!
//! Plays back a fixed list of batches, one batch per open, and remembers the
//! resume point every open was called with.

use super::{LogHandle, LogSource, ReadOutcome};
use crate::types::{DecoderError, Result, Timestamp};
use std::collections::VecDeque;

/// What a single `open` call does
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedOpen {
    /// Open succeeds and the handle yields these outcomes, then `Exhausted`
    Batch(Vec<ReadOutcome>),
    /// Open fails
    Fail,
}

/// Source that plays back scripted batches
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    script: VecDeque<ScriptedOpen>,
    opens: Vec<Option<Timestamp>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: queue a batch for the next open
    pub fn with_batch(mut self, outcomes: Vec<ReadOutcome>) -> Self {
        self.script.push_back(ScriptedOpen::Batch(outcomes));
        self
    }

    /// Builder method: make the next open fail
    pub fn with_failed_open(mut self) -> Self {
        self.script.push_back(ScriptedOpen::Fail);
        self
    }

    /// Resume point passed to every open so far, in order
    pub fn opens(&self) -> &[Option<Timestamp>] {
        &self.opens
    }

    /// Whether every scripted open has been consumed
    pub fn is_drained(&self) -> bool {
        self.script.is_empty()
    }
}

impl LogSource for MemorySource {
    type Handle = MemoryHandle;

    /// Once the script runs out every open yields an empty batch
    fn open(&mut self, resume_from: Option<Timestamp>) -> Result<MemoryHandle> {
        self.opens.push(resume_from);
        match self.script.pop_front() {
            Some(ScriptedOpen::Batch(outcomes)) => Ok(MemoryHandle {
                outcomes: outcomes.into(),
            }),
            Some(ScriptedOpen::Fail) => Err(DecoderError::SourceUnavailable(
                "scripted open failure".to_string(),
            )),
            None => Ok(MemoryHandle {
                outcomes: VecDeque::new(),
            }),
        }
    }
}

/// Handle over one scripted batch
#[derive(Debug)]
pub struct MemoryHandle {
    outcomes: VecDeque<ReadOutcome>,
}

impl LogHandle for MemoryHandle {
    fn next_record(&mut self) -> ReadOutcome {
        self.outcomes.pop_front().unwrap_or(ReadOutcome::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{timestamp_from_parts, LogRecord};

    #[test]
    fn test_scripted_batches() {
        let ts = timestamp_from_parts(1, 0).unwrap();
        let mut source = MemorySource::new()
            .with_batch(vec![ReadOutcome::Record(LogRecord::new(ts, "a", "1"))])
            .with_failed_open();

        let mut handle = source.open(None).unwrap();
        assert!(matches!(handle.next_record(), ReadOutcome::Record(_)));
        assert_eq!(handle.next_record(), ReadOutcome::Exhausted);

        assert!(source.open(Some(ts)).is_err());
        assert!(source.is_drained());
        assert_eq!(source.opens(), &[None, Some(ts)]);
    }
}
