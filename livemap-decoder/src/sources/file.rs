//! Replay file source
//!
//! Reads records from a text file in `logcat -v epoch` format. Every open starts
//! from the beginning of the file and skips records at or before the resume
//! point, so a file that another process appends to is followed across reopens.

use super::{is_after, End, LogHandle, LogSource, ReadOutcome};
use crate::message_decoder::MessageDecoder;
use crate::types::{DecoderError, Result, Timestamp};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Source backed by a text file
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSource for FileSource {
    type Handle = FileHandle;

    fn open(&mut self, resume_from: Option<Timestamp>) -> Result<FileHandle> {
        log::debug!("Opening replay file {:?} (resume from {:?})", self.path, resume_from);

        let file = File::open(&self.path).map_err(|e| {
            DecoderError::SourceUnavailable(format!("Failed to open {:?}: {}", self.path, e))
        })?;

        Ok(FileHandle {
            reader: BufReader::new(file),
            resume_from,
            buf: Vec::new(),
            end: None,
        })
    }
}

/// Read position in a replay file
pub struct FileHandle {
    reader: BufReader<File>,
    resume_from: Option<Timestamp>,
    buf: Vec<u8>,
    end: Option<End>,
}

impl LogHandle for FileHandle {
    fn next_record(&mut self) -> ReadOutcome {
        loop {
            if let Some(end) = self.end {
                return end.into();
            }

            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.end = Some(End::Exhausted),
                Ok(_) => {
                    let line = String::from_utf8_lossy(&self.buf);
                    if let Some(record) = MessageDecoder::decode_line(&line) {
                        if is_after(&record, self.resume_from.as_ref()) {
                            return ReadOutcome::Record(record);
                        }
                    }
                }
                Err(e) => {
                    log::debug!("Failed to read replay file: {}", e);
                    self.end = Some(End::Invalid);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const REPLAY: &str = "\
--------- beginning of main
1600000000.100  10  11 I opkrspdlimit: 80
garbage line
1600000000.200  10  11 I opkrspddist: 45
";

    fn collect_tags(handle: &mut FileHandle) -> Vec<String> {
        let mut tags = Vec::new();
        while let ReadOutcome::Record(record) = handle.next_record() {
            tags.push(record.tag);
        }
        tags
    }

    #[test]
    fn test_file_not_found() {
        let mut source = FileSource::new("nonexistent-livemap-replay.log");
        assert!(matches!(
            source.open(None),
            Err(DecoderError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn test_replay_from_start() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(REPLAY.as_bytes()).unwrap();

        let mut source = FileSource::new(file.path());
        let mut handle = source.open(None).unwrap();

        assert_eq!(collect_tags(&mut handle), vec!["opkrspdlimit", "opkrspddist"]);
        assert_eq!(handle.next_record(), ReadOutcome::Exhausted);
    }

    #[test]
    fn test_reopen_follows_appended_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(REPLAY.as_bytes()).unwrap();
        let mut source = FileSource::new(file.path());

        let mut last = None;
        let mut handle = source.open(None).unwrap();
        while let ReadOutcome::Record(record) = handle.next_record() {
            last = Some(record.timestamp);
        }
        drop(handle);

        writeln!(file, "1600000000.300  10  11 I opkrsigntype: 124").unwrap();
        file.flush().unwrap();

        let mut handle = source.open(last).unwrap();
        assert_eq!(collect_tags(&mut handle), vec!["opkrsigntype"]);
    }

    #[test]
    fn test_non_utf8_line_is_skipped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\xff\xfe\xfd\n").unwrap();
        file.write_all(b"1600000000.100  10  11 I opkrspdlimit: 30\n").unwrap();

        let mut source = FileSource::new(file.path());
        let mut handle = source.open(None).unwrap();
        assert_eq!(collect_tags(&mut handle), vec!["opkrspdlimit"]);
    }
}
