//! logcat source
//!
//! Runs the platform `logcat` tool in dump mode for every open. Dump mode prints
//! what is buffered and exits, which gives the non-blocking batch semantics the
//! run loop expects without holding a reader open on the log device.
//!
//! ## Invocation
//! - First open: `logcat -v epoch -b main -t 1` (only the newest line, i.e. the current end)
//! - Resume: `logcat -v epoch -b main -t <sec>.<nsec>` (everything since the last record)
//!
//! A non-zero exit status or a read error makes the handle `Invalid`.

use super::{is_after, End, LogHandle, LogSource, ReadOutcome};
use crate::config::LogcatConfig;
use crate::message_decoder::MessageDecoder;
use crate::types::{DecoderError, Result, Timestamp};
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};

/// Source backed by the `logcat` command
#[derive(Debug, Clone, Default)]
pub struct LogcatSource {
    config: LogcatConfig,
}

impl LogcatSource {
    pub fn new(config: LogcatConfig) -> Self {
        Self { config }
    }

    /// Arguments for one dump, positioned after `resume_from`
    pub fn args(&self, resume_from: Option<&Timestamp>) -> Vec<String> {
        let mut args = vec!["-v".to_string(), "epoch".to_string()];
        for buffer in &self.config.buffers {
            args.push("-b".to_string());
            args.push(buffer.clone());
        }
        args.push("-t".to_string());
        args.push(match resume_from {
            Some(ts) => format!("{}.{:09}", ts.timestamp(), ts.timestamp_subsec_nanos()),
            None => "1".to_string(),
        });
        args
    }
}

impl LogSource for LogcatSource {
    type Handle = LogcatHandle;

    fn open(&mut self, resume_from: Option<Timestamp>) -> Result<LogcatHandle> {
        let args = self.args(resume_from.as_ref());
        log::debug!("Running {:?} {}", self.config.binary, args.join(" "));

        let mut child = Command::new(&self.config.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                DecoderError::SourceUnavailable(format!(
                    "Failed to start {:?}: {}",
                    self.config.binary, e
                ))
            })?;

        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(DecoderError::CommandFailed(
                    "logcat stdout was not captured".to_string(),
                ));
            }
        };

        Ok(LogcatHandle {
            child,
            reader: BufReader::new(stdout),
            resume_from,
            buf: Vec::new(),
            end: None,
        })
    }
}

/// One running logcat dump
pub struct LogcatHandle {
    child: Child,
    reader: BufReader<ChildStdout>,
    resume_from: Option<Timestamp>,
    buf: Vec<u8>,
    end: Option<End>,
}

impl LogcatHandle {
    fn finish(&mut self) -> End {
        match self.child.wait() {
            Ok(status) if status.success() => End::Exhausted,
            Ok(status) => {
                log::debug!("logcat exited with {}", status);
                End::Invalid
            }
            Err(e) => {
                log::debug!("Failed to reap logcat: {}", e);
                End::Invalid
            }
        }
    }
}

impl LogHandle for LogcatHandle {
    fn next_record(&mut self) -> ReadOutcome {
        loop {
            if let Some(end) = self.end {
                return end.into();
            }

            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.end = Some(self.finish());
                }
                Ok(_) => {
                    let line = String::from_utf8_lossy(&self.buf);
                    if let Some(record) = MessageDecoder::decode_line(&line) {
                        if is_after(&record, self.resume_from.as_ref()) {
                            return ReadOutcome::Record(record);
                        }
                    }
                }
                Err(e) => {
                    log::debug!("Failed to read logcat output: {}", e);
                    self.end = Some(End::Invalid);
                }
            }
        }
    }
}

impl Drop for LogcatHandle {
    fn drop(&mut self) {
        if self.end.is_none() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::timestamp_from_parts;

    #[test]
    fn test_args_first_open() {
        let source = LogcatSource::default();
        assert_eq!(source.args(None), vec!["-v", "epoch", "-b", "main", "-t", "1"]);
    }

    #[test]
    fn test_args_resume() {
        let source = LogcatSource::new(
            LogcatConfig::default().with_buffers(vec!["main".to_string(), "system".to_string()]),
        );
        let ts = timestamp_from_parts(1_600_000_000, 42).unwrap();
        assert_eq!(
            source.args(Some(&ts)),
            vec!["-v", "epoch", "-b", "main", "-b", "system", "-t", "1600000000.000000042"]
        );
    }

    #[test]
    fn test_missing_binary_is_open_error() {
        let mut source = LogcatSource::new(
            LogcatConfig::default().with_binary("/nonexistent/bin/logcat-livemap-test"),
        );
        assert!(matches!(
            source.open(None),
            Err(DecoderError::SourceUnavailable(_))
        ));
    }

    #[cfg(unix)]
    fn fake_logcat(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("logcat");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_dump_yields_records_then_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_logcat(
            dir.path(),
            "echo '--------- beginning of main'\n\
             echo '1600000000.100  10  11 I opkrspdlimit: 80'\n\
             echo '1600000000.200  10  11 I opkrspddist: 45'",
        );
        let mut source = LogcatSource::new(LogcatConfig::default().with_binary(binary));
        let mut handle = source.open(None).unwrap();

        let mut tags = Vec::new();
        while let ReadOutcome::Record(record) = handle.next_record() {
            tags.push(record.tag);
        }
        assert_eq!(tags, vec!["opkrspdlimit", "opkrspddist"]);
        assert_eq!(handle.next_record(), ReadOutcome::Exhausted);
    }

    #[cfg(unix)]
    #[test]
    fn test_resume_skips_records_at_resume_point() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_logcat(
            dir.path(),
            "echo '1600000000.100  10  11 I opkrspdlimit: 80'\n\
             echo '1600000000.200  10  11 I opkrspddist: 45'",
        );
        let mut source = LogcatSource::new(LogcatConfig::default().with_binary(binary));
        let resume = timestamp_from_parts(1_600_000_000, 100_000_000).unwrap();
        let mut handle = source.open(Some(resume)).unwrap();

        match handle.next_record() {
            ReadOutcome::Record(record) => assert_eq!(record.tag, "opkrspddist"),
            other => panic!("expected record, got {:?}", other),
        }
        assert_eq!(handle.next_record(), ReadOutcome::Exhausted);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_dump_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_logcat(
            dir.path(),
            "echo '1600000000.100  10  11 I opkrspdlimit: 80'\nexit 1",
        );
        let mut source = LogcatSource::new(LogcatConfig::default().with_binary(binary));
        let mut handle = source.open(None).unwrap();

        assert!(matches!(handle.next_record(), ReadOutcome::Record(_)));
        assert_eq!(handle.next_record(), ReadOutcome::Invalid);
        assert_eq!(handle.next_record(), ReadOutcome::Invalid);
    }
}
