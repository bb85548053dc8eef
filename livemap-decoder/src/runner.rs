//! Read loop
//!
//! The runner owns the lifetime of log source handles. The outer loop opens a
//! handle from the last record's timestamp, the inner loop drains it through the
//! engine and publishes one event per record, then the handle is dropped and the
//! loop pauses before reopening. Shutdown is checked before every record and at
//! the top of every outer iteration.

use crate::config::RunnerConfig;
use crate::engine::SignalEngine;
use crate::message::PublishedEvent;
use crate::params::ParamStore;
use crate::publish::Publisher;
use crate::sources::{LogHandle, LogSource, ReadOutcome};
use crate::types::{Result, Timestamp};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest single sleep while waiting, so shutdown is noticed promptly
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Cooperative shutdown flag shared with signal handlers
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless shutdown is requested first
    ///
    /// Returns false if the sleep was cut short.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_requested() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

/// Counters kept over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Records fed through the engine
    pub records: u64,
    /// Events accepted by the publisher
    pub published: u64,
    /// Events the publisher rejected
    pub publish_failures: u64,
    /// Successful source opens
    pub opens: u64,
    /// Handles that reported `Invalid`
    pub invalidations: u64,
    /// Reopen attempts that failed
    pub failed_opens: u64,
}

/// Drives a log source through the engine into a publisher
pub struct Runner {
    config: RunnerConfig,
    shutdown: Shutdown,
    max_records: Option<u64>,
    resume_from: Option<Timestamp>,
    stats: RunStats,
}

impl Runner {
    pub fn new(config: RunnerConfig, shutdown: Shutdown) -> Self {
        Self {
            config,
            shutdown,
            max_records: None,
            resume_from: None,
            stats: RunStats::default(),
        }
    }

    /// Builder method: stop after this many records
    pub fn with_max_records(mut self, max_records: Option<u64>) -> Self {
        self.max_records = max_records;
        self
    }

    /// Timestamp of the last record read, where the next open resumes
    pub fn resume_from(&self) -> Option<Timestamp> {
        self.resume_from
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    fn should_stop(&self) -> bool {
        self.shutdown.is_requested()
            || self
                .max_records
                .is_some_and(|max| self.stats.records >= max)
    }

    /// Run until shutdown is requested (or the record limit is reached)
    ///
    /// # Returns
    /// * `Ok(RunStats)` on shutdown
    /// * `Err` only if the very first open fails
    pub fn run<S, P, B>(
        &mut self,
        source: &mut S,
        engine: &mut SignalEngine,
        params: &mut P,
        publisher: &mut B,
    ) -> Result<RunStats>
    where
        S: LogSource,
        P: ParamStore + ?Sized,
        B: Publisher + ?Sized,
    {
        let pause = self.config.pause();
        let max_backoff = self.config.max_backoff();
        let mut backoff = pause;

        while !self.should_stop() {
            let mut handle = match source.open(self.resume_from) {
                Ok(handle) => {
                    self.stats.opens += 1;
                    backoff = pause;
                    handle
                }
                Err(e) if self.stats.opens == 0 => {
                    log::error!("Cannot open log source: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    self.stats.failed_opens += 1;
                    log::warn!("Failed to reopen log source ({}), retrying in {:?}", e, backoff);
                    self.shutdown.sleep(backoff);
                    backoff = (backoff * 2).min(max_backoff);
                    continue;
                }
            };
            log::debug!("Log source opened (resume from {:?})", self.resume_from);

            self.drain(&mut handle, engine, params, publisher);
            drop(handle);

            if self.should_stop() {
                break;
            }
            self.shutdown.sleep(pause);
        }

        let stats = self.stats;
        log::info!(
            "Stopped: {} records, {} events published ({} failed), {} opens, {} invalidations, {} failed reopens",
            stats.records,
            stats.published,
            stats.publish_failures,
            stats.opens,
            stats.invalidations,
            stats.failed_opens
        );
        Ok(stats)
    }

    /// Feed every currently available record through the engine
    fn drain<H, P, B>(
        &mut self,
        handle: &mut H,
        engine: &mut SignalEngine,
        params: &mut P,
        publisher: &mut B,
    ) where
        H: LogHandle,
        P: ParamStore + ?Sized,
        B: Publisher + ?Sized,
    {
        while !self.should_stop() {
            match handle.next_record() {
                ReadOutcome::Record(record) => {
                    self.resume_from = Some(record.timestamp);
                    self.stats.records += 1;

                    let data = engine.process(&record, params);
                    let event = PublishedEvent::new(&record.timestamp, data);
                    match publisher.publish(&self.config.topic, &event) {
                        Ok(()) => self.stats.published += 1,
                        Err(e) => {
                            self.stats.publish_failures += 1;
                            log::debug!("Dropped event: {}", e);
                        }
                    }
                }
                ReadOutcome::Exhausted => {
                    log::trace!("Log source exhausted");
                    break;
                }
                ReadOutcome::Invalid => {
                    self.stats.invalidations += 1;
                    log::debug!(
                        "Log source invalidated, reopening from {:?}",
                        self.resume_from
                    );
                    break;
                }
            }
        }
    }
}
