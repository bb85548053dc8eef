//! Live Map Decoder Library
//!
//! A small library that turns the device's free-text system log into structured
//! live map events for the driving-assistance stack.
//!
//! # Architecture
//!
//! - Log sources open short-lived, non-blocking handles on the log stream and
//!   decode text lines into records
//! - The signal engine extracts speed-limit, road-sign, turn and map flags from
//!   tagged records and ages stale evidence on a heartbeat tag
//! - Publishers send one event per processed record on a named topic
//! - The runner owns the open / drain / pause / reopen cycle and cancellation
//!
//! The library does NOT:
//! - Parse arbitrary log formats
//! - Guarantee delivery of published events
//! - Install signal handlers or configure logging (that is the binary's job)
//!
//! # Example Usage
//!
//! ```no_run
//! use livemap_decoder::{
//!     EngineConfig, FileParams, JsonLinesPublisher, LogcatConfig, LogcatSource, Runner,
//!     RunnerConfig, Shutdown, SignalEngine,
//! };
//!
//! let shutdown = Shutdown::new();
//! let mut source = LogcatSource::new(LogcatConfig::default());
//! let mut engine = SignalEngine::new(EngineConfig::default());
//! let mut params = FileParams::default();
//! let mut publisher = JsonLinesPublisher::stdout();
//!
//! let mut runner = Runner::new(RunnerConfig::default(), shutdown.clone());
//! let stats = runner
//!     .run(&mut source, &mut engine, &mut params, &mut publisher)
//!     .unwrap();
//! println!("processed {} records", stats.records);
//! ```

// Public modules
pub mod config;
pub mod engine;
pub mod message;
pub mod params;
pub mod publish;
pub mod runner;
pub mod signals;
pub mod sources;
pub mod types;

// Re-export main types for convenience
pub use config::{EngineConfig, LogcatConfig, ParamKeys, RunnerConfig, TagTable};
pub use engine::SignalEngine;
pub use message::{LiveMapData, PublishedEvent};
pub use message_decoder::MessageDecoder;
pub use params::{FileParams, MemoryParams, ParamStore, DEFAULT_PARAMS_DIR};
pub use publish::{JsonLinesPublisher, MemoryPublisher, Publisher, UdpPublisher};
pub use runner::{RunStats, Runner, Shutdown};
pub use signals::{DebounceCounters, KnownTag, SignalSnapshot};
pub use sources::{FileSource, LogHandle, LogSource, LogcatSource, MemorySource, ReadOutcome};
pub use types::{DecoderError, LogPriority, LogRecord, Result, Timestamp};

// Internal modules
mod message_decoder;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
