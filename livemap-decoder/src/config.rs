//! Decoder configuration types
//!
//! This module defines the configuration needed by the library: which log tags carry
//! which signal, which parameter keys the engine reads and writes, how the run loop
//! paces itself, and how the logcat tool is invoked. All values default to the
//! on-device deployment so an empty TOML section is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the signal engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Log tags recognised by the engine
    #[serde(default)]
    pub tags: TagTable,

    /// Parameter keys read and written by the engine
    #[serde(default)]
    pub keys: ParamKeys,

    /// Records between parameter store refreshes (refresh when the counter exceeds this)
    #[serde(default = "default_config_poll_interval")]
    pub config_poll_interval: u32,

    /// Sign type code reported for a speed bump
    #[serde(default = "default_speed_bump_code")]
    pub speed_bump_code: i32,
}

fn default_config_poll_interval() -> u32 {
    10
}

fn default_speed_bump_code() -> i32 {
    124
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tags: TagTable::default(),
            keys: ParamKeys::default(),
            config_poll_interval: default_config_poll_interval(),
            speed_bump_code: default_speed_bump_code(),
        }
    }
}

impl EngineConfig {
    /// Create a new engine configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: replace the tag table
    pub fn with_tags(mut self, tags: TagTable) -> Self {
        self.tags = tags;
        self
    }

    /// Builder method: replace the parameter keys
    pub fn with_keys(mut self, keys: ParamKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Builder method: set the parameter refresh interval
    pub fn with_config_poll_interval(mut self, records: u32) -> Self {
        self.config_poll_interval = records;
        self
    }
}

/// Log tag for each signal role the engine understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagTable {
    pub speed_sign_distance: String,
    pub speed_limit: String,
    pub sign_type: String,
    pub audio_noise: String,
    pub turn_info: String,
    pub turn_distance: String,
    pub road_curvature: String,
    pub idle_heartbeat: String,
}

impl Default for TagTable {
    fn default() -> Self {
        Self {
            speed_sign_distance: "opkrspddist".to_string(),
            speed_limit: "opkrspdlimit".to_string(),
            sign_type: "opkrsigntype".to_string(),
            audio_noise: "AudioFlinger".to_string(),
            turn_info: "opkrturninfo".to_string(),
            turn_distance: "opkrdistancetoturn".to_string(),
            road_curvature: "opkrcurvangle".to_string(),
            idle_heartbeat: "opkrnaviheartbeat".to_string(),
        }
    }
}

/// Parameter store keys used by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamKeys {
    /// Map overlay enabled by the user
    pub map_enable: String,
    /// Map data source installed and usable
    pub map_valid: String,
    /// Speed bump armed (written when a speed bump sign is seen)
    pub speed_bump: String,
}

impl Default for ParamKeys {
    fn default() -> Self {
        Self {
            map_enable: "OpkrMapEnable".to_string(),
            map_valid: "OpkrApksEnable".to_string(),
            speed_bump: "OpkrSpeedBump".to_string(),
        }
    }
}

/// Pacing of the outer read loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Topic every event is published on
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Pause between draining the source and reopening it (milliseconds)
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,

    /// Upper bound for the reopen backoff (milliseconds)
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_topic() -> String {
    "liveMapData".to_string()
}

fn default_pause_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    8000
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            pause_ms: default_pause_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RunnerConfig {
    /// Create a new runner configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the publish topic
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Builder method: set the inter-open pause
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause_ms = pause.as_millis() as u64;
        self
    }

    /// Builder method: set the reopen backoff cap
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff_ms = max_backoff.as_millis() as u64;
        self
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms.max(self.pause_ms))
    }
}

/// How the logcat tool is invoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogcatConfig {
    /// Path or name of the logcat binary
    #[serde(default = "default_logcat_binary")]
    pub binary: PathBuf,

    /// Log buffers to read (passed as `-b`)
    #[serde(default = "default_buffers")]
    pub buffers: Vec<String>,
}

fn default_logcat_binary() -> PathBuf {
    PathBuf::from("logcat")
}

fn default_buffers() -> Vec<String> {
    vec!["main".to_string()]
}

impl Default for LogcatConfig {
    fn default() -> Self {
        Self {
            binary: default_logcat_binary(),
            buffers: default_buffers(),
        }
    }
}

impl LogcatConfig {
    /// Builder method: set the logcat binary
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Builder method: set the buffers to read
    pub fn with_buffers(mut self, buffers: Vec<String>) -> Self {
        self.buffers = buffers;
        self
    }
}
