//! Signal extraction and debounce engine
//!
//! This module provides the state machine at the heart of the daemon. The engine
//! is fed one log record at a time; each record may update the signal snapshot,
//! and every record yields exactly one `LiveMapData` reflecting the snapshot
//! after the update, whether or not anything changed.
//!
//! Per-record steps:
//! 1. Every `config_poll_interval + 1` records, refresh the flags from the parameter store.
//! 2. Classify the tag and apply that role's transition.
//! 3. Return the snapshot as a message.

use crate::config::EngineConfig;
use crate::message::LiveMapData;
use crate::message_decoder::MessageDecoder;
use crate::params::ParamStore;
use crate::signals::{DebounceCounters, KnownTag, SignalSnapshot};
use crate::types::LogRecord;

/// Heartbeats without speed evidence before the speed limit is dropped (exceeded, not reached)
const SPEED_EVIDENCE_TIMEOUT: u32 = 2;
/// Heartbeats without sign evidence before the sign is dropped unconditionally
const SIGN_EVIDENCE_TIMEOUT: u32 = 4;
/// Heartbeats without sign evidence before the sign is dropped when no speed bump is armed
const SIGN_EVIDENCE_SHORT_TIMEOUT: u32 = 1;
/// Distance window (exclusive) in which audio noise marks the distance reading as stale
const NOISE_GUARD_MIN_DISTANCE: f32 = 0.0;
const NOISE_GUARD_MAX_DISTANCE: f32 = 60.0;

/// The signal engine - owns the snapshot and its debounce counters
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: EngineConfig,
    snapshot: SignalSnapshot,
    counters: DebounceCounters,
}

impl SignalEngine {
    /// Create an engine with an all-zero snapshot and all counters at zero
    pub fn new(config: EngineConfig) -> Self {
        Self::with_state(config, SignalSnapshot::default(), DebounceCounters::default())
    }

    /// Create an engine starting from a given state
    pub fn with_state(
        config: EngineConfig,
        snapshot: SignalSnapshot,
        counters: DebounceCounters,
    ) -> Self {
        Self {
            config,
            snapshot,
            counters,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &SignalSnapshot {
        &self.snapshot
    }

    pub fn counters(&self) -> &DebounceCounters {
        &self.counters
    }

    /// Process one record and return the message to publish for it
    ///
    /// Never fails: malformed payloads read as zero, unknown tags change nothing.
    pub fn process<P>(&mut self, record: &LogRecord, params: &mut P) -> LiveMapData
    where
        P: ParamStore + ?Sized,
    {
        self.refresh_config(params);

        let role = KnownTag::classify(&record.tag, &self.config.tags);
        log::trace!("{:?} <- {}", role, record);
        self.apply(role, &record.message, params);

        self.snapshot.to_message()
    }

    /// Step 1: bounded-rate parameter store refresh
    fn refresh_config<P>(&mut self, params: &P)
    where
        P: ParamStore + ?Sized,
    {
        self.counters.records_since_config_poll += 1;
        if self.counters.records_since_config_poll <= self.config.config_poll_interval {
            return;
        }
        self.counters.records_since_config_poll = 0;

        let keys = &self.config.keys;
        self.snapshot.map_enable = params.get_bool(&keys.map_enable);
        self.snapshot.map_valid = params.get_bool(&keys.map_valid);
        self.counters.speed_bump_armed = params.get_bool(&keys.speed_bump);
    }

    /// Step 2: tag transition
    fn apply<P>(&mut self, role: KnownTag, message: &str, params: &mut P)
    where
        P: ParamStore + ?Sized,
    {
        let snapshot = &mut self.snapshot;
        let counters = &mut self.counters;

        match role {
            KnownTag::SpeedSignDistance => {
                counters.ticks_since_speed_evidence = 0;
                snapshot.speed_limit_distance = MessageDecoder::payload_f32(message);
            }
            KnownTag::SpeedLimit => {
                counters.ticks_since_speed_evidence = 0;
                snapshot.speed_limit = MessageDecoder::payload_f32(message);
            }
            KnownTag::SignType => {
                counters.ticks_since_speed_evidence = 0;
                counters.ticks_since_sign_evidence = 0;
                let code = MessageDecoder::payload_value(message);
                snapshot.safety_sign = code as f32;
                if code == self.config.speed_bump_code {
                    let key = &self.config.keys.speed_bump;
                    if let Err(e) = params.put_bool(key, true) {
                        log::warn!("Failed to arm speed bump ({}): {}", key, e);
                    }
                }
            }
            KnownTag::AudioNoise => {
                let distance = snapshot.speed_limit_distance;
                if distance > NOISE_GUARD_MIN_DISTANCE && distance < NOISE_GUARD_MAX_DISTANCE {
                    snapshot.clear_speed_limit();
                }
            }
            KnownTag::TurnInfo => {
                snapshot.turn_info = MessageDecoder::payload_f32(message);
            }
            KnownTag::TurnDistance => {
                snapshot.distance_to_turn = MessageDecoder::payload_f32(message);
            }
            KnownTag::RoadCurvature => {
                snapshot.road_curvature = MessageDecoder::payload_f32(message);
            }
            KnownTag::IdleHeartbeat if snapshot.speed_limit == 0.0 => {
                counters.ticks_since_sign_evidence += 1;
                if counters.ticks_since_sign_evidence > SIGN_EVIDENCE_TIMEOUT {
                    counters.ticks_since_sign_evidence = 0;
                    snapshot.clear_safety_sign();
                } else if counters.ticks_since_sign_evidence > SIGN_EVIDENCE_SHORT_TIMEOUT
                    && !counters.speed_bump_armed
                {
                    snapshot.clear_safety_sign();
                }
            }
            KnownTag::IdleHeartbeat => {
                counters.ticks_since_speed_evidence += 1;
                if counters.ticks_since_speed_evidence > SPEED_EVIDENCE_TIMEOUT {
                    counters.ticks_since_speed_evidence = 0;
                    snapshot.clear_speed_limit();
                }
            }
            KnownTag::Unknown => {}
        }
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
