//! Published message types
//!
//! `LiveMapData` is the structured event consumers read. Every field is always
//! present; absence of evidence is a zero, never an omitted field.

use crate::types::{timestamp_nanos, Timestamp};
use serde::{Deserialize, Serialize};

/// Snapshot of every live map signal, published once per processed record
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMapData {
    pub speed_limit: f32,
    pub speed_limit_distance: f32,
    pub safety_sign: f32,
    pub turn_info: f32,
    pub distance_to_turn: f32,
    pub road_curvature: f32,
    pub map_enable: bool,
    pub map_valid: bool,
}

/// Envelope written by the serializing publishers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEvent {
    /// Time of the log record that produced this event
    pub log_time_nanos: i64,
    pub live_map_data: LiveMapData,
}

impl PublishedEvent {
    pub fn new(log_time: &Timestamp, live_map_data: LiveMapData) -> Self {
        Self {
            log_time_nanos: timestamp_nanos(log_time),
            live_map_data,
        }
    }
}

/// Wire form of an event: topic plus envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireEvent<'a> {
    pub topic: &'a str,
    #[serde(flatten)]
    pub event: &'a PublishedEvent,
}
