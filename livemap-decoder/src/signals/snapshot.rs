//! Signal snapshot and debounce counters
//!
//! The snapshot is the engine's only view of the world: the best-known value of
//! every derived signal. The counters age that evidence between heartbeats.

use crate::message::LiveMapData;

/// Current best-known value of every derived signal
///
/// Zero (or false) means "none". Speed limit and its distance are always
/// cleared together.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalSnapshot {
    /// Posted speed limit
    pub speed_limit: f32,
    /// Distance to the speed-limit sign
    pub speed_limit_distance: f32,
    /// Road sign class code
    pub safety_sign: f32,
    /// Pending turn maneuver code
    pub turn_info: f32,
    /// Distance to the pending maneuver
    pub distance_to_turn: f32,
    /// Road curvature angle
    pub road_curvature: f32,
    /// A map data source is usable
    pub map_valid: bool,
    /// Map overlay is enabled by the user
    pub map_enable: bool,
}

impl SignalSnapshot {
    /// Drop the speed limit and its distance together
    pub fn clear_speed_limit(&mut self) {
        self.speed_limit = 0.0;
        self.speed_limit_distance = 0.0;
    }

    pub fn clear_safety_sign(&mut self) {
        self.safety_sign = 0.0;
    }

    /// Event payload carrying this snapshot
    pub fn to_message(&self) -> LiveMapData {
        LiveMapData {
            speed_limit: self.speed_limit,
            speed_limit_distance: self.speed_limit_distance,
            safety_sign: self.safety_sign,
            turn_info: self.turn_info,
            distance_to_turn: self.distance_to_turn,
            road_curvature: self.road_curvature,
            map_enable: self.map_enable,
            map_valid: self.map_valid,
        }
    }
}

/// Evidence-aging state kept alongside the snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceCounters {
    /// Records since the parameter store was last read
    pub records_since_config_poll: u32,
    /// Heartbeats since speed-limit evidence was last seen
    pub ticks_since_speed_evidence: u32,
    /// Heartbeats since sign evidence was last seen
    pub ticks_since_sign_evidence: u32,
    /// Cached speed-bump-armed flag from the parameter store
    pub speed_bump_armed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_zero() {
        let snapshot = SignalSnapshot::default();
        assert_eq!(snapshot.speed_limit, 0.0);
        assert!(!snapshot.map_valid);
        assert!(!snapshot.map_enable);

        let counters = DebounceCounters::default();
        assert_eq!(counters.ticks_since_speed_evidence, 0);
        assert!(!counters.speed_bump_armed);
    }

    #[test]
    fn test_clear_speed_limit_clears_both() {
        let mut snapshot = SignalSnapshot {
            speed_limit: 80.0,
            speed_limit_distance: 45.0,
            safety_sign: 124.0,
            ..SignalSnapshot::default()
        };
        snapshot.clear_speed_limit();

        assert_eq!(snapshot.speed_limit, 0.0);
        assert_eq!(snapshot.speed_limit_distance, 0.0);
        assert_eq!(snapshot.safety_sign, 124.0);
    }

    #[test]
    fn test_to_message_copies_every_field() {
        let snapshot = SignalSnapshot {
            speed_limit: 80.0,
            speed_limit_distance: 45.0,
            safety_sign: 3.0,
            turn_info: 2.0,
            distance_to_turn: 150.0,
            road_curvature: 12.0,
            map_valid: true,
            map_enable: false,
        };
        let message = snapshot.to_message();

        assert_eq!(message.speed_limit, 80.0);
        assert_eq!(message.speed_limit_distance, 45.0);
        assert_eq!(message.safety_sign, 3.0);
        assert_eq!(message.turn_info, 2.0);
        assert_eq!(message.distance_to_turn, 150.0);
        assert_eq!(message.road_curvature, 12.0);
        assert!(message.map_valid);
        assert!(!message.map_enable);
    }
}
