//! Tag classification
//!
//! Maps the free-form tag of a log record onto the closed set of roles the
//! engine understands. Matching is exact and follows a fixed order, so the
//! first role whose tag matches wins even if a table maps two roles to one tag.

use crate::config::TagTable;

/// Signal role of a log tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownTag {
    /// Distance to the upcoming speed-limit sign
    SpeedSignDistance,
    /// Posted speed limit value
    SpeedLimit,
    /// Road sign class code
    SignType,
    /// Audio subsystem chatter that co-occurs with stale distance readings
    AudioNoise,
    /// Pending turn maneuver code
    TurnInfo,
    /// Distance to the pending maneuver
    TurnDistance,
    /// Road curvature angle
    RoadCurvature,
    /// Timing pulse that drives evidence aging
    IdleHeartbeat,
    /// Anything else
    Unknown,
}

impl KnownTag {
    /// Dispatch order; the first matching role wins
    pub const DISPATCH_ORDER: [KnownTag; 8] = [
        KnownTag::SpeedSignDistance,
        KnownTag::SpeedLimit,
        KnownTag::SignType,
        KnownTag::AudioNoise,
        KnownTag::TurnInfo,
        KnownTag::TurnDistance,
        KnownTag::RoadCurvature,
        KnownTag::IdleHeartbeat,
    ];

    /// Classify a record tag against a tag table
    pub fn classify(tag: &str, table: &TagTable) -> KnownTag {
        Self::DISPATCH_ORDER
            .into_iter()
            .find(|role| role.tag_in(table) == Some(tag))
            .unwrap_or(KnownTag::Unknown)
    }

    /// The tag string configured for this role
    pub fn tag_in<'a>(&self, table: &'a TagTable) -> Option<&'a str> {
        let tag = match self {
            KnownTag::SpeedSignDistance => &table.speed_sign_distance,
            KnownTag::SpeedLimit => &table.speed_limit,
            KnownTag::SignType => &table.sign_type,
            KnownTag::AudioNoise => &table.audio_noise,
            KnownTag::TurnInfo => &table.turn_info,
            KnownTag::TurnDistance => &table.turn_distance,
            KnownTag::RoadCurvature => &table.road_curvature,
            KnownTag::IdleHeartbeat => &table.idle_heartbeat,
            KnownTag::Unknown => return None,
        };
        Some(tag.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_default_table() {
        let table = TagTable::default();
        assert_eq!(KnownTag::classify("opkrspddist", &table), KnownTag::SpeedSignDistance);
        assert_eq!(KnownTag::classify("opkrspdlimit", &table), KnownTag::SpeedLimit);
        assert_eq!(KnownTag::classify("opkrsigntype", &table), KnownTag::SignType);
        assert_eq!(KnownTag::classify("AudioFlinger", &table), KnownTag::AudioNoise);
        assert_eq!(KnownTag::classify("opkrturninfo", &table), KnownTag::TurnInfo);
        assert_eq!(KnownTag::classify("opkrdistancetoturn", &table), KnownTag::TurnDistance);
        assert_eq!(KnownTag::classify("opkrcurvangle", &table), KnownTag::RoadCurvature);
        assert_eq!(KnownTag::classify("opkrnaviheartbeat", &table), KnownTag::IdleHeartbeat);
    }

    #[test]
    fn test_classify_is_exact() {
        let table = TagTable::default();
        assert_eq!(KnownTag::classify("OPKRSPDLIMIT", &table), KnownTag::Unknown);
        assert_eq!(KnownTag::classify("opkrspdlimit ", &table), KnownTag::Unknown);
        assert_eq!(KnownTag::classify("", &table), KnownTag::Unknown);
    }

    #[test]
    fn test_first_match_wins() {
        let table = TagTable {
            speed_limit: "shared".to_string(),
            idle_heartbeat: "shared".to_string(),
            ..TagTable::default()
        };
        assert_eq!(KnownTag::classify("shared", &table), KnownTag::SpeedLimit);
    }
}
