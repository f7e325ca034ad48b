//! Event taxonomy emitted by the coordination layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events describing family state transitions and rejected commands.
///
/// Serialized with a `type` tag and kebab-case names so downstream consumers
/// can route on the event kind without deserializing the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FamilyEvent {
    /// A senior/junior link was established.
    LinkCreated {
        senior_id: u32,
        junior_id: u32,
        timestamp: DateTime<Utc>,
    },

    /// One senior/junior link was severed.
    LinkBroken {
        senior_id: u32,
        junior_id: u32,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A senior and all of its direct juniors were removed.
    TreeDissolved {
        senior_id: u32,
        affected_ids: Vec<u32>,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Reputation was credited to a member.
    RepGained {
        character_id: u32,
        amount: u32,
        daily_rep: u32,
        source: String,
        timestamp: DateTime<Utc>,
    },

    /// Reputation was spent by a member.
    RepRedeemed {
        character_id: u32,
        amount: u32,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The daily reputation counters were reset.
    RepReset {
        affected_count: u64,
        timestamp: DateTime<Utc>,
    },

    /// A reputation command was rejected or failed.
    RepError {
        character_id: u32,
        code: String,
        message: String,
        amount: u32,
        timestamp: DateTime<Utc>,
    },

    /// A link command was rejected or failed.
    LinkError {
        senior_id: u32,
        junior_id: u32,
        code: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl FamilyEvent {
    /// Stable kind string, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LinkCreated { .. } => "link-created",
            Self::LinkBroken { .. } => "link-broken",
            Self::TreeDissolved { .. } => "tree-dissolved",
            Self::RepGained { .. } => "rep-gained",
            Self::RepRedeemed { .. } => "rep-redeemed",
            Self::RepReset { .. } => "rep-reset",
            Self::RepError { .. } => "rep-error",
            Self::LinkError { .. } => "link-error",
        }
    }

    /// The primary character the event concerns, where one exists.
    pub fn character_id(&self) -> Option<u32> {
        match self {
            Self::LinkCreated { junior_id, .. } => Some(*junior_id),
            Self::LinkBroken { junior_id, .. } => Some(*junior_id),
            Self::TreeDissolved { senior_id, .. } => Some(*senior_id),
            Self::RepGained { character_id, .. } => Some(*character_id),
            Self::RepRedeemed { character_id, .. } => Some(*character_id),
            Self::RepReset { .. } => None,
            Self::RepError { character_id, .. } => Some(*character_id),
            Self::LinkError { junior_id, .. } => Some(*junior_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_serialized_tag() {
        let event = FamilyEvent::RepGained {
            character_id: 1000,
            amount: 40,
            daily_rep: 40,
            source: "mob_kills".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
        assert_eq!(json["character_id"], 1000);
    }

    #[test]
    fn reset_event_has_no_subject_character() {
        let event = FamilyEvent::RepReset {
            affected_count: 12,
            timestamp: Utc::now(),
        };
        assert_eq!(event.kind(), "rep-reset");
        assert_eq!(event.character_id(), None);
    }
}
