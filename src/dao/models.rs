use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Representation of a user stored in persistence and shared across layers.
///
/// Roster membership compares users by [`UserEntity::id`] only; the other
/// fields are a denormalised copy taken when the user joined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Stable identifier assigned by the identity provider.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Avatar URI.
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Date of birth (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
}

/// Two pairs derived from a full roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamsEntity {
    pub team_a: [UserEntity; 2],
    pub team_b: [UserEntity; 2],
}

impl TeamsEntity {
    /// Whether the given user belongs to either pair.
    pub fn contains(&self, user_id: &str) -> bool {
        self.team_a
            .iter()
            .chain(self.team_b.iter())
            .any(|user| user.id == user_id)
    }
}

/// Games won per set, one entry per set for each side.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEntity {
    pub team1: Vec<u32>,
    pub team2: Vec<u32>,
}

/// Aggregate match document persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Primary key of the match.
    pub id: Uuid,
    /// Calendar date (`YYYY-MM-DD`).
    pub date: String,
    /// Local clock time (`HH:MM`).
    pub time: String,
    /// Venue label.
    pub court: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Absolute instant of `date` + `time` in the configured offset.
    pub starts_at: SystemTime,
    /// Active roster, at most four players when writes are serialised.
    pub players: Vec<UserEntity>,
    /// FIFO queue of users waiting for a slot.
    pub waiting_list: Vec<UserEntity>,
    /// Organizer, fixed at creation.
    pub created_by: UserEntity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<TeamsEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreEntity>,
    /// Optimistic concurrency token, bumped on every write.
    #[serde(default)]
    pub version: u64,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl MatchEntity {
    /// Whether the user currently holds a player slot.
    pub fn is_player(&self, user_id: &str) -> bool {
        self.players.iter().any(|user| user.id == user_id)
    }

    /// Whether the user is queued on the waiting list.
    pub fn is_waiting(&self, user_id: &str) -> bool {
        self.waiting_list.iter().any(|user| user.id == user_id)
    }

    /// Whether the user organised this match.
    pub fn is_organizer(&self, user_id: &str) -> bool {
        self.created_by.id == user_id
    }
}
