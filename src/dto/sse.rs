use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::{common::UserSummary, matches::MatchSummary};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Full match collection, sent on connect and after every write.
pub struct MatchesSnapshot {
    pub matches: Vec<MatchSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Full user collection, sent on connect and after every profile write.
pub struct UsersSnapshot {
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}
