use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    dao::models::{MatchEntity, UserEntity},
    dto::sse::{MatchesSnapshot, ServerEvent, SystemStatus, UsersSnapshot},
    error::ServiceError,
    state::SharedState,
};

pub const EVENT_MATCHES_SNAPSHOT: &str = "matches.snapshot";
pub const EVENT_USERS_SNAPSHOT: &str = "users.snapshot";
pub const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Build the `matches.snapshot` event for the current collection.
pub async fn matches_snapshot_event(state: &SharedState) -> Result<ServerEvent, ServiceError> {
    let store = state.require_store().await?;
    let matches = store.list_matches().await?;
    Ok(snapshot_event(EVENT_MATCHES_SNAPSHOT, &matches_payload(matches))?)
}

/// Build the `users.snapshot` event for the current collection.
pub async fn users_snapshot_event(state: &SharedState) -> Result<ServerEvent, ServiceError> {
    let store = state.require_store().await?;
    let users = store.list_users().await?;
    Ok(snapshot_event(EVENT_USERS_SNAPSHOT, &users_payload(users))?)
}

/// Push a fresh match snapshot to every subscriber.
///
/// The write that triggered it already succeeded, so failures are only logged.
pub async fn broadcast_matches_snapshot(state: &SharedState) {
    if state.sse().subscriber_count() == 0 {
        debug!("no SSE subscribers; skipping match snapshot");
        return;
    }
    match matches_snapshot_event(state).await {
        Ok(event) => state.sse().broadcast(event),
        Err(err) => warn!(error = %err, "failed to build match snapshot"),
    }
}

/// Push a fresh user snapshot to every subscriber.
pub async fn broadcast_users_snapshot(state: &SharedState) {
    if state.sse().subscriber_count() == 0 {
        return;
    }
    match users_snapshot_event(state).await {
        Ok(event) => state.sse().broadcast(event),
        Err(err) => warn!(error = %err, "failed to build user snapshot"),
    }
}

pub fn system_status_event(degraded: bool) -> serde_json::Result<ServerEvent> {
    snapshot_event(EVENT_SYSTEM_STATUS, &SystemStatus { degraded })
}

/// Announce entering or leaving degraded mode.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    match system_status_event(degraded) {
        Ok(event) => state.sse().broadcast(event),
        Err(err) => warn!(error = %err, "failed to serialize system status"),
    }
}

fn matches_payload(matches: Vec<MatchEntity>) -> MatchesSnapshot {
    MatchesSnapshot {
        matches: matches.into_iter().map(Into::into).collect(),
    }
}

fn users_payload(users: Vec<UserEntity>) -> UsersSnapshot {
    UsersSnapshot {
        users: users.into_iter().map(Into::into).collect(),
    }
}

fn snapshot_event(event: &str, payload: &impl Serialize) -> serde_json::Result<ServerEvent> {
    ServerEvent::json(Some(event.to_string()), payload)
}
