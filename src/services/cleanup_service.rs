//! Expiry sweeper: deletes matches once their start plus the grace period
//! has passed.

use std::time::{Duration, SystemTime};

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::roster_store::RosterStore,
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        schedule::{expired_matches, is_expired},
    },
};

/// Sweep on every match change notification and on a periodic tick.
pub async fn run(state: SharedState) {
    let mut ticker = interval(state.config().sweep_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {},
            _ = state.matches_changed().notified() => {},
        }

        match sweep_expired(&state, SystemTime::now(), None).await {
            Ok(0) => {}
            Ok(removed) => info!(removed, "expired matches removed"),
            Err(ServiceError::Degraded) => debug!("storage unavailable; skipping expiry sweep"),
            Err(err) => warn!(error = %err, "expiry sweep failed; retrying on next tick"),
        }
    }
}

/// Delete the matches expired at `now`, optionally only those organised by
/// `organizer`. Returns how many were removed by this call.
pub async fn sweep_expired(
    state: &SharedState,
    now: SystemTime,
    organizer: Option<&str>,
) -> Result<usize, ServiceError> {
    let store = state.require_store().await?;
    let matches = store.list_matches().await?;
    let expired = expired_matches(&matches, now, state.config().cleanup_grace, organizer);

    let grace = state.config().cleanup_grace;
    let mut removed = 0;
    for id in expired {
        if remove_if_still_expired(store.as_ref(), id, now, grace).await? {
            removed += 1;
        }
    }

    if removed > 0 {
        sse_events::broadcast_matches_snapshot(state).await;
    }
    Ok(removed)
}

/// Delete `id` only if its current copy is still expired. The listing the
/// candidates came from may predate a reschedule.
async fn remove_if_still_expired(
    store: &dyn RosterStore,
    id: Uuid,
    now: SystemTime,
    grace: Duration,
) -> Result<bool, ServiceError> {
    let Some(current) = store.find_match(id).await? else {
        return Ok(false);
    };
    if !is_expired(&current, now, grace) {
        debug!(match_id = %id, "match rescheduled since listing; keeping it");
        return Ok(false);
    }

    let deleted = store.delete_match(id).await?;
    if deleted {
        debug!(match_id = %id, "expired match deleted");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{MatchEntity, UserEntity},
            roster_store::memory::MemoryRosterStore,
        },
        state::AppState,
    };

    fn match_by(organizer: &str, starts_at: SystemTime) -> MatchEntity {
        let user = UserEntity {
            id: organizer.into(),
            name: organizer.into(),
            avatar: String::new(),
            email: None,
            phone: None,
            dob: None,
        };
        MatchEntity {
            id: Uuid::new_v4(),
            date: "2026-01-01".into(),
            time: "10:00".into(),
            court: "Court".into(),
            address: None,
            starts_at,
            players: vec![user.clone()],
            waiting_list: Vec::new(),
            created_by: user,
            teams: None,
            score: None,
            version: 0,
            created_at: starts_at,
            updated_at: starts_at,
        }
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_matches_once() {
        let store = Arc::new(MemoryRosterStore::new());
        let state = AppState::new(AppConfig::default());
        state.set_store(store.clone()).await;

        let now = SystemTime::now();
        let old = match_by("a", now - Duration::from_secs(301));
        let recent = match_by("a", now - Duration::from_secs(120));
        let other = match_by("b", now - Duration::from_secs(3_600));
        for entity in [&old, &recent, &other] {
            store.insert_match(entity.clone()).await.unwrap();
        }

        assert_eq!(sweep_expired(&state, now, Some("a")).await.unwrap(), 1);
        assert!(store.find_match(old.id).await.unwrap().is_none());
        assert!(store.find_match(other.id).await.unwrap().is_some());

        assert_eq!(sweep_expired(&state, now, None).await.unwrap(), 1);
        assert_eq!(sweep_expired(&state, now, None).await.unwrap(), 0);
        assert!(store.find_match(recent.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rescheduled_match_survives_a_stale_listing() {
        let store = MemoryRosterStore::new();
        let now = SystemTime::now();
        let grace = Duration::from_secs(300);
        let entity = match_by("a", now - Duration::from_secs(3_600));
        store.insert_match(entity.clone()).await.unwrap();

        let listing = store.list_matches().await.unwrap();
        let candidates = expired_matches(&listing, now, grace, None);
        assert_eq!(candidates, vec![entity.id]);

        let mut moved = entity.clone();
        moved.starts_at = now + Duration::from_secs(86_400);
        store.replace_match(moved, entity.version).await.unwrap();

        assert!(!remove_if_still_expired(&store, entity.id, now, grace).await.unwrap());
        assert!(store.find_match(entity.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn already_deleted_candidate_is_a_no_op() {
        let store = MemoryRosterStore::new();
        let now = SystemTime::now();
        let entity = match_by("a", now - Duration::from_secs(3_600));
        store.insert_match(entity.clone()).await.unwrap();
        store.delete_match(entity.id).await.unwrap();

        let removed = remove_if_still_expired(&store, entity.id, now, Duration::ZERO)
            .await
            .unwrap();
        assert!(!removed);
    }
}
