//! Match catalogue and roster intents. Every write goes through
//! [`mutate_match`], a read-modify-write guarded by the store's
//! compare-and-swap on the match version.

use std::time::SystemTime;

use rand::rng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        models::{MatchEntity, UserEntity},
        storage::StorageError,
    },
    dto::matches::{
        CreateMatchRequest, MatchListQuery, MatchSummary, ScoreRequest, ScoreUpdateResponse,
        UpdateMatchRequest,
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        roster::{self, RosterRole, ScoreOutcome},
        schedule,
    },
};

/// Attempts before a contended write gives up with a conflict.
const MAX_CAS_ATTEMPTS: u32 = 3;

pub async fn list_matches(
    state: &SharedState,
    viewer: &UserEntity,
    query: MatchListQuery,
) -> Result<Vec<MatchSummary>, ServiceError> {
    let store = state.require_store().await?;
    let matches = store.list_matches().await?;
    let selected = schedule::select_matches(
        matches,
        query.view.into(),
        &viewer.id,
        query.include_past,
        SystemTime::now(),
    );
    Ok(selected
        .into_iter()
        .map(|entity| MatchSummary::for_viewer(entity, &viewer.id))
        .collect())
}

pub async fn get_match(
    state: &SharedState,
    viewer: &UserEntity,
    id: Uuid,
) -> Result<MatchSummary, ServiceError> {
    let entity = load_match(state, id).await?;
    Ok(MatchSummary::for_viewer(entity, &viewer.id))
}

/// Schedule a match with the organizer as its only player.
pub async fn create_match(
    state: &SharedState,
    organizer: &UserEntity,
    payload: CreateMatchRequest,
) -> Result<MatchSummary, ServiceError> {
    let starts_at = schedule::starts_at(&payload.date, &payload.time, state.config().utc_offset)?;
    let now = SystemTime::now();
    let entity = MatchEntity {
        id: Uuid::new_v4(),
        date: payload.date.trim().to_string(),
        time: payload.time.trim().to_string(),
        court: payload.court.trim().to_string(),
        address: normalize_address(payload.address),
        starts_at,
        players: vec![organizer.clone()],
        waiting_list: Vec::new(),
        created_by: organizer.clone(),
        teams: None,
        score: None,
        version: 0,
        created_at: now,
        updated_at: now,
    };

    let store = state.require_store().await?;
    store.insert_match(entity.clone()).await?;
    info!(match_id = %entity.id, organizer = %organizer.id, "match created");
    after_match_write(state).await;

    Ok(MatchSummary::for_viewer(entity, &organizer.id))
}

/// Organizer-only edit of date, time, court and address.
pub async fn update_match(
    state: &SharedState,
    viewer: &UserEntity,
    id: Uuid,
    payload: UpdateMatchRequest,
) -> Result<MatchSummary, ServiceError> {
    let starts_at = schedule::starts_at(&payload.date, &payload.time, state.config().utc_offset)?;
    let date = payload.date.trim().to_string();
    let time = payload.time.trim().to_string();
    let court = payload.court.trim().to_string();
    let address = normalize_address(payload.address);

    let (entity, ()) = mutate_match(state, id, |entity| {
        if !entity.is_organizer(&viewer.id) {
            return Err(ServiceError::Forbidden(
                "only the organizer can edit this match".into(),
            ));
        }
        let changed = entity.date != date
            || entity.time != time
            || entity.court != court
            || entity.address != address;
        entity.date = date.clone();
        entity.time = time.clone();
        entity.court = court.clone();
        entity.address = address.clone();
        entity.starts_at = starts_at;
        Ok((changed, ()))
    })
    .await?;

    Ok(MatchSummary::for_viewer(entity, &viewer.id))
}

/// Take a player slot. A full match sends the caller to the waiting list.
pub async fn join_match(
    state: &SharedState,
    user: &UserEntity,
    id: Uuid,
) -> Result<MatchSummary, ServiceError> {
    let (entity, ()) = mutate_match(state, id, |entity| {
        if roster::role_of(entity, &user.id) == RosterRole::Outsider && roster::is_full(entity) {
            return Err(ServiceError::Conflict(
                "match is full; join the waiting list instead".into(),
            ));
        }
        Ok((roster::join_match(entity, user.clone()), ()))
    })
    .await?;
    Ok(MatchSummary::for_viewer(entity, &user.id))
}

/// Give up a player slot, promoting the first waiting user.
pub async fn leave_match(
    state: &SharedState,
    user: &UserEntity,
    id: Uuid,
) -> Result<MatchSummary, ServiceError> {
    let (entity, ()) = mutate_match(state, id, |entity| {
        Ok((roster::leave_match(entity, &user.id), ()))
    })
    .await?;
    Ok(MatchSummary::for_viewer(entity, &user.id))
}

/// Queue for a slot. Only offered once every slot is taken.
pub async fn join_waiting_list(
    state: &SharedState,
    user: &UserEntity,
    id: Uuid,
) -> Result<MatchSummary, ServiceError> {
    let (entity, ()) = mutate_match(state, id, |entity| {
        if roster::role_of(entity, &user.id) == RosterRole::Outsider && !roster::is_full(entity) {
            return Err(ServiceError::Conflict(
                "match still has open slots; join it directly".into(),
            ));
        }
        Ok((roster::join_waiting_list(entity, user.clone()), ()))
    })
    .await?;
    Ok(MatchSummary::for_viewer(entity, &user.id))
}

pub async fn leave_waiting_list(
    state: &SharedState,
    user: &UserEntity,
    id: Uuid,
) -> Result<MatchSummary, ServiceError> {
    let (entity, ()) = mutate_match(state, id, |entity| {
        Ok((roster::leave_waiting_list(entity, &user.id), ()))
    })
    .await?;
    Ok(MatchSummary::for_viewer(entity, &user.id))
}

/// Store, clear or reject a score sheet. A rejected sheet is not an error:
/// the current match comes back with `applied: false`.
pub async fn set_score(
    state: &SharedState,
    user: &UserEntity,
    id: Uuid,
    payload: ScoreRequest,
) -> Result<ScoreUpdateResponse, ServiceError> {
    let (entity, outcome) = mutate_match(state, id, |entity| {
        let outcome = roster::set_score(entity, &payload.team1, &payload.team2);
        Ok((outcome.changed(), outcome))
    })
    .await?;

    if outcome == ScoreOutcome::Rejected {
        debug!(match_id = %id, user = %user.id, "score sheet rejected");
    }

    Ok(ScoreUpdateResponse {
        applied: outcome != ScoreOutcome::Rejected,
        current: MatchSummary::for_viewer(entity, &user.id),
    })
}

/// Draw new random pairs for a full match.
pub async fn shuffle_teams(
    state: &SharedState,
    user: &UserEntity,
    id: Uuid,
) -> Result<MatchSummary, ServiceError> {
    let (entity, ()) = mutate_match(state, id, |entity| {
        if !roster::is_full(entity) {
            return Err(ServiceError::Conflict(
                "teams can only be shuffled with four players".into(),
            ));
        }
        Ok((roster::shuffle_teams(entity, &mut rng()), ()))
    })
    .await?;
    Ok(MatchSummary::for_viewer(entity, &user.id))
}

pub(crate) async fn load_match(state: &SharedState, id: Uuid) -> Result<MatchEntity, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_match(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match `{id}` not found")))
}

/// Publish the new collection and wake the expiry sweeper.
pub(crate) async fn after_match_write(state: &SharedState) {
    sse_events::broadcast_matches_snapshot(state).await;
    state.notify_matches_changed();
}

/// Re-read, apply and compare-and-swap until the write lands.
///
/// `apply` reports whether it changed the match; unchanged matches are
/// returned without a write. Lost races re-run `apply` on the fresh copy.
async fn mutate_match<F, T>(
    state: &SharedState,
    id: Uuid,
    mut apply: F,
) -> Result<(MatchEntity, T), ServiceError>
where
    F: FnMut(&mut MatchEntity) -> Result<(bool, T), ServiceError>,
{
    let store = state.require_store().await?;

    for attempt in 1..=MAX_CAS_ATTEMPTS {
        let Some(mut entity) = store.find_match(id).await? else {
            return Err(ServiceError::NotFound(format!("match `{id}` not found")));
        };
        let expected = entity.version;

        let (changed, value) = apply(&mut entity)?;
        if !changed {
            return Ok((entity, value));
        }

        entity.updated_at = SystemTime::now();
        match store.replace_match(entity.clone(), expected).await {
            Ok(()) => {
                entity.version = expected + 1;
                debug!(match_id = %id, version = entity.version, "match updated");
                after_match_write(state).await;
                return Ok((entity, value));
            }
            Err(StorageError::Conflict { .. }) => {
                debug!(match_id = %id, attempt, "concurrent write detected; retrying");
            }
            Err(err) => {
                warn!(match_id = %id, error = %err, "failed to persist match");
                return Err(err.into());
            }
        }
    }

    Err(ServiceError::Conflict(format!(
        "match `{id}` is being modified concurrently; try again"
    )))
}

fn normalize_address(address: Option<String>) -> Option<String> {
    address
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
