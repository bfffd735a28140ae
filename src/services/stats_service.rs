use crate::{
    dto::stats::StatsResponse,
    error::ServiceError,
    state::{SharedState, stats::compute_rankings},
};

/// Rankings over the current users and matches, recomputed on every call.
pub async fn rankings(state: &SharedState) -> Result<StatsResponse, ServiceError> {
    let store = state.require_store().await?;
    let users = store.list_users().await?;
    let matches = store.list_matches().await?;
    Ok(compute_rankings(&users, &matches).into())
}
