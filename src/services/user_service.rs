use tracing::info;

use crate::{
    dao::models::UserEntity,
    dto::{common::UserSummary, users::UpdateProfileRequest},
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

pub async fn list_users(state: &SharedState) -> Result<Vec<UserSummary>, ServiceError> {
    let store = state.require_store().await?;
    let users = store.list_users().await?;
    Ok(users.into_iter().map(Into::into).collect())
}

/// Load a user record by its provider id.
pub async fn find_user(state: &SharedState, id: &str) -> Result<Option<UserEntity>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.find_user(id.to_string()).await?)
}

/// Persist a user and publish the new collection.
pub async fn save_user(state: &SharedState, user: UserEntity) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    store.save_user(user).await?;
    sse_events::broadcast_users_snapshot(state).await;
    Ok(())
}

/// Edit the caller's own profile.
///
/// Copies of the user already embedded in matches keep the old values.
pub async fn update_profile(
    state: &SharedState,
    current: &UserEntity,
    payload: UpdateProfileRequest,
) -> Result<UserSummary, ServiceError> {
    let mut user = current.clone();
    user.name = payload.name.trim().to_string();
    user.phone = non_empty(payload.phone);
    user.dob = non_empty(payload.dob);

    if user == *current {
        return Ok(user.into());
    }

    save_user(state, user.clone()).await?;
    info!(user = %user.id, "profile updated");
    Ok(user.into())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::roster_store::memory::MemoryRosterStore, state::AppState,
    };

    #[tokio::test]
    async fn profile_edit_is_persisted() {
        let state = AppState::new(AppConfig::default());
        state.set_store(Arc::new(MemoryRosterStore::new())).await;
        let current = UserEntity {
            id: "u1".into(),
            name: "Padel Player".into(),
            avatar: "https://i.pravatar.cc/150?u=u1".into(),
            email: Some("u1@example.test".into()),
            phone: None,
            dob: None,
        };
        save_user(&state, current.clone()).await.unwrap();

        let updated = update_profile(
            &state,
            &current,
            UpdateProfileRequest {
                name: "  Lucía ".into(),
                phone: Some("".into()),
                dob: Some("1992-03-04".into()),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "Lucía");
        assert!(updated.phone.is_none());
        let stored = find_user(&state, "u1").await.unwrap().unwrap();
        assert_eq!(stored.dob.as_deref(), Some("1992-03-04"));
        assert_eq!(stored.email.as_deref(), Some("u1@example.test"));
    }
}
