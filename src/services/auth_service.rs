//! Identity gateway hand-over: gate unverified accounts, resolve or create
//! the user record, and bind it to a bearer token.

use tracing::{info, warn};

use crate::{
    dao::models::UserEntity,
    dto::auth::{SessionClaims, SessionResponse},
    error::ServiceError,
    services::user_service,
    state::SharedState,
};

/// Name given to users whose provider supplies none.
pub const DEFAULT_DISPLAY_NAME: &str = "Padel Player";
const DEFAULT_AVATAR_BASE: &str = "https://i.pravatar.cc/150?u=";

/// Open a session for gateway-verified claims.
pub async fn open_session(
    state: &SharedState,
    gateway_key: Option<&str>,
    claims: SessionClaims,
) -> Result<SessionResponse, ServiceError> {
    check_gateway(state, gateway_key, &claims)?;

    if !claims.may_enter() {
        info!(uid = %claims.uid, "sign-in refused until the email is verified");
        return Err(ServiceError::Unauthorized(
            "email address has not been verified".into(),
        ));
    }

    let user = resolve_user(state, &claims).await?;
    let token = state.sessions().open(&user.id);
    info!(user = %user.id, provider = %claims.provider, "session opened");

    Ok(SessionResponse {
        token,
        user: user.into(),
    })
}

/// Only the configured gateway may hand over claims. Without a key the
/// hand-over is closed unless `allow_open_sessions` is set.
fn check_gateway(
    state: &SharedState,
    gateway_key: Option<&str>,
    claims: &SessionClaims,
) -> Result<(), ServiceError> {
    let config = state.config();
    match config.identity_gateway_key.as_deref() {
        Some(expected) if gateway_key == Some(expected) => Ok(()),
        Some(_) => {
            warn!(uid = %claims.uid, "session hand-over with an invalid gateway key");
            Err(ServiceError::Unauthorized(
                "invalid identity gateway key".into(),
            ))
        }
        None if config.allow_open_sessions => Ok(()),
        None => {
            warn!(uid = %claims.uid, "session hand-over refused; no identity gateway key configured");
            Err(ServiceError::GatewayNotConfigured)
        }
    }
}

/// User bound to `token`, if the session and the record both exist.
pub async fn current_user(state: &SharedState, token: &str) -> Result<UserEntity, ServiceError> {
    let Some(user_id) = state.sessions().resolve(token) else {
        return Err(ServiceError::Unauthorized("unknown or expired session".into()));
    };
    user_service::find_user(state, &user_id)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("session user no longer exists".into()))
}

/// Revoke `token`. Unknown tokens are ignored.
pub fn sign_out(state: &SharedState, token: &str) {
    if state.sessions().revoke(token) {
        info!("session closed");
    }
}

/// Load the user behind `claims`, creating the record on first sign-in.
async fn resolve_user(state: &SharedState, claims: &SessionClaims) -> Result<UserEntity, ServiceError> {
    if let Some(existing) = user_service::find_user(state, &claims.uid).await? {
        return Ok(existing);
    }

    let user = new_user(claims);
    user_service::save_user(state, user.clone()).await?;
    info!(user = %user.id, "user record created on first sign-in");
    Ok(user)
}

fn new_user(claims: &SessionClaims) -> UserEntity {
    let name = claims
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DISPLAY_NAME)
        .to_string();
    let avatar = claims
        .photo_url
        .clone()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| format!("{DEFAULT_AVATAR_BASE}{}", urlencoding::encode(&claims.uid)));

    UserEntity {
        id: claims.uid.clone(),
        name,
        avatar,
        email: claims.email.clone(),
        phone: None,
        dob: None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::roster_store::memory::MemoryRosterStore, state::AppState,
    };

    fn claims(uid: &str, provider: &str, verified: bool) -> SessionClaims {
        SessionClaims {
            uid: uid.into(),
            display_name: None,
            email: Some(format!("{uid}@example.test")),
            photo_url: None,
            email_verified: verified,
            provider: provider.into(),
        }
    }

    fn open_sessions() -> AppConfig {
        AppConfig::from_json(r#"{"allow_open_sessions": true}"#).unwrap()
    }

    async fn state_with(config: AppConfig) -> SharedState {
        let state = AppState::new(config);
        state.set_store(Arc::new(MemoryRosterStore::new())).await;
        state
    }

    #[tokio::test]
    async fn first_sign_in_creates_a_default_profile() {
        let state = state_with(open_sessions()).await;

        let session = open_session(&state, None, claims("abc", "google.com", false))
            .await
            .unwrap();

        assert_eq!(session.user.name, DEFAULT_DISPLAY_NAME);
        assert_eq!(session.user.avatar, "https://i.pravatar.cc/150?u=abc");
        let user = current_user(&state, &session.token).await.unwrap();
        assert_eq!(user.id, "abc");
    }

    #[tokio::test]
    async fn existing_profile_is_kept_on_sign_in() {
        let state = state_with(open_sessions()).await;
        let mut first = claims("abc", "password", true);
        first.display_name = Some("Ana".into());
        open_session(&state, None, first).await.unwrap();

        let mut second = claims("abc", "password", true);
        second.display_name = Some("Someone Else".into());
        let session = open_session(&state, None, second).await.unwrap();
        assert_eq!(session.user.name, "Ana");
    }

    #[tokio::test]
    async fn unverified_password_sign_in_is_refused() {
        let state = state_with(open_sessions()).await;
        let err = open_session(&state, None, claims("abc", "password", false))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
        assert!(user_service::find_user(&state, "abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn gateway_key_is_enforced_when_configured() {
        let config = AppConfig::from_json(r#"{"identity_gateway_key": "k"}"#).unwrap();
        let state = state_with(config).await;

        let err = open_session(&state, Some("wrong"), claims("abc", "google.com", true))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
        assert!(
            open_session(&state, Some("k"), claims("abc", "google.com", true))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn hand_over_is_closed_without_a_gateway_key() {
        let state = state_with(AppConfig::default()).await;

        let err = open_session(&state, None, claims("abc", "password", true))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::GatewayNotConfigured));
        let err = open_session(&state, Some("anything"), claims("abc", "google.com", true))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::GatewayNotConfigured));
        assert!(user_service::find_user(&state, "abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_key_header_is_refused_when_a_key_is_configured() {
        let config = AppConfig::from_json(
            r#"{"identity_gateway_key": "k", "allow_open_sessions": true}"#,
        )
        .unwrap();
        let state = state_with(config).await;

        let err = open_session(&state, None, claims("abc", "google.com", true))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn signed_out_token_stops_resolving() {
        let state = state_with(open_sessions()).await;
        let session = open_session(&state, None, claims("abc", "google.com", true))
            .await
            .unwrap();

        sign_out(&state, &session.token);
        assert!(matches!(
            current_user(&state, &session.token).await,
            Err(ServiceError::Unauthorized(_))
        ));
    }
}
