//! Bearer-token session guard shared by the authenticated route trees.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::{
    dao::models::UserEntity, error::AppError, services::auth_service, state::SharedState,
};

/// Query string accepted in place of the header, for EventSource clients.
#[derive(Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

/// User resolved from the request's bearer token.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub UserEntity);

/// Reject requests without a live session and expose the caller as
/// [`CurrentUser`] to the handlers.
pub async fn require_session(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req).ok_or_else(|| {
        AppError::Unauthorized("missing bearer token in `Authorization` header".into())
    })?;

    let user = auth_service::current_user(&state, &token).await?;
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Token from `Authorization: Bearer <token>`, or the `access_token` query parameter.
pub fn bearer_token<B>(req: &Request<B>) -> Option<String> {
    let from_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_owned());

    from_header
        .or_else(|| {
            Query::<TokenQuery>::try_from_uri(req.uri())
                .ok()
                .and_then(|Query(query)| query.access_token)
        })
        .filter(|token| !token.is_empty())
}
