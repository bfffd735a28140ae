use axum::{
    Extension, Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware,
    routing::{get, post},
};

use crate::{
    dto::auth::{CurrentSessionResponse, SessionClaims, SessionResponse},
    error::AppError,
    routes::{
        payload::ValidJson,
        session::{CurrentUser, bearer_token, require_session},
    },
    services::auth_service,
    state::SharedState,
};

const GATEWAY_KEY_HEADER: &str = "x-identity-gateway-key";

/// Session hand-over from the identity gateway.
#[utoipa::path(
    post,
    path = "/auth/session",
    tag = "auth",
    params(("X-Identity-Gateway-Key" = Option<String>, Header, description = "Shared key of the identity gateway, when configured")),
    request_body = SessionClaims,
    responses(
        (status = 200, description = "Session opened", body = SessionResponse),
        (status = 400, description = "Malformed claims"),
        (status = 401, description = "Unverified account or invalid gateway key"),
        (status = 503, description = "No identity gateway configured")
    )
)]
pub async fn open_session(
    State(state): State<SharedState>,
    headers: HeaderMap,
    ValidJson(claims): ValidJson<SessionClaims>,
) -> Result<Json<SessionResponse>, AppError> {
    let gateway_key = headers
        .get(GATEWAY_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    Ok(Json(
        auth_service::open_session(&state, gateway_key, claims).await?,
    ))
}

/// User bound to the presented bearer token.
#[utoipa::path(
    get,
    path = "/auth/session",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current session", body = CurrentSessionResponse),
        (status = 401, description = "Missing or unknown token")
    )
)]
pub async fn current_session(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<CurrentSessionResponse> {
    Json(CurrentSessionResponse { user: user.into() })
}

/// Revoke the presented bearer token.
#[utoipa::path(
    delete,
    path = "/auth/session",
    tag = "auth",
    security(("bearer" = [])),
    responses((status = 204, description = "Signed out"))
)]
pub async fn sign_out(State(state): State<SharedState>, req: Request<Body>) -> StatusCode {
    if let Some(token) = bearer_token(&req) {
        auth_service::sign_out(&state, &token);
    }
    StatusCode::NO_CONTENT
}

/// Session routes. Only `GET` needs a live session.
pub fn router(state: SharedState) -> Router<SharedState> {
    let guarded = Router::new()
        .route("/auth/session", get(current_session))
        .route_layer(middleware::from_fn_with_state(state, require_session));

    Router::new()
        .route("/auth/session", post(open_session).delete(sign_out))
        .merge(guarded)
}
