use axum::{
    Extension, Json, Router,
    extract::State,
    middleware,
    routing::get,
};

use crate::{
    dto::{common::UserSummary, users::UpdateProfileRequest},
    error::AppError,
    routes::{
        payload::ValidJson,
        session::{CurrentUser, require_session},
    },
    services::user_service,
    state::SharedState,
};

/// Every registered user.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer" = [])),
    responses((status = 200, description = "Registered users", body = [UserSummary]))
)]
pub async fn list_users(
    State(state): State<SharedState>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    Ok(Json(user_service::list_users(&state).await?))
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    security(("bearer" = [])),
    responses((status = 200, description = "Caller's profile", body = UserSummary))
)]
pub async fn get_me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserSummary> {
    Json(user.into())
}

/// Edit the caller's own profile.
#[utoipa::path(
    put,
    path = "/users/me",
    tag = "users",
    security(("bearer" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserSummary),
        (status = 400, description = "Blank name or malformed date of birth")
    )
)]
pub async fn update_me(
    State(state): State<SharedState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidJson(payload): ValidJson<UpdateProfileRequest>,
) -> Result<Json<UserSummary>, AppError> {
    Ok(Json(
        user_service::update_profile(&state, &user, payload).await?,
    ))
}

/// Profile routes, all behind the session guard.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/me", get(get_me).put(update_me))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}
