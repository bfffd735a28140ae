use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
};
use std::time::SystemTime;
use uuid::Uuid;

use crate::{
    dto::{
        matches::{
            CleanupResponse, CreateMatchRequest, MatchListQuery, MatchSummary, ScoreRequest, ScoreUpdateResponse,
            UpdateMatchRequest,
        },
        share::{ShareQuery, ShareResponse},
    },
    error::AppError,
    routes::{
        payload::ValidJson,
        session::{CurrentUser, require_session},
    },
    services::{cleanup_service, match_service, share_service},
    state::SharedState,
};

/// Upcoming matches, soonest first.
#[utoipa::path(
    get,
    path = "/matches",
    tag = "matches",
    security(("bearer" = [])),
    params(MatchListQuery),
    responses((status = 200, description = "Matches", body = [MatchSummary]))
)]
pub async fn list_matches(
    State(state): State<SharedState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<MatchListQuery>,
) -> Result<Json<Vec<MatchSummary>>, AppError> {
    Ok(Json(match_service::list_matches(&state, &user, query).await?))
}

/// Schedule a match; the caller organises it and takes the first slot.
#[utoipa::path(
    post,
    path = "/matches",
    tag = "matches",
    security(("bearer" = [])),
    request_body = CreateMatchRequest,
    responses(
        (status = 201, description = "Match created", body = MatchSummary),
        (status = 400, description = "Malformed date, time or court")
    )
)]
pub async fn create_match(
    State(state): State<SharedState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidJson(payload): ValidJson<CreateMatchRequest>,
) -> Result<(StatusCode, Json<MatchSummary>), AppError> {
    let created = match_service::create_match(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/matches/{id}",
    tag = "matches",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Match", body = MatchSummary),
        (status = 404, description = "Unknown match")
    )
)]
pub async fn get_match(
    State(state): State<SharedState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(match_service::get_match(&state, &user, id).await?))
}

/// Organizer edit of the schedule fields.
#[utoipa::path(
    put,
    path = "/matches/{id}",
    tag = "matches",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = UpdateMatchRequest,
    responses(
        (status = 200, description = "Match updated", body = MatchSummary),
        (status = 403, description = "Caller is not the organizer")
    )
)]
pub async fn update_match(
    State(state): State<SharedState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<UpdateMatchRequest>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::update_match(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/matches/{id}/players",
    tag = "roster",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Caller holds a player slot", body = MatchSummary),
        (status = 409, description = "Match is full or kept changing concurrently")
    )
)]
pub async fn join_match(
    State(state): State<SharedState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(match_service::join_match(&state, &user, id).await?))
}

#[utoipa::path(
    delete,
    path = "/matches/{id}/players",
    tag = "roster",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses((status = 200, description = "Caller left; first waiting user promoted", body = MatchSummary))
)]
pub async fn leave_match(
    State(state): State<SharedState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(match_service::leave_match(&state, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/matches/{id}/waiting-list",
    tag = "roster",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Caller queued", body = MatchSummary),
        (status = 409, description = "Match still has open slots")
    )
)]
pub async fn join_waiting_list(
    State(state): State<SharedState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::join_waiting_list(&state, &user, id).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/matches/{id}/waiting-list",
    tag = "roster",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses((status = 200, description = "Caller left the waiting list", body = MatchSummary))
)]
pub async fn leave_waiting_list(
    State(state): State<SharedState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::leave_waiting_list(&state, &user, id).await?,
    ))
}

/// Record, clear or (silently) reject a score sheet.
#[utoipa::path(
    put,
    path = "/matches/{id}/score",
    tag = "roster",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = ScoreRequest,
    responses((status = 200, description = "Score outcome and current match", body = ScoreUpdateResponse))
)]
pub async fn set_score(
    State(state): State<SharedState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoreUpdateResponse>, AppError> {
    Ok(Json(
        match_service::set_score(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/matches/{id}/teams/shuffle",
    tag = "roster",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "New random pairs; score cleared", body = MatchSummary),
        (status = 409, description = "Match does not have four players")
    )
)]
pub async fn shuffle_teams(
    State(state): State<SharedState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(match_service::shuffle_teams(&state, &user, id).await?))
}

/// Shareable message and WhatsApp link.
#[utoipa::path(
    get,
    path = "/matches/{id}/share",
    tag = "matches",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Match identifier"), ShareQuery),
    responses((status = 200, description = "Share text", body = ShareResponse))
)]
pub async fn share_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ShareQuery>,
) -> Result<Json<ShareResponse>, AppError> {
    Ok(Json(
        share_service::share_match(&state, id, query.kind).await?,
    ))
}

/// Delete the caller's own matches that are past their grace period.
#[utoipa::path(
    delete,
    path = "/matches/expired",
    tag = "matches",
    security(("bearer" = [])),
    responses((status = 200, description = "Expired matches removed", body = CleanupResponse))
)]
pub async fn cleanup_expired(
    State(state): State<SharedState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<CleanupResponse>, AppError> {
    let removed =
        cleanup_service::sweep_expired(&state, SystemTime::now(), Some(&user.id)).await?;
    Ok(Json(CleanupResponse { removed }))
}

/// Match catalogue and roster routes, all behind the session guard.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/matches", get(list_matches).post(create_match))
        .route("/matches/expired", delete(cleanup_expired))
        .route("/matches/{id}", get(get_match).put(update_match))
        .route("/matches/{id}/players", post(join_match).delete(leave_match))
        .route(
            "/matches/{id}/waiting-list",
            post(join_waiting_list).delete(leave_waiting_list),
        )
        .route("/matches/{id}/score", put(set_score))
        .route("/matches/{id}/teams/shuffle", post(shuffle_teams))
        .route("/matches/{id}/share", get(share_match))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}
