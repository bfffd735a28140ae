use axum::{Json, Router, extract::State, middleware, routing::get};

use crate::{
    dto::stats::StatsResponse, error::AppError, routes::session::require_session,
    services::stats_service, state::SharedState,
};

/// Podium and leaderboards over every user and match.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer" = [])),
    responses((status = 200, description = "Rankings", body = StatsResponse))
)]
pub async fn stats(State(state): State<SharedState>) -> Result<Json<StatsResponse>, AppError> {
    Ok(Json(stats_service::rankings(&state).await?))
}

pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/stats", get(stats))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}
