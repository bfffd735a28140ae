use std::convert::Infallible;

use axum::{Router, extract::State, middleware, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{routes::session::require_session, services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/matches",
    tag = "sse",
    security(("bearer" = [])),
    params(("access_token" = Option<String>, Query, description = "Bearer token for clients that cannot set headers")),
    responses((status = 200, description = "`matches.snapshot`, `users.snapshot` and `system.status` events", content_type = "text/event-stream", body = String))
)]
/// Stream full match and user snapshots, starting with the current ones.
pub async fn snapshot_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let (receiver, initial) = sse_service::subscribe(&state).await;
    info!("New snapshot SSE connection");
    sse_service::to_sse_stream(receiver, initial)
}

/// Configure the SSE endpoints.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/matches", get(snapshot_stream))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}
