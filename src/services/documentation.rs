use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the padel roster service.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::auth::open_session,
        crate::routes::auth::current_session,
        crate::routes::auth::sign_out,
        crate::routes::users::list_users,
        crate::routes::users::get_me,
        crate::routes::users::update_me,
        crate::routes::matches::list_matches,
        crate::routes::matches::create_match,
        crate::routes::matches::get_match,
        crate::routes::matches::update_match,
        crate::routes::matches::join_match,
        crate::routes::matches::leave_match,
        crate::routes::matches::join_waiting_list,
        crate::routes::matches::leave_waiting_list,
        crate::routes::matches::set_score,
        crate::routes::matches::shuffle_teams,
        crate::routes::matches::share_match,
        crate::routes::matches::cleanup_expired,
        crate::routes::stats::stats,
        crate::routes::sse::snapshot_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::auth::SessionClaims,
            crate::dto::auth::SessionResponse,
            crate::dto::auth::CurrentSessionResponse,
            crate::dto::common::UserSummary,
            crate::dto::users::UpdateProfileRequest,
            crate::dto::matches::CreateMatchRequest,
            crate::dto::matches::UpdateMatchRequest,
            crate::dto::matches::ScoreRequest,
            crate::dto::matches::MatchSummary,
            crate::dto::matches::ScoreUpdateResponse,
            crate::dto::matches::CleanupResponse,
            crate::dto::share::ShareKind,
            crate::dto::share::ShareResponse,
            crate::dto::stats::StatsResponse,
            crate::dto::sse::MatchesSnapshot,
            crate::dto::sse::UsersSnapshot,
            crate::dto::sse::SystemStatus,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Sessions handed over by the identity gateway"),
        (name = "users", description = "User profiles"),
        (name = "matches", description = "Match catalogue"),
        (name = "roster", description = "Players, waiting list, teams and score of a match"),
        (name = "stats", description = "Rankings"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by the guarded routes.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
