use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

pub mod auth;
pub mod health;
pub mod matches;
pub mod payload;
pub mod session;
pub mod sse;
pub mod stats;
pub mod users;

const SWAGGER_UI_PATH: &str = "/docs";
const OPENAPI_JSON_PATH: &str = "/api-doc/openapi.json";

/// Compose all route trees, wiring in shared state and the Swagger UI.
pub fn router(state: SharedState) -> Router<()> {
    let swagger: Router<SharedState> = SwaggerUi::new(SWAGGER_UI_PATH)
        .url(OPENAPI_JSON_PATH, ApiDoc::openapi())
        .into();

    health::router()
        .merge(auth::router(state.clone()))
        .merge(users::router(state.clone()))
        .merge(matches::router(state.clone()))
        .merge(stats::router(state.clone()))
        .merge(sse::router(state.clone()))
        .merge(swagger)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::AppConfig, dao::roster_store::memory::MemoryRosterStore, state::AppState};

    const GATEWAY_KEY: &str = "gateway-secret";

    async fn app_with(config: AppConfig) -> Router<()> {
        let state = AppState::new(config);
        state.set_store(Arc::new(MemoryRosterStore::new())).await;
        router(state)
    }

    async fn app() -> Router<()> {
        let config =
            AppConfig::from_json(&json!({ "identity_gateway_key": GATEWAY_KEY }).to_string())
                .unwrap();
        app_with(config).await
    }

    async fn hand_over(app: &Router<()>, gateway_key: Option<&str>, claims: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/auth/session")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = gateway_key {
            builder = builder.header("x-identity-gateway-key", key);
        }
        let request = builder.body(Body::from(claims.to_string())).unwrap();
        read(app.clone().oneshot(request).await.unwrap()).await
    }

    async fn read(response: axum::response::Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn send(
        app: &Router<()>,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        read(app.clone().oneshot(request).await.unwrap()).await
    }

    async fn sign_in(app: &Router<()>, uid: &str, name: &str) -> String {
        let (status, body) = hand_over(
            app,
            Some(GATEWAY_KEY),
            json!({
                "uid": uid,
                "display_name": name,
                "email_verified": true,
                "provider": "password"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_match(app: &Router<()>, token: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/matches",
            Some(token),
            Some(json!({ "date": "2099-05-02", "time": "19:00", "court": "Court 2" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn healthcheck_is_public() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/healthcheck", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage_reachable"], true);
    }

    #[tokio::test]
    async fn roster_routes_require_a_session() {
        let app = app().await;
        let (status, _) = send(&app, Method::GET, "/matches", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::GET, "/matches", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unverified_password_sign_in_is_refused() {
        let app = app().await;
        let (status, body) = hand_over(
            &app,
            Some(GATEWAY_KEY),
            json!({ "uid": "u1", "email_verified": false, "provider": "password" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"].as_str().unwrap().contains("verified"));
    }

    #[tokio::test]
    async fn claims_without_the_gateway_key_cannot_take_over_a_user() {
        let app = app().await;
        let ana = sign_in(&app, "ana", "Ana").await;
        let id = create_match(&app, &ana).await;

        let forged = json!({ "uid": "ana", "email_verified": true, "provider": "password" });
        let (status, _) = hand_over(&app, None, forged.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = hand_over(&app, Some("guess"), forged).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, Method::GET, &format!("/matches/{id}"), Some(&ana), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["court"], "Court 2");
    }

    #[tokio::test]
    async fn hand_over_is_closed_when_no_gateway_is_configured() {
        let app = app_with(AppConfig::default()).await;
        let claims = json!({ "uid": "ana", "email_verified": true, "provider": "password" });

        let (status, body) = hand_over(&app, None, claims.clone()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["message"].as_str().unwrap().contains("not configured"));

        let open = AppConfig::from_json(r#"{"allow_open_sessions": true}"#).unwrap();
        let app = app_with(open).await;
        let (status, body) = hand_over(&app, None, claims).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].is_string());
    }

    #[tokio::test]
    async fn organizer_creates_and_others_join() {
        let app = app().await;
        let ana = sign_in(&app, "ana", "Ana Ruiz").await;
        let bea = sign_in(&app, "bea", "Bea Gil").await;
        let id = create_match(&app, &ana).await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/matches/{id}/players"),
            Some(&bea),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["players"].as_array().unwrap().len(), 2);
        assert_eq!(body["open_slots"], 2);
        assert_eq!(body["viewer"]["role"], "player");
        assert_eq!(body["viewer"]["is_organizer"], false);

        let (status, body) = send(&app, Method::GET, "/matches", Some(&ana), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["viewer"]["is_organizer"], true);
    }

    #[tokio::test]
    async fn malformed_schedule_is_a_bad_request() {
        let app = app().await;
        let ana = sign_in(&app, "ana", "Ana").await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/matches",
            Some(&ana),
            Some(json!({ "date": "02/05/2099", "time": "7pm", "court": "Court 2" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("bad request: validation failed"));
        assert!(message.contains("date"));

        let (status, body) = send(
            &app,
            Method::POST,
            "/matches",
            Some(&ana),
            Some(json!({ "date": "2099-05-02" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn score_on_incomplete_roster_is_not_applied() {
        let app = app().await;
        let ana = sign_in(&app, "ana", "Ana").await;
        let id = create_match(&app, &ana).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/matches/{id}/score"),
            Some(&ana),
            Some(json!({ "team1": [6, 6], "team2": [3, 4] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], false);
        assert!(body["match"].get("score").is_none());
    }

    #[tokio::test]
    async fn waiting_list_opens_only_when_full() {
        let app = app().await;
        let ana = sign_in(&app, "ana", "Ana").await;
        let id = create_match(&app, &ana).await;
        let bea = sign_in(&app, "bea", "Bea").await;

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/matches/{id}/waiting-list"),
            Some(&bea),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        for uid in ["bea", "cai", "dan"] {
            let token = sign_in(&app, uid, uid).await;
            let (status, _) = send(
                &app,
                Method::POST,
                &format!("/matches/{id}/players"),
                Some(&token),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let eva = sign_in(&app, "eva", "Eva").await;
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/matches/{id}/waiting-list"),
            Some(&eva),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_full"], true);
        assert_eq!(body["viewer"]["role"], "waiting");
        assert!(body["teams"]["team_a"].is_array());
    }

    #[tokio::test]
    async fn signed_out_token_is_rejected() {
        let app = app().await;
        let ana = sign_in(&app, "ana", "Ana").await;

        let (status, _) = send(&app, Method::DELETE, "/auth/session", Some(&ana), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, "/auth/session", Some(&ana), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
