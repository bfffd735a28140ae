//! padel-roster binary entrypoint wiring REST, SSE, the expiry sweeper and the storage backend.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, bail};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use padel_roster::{
    config::AppConfig,
    dao::roster_store::memory::MemoryRosterStore,
    routes,
    services::{cleanup_service, sse_service},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    if config.identity_gateway_key.is_none() {
        if config.allow_open_sessions {
            warn!("no identity gateway key; accepting unauthenticated session hand-overs");
        } else {
            warn!("no identity gateway key configured; sign-in is disabled");
        }
    }
    let app_state = AppState::new(config);
    install_storage(&app_state).await?;

    tokio::spawn(cleanup_service::run(app_state.clone()));
    tokio::spawn(sse_service::forward_degraded_changes(app_state.clone()));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the backend named by `STORAGE_BACKEND` (`memory` by default).
///
/// Database backends are connected by the storage supervisor in the
/// background; the service answers 503 until they are reachable.
async fn install_storage(state: &SharedState) -> anyhow::Result<()> {
    let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "memory".into());
    match backend.as_str() {
        "memory" => {
            warn!("using the in-memory store; data is lost on restart");
            state.set_store(Arc::new(MemoryRosterStore::new())).await;
        }
        #[cfg(feature = "mongo-store")]
        "mongo" => {
            use padel_roster::dao::{
                roster_store::{
                    RosterStore,
                    mongodb::{MongoConfig, MongoRosterStore},
                },
                storage::StorageError,
            };
            use padel_roster::services::storage_supervisor;

            tokio::spawn(storage_supervisor::run(state.clone(), || async {
                let config = MongoConfig::from_env().await?;
                let store = MongoRosterStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn RosterStore>)
            }));
        }
        #[cfg(feature = "couch-store")]
        "couch" => {
            use padel_roster::dao::{
                roster_store::{
                    RosterStore,
                    couchdb::{CouchConfig, CouchRosterStore},
                },
                storage::StorageError,
            };
            use padel_roster::services::storage_supervisor;

            tokio::spawn(storage_supervisor::run(state.clone(), || async {
                let config = CouchConfig::from_env()?;
                let store = CouchRosterStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn RosterStore>)
            }));
        }
        other => bail!("unsupported STORAGE_BACKEND `{other}`"),
    }
    info!(backend = %backend, "storage backend selected");
    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
