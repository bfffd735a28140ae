use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the roster store and summarise the service state.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let storage_reachable = match state.store().await {
        Some(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "roster store ping failed");
                false
            }
        },
        None => false,
    };

    HealthResponse::new(
        state.is_degraded().await,
        storage_reachable,
        state.sse().subscriber_count(),
    )
}
