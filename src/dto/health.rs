use serde::Serialize;
use utoipa::ToSchema;

/// Payload of `GET /healthcheck`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok`, or `degraded` while the roster store is unreachable.
    pub status: String,
    /// Whether the latest store ping succeeded.
    pub storage_reachable: bool,
    /// Open match snapshot streams.
    pub subscribers: usize,
}

impl HealthResponse {
    pub fn new(degraded: bool, storage_reachable: bool, subscribers: usize) -> Self {
        let status = if degraded || !storage_reachable {
            "degraded"
        } else {
            "ok"
        };
        Self {
            status: status.to_string(),
            storage_reachable,
            subscribers,
        }
    }
}
