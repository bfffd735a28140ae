/// Session hand-over and bearer-token resolution.
pub mod auth_service;
/// Expiry sweeper for past matches.
pub mod cleanup_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Match catalogue and roster intents.
pub mod match_service;
/// Shareable match messages.
pub mod share_service;
/// Server-Sent Events snapshot payloads.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Rankings over users and matches.
pub mod stats_service;
/// Storage connection supervisor with backoff.
pub mod storage_supervisor;
/// User profiles.
pub mod user_service;
