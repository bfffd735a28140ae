pub mod roster;
pub mod schedule;
pub mod score;
mod session;
mod sse;
pub mod stats;

use std::sync::Arc;

use tokio::sync::{Notify, RwLock, watch};

use crate::{config::AppConfig, dao::roster_store::RosterStore, error::ServiceError};

pub use self::session::SessionRegistry;
pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

const SSE_CAPACITY: usize = 32;

/// Central application state holding the storage handle, live subscribers
/// and open sessions.
pub struct AppState {
    store: RwLock<Option<Arc<dyn RosterStore>>>,
    degraded: watch::Sender<bool>,
    sse: SseHub,
    sessions: SessionRegistry,
    config: AppConfig,
    matches_changed: Notify,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            degraded: degraded_tx,
            sse: SseHub::new(SSE_CAPACITY),
            sessions: SessionRegistry::new(config.session_ttl),
            config,
            matches_changed: Notify::new(),
        })
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn RosterStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store or [`ServiceError::Degraded`] when none is installed.
    pub async fn require_store(&self) -> Result<Arc<dyn RosterStore>, ServiceError> {
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a store implementation and leave degraded mode.
    pub async fn set_store(&self, store: Arc<dyn RosterStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Broadcast hub used for the snapshot SSE stream.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Wake the expiry sweeper after the match collection changed.
    pub fn notify_matches_changed(&self) {
        self.matches_changed.notify_one();
    }

    pub fn matches_changed(&self) -> &Notify {
        &self.matches_changed
    }
}
