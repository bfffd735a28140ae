use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::sse::ServerEvent,
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

/// Subscribe to snapshot broadcasts and collect the events a new client
/// should receive first.
///
/// The subscription is taken before the initial snapshots are read, so a
/// write landing in between is delivered rather than lost.
pub async fn subscribe(
    state: &SharedState,
) -> (broadcast::Receiver<ServerEvent>, Vec<ServerEvent>) {
    let receiver = state.sse().subscribe();
    let initial = initial_events(state).await;
    (receiver, initial)
}

async fn initial_events(state: &SharedState) -> Vec<ServerEvent> {
    let snapshots = async {
        Ok::<_, ServiceError>(vec![
            sse_events::matches_snapshot_event(state).await?,
            sse_events::users_snapshot_event(state).await?,
        ])
    };

    match snapshots.await {
        Ok(events) => events,
        Err(err) => {
            warn!(error = %err, "initial snapshots unavailable; reporting degraded status");
            sse_events::system_status_event(true)
                .map(|event| vec![event])
                .unwrap_or_default()
        }
    }
}

/// Convert a broadcast receiver into an SSE response, replaying `initial`
/// first and forwarding events until the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    initial: Vec<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        for payload in initial {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            // Snapshots are full collections, so the next one catches up.
                            warn!(skipped, "SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        info!("snapshot SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Relay degraded-mode flips to subscribers, and resend snapshots once
/// storage is back.
pub async fn forward_degraded_changes(state: SharedState) {
    let mut watcher = state.degraded_watcher();
    while watcher.changed().await.is_ok() {
        let degraded = *watcher.borrow_and_update();
        sse_events::broadcast_system_status(&state, degraded);
        if !degraded {
            sse_events::broadcast_matches_snapshot(&state).await;
            sse_events::broadcast_users_snapshot(&state).await;
        }
    }
}

fn to_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}
