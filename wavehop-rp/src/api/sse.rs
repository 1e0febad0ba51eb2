//! Server-Sent Events (SSE) stream
//!
//! Streams real-time player events to connected Presentation clients.
//! Every client receives the current state snapshot first, then live
//! events as the controller mutates state.

use crate::api::server::AppContext;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};
use wavehop_common::events::PlayerEvent;

/// GET /events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");

    // Snapshot first so a fresh client renders without waiting for the
    // next mutation
    let initial = PlayerEvent::StateChanged {
        state: ctx.state.snapshot().await,
        timestamp: chrono::Utc::now(),
    };

    let rx = ctx.state.subscribe_events();
    let live = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => encode(&event),
            Err(e) => {
                // Lagged or closed receiver; drop and continue
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    let stream = stream::iter(encode(&initial)).chain(live);

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Serialize a player event into an SSE frame
fn encode(event: &PlayerEvent) -> Option<Result<Event, Infallible>> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Ok(Event::default().event(event.type_str()).data(json))),
        Err(e) => {
            warn!("Failed to serialize event: {}", e);
            None
        }
    }
}
