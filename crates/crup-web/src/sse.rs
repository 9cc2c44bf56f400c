//! Server-Sent Events (SSE) stream of [`AppEvent`]s.
//!
//! Each event is sent with its `type` as the SSE event name and the JSON
//! body as data. A client that falls behind the broadcast buffer receives a
//! `resync` event and should reload its view.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_core::Stream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::warn;

use crate::state::{AppEvent, SharedState};

pub async fn sse_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.subscribe()).filter_map(|item| match item {
        Ok(event) => to_sse(&event).map(Ok),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            Some(Ok(Event::default().event("resync").data(skipped.to_string())))
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn to_sse(event: &AppEvent) -> Option<Event> {
    match Event::default().event(event.kind()).json_data(event) {
        Ok(ev) => Some(ev),
        Err(e) => {
            warn!(error = %e, kind = event.kind(), "Dropping unserializable event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_matches_serde_tag() {
        let ev = AppEvent::DomainRemoved { id: "physics".into() };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["type"], ev.kind());
        assert!(to_sse(&ev).is_some());
    }
}
