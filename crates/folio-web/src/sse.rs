//! Server-Sent Events for live dashboard updates

use axum::response::sse::{Event, KeepAlive, Sse};
use folio_core::{DataEvent, EventBus};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Create an SSE stream from the event bus
/// Takes EventBus by value (cheap clone, Arc internally)
pub fn create_sse_stream(event_bus: EventBus) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = event_bus.subscribe();
    let stream = BroadcastStream::new(rx);

    // Lagged receivers skip the missed events
    let sse_stream = stream.filter_map(|result: Result<DataEvent, _>| {
        result.ok().map(|event| Ok(to_sse_event(&event)))
    });

    Sse::new(sse_stream).keep_alive(KeepAlive::default())
}

/// Event name plus a small JSON payload
pub fn to_sse_event(event: &DataEvent) -> Event {
    let data = match event {
        DataEvent::ViewRecorded { item_id } => json!({ "itemId": item_id }),
        DataEvent::EventRecorded { event_type } => json!({ "eventType": event_type }),
        DataEvent::InquiryReceived(id) | DataEvent::ItemCreated(id) | DataEvent::CategoryCreated(id) => {
            json!({ "id": id })
        }
    };
    Event::default().event(event.name()).data(data.to_string())
}
