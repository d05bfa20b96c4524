//! Server-Sent Events (SSE) stream of execution results.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::state::AppState;

/// `GET /api/history/stream`: SSE stream of execution results.
///
/// Each result is sent as a JSON `data:` frame under the `execution` event
/// name as soon as it is appended to history. The stream continues until
/// the client disconnects.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let results = BroadcastStream::new(state.engine.subscribe_results()).filter_map(|result| {
        match result {
            Ok(execution) => match serde_json::to_string(&execution) {
                Ok(json) => Some(Ok(Event::default().event("execution").data(json))),
                Err(err) => {
                    tracing::warn!(%err, "failed to serialize execution result for SSE stream");
                    None
                }
            },
            Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "SSE subscriber lagged, some results were dropped");
                None
            }
        }
    });

    Sse::new(results).keep_alive(KeepAlive::default())
}
