use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use ulasan_scraper::{EventSink, JobEvent, ScrapeRequest};

use super::AppState;

/// Start a scrape job and stream its log as Server-Sent Events.
///
/// Each event is `data: {"type": "log" | "result" | "done", "data": ...}`.
/// The job runs on its own task, so a client that disconnects early does
/// not cancel it. A body that fails to parse still yields a failed `result`
/// followed by `done`.
pub(super) async fn start_scrape(
    State(state): State<AppState>,
    body: Bytes,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let (sink, mut rx) = EventSink::channel();

    match serde_json::from_slice::<ScrapeRequest>(&body) {
        Ok(request) => {
            let scraper = state.scraper.clone();
            tokio::spawn(async move {
                scraper.run(request, sink).await;
            });
        }
        Err(e) => {
            tracing::warn!(error = %e, "rejected scrape request body");
            let message = format!("invalid request: {e}");
            sink.log(format!("[ERROR] {message}"));
            sink.send(JobEvent::Result(Err(message))).await;
            sink.send(JobEvent::Done).await;
        }
    }

    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            yield Ok(Event::default().data(event.to_json().to_string()));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
