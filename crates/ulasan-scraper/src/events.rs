//! Progress events emitted while a scrape job runs.

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use ulasan_sentiment::Row;

/// Events buffered between a running job and its consumer.
pub const EVENT_BUFFER: usize = 1024;

/// Successful scrape summary carried by the `result` event.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeSummary {
    pub job_id: String,
    pub count: usize,
    pub preview: Vec<Row>,
    pub file_id: String,
    pub file_url: String,
}

#[derive(Debug, Clone)]
pub enum JobEvent {
    /// One tagged log line, e.g. `[OUT] 20 tweets`.
    Log(String),
    Result(Result<ScrapeSummary, String>),
    Done,
}

impl JobEvent {
    /// Wire form: `{"type": "log" | "result" | "done", "data": ...}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            JobEvent::Log(line) => json!({ "type": "log", "data": line }),
            JobEvent::Result(Ok(summary)) => {
                let mut data = serde_json::to_value(summary).unwrap_or_else(|_| json!({}));
                if let Value::Object(map) = &mut data {
                    map.insert("ok".to_string(), Value::Bool(true));
                }
                json!({ "type": "result", "data": data })
            }
            JobEvent::Result(Err(error)) => {
                json!({ "type": "result", "data": { "ok": false, "error": error } })
            }
            JobEvent::Done => json!({ "type": "done", "data": null }),
        }
    }
}

/// Sending half of a job's event stream.
///
/// Log lines are sent without waiting: when the consumer lags and the
/// buffer is full the line is dropped. `result` and `done` wait for room.
/// A consumer that disconnected mid-job just stops receiving, and the job
/// runs to completion.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<JobEvent>,
}

impl EventSink {
    #[must_use]
    pub fn new(tx: Sender<JobEvent>) -> Self {
        Self { tx }
    }

    /// A sink paired with its receiver, buffering [`EVENT_BUFFER`] events.
    #[must_use]
    pub fn channel() -> (Self, Receiver<JobEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        (Self::new(tx), rx)
    }

    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(line = %line, "job log");
        if let Err(TrySendError::Full(_)) = self.tx.try_send(JobEvent::Log(line)) {
            tracing::debug!("event consumer lagging, log line dropped");
        }
    }

    pub async fn send(&self, event: JobEvent) {
        let _ = self.tx.send(event).await;
    }
}
