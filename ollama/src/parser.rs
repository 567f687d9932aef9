use std::time::Duration;

use bytes::Bytes;
use bytes::BytesMut;
use futures::Stream;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::Value as JsonValue;

use crate::error::OllamaError;
use crate::pull::DownloadProgress;
use crate::pull::PullEvent;

/// Longest record kept while waiting for its newline. Longer lines are dropped.
const MAX_LINE_BYTES: usize = 64 * 1024;

/// Convert a single JSON record from `/api/pull` into zero or more events.
pub(crate) fn pull_events_from_value(value: &JsonValue) -> Vec<PullEvent> {
    if let Some(err) = value.get("error").and_then(|e| e.as_str()) {
        return vec![PullEvent::Error(err.to_string())];
    }

    let status = value
        .get("status")
        .and_then(|s| s.as_str())
        .map(str::to_string);
    if status.as_deref() == Some("success") {
        return vec![PullEvent::Success];
    }

    let completed = value.get("completed").and_then(JsonValue::as_u64);
    let total = value.get("total").and_then(JsonValue::as_u64);
    if completed.is_some() || total.is_some() {
        let digest = value
            .get("digest")
            .and_then(|d| d.as_str())
            .map(str::to_string);
        return vec![PullEvent::Progress(DownloadProgress {
            status,
            digest,
            completed,
            total,
        })];
    }

    status.map(PullEvent::Status).into_iter().collect()
}

/// Split a byte stream into newline-delimited JSON values.
///
/// Lines that are empty, not UTF-8, not JSON or longer than
/// [`MAX_LINE_BYTES`] are skipped. A transport error
/// or `idle_timeout` elapsing between chunks is yielded once and ends the
/// stream.
pub(crate) fn decode_json_lines<S>(
    body: S,
    idle_timeout: Duration,
    url: String,
) -> BoxStream<'static, Result<JsonValue, OllamaError>>
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    let mut body = Box::pin(body);
    let mut buf = BytesMut::new();
    // Bytes of `buf` already known to hold no newline.
    let mut scanned = 0;
    // Inside an oversized line; drop everything up to its newline.
    let mut discarding = false;

    let s = async_stream::stream! {
        loop {
            let chunk = match tokio::time::timeout(idle_timeout, body.next()).await {
                Ok(Some(Ok(chunk))) => chunk,
                Ok(Some(Err(err))) => {
                    yield Err(OllamaError::from_reqwest(&url, err));
                    return;
                }
                Ok(None) => break,
                Err(_) => {
                    yield Err(OllamaError::Connectivity {
                        url: url.clone(),
                        reason: format!("no data received for {}s", idle_timeout.as_secs()),
                    });
                    return;
                }
            };
            buf.extend_from_slice(&chunk);
            while let Some(pos) = buf[scanned..].iter().position(|b| *b == b'\n') {
                let line = buf.split_to(scanned + pos + 1);
                scanned = 0;
                if std::mem::take(&mut discarding) {
                    continue;
                }
                if let Some(value) = decode_line(&line) {
                    yield Ok(value);
                }
            }
            scanned = buf.len();
            if buf.len() > MAX_LINE_BYTES {
                tracing::debug!("skipping stream line longer than {MAX_LINE_BYTES} bytes");
                buf.clear();
                scanned = 0;
                discarding = true;
            }
        }
        // The final record may not be newline-terminated.
        if !discarding {
            if let Some(value) = decode_line(&buf) {
                yield Ok(value);
            }
        }
    };

    Box::pin(s)
}

fn decode_line(line: &[u8]) -> Option<JsonValue> {
    let text = std::str::from_utf8(line).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<JsonValue>(text) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!("skipping malformed stream line {text:?}: {err}");
            None
        }
    }
}
