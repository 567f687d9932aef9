use std::collections::BTreeSet;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::Value as JsonValue;

use crate::error::OllamaError;
use crate::error::Result;
use crate::models::GenerationRequest;
use crate::models::ModelDescriptor;
use crate::models::model_names_match;
use crate::parser::decode_json_lines;
use crate::parser::pull_events_from_value;
use crate::pull::PullEvent;
use crate::pull::PullProgressReporter;
use crate::url::base_url_to_host_root;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PULL_TIMEOUT: Duration = Duration::from_secs(300);

/// Client for interacting with a local Ollama instance.
///
/// Unary calls (catalog, generation) are bounded by `request_timeout`. The
/// pull uses `pull_timeout` both for the initial response and as the idle
/// window between streamed chunks, so a large download is never cut off
/// while data keeps arriving.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    host_root: String,
    request_timeout: Duration,
    pull_timeout: Duration,
}

impl OllamaClient {
    /// Build a client for `base_url`, e.g. `http://localhost:11434`.
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            host_root: base_url_to_host_root(base_url),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            pull_timeout: DEFAULT_PULL_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_pull_timeout(mut self, timeout: Duration) -> Self {
        self.pull_timeout = timeout;
        self
    }

    pub fn host_root(&self) -> &str {
        &self.host_root
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.host_root)
    }

    // ---------------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------------

    /// `GET path` and decode the JSON body.
    pub async fn get_json(&self, path: &str) -> Result<JsonValue> {
        let url = self.url(path);
        tracing::debug!("GET {url}");
        let request = self.client.get(&url).timeout(self.request_timeout);
        let resp = send(request, &url).await?;
        read_json(resp, &url).await
    }

    /// `POST path` with a JSON body and decode the JSON response.
    pub async fn post_json(&self, path: &str, body: &JsonValue) -> Result<JsonValue> {
        let url = self.url(path);
        tracing::debug!("POST {url}");
        let request = self
            .client
            .post(&url)
            .json(body)
            .timeout(self.request_timeout);
        let resp = send(request, &url).await?;
        read_json(resp, &url).await
    }

    /// `POST path` and return the response as a lazy, single-pass sequence
    /// of newline-delimited JSON records.
    pub async fn post_json_lines(
        &self,
        path: &str,
        body: &JsonValue,
    ) -> Result<BoxStream<'static, Result<JsonValue>>> {
        let url = self.url(path);
        tracing::debug!("POST {url} (streaming)");
        let request = self.client.post(&url).json(body);
        let sent = tokio::time::timeout(self.pull_timeout, send(request, &url)).await;
        let resp = match sent {
            Ok(resp) => resp?,
            Err(_) => {
                return Err(OllamaError::Connectivity {
                    url,
                    reason: format!(
                        "no response within {}s",
                        self.pull_timeout.as_secs()
                    ),
                });
            }
        };
        Ok(decode_json_lines(
            resp.bytes_stream(),
            self.pull_timeout,
            url,
        ))
    }

    // ---------------------------------------------------------------------
    // Model registry
    // ---------------------------------------------------------------------

    /// Return metadata for every model resident on the server.
    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        let val = self.get_json("/api/tags").await?;
        let models = val
            .get("models")
            .and_then(|m| m.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|entry| {
                        serde_json::from_value::<ModelDescriptor>(entry.clone())
                            .map_err(|err| {
                                tracing::warn!("ignoring unreadable catalog entry {entry}: {err}");
                            })
                            .ok()
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Ok(models)
    }

    /// Return the set of model names known to the local Ollama instance.
    /// An empty catalog is an empty set, not an error.
    pub async fn fetch_models(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .list_models()
            .await?
            .into_iter()
            .map(|m| m.name)
            .collect())
    }

    /// Whether `model` is resident, honoring the implicit `:latest` tag.
    pub async fn has_model(&self, model: &str) -> Result<bool> {
        Ok(self
            .fetch_models()
            .await?
            .iter()
            .any(|name| model_names_match(model, name)))
    }

    /// Look up catalog metadata for `model`. `None` means it is not resident.
    pub async fn describe_model(&self, model: &str) -> Result<Option<ModelDescriptor>> {
        Ok(self
            .list_models()
            .await?
            .into_iter()
            .find(|m| model_names_match(model, &m.name)))
    }

    // ---------------------------------------------------------------------
    // Generation
    // ---------------------------------------------------------------------

    /// Issue a non-streaming generation request and return the raw envelope.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<JsonValue> {
        let body = serde_json::to_value(request).map_err(|source| OllamaError::InvalidJson {
            url: self.url("/api/generate"),
            source,
        })?;
        self.post_json("/api/generate", &body)
            .await
            .map_err(|err| err.for_model(&request.model))
    }

    // ---------------------------------------------------------------------
    // Pull
    // ---------------------------------------------------------------------

    /// Start a model pull and emit streaming events. The returned stream ends
    /// after a `Success` or `Error` event, after a transport failure, or when
    /// the server closes the connection.
    pub async fn pull_model_stream(
        &self,
        model: &str,
    ) -> Result<BoxStream<'static, Result<PullEvent>>> {
        let mut values = self
            .post_json_lines("/api/pull", &serde_json::json!({ "name": model }))
            .await
            .map_err(|err| err.for_model(model))?;

        let s = async_stream::stream! {
            while let Some(item) = values.next().await {
                let value = match item {
                    Ok(value) => value,
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                };
                for ev in pull_events_from_value(&value) {
                    let terminal = matches!(ev, PullEvent::Success | PullEvent::Error(_));
                    yield Ok(ev);
                    if terminal {
                        return;
                    }
                }
            }
        };

        Ok(Box::pin(s))
    }

    /// High-level helper to pull a model and drive a progress reporter.
    pub async fn pull_with_reporter(
        &self,
        model: &str,
        reporter: &mut dyn PullProgressReporter,
    ) -> Result<()> {
        reporter.on_event(&PullEvent::Status(format!(
            "Pulling model '{model}'... This may take a few minutes."
        )))?;
        let mut stream = self.pull_model_stream(model).await?;
        while let Some(event) = stream.next().await {
            let event = event?;
            reporter.on_event(&event)?;
            match event {
                PullEvent::Success => {
                    tracing::info!("pulled model {model}");
                    return Ok(());
                }
                PullEvent::Error(err) => {
                    // Ollama answers 200 OK even when the stream carries an
                    // error, so the event stream decides the outcome.
                    return Err(OllamaError::PullFailed(err));
                }
                PullEvent::Progress(_) | PullEvent::Status(_) => {}
            }
        }
        Err(OllamaError::PullFailed(
            "pull stream ended unexpectedly without success".to_string(),
        ))
    }
}

async fn send(request: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response> {
    let resp = request
        .send()
        .await
        .map_err(|err| OllamaError::from_reqwest(url, err))?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::debug!("{url} answered {status}: {body}");
    Err(OllamaError::UnexpectedStatus { status, body })
}

async fn read_json(resp: reqwest::Response, url: &str) -> Result<JsonValue> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|err| OllamaError::from_reqwest(url, err))?;
    serde_json::from_slice(&bytes).map_err(|source| OllamaError::InvalidJson {
        url: url.to_string(),
        source,
    })
}
