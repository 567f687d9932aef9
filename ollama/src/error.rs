use reqwest::StatusCode;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OllamaError>;

#[derive(Error, Debug)]
pub enum OllamaError {
    /// The server could not be reached at all: connection refused, DNS
    /// failure, or a deadline elapsed before the server answered.
    #[error("could not reach Ollama at {url}: {reason}")]
    Connectivity { url: String, reason: String },

    /// Non-2xx response that is not attributable to a missing model.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    /// The server answered 404 with a "not found" error for the model.
    #[error("model '{model}' is not available on the Ollama server")]
    ModelNotFound { model: String },

    /// A 2xx response whose body is not JSON.
    #[error("invalid JSON from {url}: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The pull stream reported an error or closed before `success`.
    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl OllamaError {
    /// Classify a `reqwest` failure that happened before a status code was
    /// available (or while reading the body).
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed ({err})")
        } else {
            err.to_string()
        };
        OllamaError::Connectivity {
            url: url.to_string(),
            reason,
        }
    }

    /// Re-classify a 404 whose JSON body carries a "not found" error as
    /// [`OllamaError::ModelNotFound`]. A 404 with an unparsable body stays a
    /// generic [`OllamaError::UnexpectedStatus`].
    pub(crate) fn for_model(self, model: &str) -> Self {
        match self {
            OllamaError::UnexpectedStatus { status, body }
                if status == StatusCode::NOT_FOUND && body_reports_not_found(&body) =>
            {
                OllamaError::ModelNotFound {
                    model: model.to_string(),
                }
            }
            other => other,
        }
    }
}

fn body_reports_not_found(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|e| e.as_str())
                .map(|e| e.to_lowercase().contains("not found"))
        })
        .unwrap_or(false)
}
