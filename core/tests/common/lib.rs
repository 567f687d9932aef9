#![allow(clippy::expect_used)]

use std::time::Duration;

use testgen_core::DownloadConfirmer;
use testgen_core::config::Config;
use testgen_core::error::Result;
use testgen_ollama::ModelDescriptor;
use testgen_ollama::PullEvent;
use testgen_ollama::PullProgressReporter;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

/// Returns a `Config` pointed at `server` with short timeouts so failing
/// tests fail fast.
pub fn config_for_server(server: &MockServer, manage_model: bool) -> Config {
    Config {
        model: "codellama".to_string(),
        base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
        pull_timeout: Duration::from_secs(5),
        manage_model,
    }
}

/// Mount `GET /api/tags` listing `names`, expecting exactly `calls` hits.
pub async fn mount_tags(server: &MockServer, names: &[&str], calls: u64) {
    let models: Vec<serde_json::Value> = names
        .iter()
        .map(|name| serde_json::json!({ "name": name, "size": 1024 }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "models": models })),
        )
        .expect(calls)
        .mount(server)
        .await;
}

/// Mount `POST /api/pull` streaming `lines`, expecting exactly `calls` hits.
pub async fn mount_pull(server: &MockServer, lines: &[&str], calls: u64) {
    let mut body = lines.join("\n");
    body.push('\n');
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .expect(calls)
        .mount(server)
        .await;
}

/// Mount `POST /api/generate` answering with `generated` as the `response`.
pub async fn mount_generate(server: &MockServer, generated: &str, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "codellama",
                "response": generated,
                "done": true,
            })),
        )
        .expect(calls)
        .mount(server)
        .await;
}

/// Progress reporter that keeps every event for later assertions.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Vec<PullEvent>,
}

impl PullProgressReporter for RecordingReporter {
    fn on_event(&mut self, event: &PullEvent) -> std::io::Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}

impl RecordingReporter {
    /// Completion percentages of progress events with a known total.
    pub fn percents(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|event| match event {
                PullEvent::Progress(progress) => progress.percent(),
                _ => None,
            })
            .collect()
    }
}

/// Confirmer with a fixed answer that records how often it was asked.
pub struct ScriptedConfirmer {
    answer: bool,
    pub asked: Vec<(String, Option<ModelDescriptor>)>,
}

impl ScriptedConfirmer {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Vec::new(),
        }
    }
}

impl DownloadConfirmer for ScriptedConfirmer {
    async fn confirm(&mut self, model: &str, descriptor: Option<&ModelDescriptor>) -> Result<bool> {
        self.asked.push((model.to_string(), descriptor.cloned()));
        Ok(self.answer)
    }
}
