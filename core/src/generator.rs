use testgen_ollama::OllamaClient;
use testgen_ollama::PullProgressReporter;
use tracing::debug;
use tracing::info;

use crate::acquire::AcquisitionOutcome;
use crate::acquire::DownloadConfirmer;
use crate::acquire::ensure_model_available;
use crate::config::Config;
use crate::error::Result;
use crate::error::TestgenErr;
use crate::prompt::build_generation_request;
use crate::response::GenerationResult;
use crate::response::extract;

/// Runs one generation: optional model acquisition, prompt construction,
/// the generate call and response validation, strictly in that order.
#[derive(Debug, Clone)]
pub struct TestCaseGenerator {
    client: OllamaClient,
    model: String,
    manage_model: bool,
}

impl TestCaseGenerator {
    pub fn new(config: &Config) -> Self {
        let client = OllamaClient::new(&config.base_url)
            .with_request_timeout(config.request_timeout)
            .with_pull_timeout(config.pull_timeout);
        Self {
            client,
            model: config.model.clone(),
            manage_model: config.manage_model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    /// Generate test cases for `feature_description`.
    ///
    /// When model management is enabled the model is made available first;
    /// a declined download ends the run with
    /// [`TestgenErr::AcquisitionDeclined`]. Errors from the client are
    /// returned as-is.
    pub async fn generate<C>(
        &self,
        feature_description: &str,
        confirmer: &mut C,
        reporter: &mut dyn PullProgressReporter,
    ) -> Result<GenerationResult>
    where
        C: DownloadConfirmer,
    {
        if self.manage_model {
            let outcome =
                ensure_model_available(&self.client, &self.model, confirmer, reporter).await?;
            debug!("acquisition outcome for '{}': {outcome:?}", self.model);
            if outcome == AcquisitionOutcome::Declined {
                return Err(TestgenErr::AcquisitionDeclined {
                    model: self.model.clone(),
                });
            }
        }

        let request = build_generation_request(&self.model, feature_description);
        info!("requesting test cases from '{}'", self.model);
        let envelope = self.client.generate(&request).await?;
        extract(&envelope)
    }
}
