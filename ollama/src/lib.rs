//! Client for the handful of Ollama endpoints the test case generator
//! relies on: the model catalog, non-streaming generation and the
//! streaming model pull.

mod client;
mod error;
mod models;
mod parser;
mod pull;
mod url;

pub use client::OllamaClient;
pub use error::OllamaError;
pub use error::Result;
pub use models::GenerationRequest;
pub use models::ModelDescriptor;
pub use models::ModelDetails;
pub use models::OutputFormat;
pub use models::format_size;
pub use models::model_names_match;
pub use pull::CliProgressReporter;
pub use pull::DownloadProgress;
pub use pull::PullEvent;
pub use pull::PullProgressReporter;
pub use url::base_url_to_host_root;

/// Default base URL of a local Ollama server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
