//! Root of the `testgen-core` library.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output goes through writers supplied by the caller or the
// tracing stack.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod acquire;
pub mod config;
pub mod error;
mod flags;
pub mod generator;
pub mod prompt;
pub mod response;

pub use acquire::AcquisitionOutcome;
pub use acquire::AssumeYes;
pub use acquire::DownloadConfirmer;
pub use acquire::PromptConfirmer;
pub use acquire::ensure_model_available;
pub use generator::TestCaseGenerator;
pub use prompt::build_generation_request;
pub use response::GenerationResult;
pub use response::extract;
