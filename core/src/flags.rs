use std::time::Duration;

use env_flags::env_flags;

env_flags! {
    pub TESTGEN_MODEL: &str = "codellama";
    pub OLLAMA_BASE_URL: &str = "http://localhost:11434";

    /// Deadline for catalog and generation calls.
    pub TESTGEN_REQUEST_TIMEOUT_MS: Duration = Duration::from_millis(30_000), |value| {
        value.parse().map(Duration::from_millis)
    };

    /// Deadline for the pull response and idle window between pull chunks.
    pub TESTGEN_PULL_TIMEOUT_MS: Duration = Duration::from_millis(300_000), |value| {
        value.parse().map(Duration::from_millis)
    };
}
