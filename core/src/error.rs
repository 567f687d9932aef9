use std::io;

use testgen_ollama::OllamaError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TestgenErr>;

/// Ways the generated content can fail to have the `test_cases` shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("response is not a JSON object (found {found})")]
    NotAnObject { found: &'static str },

    #[error("response does not contain 'test_cases' key")]
    MissingTestCases,

    #[error("'test_cases' value is not a list (found {found})")]
    TestCasesNotAList { found: &'static str },

    #[error("'test_cases[{index}]' is not a string (found {found})")]
    NonStringTestCase { index: usize, found: &'static str },
}

#[derive(Error, Debug)]
pub enum TestgenErr {
    /// Transport and registry failures, passed through untouched.
    #[error(transparent)]
    Ollama(#[from] OllamaError),

    /// The operator answered "no" to the download prompt.
    #[error("download of model '{model}' was declined")]
    AcquisitionDeclined { model: String },

    /// The server answered, but the generated text is not JSON.
    #[error("failed to parse JSON response from Ollama: {0}")]
    MalformedGeneration(#[source] serde_json::Error),

    #[error("{0}")]
    SchemaViolation(#[from] SchemaViolation),

    /// Operator interrupt (Ctrl-C or end of input at a prompt).
    #[error("operation cancelled by user")]
    Interrupted,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl TestgenErr {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, TestgenErr::Interrupted)
    }

    /// Follow-up advice shown under the error message, if any.
    pub fn hint(&self) -> Option<String> {
        match self {
            TestgenErr::Ollama(OllamaError::Connectivity { .. }) => Some(
                "Make sure Ollama is running and accessible at the specified URL. \
                 You can start Ollama with: ollama serve"
                    .to_string(),
            ),
            TestgenErr::Ollama(OllamaError::ModelNotFound { model }) => {
                Some(format!("Please pull it with: ollama pull {model}"))
            }
            TestgenErr::MalformedGeneration(_) | TestgenErr::SchemaViolation(_) => Some(
                "The AI response was not in the expected format. Try running the command again."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

pub fn get_error_message_ui(e: &TestgenErr) -> String {
    match e {
        TestgenErr::SchemaViolation(violation) => format!("Error: {violation}"),
        TestgenErr::AcquisitionDeclined { .. } => "Model download cancelled by user.".to_string(),
        _ => format!("Error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn schema_violation_messages_name_the_field() {
        assert_eq!(
            SchemaViolation::MissingTestCases.to_string(),
            "response does not contain 'test_cases' key"
        );
        assert_eq!(
            SchemaViolation::TestCasesNotAList { found: "string" }.to_string(),
            "'test_cases' value is not a list (found string)"
        );
    }

    #[test]
    fn declined_is_reported_as_cancelled_download() {
        let err = TestgenErr::AcquisitionDeclined {
            model: "codellama".to_string(),
        };
        assert_eq!(get_error_message_ui(&err), "Model download cancelled by user.");
        assert_eq!(err.hint(), None);
    }

    #[test]
    fn missing_model_hint_names_pull_command() {
        let err = TestgenErr::from(OllamaError::ModelNotFound {
            model: "phi3".to_string(),
        });
        assert_eq!(
            get_error_message_ui(&err),
            "Error: model 'phi3' is not available on the Ollama server"
        );
        assert_eq!(
            err.hint().as_deref(),
            Some("Please pull it with: ollama pull phi3")
        );
    }
}
