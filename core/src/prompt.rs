use testgen_ollama::GenerationRequest;
use testgen_ollama::OutputFormat;

/// Embed `feature_description` into the fixed QA instruction.
pub fn build_prompt(feature_description: &str) -> String {
    format!(
        "You are a QA automation expert. Given the following feature description, \
         write a list of high-level test cases in JSON format. The JSON should have \
         a single key called 'test_cases'. The test cases should cover functional \
         and edge cases. Feature: {feature_description}."
    )
}

/// Build the non-streaming, JSON-constrained generation request for `model`.
pub fn build_generation_request(model: &str, feature_description: &str) -> GenerationRequest {
    GenerationRequest {
        model: model.to_string(),
        prompt: build_prompt(feature_description),
        format: Some(OutputFormat::Json),
        stream: false,
    }
}
