//! Turning the raw `/api/generate` envelope into a validated
//! [`GenerationResult`].
//!
//! The envelope's `response` field holds the model output as a string. That
//! string must itself decode to `{"test_cases": [<string>, ...]}`; nothing is
//! coerced, so a bare string is never wrapped into a one-element list.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::error::SchemaViolation;
use crate::error::TestgenErr;

/// Envelope field carrying the generated text.
const RESPONSE_FIELD: &str = "response";
const TEST_CASES_KEY: &str = "test_cases";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub test_cases: Vec<String>,
}

/// Extract and validate the generated test cases from a server envelope.
pub fn extract(envelope: &JsonValue) -> Result<GenerationResult> {
    let generated_text = envelope
        .get(RESPONSE_FIELD)
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    tracing::trace!("generated text: {generated_text}");

    let parsed: JsonValue =
        serde_json::from_str(generated_text).map_err(TestgenErr::MalformedGeneration)?;
    Ok(validate(&parsed)?)
}

/// Enforce the `test_cases` shape on already-decoded content.
pub fn validate(value: &JsonValue) -> std::result::Result<GenerationResult, SchemaViolation> {
    let object = value.as_object().ok_or(SchemaViolation::NotAnObject {
        found: json_type_name(value),
    })?;
    let test_cases = object
        .get(TEST_CASES_KEY)
        .ok_or(SchemaViolation::MissingTestCases)?;
    let items = test_cases
        .as_array()
        .ok_or(SchemaViolation::TestCasesNotAList {
            found: json_type_name(test_cases),
        })?;

    let test_cases = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or(SchemaViolation::NonStringTestCase {
                    index,
                    found: json_type_name(item),
                })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(GenerationResult { test_cases })
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "list",
        JsonValue::Object(_) => "object",
    }
}
