#![allow(clippy::expect_used, clippy::unwrap_used)]

use core_test_support::RecordingReporter;
use core_test_support::ScriptedConfirmer;
use core_test_support::config_for_server;
use core_test_support::mount_generate;
use core_test_support::mount_pull;
use core_test_support::mount_tags;
use pretty_assertions::assert_eq;
use testgen_core::TestCaseGenerator;
use testgen_core::build_generation_request;
use testgen_core::error::SchemaViolation;
use testgen_core::error::TestgenErr;
use testgen_ollama::OllamaError;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::method;
use wiremock::matchers::path;

#[tokio::test]
async fn download_then_generate_end_to_end() {
    let server = MockServer::start().await;
    mount_tags(&server, &[], 2).await;
    mount_pull(
        &server,
        &[
            r#"{"status":"pulling"}"#,
            r#"{"completed":50,"total":100}"#,
            r#"{"status":"success"}"#,
        ],
        1,
    )
    .await;

    let expected_request = build_generation_request("codellama", "User login");
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(serde_json::to_value(&expected_request).unwrap()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "{\"test_cases\": [\"Verify valid login\", \"Verify invalid password\"]}"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let generator = TestCaseGenerator::new(&config_for_server(&server, true));
    let mut confirmer = ScriptedConfirmer::answering(true);
    let mut reporter = RecordingReporter::default();

    let result = generator
        .generate("User login", &mut confirmer, &mut reporter)
        .await
        .expect("generation succeeds");
    assert_eq!(
        result.test_cases,
        vec!["Verify valid login", "Verify invalid password"]
    );
    assert_eq!(reporter.percents(), vec![50.0]);
    assert_eq!(confirmer.asked.len(), 1);
}

#[tokio::test]
async fn declined_download_never_generates() {
    let server = MockServer::start().await;
    mount_tags(&server, &[], 2).await;
    mount_pull(&server, &[r#"{"status":"success"}"#], 0).await;
    mount_generate(&server, r#"{"test_cases": []}"#, 0).await;

    let generator = TestCaseGenerator::new(&config_for_server(&server, true));
    let mut confirmer = ScriptedConfirmer::answering(false);
    let mut reporter = RecordingReporter::default();

    let err = generator
        .generate("User login", &mut confirmer, &mut reporter)
        .await
        .unwrap_err();
    assert!(
        matches!(&err, TestgenErr::AcquisitionDeclined { model } if model == "codellama"),
        "err = {err:?}"
    );
}

#[tokio::test]
async fn unmanaged_run_skips_catalog() {
    let server = MockServer::start().await;
    mount_tags(&server, &["codellama:latest"], 0).await;
    mount_generate(&server, r#"{"test_cases": ["a", "b"]}"#, 1).await;

    let generator = TestCaseGenerator::new(&config_for_server(&server, false));
    let mut confirmer = ScriptedConfirmer::answering(true);
    let mut reporter = RecordingReporter::default();

    let result = generator
        .generate("Search", &mut confirmer, &mut reporter)
        .await
        .unwrap();
    assert_eq!(result.test_cases, vec!["a", "b"]);
    assert!(confirmer.asked.is_empty());
}

#[tokio::test]
async fn malformed_generation_is_classified() {
    let server = MockServer::start().await;
    mount_generate(&server, "not valid json", 1).await;

    let generator = TestCaseGenerator::new(&config_for_server(&server, false));
    let err = generator
        .generate(
            "Search",
            &mut ScriptedConfirmer::answering(true),
            &mut RecordingReporter::default(),
        )
        .await
        .unwrap_err();
    assert!(
        matches!(err, TestgenErr::MalformedGeneration(_)),
        "err = {err:?}"
    );
}

#[tokio::test]
async fn schema_violation_is_classified() {
    let server = MockServer::start().await;
    mount_tags(&server, &["codellama:latest"], 1).await;
    mount_generate(&server, r#"{"wrong_key": []}"#, 1).await;

    let generator = TestCaseGenerator::new(&config_for_server(&server, true));
    let err = generator
        .generate(
            "Search",
            &mut ScriptedConfirmer::answering(true),
            &mut RecordingReporter::default(),
        )
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            TestgenErr::SchemaViolation(SchemaViolation::MissingTestCases)
        ),
        "err = {err:?}"
    );
}

#[tokio::test]
async fn missing_model_on_generate_is_model_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": "model \"codellama\" not found, try pulling it first"
        })))
        .mount(&server)
        .await;

    let generator = TestCaseGenerator::new(&config_for_server(&server, false));
    let err = generator
        .generate(
            "Search",
            &mut ScriptedConfirmer::answering(true),
            &mut RecordingReporter::default(),
        )
        .await
        .unwrap_err();
    assert!(
        matches!(
            &err,
            TestgenErr::Ollama(OllamaError::ModelNotFound { model }) if model == "codellama"
        ),
        "err = {err:?}"
    );
}
