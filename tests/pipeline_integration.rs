//! Integration tests for the full extraction pipeline.
//!
//! These tests drive the pipeline end to end against mock capabilities:
//! 1. Acquire text (inline or external, by size)
//! 2. Infer a structured candidate
//! 3. Validate and classify against the canonical schema
//! 4. Assemble the annotated result

use std::sync::Arc;
use std::time::Duration;

use resume_extraction::{
    testing::{MockInference, MockPdfService, PdfCall},
    AcquisitionPath, ExtractionPipeline, PipelineConfig, RequestOptions, ValidationMode,
    CANONICAL_FIELDS,
};

fn fast_config() -> PipelineConfig {
    PipelineConfig::new().with_retry_backoff_base(Duration::from_millis(1))
}

fn pipeline_with(mock: Arc<MockInference>, config: PipelineConfig) -> ExtractionPipeline {
    ExtractionPipeline::new(mock, config)
}

/// Minimal candidate: one title, one experience entry without dates.
const MINIMAL_CANDIDATE: &str = r#"{
    "desired_titles": ["Software Engineer"],
    "experience": [{"employer": "Acme", "title": "Developer"}]
}"#;

#[tokio::test]
async fn test_end_to_end_scenario() {
    let mock = Arc::new(MockInference::new().with_response(
        r#"{"desired_titles":["Software Engineer"],"experience":[{"employer":"Acme","title":"Senior Developer","start":"2020-01","end":"present"}]}"#,
    ));
    let pipeline = pipeline_with(mock, fast_config());

    let text = "Jane Doe\nSoftware Engineer\nSenior Developer at Acme from 2020-01 to present.";
    let result = pipeline
        .process_text(text, &RequestOptions::new().with_language_hint("en"))
        .await;

    assert!(result.success);
    let record = result.data.unwrap();
    assert_eq!(record.experience[0].end.as_deref(), Some("present"));
    assert_eq!(record.desired_titles, vec!["Software Engineer"]);
    assert!(result.unmapped_fields.contains(&"skills".to_string()));
    assert!(result.unmapped_fields.contains(&"summary".to_string()));
    assert!(result.partial_fields.is_empty());
}

#[tokio::test]
async fn test_flexible_mode_never_aborts_on_missing_optional_data() {
    let mock = Arc::new(MockInference::new().with_response(MINIMAL_CANDIDATE));
    let pipeline = pipeline_with(mock, fast_config());

    let result = pipeline
        .process_text(
            "resume",
            &RequestOptions::new().with_mode(ValidationMode::Flexible),
        )
        .await;

    assert!(result.success);
    assert!(result.partial_fields.contains(&"experience".to_string()));
    assert!(
        result.errors.is_empty(),
        "date-dependent validations must not surface as errors"
    );
}

#[tokio::test]
async fn test_strict_mode_aborts_on_missing_required_data() {
    let mock = Arc::new(MockInference::new().with_response(MINIMAL_CANDIDATE));
    let pipeline = pipeline_with(
        mock,
        fast_config().with_required_fields(["summary"]),
    );

    let result = pipeline
        .process_text(
            "resume",
            &RequestOptions::new().with_mode(ValidationMode::Strict),
        )
        .await;

    assert!(!result.success);
    assert!(result
        .errors
        .iter()
        .any(|e| e.starts_with("SCHEMA_VALIDATION_ERROR")));
    // The partially-built record is still returned for diagnostics.
    assert!(result.data.is_some());
}

#[tokio::test]
async fn test_size_threshold_routing() {
    let threshold = 512;

    // T-1 bytes: inline extractor only.
    let inference = Arc::new(MockInference::new().with_response(MINIMAL_CANDIDATE));
    let small_pdf = Arc::new(MockPdfService::new().with_text("small resume"));
    let pipeline = pipeline_with(inference, fast_config().with_size_threshold(threshold))
        .with_pdf_backends(small_pdf.clone(), small_pdf.clone(), small_pdf.clone());

    let result = pipeline
        .process_pdf(&vec![0u8; threshold - 1], &RequestOptions::new())
        .await;
    assert!(result.success);
    assert_eq!(result.metadata.acquisition_path, Some(AcquisitionPath::Inline));
    assert_eq!(
        small_pdf.calls(),
        vec![PdfCall::InlineExtract { size: threshold - 1 }]
    );

    // T+1 bytes: upload then extract, in order, exactly once each.
    let inference = Arc::new(MockInference::new().with_response(MINIMAL_CANDIDATE));
    let large_pdf = Arc::new(MockPdfService::new().with_text("large resume"));
    let pipeline = pipeline_with(inference, fast_config().with_size_threshold(threshold))
        .with_pdf_backends(large_pdf.clone(), large_pdf.clone(), large_pdf.clone());

    let result = pipeline
        .process_pdf(&vec![0u8; threshold + 1], &RequestOptions::new())
        .await;
    assert!(result.success);
    assert_eq!(
        result.metadata.acquisition_path,
        Some(AcquisitionPath::External)
    );
    assert_eq!(
        large_pdf.calls(),
        vec![
            PdfCall::Upload { size: threshold + 1 },
            PdfCall::RemoteExtract {
                handle: "mock-handle-1".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_retry_bound_produces_inference_failed_result() {
    // N+1 consecutive transient failures against N configured retries:
    // exactly N+1 attempts and a clean failure result, no panic.
    let retries = 2;
    let mock = Arc::new(MockInference::new().with_transient_failures(retries + 1));
    let pipeline = pipeline_with(
        mock.clone(),
        fast_config().with_inference_retries(retries as u32),
    );

    let result = pipeline.process_text("resume", &RequestOptions::new()).await;

    assert!(!result.success);
    assert!(result.data.is_none());
    assert!(result.errors[0].starts_with("INFERENCE_FAILED"));
    assert_eq!(mock.attempts(), retries + 1);
}

#[tokio::test]
async fn test_classification_completeness_across_outcomes() {
    let cases = vec![
        MINIMAL_CANDIDATE.to_string(),
        "{}".to_string(),
        "not json at all".to_string(),
        r#"{"skills": "Rust", "availability": ["odd"]}"#.to_string(),
    ];

    for raw in cases {
        let mock = Arc::new(MockInference::new().with_response(raw.clone()));
        let pipeline = pipeline_with(mock, fast_config());
        let result = pipeline.process_text("resume", &RequestOptions::new()).await;

        // Every annotated field is canonical, and the two lists are disjoint.
        let mut union: Vec<&String> = result
            .unmapped_fields
            .iter()
            .chain(&result.partial_fields)
            .collect();
        for field in &union {
            assert!(
                CANONICAL_FIELDS.contains(&field.as_str()),
                "non-canonical field {field} for input: {raw}"
            );
        }
        let total = union.len();
        union.sort();
        union.dedup();
        assert_eq!(
            union.len(),
            total,
            "partial and unmapped overlap for input: {raw}"
        );

        // Each list preserves canonical field order.
        for list in [&result.unmapped_fields, &result.partial_fields] {
            let positions: Vec<usize> = list
                .iter()
                .filter_map(|f| CANONICAL_FIELDS.iter().position(|c| c == f))
                .collect();
            assert!(
                positions.windows(2).all(|w| w[0] < w[1]),
                "non-canonical ordering in {list:?} for input: {raw}"
            );
        }
    }
}

#[tokio::test]
async fn test_upload_failure_surfaces_distinct_kind() {
    let inference = Arc::new(MockInference::new());
    let pdf = Arc::new(MockPdfService::new().with_upload_failure("service quota exceeded"));
    let pipeline = pipeline_with(inference, fast_config().with_size_threshold(4))
        .with_pdf_backends(pdf.clone(), pdf.clone(), pdf);

    let result = pipeline.process_pdf(&[0u8; 64], &RequestOptions::new()).await;

    assert!(!result.success);
    assert!(result.data.is_none());
    assert!(result.errors[0].starts_with("UPLOAD_FAILED"));
}

#[tokio::test]
async fn test_inline_failure_does_not_reach_remote_service() {
    let inference = Arc::new(MockInference::new());
    let pdf = Arc::new(MockPdfService::new().with_inline_failure("malformed pdf"));
    let pipeline = pipeline_with(inference, fast_config().with_size_threshold(1024))
        .with_pdf_backends(pdf.clone(), pdf.clone(), pdf.clone());

    let result = pipeline.process_pdf(&[0u8; 16], &RequestOptions::new()).await;

    assert!(!result.success);
    assert!(result.errors[0].starts_with("EXTRACTION_FAILED"));
    assert_eq!(pdf.calls(), vec![PdfCall::InlineExtract { size: 16 }]);
}

#[tokio::test]
async fn test_russian_resume_dates_normalized() {
    let mock = Arc::new(MockInference::new().with_response(
        r#"{"desired_titles":["Инженер"],"experience":[{"employer":"ООО Ромашка","title":"Инженер","start":"март 2020","end":"настоящее время"}]}"#,
    ));
    let pipeline = pipeline_with(mock, fast_config());

    let result = pipeline
        .process_text("резюме", &RequestOptions::new().with_language_hint("ru"))
        .await;

    assert!(result.success);
    let record = result.data.unwrap();
    assert_eq!(record.experience[0].start.as_deref(), Some("2020-03"));
    assert_eq!(record.experience[0].end.as_deref(), Some("present"));
    assert_eq!(result.metadata.language, "ru");
}

#[tokio::test]
async fn test_metadata_is_populated() {
    let mock = Arc::new(MockInference::new().with_response("{}"));
    let pipeline = pipeline_with(mock, fast_config());

    let result = pipeline.process_text("resume", &RequestOptions::new()).await;

    assert_eq!(result.metadata.capability, "mock-inference");
    assert_eq!(result.metadata.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(result.metadata.prompt_hash.len(), 16);
    assert!(result.metadata.acquisition_path.is_none());
}
