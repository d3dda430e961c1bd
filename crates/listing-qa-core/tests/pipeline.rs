//! End-to-end pipeline tests using synthetic images and port fakes.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use listing_qa_core::decision::DecisionEngine;
use listing_qa_core::domain::{Decision, DecisionPath, ImageInfo, SUITABLE_PHRASE};
use listing_qa_core::error::{BackendError, PipelineError};
use listing_qa_core::extractors::{
    ColorExtractor, SharpnessExtractor, SubjectConfig, SubjectExtractor, TextExtractor,
};
use listing_qa_core::pipeline::Pipeline;
use listing_qa_core::ports::{ReasoningBackend, TextRecognizer};
use listing_qa_test_support::{
    FakeClassifier, FakeReasoningBackend, FakeTextRecognizer, MockImageSource, MockProgressSink,
    MockResultOutput, SyntheticImageBuilder,
};

fn pipeline_with(
    recognizer: FakeTextRecognizer,
    backend: Option<Arc<dyn ReasoningBackend>>,
) -> Pipeline {
    let classifier = Arc::new(FakeClassifier::new(&[
        ("strawberry", 0.97),
        ("pomegranate", 0.02),
        ("bell_pepper", 0.005),
        ("fig", 0.001),
    ]));
    let recognizer: Arc<dyn TextRecognizer> = Arc::new(recognizer);
    Pipeline::new(
        SharpnessExtractor::default(),
        ColorExtractor::default(),
        SubjectExtractor::new(classifier, SubjectConfig::default()),
        TextExtractor::new(recognizer),
        DecisionEngine::select(backend),
    )
    .expect("valid pipeline")
}

fn heuristic_pipeline() -> Pipeline {
    pipeline_with(FakeTextRecognizer::blank(), None)
}

fn strawberry() -> ImageInfo {
    SyntheticImageBuilder::named(SyntheticImageBuilder::product_shot(), "data/strawberry.jpeg")
}

#[test]
fn sharp_clean_product_is_suitable() {
    let report = heuristic_pipeline().analyze(&strawberry()).unwrap();

    assert_eq!(report.metadata.filename, "strawberry.jpeg");
    assert_eq!(report.metadata.system, "listing-qa");
    assert!(!report.extracted_signals.blur.is_blurry);
    assert!(!report.extracted_signals.color.is_cluttered);
    assert_eq!(report.extracted_signals.object.primary_subject, "strawberry");
    assert_eq!(report.extracted_signals.object.detected_objects.len(), 3);
    assert!(!report.extracted_signals.ocr.has_text);

    let verdict = report.final_decision.verdict().expect("verdict");
    assert!(verdict.is_suitable);
    assert!((verdict.quality_score - 95.0).abs() < f64::EPSILON);
    assert!(verdict.reasoning.contains("strawberry"));
    assert_eq!(verdict.final_verdict, SUITABLE_PHRASE);
    assert!(verdict.mock_mode);
}

#[test]
fn blurry_product_is_rejected_with_its_score() {
    let image = SyntheticImageBuilder::named(
        SyntheticImageBuilder::blurry_product(),
        "data/strawberry_blur.png",
    );
    let report = heuristic_pipeline().analyze(&image).unwrap();

    let blur = &report.extracted_signals.blur;
    assert!(blur.is_blurry, "score {}", blur.blur_score);

    let verdict = report.final_decision.verdict().expect("verdict");
    assert!(!verdict.is_suitable);
    assert!((verdict.quality_score - 40.0).abs() < f64::EPSILON);
    assert!(verdict
        .reasoning
        .contains(&format!("(Score: {})", blur.blur_score)));
}

#[test]
fn cluttered_scene_is_rejected() {
    let report = heuristic_pipeline()
        .analyze(&SyntheticImageBuilder::cluttered_scene())
        .unwrap();

    assert!(!report.extracted_signals.blur.is_blurry);
    assert!(report.extracted_signals.color.is_cluttered);
    let verdict = report.final_decision.verdict().expect("verdict");
    assert!((verdict.quality_score - 55.0).abs() < f64::EPSILON);
    assert_eq!(verdict.issues, ["clutter"]);
}

#[test]
fn embedded_text_is_reported_but_not_judged_by_heuristics() {
    let pipeline = pipeline_with(FakeTextRecognizer::new("BUY 2 GET 1 FREE\n"), None);
    let report = pipeline.analyze(&strawberry()).unwrap();

    assert!(report.extracted_signals.ocr.has_text);
    assert_eq!(report.extracted_signals.ocr.word_count, 5);
    assert!(report.final_decision.is_suitable());
}

#[test]
fn remote_verdict_is_normalized() {
    let backend = Arc::new(FakeReasoningBackend::replying(
        &FakeReasoningBackend::verdict_json(true, 0.88, 0.93),
    ));
    let pipeline = pipeline_with(FakeTextRecognizer::blank(), Some(backend.clone()));
    let report = pipeline.analyze(&strawberry()).unwrap();

    let verdict = report.final_decision.verdict().expect("verdict");
    assert_eq!(verdict.decided_by, DecisionPath::Remote);
    assert!(!verdict.mock_mode);
    assert!((verdict.quality_score - 88.0).abs() < 1e-9);
    assert_eq!(verdict.confidence, Some(0.93));

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].user_prompt.contains("\"primary_subject\":\"strawberry\""));
}

#[test]
fn remote_non_json_reply_becomes_error_decision() {
    let backend = Arc::new(FakeReasoningBackend::replying("I think it looks great!"));
    let pipeline = pipeline_with(FakeTextRecognizer::blank(), Some(backend));
    let report = pipeline.analyze(&strawberry()).unwrap();

    assert!(matches!(report.final_decision, Decision::Failed { .. }));
    let json = serde_json::to_value(&report).unwrap();
    assert!(json["final_decision"]["error"].is_string());
    assert!(json["final_decision"].get("is_suitable").is_none());
    // Signals are still reported.
    assert_eq!(json["extracted_signals"]["object"]["primary_subject"], "strawberry");
}

#[test]
fn remote_reply_missing_fields_becomes_error_decision() {
    let backend = Arc::new(FakeReasoningBackend::replying(
        r#"{"image_quality_score": 0.9, "final_verdict": "Suitable for professional e-commerce use"}"#,
    ));
    let pipeline = pipeline_with(FakeTextRecognizer::blank(), Some(backend));
    let report = pipeline.analyze(&strawberry()).unwrap();

    let error = report.final_decision.error().expect("error decision");
    assert!(error.contains("schema"), "{error}");
}

#[test]
fn remote_timeout_is_not_replaced_by_heuristics() {
    let backend = Arc::new(FakeReasoningBackend::failing(BackendError::Timeout(30)));
    let pipeline = pipeline_with(FakeTextRecognizer::blank(), Some(backend.clone()));
    let report = pipeline.analyze(&strawberry()).unwrap();

    assert_eq!(
        report.final_decision.error(),
        Some("request timed out after 30 seconds")
    );
    assert_eq!(backend.requests().len(), 1);
}

#[test]
fn missing_ocr_engine_fails_the_image() {
    let pipeline = pipeline_with(FakeTextRecognizer::missing(), None);
    let err = pipeline.analyze(&strawberry()).unwrap_err();
    assert!(matches!(err, PipelineError::TextExtraction(_)));
}

#[test]
fn batch_skips_corrupt_image_and_continues() {
    let source = MockImageSource::new(vec![
        strawberry(),
        SyntheticImageBuilder::named(SyntheticImageBuilder::blurry_product(), "blur.png"),
        SyntheticImageBuilder::named(SyntheticImageBuilder::cluttered_scene(), "busy.webp"),
    ])
    .with_broken("data/notes.png");
    let output = MockResultOutput::new();
    let progress = MockProgressSink::new();

    let summary = heuristic_pipeline()
        .run_batch(&source, &output, &progress)
        .unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.suitable, 1);
    assert_eq!(summary.unsuitable, 2);
    assert!(summary.is_partial());
    assert!(!summary.all_suitable());

    assert_eq!(output.reports().len(), 3);
    assert_eq!(output.flush_count(), 1);
    assert_eq!(progress.started_count(), 3);
    assert_eq!(progress.completed_count(), 3);
    assert_eq!(progress.skipped_paths(), ["data/notes.png"]);
    assert_eq!(progress.finished_counts(), Some((3, 1)));
}

#[test]
fn batch_counts_decision_failures() {
    let backend = Arc::new(FakeReasoningBackend::new(vec![
        Ok(FakeReasoningBackend::verdict_json(true, 0.9, 0.9)),
        Err(BackendError::Status {
            status: 401,
            body: "invalid api key".into(),
        }),
    ]));
    let pipeline = pipeline_with(FakeTextRecognizer::blank(), Some(backend));
    let source = MockImageSource::new(vec![strawberry(), strawberry()]);
    let output = MockResultOutput::new();

    let summary = pipeline
        .run_batch(&source, &output, &MockProgressSink::new())
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.suitable, 1);
    assert_eq!(summary.decision_failures, 1);
    assert!(!summary.is_partial());
}

#[test]
fn batch_aborts_when_reports_cannot_be_written() {
    let source = MockImageSource::new(vec![strawberry()]);
    let result = heuristic_pipeline().run_batch(
        &source,
        &MockResultOutput::failing(),
        &MockProgressSink::new(),
    );
    assert!(result.is_err());
}

#[test]
fn invalid_extractor_config_is_rejected_up_front() {
    let classifier = Arc::new(FakeClassifier::new(&[]));
    let result = Pipeline::new(
        SharpnessExtractor::default(),
        ColorExtractor::default(),
        SubjectExtractor::new(classifier, SubjectConfig { top_k: 0 }),
        TextExtractor::new(Arc::new(FakeTextRecognizer::blank())),
        DecisionEngine::default(),
    );
    assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
}
