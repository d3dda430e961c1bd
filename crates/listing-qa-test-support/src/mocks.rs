//! Mock implementations of core port traits.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use image::{DynamicImage, GrayImage};
use listing_qa_core::domain::{FinalReport, ImageInfo};
use listing_qa_core::error::{BackendError, PipelineError};
use listing_qa_core::ports::{
    ClassScore, ImageSource, ProgressEvent, ProgressSink, ReasoningBackend, ReasoningRequest,
    ResultOutput, SubjectClassifier, TextRecognizer,
};

/// One item of a [`MockImageSource`].
#[derive(Debug, Clone)]
enum SourceItem {
    Image(ImageInfo),
    Broken(String),
}

/// Mock implementation of `ImageSource` for testing.
///
/// Yields pre-built images, and load failures for paths added with
/// [`MockImageSource::with_broken`].
pub struct MockImageSource {
    items: Vec<SourceItem>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    /// Creates a new mock source with the given images.
    #[must_use]
    pub fn new(images: Vec<ImageInfo>) -> Self {
        Self {
            items: images.into_iter().map(SourceItem::Image).collect(),
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Appends an item that fails to load with an `ImageLoad` error.
    #[must_use]
    pub fn with_broken(mut self, path: impl Into<String>) -> Self {
        self.items.push(SourceItem::Broken(path.into()));
        self
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo, PipelineError>> + Send + '_> {
        if let Ok(mut c) = self.iteration_count.lock() {
            *c += 1;
        }
        Box::new(self.items.iter().map(|item| match item {
            SourceItem::Image(image) => Ok(image.clone()),
            SourceItem::Broken(path) => Err(PipelineError::image_load(
                path,
                "unsupported or corrupt image data",
            )),
        }))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures reports for later assertions, and can be told to fail.
pub struct MockResultOutput {
    reports: Arc<Mutex<Vec<FinalReport>>>,
    flush_count: Arc<Mutex<usize>>,
    fail_writes: bool,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
            fail_writes: false,
        }
    }

    /// Creates an output whose every write fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }

    /// Returns all captured reports.
    #[must_use]
    pub fn reports(&self) -> Vec<FinalReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, report: &FinalReport) -> anyhow::Result<()> {
        if self.fail_writes {
            anyhow::bail!("disk full");
        }
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Started { .. }))
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Completed { .. }))
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Skipped { .. }))
    }

    /// Returns the paths of skipped images.
    #[must_use]
    pub fn skipped_paths(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Skipped { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((*processed, *skipped)),
            _ => None,
        })
    }

    fn count(&self, predicate: impl Fn(&ProgressEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Classifier returning the same scores for every image.
pub struct FakeClassifier {
    scores: Result<Vec<ClassScore>, String>,
    calls: Mutex<usize>,
}

impl FakeClassifier {
    /// Answers with `(label, probability)` pairs.
    #[must_use]
    pub fn new(scores: &[(&str, f32)]) -> Self {
        Self {
            scores: Ok(scores
                .iter()
                .map(|(label, p)| ClassScore::new(*label, *p))
                .collect()),
            calls: Mutex::new(0),
        }
    }

    /// Classifier that always fails inference.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            scores: Err(message.to_string()),
            calls: Mutex::new(0),
        }
    }

    /// Number of `classify` calls.
    #[must_use]
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SubjectClassifier for FakeClassifier {
    fn name(&self) -> &str {
        "fake-classifier"
    }

    fn classify(&self, _image: &DynamicImage) -> Result<Vec<ClassScore>, PipelineError> {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        self.scores
            .clone()
            .map_err(|message| PipelineError::Extraction {
                stage: "subject",
                message,
            })
    }
}

/// OCR engine returning fixed text.
pub struct FakeTextRecognizer {
    text: Result<String, String>,
}

impl FakeTextRecognizer {
    /// Recognizes `text` in every image.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            text: Ok(text.to_string()),
        }
    }

    /// Finds no text.
    #[must_use]
    pub fn blank() -> Self {
        Self::new("")
    }

    /// Engine that is not installed.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            text: Err("tesseract: command not found".to_string()),
        }
    }
}

impl TextRecognizer for FakeTextRecognizer {
    fn name(&self) -> &str {
        "fake-ocr"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<String, PipelineError> {
        self.text.clone().map_err(PipelineError::TextExtraction)
    }
}

/// Reasoning backend replaying scripted replies.
///
/// Replies are consumed in order; the last one repeats once the queue is
/// down to a single entry.
pub struct FakeReasoningBackend {
    replies: Mutex<VecDeque<Result<String, BackendError>>>,
    requests: Mutex<Vec<ReasoningRequest>>,
}

impl FakeReasoningBackend {
    /// Backend answering with the given replies.
    #[must_use]
    pub fn new(replies: Vec<Result<String, BackendError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Backend that always answers `content`.
    #[must_use]
    pub fn replying(content: &str) -> Self {
        Self::new(vec![Ok(content.to_string())])
    }

    /// Backend that always fails with `error`.
    #[must_use]
    pub fn failing(error: BackendError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// A well-formed verdict JSON in the backend's answer schema.
    #[must_use]
    pub fn verdict_json(suitable: bool, score: f64, confidence: f64) -> String {
        let phrase = if suitable {
            "Suitable for professional e-commerce use"
        } else {
            "Not suitable for professional e-commerce use"
        };
        serde_json::json!({
            "image_quality_score": score,
            "issues_detected": if suitable { vec![] } else { vec!["unwanted text"] },
            "detected_objects": ["strawberry"],
            "text_detected": [],
            "llm_reasoning_summary": "Judged from the supplied signals.",
            "final_verdict": phrase,
            "confidence": confidence,
        })
        .to_string()
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ReasoningRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReasoningBackend for FakeReasoningBackend {
    fn name(&self) -> &str {
        "fake-backend"
    }

    fn complete(&self, request: &ReasoningRequest) -> Result<String, BackendError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let mut replies = self.replies.lock().unwrap_or_else(PoisonError::into_inner);
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        reply.unwrap_or(Err(BackendError::EmptyResponse))
    }
}
