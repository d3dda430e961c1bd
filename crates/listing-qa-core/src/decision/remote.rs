//! Decision delegated to an external reasoning service.
//!
//! The signal bundle is sent as JSON together with an instruction block that
//! fixes the answer schema. The answer is validated strictly; anything that
//! does not match the schema becomes a failed decision.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{
    round_to, Decision, DecisionPath, SignalBundle, Verdict, NOT_SUITABLE_PHRASE,
    SUITABLE_PHRASE,
};
use crate::error::BackendError;
use crate::ports::{ReasoningBackend, ReasoningRequest};

/// Prefix of the user message; the bundle JSON follows.
pub const USER_PROMPT_PREFIX: &str = "Analyze these image signals and return a JSON verdict: ";

/// Answer shape required from the backend. Every field is mandatory.
#[derive(Debug, Clone, Deserialize)]
struct RemoteVerdict {
    image_quality_score: f64,
    issues_detected: Vec<String>,
    detected_objects: Vec<String>,
    text_detected: Vec<String>,
    llm_reasoning_summary: String,
    final_verdict: String,
    confidence: f64,
}

/// Builds the instruction block for a bundle.
///
/// Missing detections or color clusters are rendered as placeholders rather
/// than failing.
#[must_use]
pub fn system_prompt(bundle: &SignalBundle) -> String {
    let subject_confidence = bundle
        .object
        .primary_confidence()
        .map_or_else(|| "n/a".to_string(), |c| c.to_string());
    let coverage = bundle
        .color
        .top_coverage()
        .map_or_else(|| "n/a".to_string(), |c| format!("{}%", round_to(c * 100.0, 1)));

    let mut prompt = String::from(
        "You are an AI Quality Assurance expert for a high-end e-commerce platform.\n\
         Your task is to analyze technical signals from a product image and decide if it \
         meets professional standards.\n\nVISUAL SIGNALS:\n",
    );
    prompt.push_str(&format!(
        "- Subject: {} (Confidence: {subject_confidence})\n\
         - Blur Score: {} (Threshold: {}) (is_blurry: {})\n\
         - Dominant Color Coverage: {coverage} (is_cluttered: {})\n\
         - Text Found: {:?} (Word Count: {}) (has_text: {})\n",
        bundle.object.primary_subject,
        bundle.blur.blur_score,
        bundle.blur.threshold_used,
        bundle.blur.is_blurry,
        bundle.color.is_cluttered,
        bundle.ocr.detected_text,
        bundle.ocr.word_count,
        bundle.ocr.has_text
    ));

    prompt.push_str(
        "\nCRITERIA:\n\
         1. Low blur scores (near or below threshold) indicate poor quality.\n\
         2. Backgrounds should be clean (high dominant color coverage).\n\
         3. No promotional text or watermarks are allowed in main listing photos.\n\
         4. The subject must be clearly identified and relevant to e-commerce.\n\
         5. Answer only with the JSON described in OUTPUT FORMAT.\n\
         \nOUTPUT FORMAT:\n\
         Return ONLY a valid JSON object. Do not include any other text or markdown fences.\n\
         JSON SCHEMA:\n\
         {\n  \"image_quality_score\": <float 0-1.0 based on clarity and composition>,\n  \
         \"issues_detected\": <list of strings naming defects like 'blur', 'clutter' or 'unwanted text'>,\n  \
         \"detected_objects\": <list of all objects identified in the image>,\n  \
         \"text_detected\": <list of specific words found by OCR>,\n  \
         \"llm_reasoning_summary\": <short paragraph explaining your logic>,\n",
    );
    prompt.push_str(&format!(
        "  \"final_verdict\": <string: \"{SUITABLE_PHRASE}\" OR \"{NOT_SUITABLE_PHRASE}\">,\n"
    ));
    prompt.push_str(
        "  \"confidence\": <float 0-1.0 representing your certainty in e-commerce use of the image>\n}\n",
    );
    prompt
}

/// Builds the full request for a bundle.
///
/// # Errors
///
/// Returns [`BackendError::InvalidJson`] if the bundle cannot be serialized.
pub fn build_request(bundle: &SignalBundle) -> Result<ReasoningRequest, BackendError> {
    let signals =
        serde_json::to_string(bundle).map_err(|e| BackendError::InvalidJson(e.to_string()))?;
    Ok(ReasoningRequest {
        system_prompt: system_prompt(bundle),
        user_prompt: format!("{USER_PROMPT_PREFIX}{signals}"),
    })
}

/// Maps a verdict phrase to a suitability flag.
///
/// Case-insensitive, surrounding whitespace and one trailing period ignored.
fn parse_phrase(phrase: &str) -> Option<bool> {
    let trimmed = phrase.trim();
    let normalized = trimmed.strip_suffix('.').unwrap_or(trimmed).trim_end();
    if normalized.eq_ignore_ascii_case(SUITABLE_PHRASE) {
        Some(true)
    } else if normalized.eq_ignore_ascii_case(NOT_SUITABLE_PHRASE) {
        Some(false)
    } else {
        None
    }
}

fn check_unit_range(field: &str, value: f64) -> Result<(), BackendError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(BackendError::Schema(format!(
            "{field} must be within [0, 1], got {value}"
        )))
    }
}

/// Parses and validates the backend's answer into a canonical verdict.
///
/// The 0-1 quality score is rescaled to 0-100.
///
/// # Errors
///
/// Returns [`BackendError::EmptyResponse`] for blank content,
/// [`BackendError::InvalidJson`] if the content is not a JSON object and
/// [`BackendError::Schema`] for missing fields or out-of-range values.
pub fn parse_verdict(content: &str) -> Result<Verdict, BackendError> {
    if content.trim().is_empty() {
        return Err(BackendError::EmptyResponse);
    }

    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| BackendError::InvalidJson(e.to_string()))?;
    if !value.is_object() {
        return Err(BackendError::InvalidJson(
            "expected a JSON object at the top level".into(),
        ));
    }

    let remote: RemoteVerdict =
        serde_json::from_value(value).map_err(|e| BackendError::Schema(e.to_string()))?;

    check_unit_range("image_quality_score", remote.image_quality_score)?;
    check_unit_range("confidence", remote.confidence)?;
    let is_suitable = parse_phrase(&remote.final_verdict).ok_or_else(|| {
        BackendError::Schema(format!(
            "unrecognized final_verdict {:?}",
            remote.final_verdict
        ))
    })?;

    Ok(Verdict::new(
        is_suitable,
        round_to(remote.image_quality_score * 100.0, 1),
        remote.llm_reasoning_summary,
        DecisionPath::Remote,
    )
    .with_issues(remote.issues_detected)
    .with_objects(remote.detected_objects)
    .with_text(remote.text_detected)
    .with_confidence(remote.confidence))
}

/// Decider backed by a [`ReasoningBackend`].
///
/// One request per image. Failures are reported, never retried, and never
/// replaced by the heuristic verdict.
#[derive(Clone)]
pub struct RemoteDecider {
    backend: Arc<dyn ReasoningBackend>,
}

impl std::fmt::Debug for RemoteDecider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDecider")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl RemoteDecider {
    /// Creates a remote decider.
    #[must_use]
    pub fn new(backend: Arc<dyn ReasoningBackend>) -> Self {
        Self { backend }
    }

    /// Name of the backend.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    fn try_decide(&self, bundle: &SignalBundle) -> Result<Verdict, BackendError> {
        let request = build_request(bundle)?;
        debug!("Sending signals to {}", self.backend.name());
        let content = self.backend.complete(&request)?;
        parse_verdict(&content)
    }

    /// Judges a signal bundle through the backend.
    #[must_use]
    pub fn decide(&self, bundle: &SignalBundle) -> Decision {
        match self.try_decide(bundle) {
            Ok(verdict) => Decision::Verdict(verdict),
            Err(e) => {
                warn!("Reasoning backend {} failed: {}", self.backend.name(), e);
                Decision::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
