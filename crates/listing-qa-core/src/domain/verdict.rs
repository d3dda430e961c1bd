//! Canonical verdict shape shared by both decision paths.

use serde::{Deserialize, Serialize};

/// Verdict phrase for an accepted image.
pub const SUITABLE_PHRASE: &str = "Suitable for professional e-commerce use";
/// Verdict phrase for a rejected image.
pub const NOT_SUITABLE_PHRASE: &str = "Not suitable for professional e-commerce use";

/// Which decision strategy produced a verdict.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPath {
    /// Local deterministic rules (no backend configured).
    Heuristic,
    /// External reasoning service.
    Remote,
}

/// Suitability judgment for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the image is fit for a listing.
    pub is_suitable: bool,
    /// Quality on a 0-100 scale.
    pub quality_score: f64,
    /// Human-readable explanation.
    pub reasoning: String,
    /// One of [`SUITABLE_PHRASE`] or [`NOT_SUITABLE_PHRASE`].
    pub final_verdict: String,
    /// Short defect tags such as `blur` or `clutter`.
    pub issues: Vec<String>,
    /// Objects the decision took into account.
    pub detected_objects: Vec<String>,
    /// Words found in the image.
    pub text_detected: Vec<String>,
    /// Backend certainty in `[0, 1]`; heuristics do not report one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Strategy that produced this verdict.
    pub decided_by: DecisionPath,
    /// `true` when no reasoning backend was involved.
    pub mock_mode: bool,
}

impl Verdict {
    /// Creates a verdict, deriving the verdict phrase and provenance flag.
    #[must_use]
    pub fn new(
        is_suitable: bool,
        quality_score: f64,
        reasoning: impl Into<String>,
        decided_by: DecisionPath,
    ) -> Self {
        Self {
            is_suitable,
            quality_score,
            reasoning: reasoning.into(),
            final_verdict: verdict_phrase(is_suitable).to_string(),
            issues: Vec::new(),
            detected_objects: Vec::new(),
            text_detected: Vec::new(),
            confidence: None,
            decided_by,
            mock_mode: matches!(decided_by, DecisionPath::Heuristic),
        }
    }

    /// Sets the issue tags.
    #[must_use]
    pub fn with_issues(mut self, issues: Vec<String>) -> Self {
        self.issues = issues;
        self
    }

    /// Sets the detected object labels.
    #[must_use]
    pub fn with_objects(mut self, objects: Vec<String>) -> Self {
        self.detected_objects = objects;
        self
    }

    /// Sets the detected words.
    #[must_use]
    pub fn with_text(mut self, words: Vec<String>) -> Self {
        self.text_detected = words;
        self
    }

    /// Sets the confidence.
    #[must_use]
    pub const fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Returns the verdict phrase for a suitability flag.
#[must_use]
pub const fn verdict_phrase(is_suitable: bool) -> &'static str {
    if is_suitable {
        SUITABLE_PHRASE
    } else {
        NOT_SUITABLE_PHRASE
    }
}

/// Outcome of the decision engine.
///
/// Serialized untagged: either the verdict object or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Decision {
    /// A verdict was reached.
    Verdict(Verdict),
    /// The reasoning backend failed; no verdict for this image.
    Failed {
        /// Failure description.
        error: String,
    },
}

impl Decision {
    /// Returns the verdict, if one was reached.
    #[must_use]
    pub const fn verdict(&self) -> Option<&Verdict> {
        match self {
            Self::Verdict(v) => Some(v),
            Self::Failed { .. } => None,
        }
    }

    /// Returns the failure message, if the decision failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Verdict(_) => None,
            Self::Failed { error } => Some(error),
        }
    }

    /// Whether a verdict was reached and it accepts the image.
    #[must_use]
    pub fn is_suitable(&self) -> bool {
        matches!(self, Self::Verdict(v) if v.is_suitable)
    }
}

impl From<Verdict> for Decision {
    fn from(verdict: Verdict) -> Self {
        Self::Verdict(verdict)
    }
}
