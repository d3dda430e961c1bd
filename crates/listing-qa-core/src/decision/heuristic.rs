//! Deterministic local decision rules.

use crate::domain::{DecisionPath, SignalBundle, Verdict};

/// Score given to a blurry image.
pub const BLURRY_SCORE: f64 = 40.0;
/// Score given to a sharp image with a cluttered background.
pub const CLUTTERED_SCORE: f64 = 55.0;
/// Score given to an accepted image.
pub const SUITABLE_SCORE: f64 = 95.0;

/// Rule-based decider used when no reasoning backend is configured.
///
/// Blur takes precedence over clutter. Embedded text is reported in the
/// signals but never rejects an image on this path.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicDecider;

impl HeuristicDecider {
    /// Creates a heuristic decider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Judges a signal bundle.
    #[must_use]
    pub fn decide(&self, bundle: &SignalBundle) -> Verdict {
        let objects: Vec<String> = bundle
            .object
            .detected_objects
            .iter()
            .map(|o| o.label.clone())
            .collect();

        let verdict = if bundle.blur.is_blurry {
            Verdict::new(
                false,
                BLURRY_SCORE,
                format!(
                    "Image is rejected because it is too blurry (Score: {}).",
                    bundle.blur.blur_score
                ),
                DecisionPath::Heuristic,
            )
            .with_issues(vec!["blur".to_string()])
        } else if bundle.color.is_cluttered {
            Verdict::new(
                false,
                CLUTTERED_SCORE,
                "The background is too cluttered for a professional product shot.",
                DecisionPath::Heuristic,
            )
            .with_issues(vec!["clutter".to_string()])
        } else {
            Verdict::new(
                true,
                SUITABLE_SCORE,
                format!(
                    "This is a high-quality image of a {} with a clean background and clear focus.",
                    bundle.object.primary_subject
                ),
                DecisionPath::Heuristic,
            )
        };

        let words = bundle
            .ocr
            .detected_text
            .split_whitespace()
            .map(str::to_string)
            .collect();

        verdict.with_objects(objects).with_text(words)
    }
}
