//! Signal records produced by the extractors and the bundle that merges them.

use serde::{Deserialize, Serialize};

/// Subject label used when the classifier returns nothing.
pub const UNKNOWN_SUBJECT: &str = "unknown";

/// Rounds `value` to `decimals` decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Focus measure of the whole image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharpnessSignal {
    /// `blur_score < threshold_used`.
    pub is_blurry: bool,
    /// Variance of the Laplacian response, rounded to two decimals.
    pub blur_score: f64,
    /// Threshold the score was compared against.
    pub threshold_used: f64,
}

impl SharpnessSignal {
    /// Builds the signal from a raw variance, rounding before comparing so the
    /// serialized fields always agree with each other.
    #[must_use]
    pub fn from_variance(variance: f64, threshold: f64) -> Self {
        let blur_score = round_to(variance.max(0.0), 2);
        Self {
            is_blurry: blur_score < threshold,
            blur_score,
            threshold_used: threshold,
        }
    }
}

/// One color cluster and the share of sampled pixels assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    /// Cluster center as 8-bit RGB.
    pub rgb: [u8; 3],
    /// Fraction of sampled pixels, rounded to two decimals.
    pub coverage: f64,
}

/// Background complexity estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSignal {
    /// Clusters sorted by descending coverage.
    pub dominant_colors: Vec<DominantColor>,
    /// `dominant_colors[0].coverage < 0.5`.
    pub is_cluttered: bool,
}

impl ColorSignal {
    /// Coverage below which the top cluster is considered a cluttered background.
    pub const CLUTTER_COVERAGE: f64 = 0.5;

    /// Sorts the clusters and derives the clutter flag.
    #[must_use]
    pub fn from_clusters(mut dominant_colors: Vec<DominantColor>) -> Self {
        dominant_colors.sort_by(|a, b| b.coverage.total_cmp(&a.coverage));
        let is_cluttered = dominant_colors
            .first()
            .is_none_or(|c| c.coverage < Self::CLUTTER_COVERAGE);
        Self {
            dominant_colors,
            is_cluttered,
        }
    }

    /// Coverage of the largest cluster, if any.
    #[must_use]
    pub fn top_coverage(&self) -> Option<f64> {
        self.dominant_colors.first().map(|c| c.coverage)
    }
}

/// A classifier label with its probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    /// Human-readable label (underscores replaced with spaces).
    pub label: String,
    /// Probability in `[0, 1]`, rounded to three decimals.
    pub confidence: f64,
}

/// Dominant visual subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSignal {
    /// Top-k labels sorted by descending confidence.
    pub detected_objects: Vec<DetectedObject>,
    /// First label, or [`UNKNOWN_SUBJECT`] when nothing was detected.
    pub primary_subject: String,
}

impl SubjectSignal {
    /// Sorts the detections and derives the primary subject.
    #[must_use]
    pub fn from_detections(mut detected_objects: Vec<DetectedObject>) -> Self {
        detected_objects.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        let primary_subject = detected_objects
            .first()
            .map_or_else(|| UNKNOWN_SUBJECT.to_string(), |o| o.label.clone());
        Self {
            detected_objects,
            primary_subject,
        }
    }

    /// Confidence of the primary subject, if any.
    #[must_use]
    pub fn primary_confidence(&self) -> Option<f64> {
        self.detected_objects.first().map(|o| o.confidence)
    }
}

/// Embedded text found by OCR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSignal {
    /// Recognized text, trimmed. Empty when no text was found.
    pub detected_text: String,
    /// Number of whitespace-delimited tokens.
    pub word_count: usize,
    /// `!detected_text.is_empty()`.
    pub has_text: bool,
}

impl TextSignal {
    /// Builds the signal from raw OCR output.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let detected_text = raw.trim().to_string();
        Self {
            word_count: detected_text.split_whitespace().count(),
            has_text: !detected_text.is_empty(),
            detected_text,
        }
    }
}

/// The four signal records computed for one image.
///
/// Field names are the wire keys `blur`, `color`, `object` and `ocr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBundle {
    /// Sharpness signal.
    pub blur: SharpnessSignal,
    /// Color composition signal.
    pub color: ColorSignal,
    /// Subject signal.
    pub object: SubjectSignal,
    /// Text signal.
    pub ocr: TextSignal,
}
