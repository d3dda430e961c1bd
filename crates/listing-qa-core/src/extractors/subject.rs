//! Subject extractor.
//!
//! Ranks the output of a pretrained image classifier and keeps the top labels
//! as the image's detected objects.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{round_to, DetectedObject, ImageInfo, SignalExtractor, SubjectSignal};
use crate::error::PipelineError;
use crate::ports::SubjectClassifier;

/// Configuration for the subject extractor.
#[derive(Debug, Clone)]
pub struct SubjectConfig {
    /// Number of labels to keep.
    pub top_k: usize,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

impl SubjectConfig {
    /// Checks that at least one label is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `top_k` is zero.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.top_k == 0 {
            return Err(PipelineError::InvalidConfig(
                "subject.top_k must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Classifier-backed subject extractor.
///
/// The classifier is built once by the caller and shared; the extractor never
/// loads model weights itself.
pub struct SubjectExtractor {
    classifier: Arc<dyn SubjectClassifier>,
    config: SubjectConfig,
}

impl SubjectExtractor {
    /// Creates a new subject extractor around a loaded classifier.
    #[must_use]
    pub fn new(classifier: Arc<dyn SubjectClassifier>, config: SubjectConfig) -> Self {
        Self { classifier, config }
    }

    /// Returns the extractor configuration.
    #[must_use]
    pub const fn config(&self) -> &SubjectConfig {
        &self.config
    }

    /// Name of the wrapped classifier.
    #[must_use]
    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }
}

impl SignalExtractor for SubjectExtractor {
    type Signal = SubjectSignal;

    fn name(&self) -> &'static str {
        "subject"
    }

    fn extract(&self, image: &ImageInfo) -> Result<SubjectSignal, PipelineError> {
        self.config.validate()?;

        let mut scores = self.classifier.classify(&image.image)?;
        scores.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        scores.truncate(self.config.top_k);

        let detections = scores
            .into_iter()
            .map(|score| DetectedObject {
                label: score.label.replace('_', " "),
                confidence: round_to(f64::from(score.probability), 3),
            })
            .collect();

        let signal = SubjectSignal::from_detections(detections);
        debug!(
            "Subject of {}: primary={} confidence={:?}",
            image.path,
            signal.primary_subject,
            signal.primary_confidence()
        );
        Ok(signal)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::UNKNOWN_SUBJECT;
    use crate::ports::ClassScore;
    use image::DynamicImage;

    struct StaticClassifier(Vec<ClassScore>);

    impl SubjectClassifier for StaticClassifier {
        fn name(&self) -> &str {
            "static"
        }

        fn classify(&self, _image: &DynamicImage) -> Result<Vec<ClassScore>, PipelineError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenClassifier;

    impl SubjectClassifier for BrokenClassifier {
        fn name(&self) -> &str {
            "broken"
        }

        fn classify(&self, _image: &DynamicImage) -> Result<Vec<ClassScore>, PipelineError> {
            Err(PipelineError::Extraction {
                stage: "subject",
                message: "shape mismatch".into(),
            })
        }
    }

    fn extractor(scores: Vec<ClassScore>, top_k: usize) -> SubjectExtractor {
        SubjectExtractor::new(Arc::new(StaticClassifier(scores)), SubjectConfig { top_k })
    }

    fn image() -> ImageInfo {
        ImageInfo::new("product.png", DynamicImage::new_rgb8(8, 8))
    }

    #[test]
    fn test_default_config() {
        assert_eq!(SubjectConfig::default().top_k, 3);
    }

    #[test]
    fn test_ranks_truncates_and_rounds() {
        let signal = extractor(
            vec![
                ClassScore::new("pomegranate", 0.05),
                ClassScore::new("strawberry", 0.912_34),
                ClassScore::new("granny_smith", 0.02),
                ClassScore::new("bell_pepper", 0.011),
            ],
            3,
        )
        .extract(&image())
        .expect("extraction should succeed");

        let labels: Vec<_> = signal
            .detected_objects
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(labels, ["strawberry", "pomegranate", "granny smith"]);
        assert_eq!(signal.primary_subject, "strawberry");
        assert!((signal.detected_objects[0].confidence - 0.912).abs() < 1e-9);
    }

    #[test]
    fn test_empty_classifier_output_is_unknown() {
        let signal = extractor(vec![], 3)
            .extract(&image())
            .expect("extraction should succeed");
        assert!(signal.detected_objects.is_empty());
        assert_eq!(signal.primary_subject, UNKNOWN_SUBJECT);
    }

    #[test]
    fn test_top_k_larger_than_output() {
        let signal = extractor(vec![ClassScore::new("teapot", 0.4)], 5)
            .extract(&image())
            .expect("extraction should succeed");
        assert_eq!(signal.detected_objects.len(), 1);
    }

    #[test]
    fn test_classifier_failure_propagates() {
        let extractor = SubjectExtractor::new(Arc::new(BrokenClassifier), SubjectConfig::default());
        let err = extractor.extract(&image()).expect_err("should fail");
        assert!(matches!(err, PipelineError::Extraction { stage: "subject", .. }));
    }

    #[test]
    fn test_zero_top_k_is_invalid() {
        let err = extractor(vec![], 0).extract(&image()).expect_err("should fail");
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }
}
