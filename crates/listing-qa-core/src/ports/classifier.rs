//! Subject classification port.

use image::DynamicImage;

use crate::error::PipelineError;

/// One class of a classifier output.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScore {
    /// Raw class label, possibly with underscores (`granny_smith`).
    pub label: String,
    /// Probability in `[0, 1]`.
    pub probability: f32,
}

impl ClassScore {
    /// Creates a class score.
    #[must_use]
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Port for a pretrained general-purpose image classifier.
///
/// Implementations are expensive to build and are shared across calls and
/// threads, so they must be usable through `&self` from several threads.
pub trait SubjectClassifier: Send + Sync {
    /// Short identifier of the underlying model.
    fn name(&self) -> &str;

    /// Classifies an image.
    ///
    /// Returns scored classes in any order; the caller ranks and truncates.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Extraction`] if inference fails.
    fn classify(&self, image: &DynamicImage) -> Result<Vec<ClassScore>, PipelineError>;
}
