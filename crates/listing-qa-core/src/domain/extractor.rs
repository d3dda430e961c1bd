//! Extractor trait for the per-image signal records.

use super::ImageInfo;
use crate::error::PipelineError;

/// A single-purpose function computing one signal record from an image.
///
/// Extractors are independent of each other and hold no per-image state.
pub trait SignalExtractor: Send + Sync {
    /// The signal record this extractor produces.
    type Signal;

    /// Returns the name of this extractor.
    fn name(&self) -> &'static str;

    /// Computes the signal for an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal cannot be computed. The pipeline treats
    /// any error as a failure of the whole image.
    fn extract(&self, image: &ImageInfo) -> Result<Self::Signal, PipelineError>;
}
