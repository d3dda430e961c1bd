//! OCR port.

use image::GrayImage;

use crate::error::PipelineError;

/// Port for an OCR engine.
pub trait TextRecognizer: Send + Sync {
    /// Short identifier of the engine.
    fn name(&self) -> &str;

    /// Recognizes text in a binarized grayscale image.
    ///
    /// Returns the raw engine output; an empty string means no text was found.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::TextExtraction`] if the engine is unavailable
    /// or fails.
    fn recognize(&self, image: &GrayImage) -> Result<String, PipelineError>;
}
