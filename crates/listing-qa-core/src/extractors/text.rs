//! Text extractor.
//!
//! Binarizes the image with Otsu's threshold and hands it to an OCR engine.
//! "No text" is a successful, empty result; a missing or failing engine is a
//! [`PipelineError::TextExtraction`].

use std::sync::Arc;

use image::GrayImage;
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use tracing::debug;

use crate::domain::{ImageInfo, SignalExtractor, TextSignal};
use crate::error::PipelineError;
use crate::ports::TextRecognizer;

/// Converts a grayscale image to pure black and white at its Otsu level.
#[must_use]
pub fn binarize(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    threshold(gray, level, ThresholdType::Binary)
}

/// OCR-backed text extractor.
pub struct TextExtractor {
    recognizer: Arc<dyn TextRecognizer>,
}

impl TextExtractor {
    /// Creates a new text extractor around an OCR engine.
    #[must_use]
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Name of the wrapped OCR engine.
    #[must_use]
    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }
}

impl SignalExtractor for TextExtractor {
    type Signal = TextSignal;

    fn name(&self) -> &'static str {
        "text"
    }

    fn extract(&self, image: &ImageInfo) -> Result<TextSignal, PipelineError> {
        let binary = binarize(&image.to_luma8());
        let raw = self.recognizer.recognize(&binary)?;
        let signal = TextSignal::from_raw(&raw);
        debug!(
            "Text in {}: {} words via {}",
            image.path,
            signal.word_count,
            self.recognizer.name()
        );
        Ok(signal)
    }
}
