//! Sharpness extractor.
//!
//! Estimates focus from the variance of the Laplacian response over a
//! grayscale conversion of the image. Sharp images have strong second-derivative
//! edges, so a low variance means a blurry image.

use imageproc::filter::laplacian_filter;
use tracing::debug;

use crate::domain::{ImageInfo, SharpnessSignal, SignalExtractor};
use crate::error::PipelineError;

/// Configuration for the sharpness extractor.
#[derive(Debug, Clone)]
pub struct SharpnessConfig {
    /// Images whose Laplacian variance is below this value are blurry.
    pub threshold: f64,
}

impl Default for SharpnessConfig {
    fn default() -> Self {
        Self { threshold: 100.0 }
    }
}

impl SharpnessConfig {
    /// Checks that the threshold is usable.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for negative or non-finite thresholds.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.threshold.is_finite() && self.threshold >= 0.0 {
            Ok(())
        } else {
            Err(PipelineError::InvalidConfig(format!(
                "blur.threshold must be a finite value >= 0, got {}",
                self.threshold
            )))
        }
    }
}

/// Laplacian-variance sharpness extractor.
pub struct SharpnessExtractor {
    config: SharpnessConfig,
}

impl SharpnessExtractor {
    /// Creates a new sharpness extractor with the given configuration.
    #[must_use]
    pub const fn new(config: SharpnessConfig) -> Self {
        Self { config }
    }

    /// Returns the extractor configuration.
    #[must_use]
    pub const fn config(&self) -> &SharpnessConfig {
        &self.config
    }
}

impl Default for SharpnessExtractor {
    fn default() -> Self {
        Self::new(SharpnessConfig::default())
    }
}

/// Population variance of the 3x3 Laplacian response.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn laplacian_variance(gray: &image::GrayImage) -> f64 {
    let response = laplacian_filter(gray);
    let count = u64::from(response.width()) * u64::from(response.height());
    if count == 0 {
        return 0.0;
    }
    let n = count as f64;
    let mean = response.pixels().map(|p| f64::from(p.0[0])).sum::<f64>() / n;
    response
        .pixels()
        .map(|p| {
            let diff = f64::from(p.0[0]) - mean;
            diff * diff
        })
        .sum::<f64>()
        / n
}

impl SignalExtractor for SharpnessExtractor {
    type Signal = SharpnessSignal;

    fn name(&self) -> &'static str {
        "sharpness"
    }

    fn extract(&self, image: &ImageInfo) -> Result<SharpnessSignal, PipelineError> {
        let variance = laplacian_variance(&image.to_luma8());
        let signal = SharpnessSignal::from_variance(variance, self.config.threshold);
        debug!(
            "Sharpness of {}: score={} threshold={} blurry={}",
            image.path, signal.blur_score, signal.threshold_used, signal.is_blurry
        );
        Ok(signal)
    }
}
