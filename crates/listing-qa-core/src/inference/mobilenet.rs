//! MobileNetV4 ImageNet classifier.
//!
//! Wraps `candle_transformers`' MobileNetV4 conv-small network with timm
//! ImageNet-1k weights and a plain-text label file (one label per line, in
//! class index order).

// Allow common ML code patterns
#![allow(clippy::cast_possible_truncation)]

use std::path::Path;

use candle_core::{Device, Module, Tensor};
use candle_nn::Func;
use candle_transformers::models::mobilenetv4;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, info};

use super::{get_device, imagenet_normalize, load_safetensors, softmax};
use crate::error::PipelineError;
use crate::ports::{ClassScore, SubjectClassifier};

/// Number of ImageNet-1k classes.
pub const IMAGENET_CLASSES: usize = 1000;
/// Side of the square network input.
pub const INPUT_SIZE: u32 = 224;

/// Reads a label file.
///
/// # Errors
///
/// Returns [`PipelineError::ModelUnavailable`] if the file cannot be read or
/// has no labels.
pub fn load_labels(path: impl AsRef<Path>) -> Result<Vec<String>, PipelineError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::ModelUnavailable(format!("cannot read labels {}: {e}", path.display()))
    })?;
    let labels: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if labels.is_empty() {
        return Err(PipelineError::ModelUnavailable(format!(
            "label file {} is empty",
            path.display()
        )));
    }
    Ok(labels)
}

/// ImageNet classifier built once and shared across images.
pub struct MobileNetClassifier {
    model: Func<'static>,
    labels: Vec<String>,
    device: Device,
}

impl MobileNetClassifier {
    /// Loads weights and labels.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ModelUnavailable`] if either file is missing
    /// or invalid, or the label count is not 1000.
    pub fn load(weights: impl AsRef<Path>, labels: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let weights = weights.as_ref();
        let labels = load_labels(labels)?;
        if labels.len() != IMAGENET_CLASSES {
            return Err(PipelineError::ModelUnavailable(format!(
                "expected {IMAGENET_CLASSES} labels, found {}",
                labels.len()
            )));
        }

        let device = get_device();
        debug!("Loading MobileNetV4 from {}", weights.display());
        let vb = load_safetensors(weights, &device)
            .map_err(|e| PipelineError::ModelUnavailable(format!("{e:#}")))?;
        let model = mobilenetv4::mobilenetv4(&mobilenetv4::Config::small(), IMAGENET_CLASSES, vb)
            .map_err(|e| {
                PipelineError::ModelUnavailable(format!(
                    "invalid MobileNetV4 weights {}: {e}",
                    weights.display()
                ))
            })?;

        info!("Loaded MobileNetV4 classifier from {}", weights.display());
        Ok(Self::from_parts(model, labels, device))
    }

    /// Builds a classifier from an already constructed network.
    ///
    /// The network must map a `(1, 3, 224, 224)` tensor to `(1, labels.len())`
    /// logits.
    #[must_use]
    pub const fn from_parts(model: Func<'static>, labels: Vec<String>, device: Device) -> Self {
        Self {
            model,
            labels,
            device,
        }
    }

    /// Number of classes.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    fn preprocess(&self, image: &DynamicImage) -> candle_core::Result<Tensor> {
        let rgb = image
            .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle)
            .to_rgb8();
        let size = INPUT_SIZE as usize;
        Tensor::from_vec(imagenet_normalize(&rgb), (3, size, size), &self.device)?.unsqueeze(0)
    }

    fn logits(&self, image: &DynamicImage) -> candle_core::Result<Vec<f32>> {
        let input = self.preprocess(image)?;
        self.model
            .forward(&input)?
            .squeeze(0)?
            .to_dtype(candle_core::DType::F32)?
            .to_vec1::<f32>()
    }
}

impl SubjectClassifier for MobileNetClassifier {
    fn name(&self) -> &str {
        "mobilenetv4-conv-small"
    }

    fn classify(&self, image: &DynamicImage) -> Result<Vec<ClassScore>, PipelineError> {
        let logits = self.logits(image).map_err(|e| PipelineError::Extraction {
            stage: "subject",
            message: format!("inference failed: {e}"),
        })?;

        if logits.len() != self.labels.len() {
            return Err(PipelineError::Extraction {
                stage: "subject",
                message: format!(
                    "model produced {} logits for {} labels",
                    logits.len(),
                    self.labels.len()
                ),
            });
        }

        Ok(softmax(&logits)
            .into_iter()
            .zip(&self.labels)
            .map(|(p, label)| ClassScore::new(label.clone(), p))
            .collect())
    }
}
