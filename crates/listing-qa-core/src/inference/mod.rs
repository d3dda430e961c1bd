//! ML inference using Candle.
//!
//! Provides device selection, safetensors loading and the ImageNet classifier
//! behind the subject extractor.

mod device;
mod loader;
mod mobilenet;
mod utils;

pub use device::get_device;
pub use loader::load_safetensors;
pub use mobilenet::{load_labels, MobileNetClassifier, IMAGENET_CLASSES, INPUT_SIZE};
pub use utils::{imagenet_normalize, softmax};
