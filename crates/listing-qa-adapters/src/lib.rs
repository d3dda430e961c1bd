//! Listing QA Adapters - External adapters for listing-qa.
//!
//! This crate provides adapters for:
//! - Filesystem image source
//! - Tesseract OCR
//! - OpenAI-compatible reasoning backends
//! - Per-image JSON report files
//! - Model downloading and caching

pub mod fs;
pub mod models;
pub mod openai;
pub mod report_dir;
pub mod tesseract;

pub use fs::FsImageSource;
pub use models::{models_dir, ModelInfo, ModelStore, CLASSIFIER_LABELS, CLASSIFIER_WEIGHTS};
pub use openai::{OpenAiCompatibleClient, OpenAiConfig};
pub use report_dir::DirectoryReportWriter;
pub use tesseract::TesseractRecognizer;
