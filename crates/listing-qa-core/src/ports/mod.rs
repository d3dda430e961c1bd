//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external adapters.

mod classifier;
mod image_source;
mod progress;
mod reasoning;
mod result_output;
mod text_recognizer;

pub use classifier::{ClassScore, SubjectClassifier};
pub use image_source::ImageSource;
pub use progress::{NoProgress, ProgressEvent, ProgressSink};
pub use reasoning::{ReasoningBackend, ReasoningRequest};
pub use result_output::ResultOutput;
pub use text_recognizer::TextRecognizer;
