//! Core domain types for listing photo analysis.

mod extractor;
mod image;
mod report;
mod signals;
mod verdict;

pub use extractor::SignalExtractor;
pub use image::ImageInfo;
pub use report::{FinalReport, ReportMetadata, SYSTEM_NAME};
pub use signals::{
    round_to, ColorSignal, DetectedObject, DominantColor, SharpnessSignal, SignalBundle,
    SubjectSignal, TextSignal, UNKNOWN_SUBJECT,
};
pub use verdict::{
    verdict_phrase, Decision, DecisionPath, Verdict, NOT_SUITABLE_PHRASE, SUITABLE_PHRASE,
};
