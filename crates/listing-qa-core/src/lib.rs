//! Listing QA Core - Domain logic, signal extractors and decision engine
//!
//! This crate contains the signal records, the four extractors (sharpness,
//! color composition, subject, text), the heuristic and remote decision
//! strategies, and the pipeline that ties them together for one image or a
//! batch.

pub mod decision;
pub mod domain;
pub mod error;
pub mod extractors;
pub mod inference;
pub mod pipeline;
pub mod ports;

pub use decision::{DecisionEngine, HeuristicDecider, RemoteDecider};
pub use domain::{
    ColorSignal, Decision, DecisionPath, DetectedObject, DominantColor, FinalReport, ImageInfo,
    ReportMetadata, SharpnessSignal, SignalBundle, SignalExtractor, SubjectSignal, TextSignal,
    Verdict,
};
pub use error::{BackendError, PipelineError};
pub use extractors::{
    ColorConfig, ColorExtractor, SharpnessConfig, SharpnessExtractor, SubjectConfig,
    SubjectExtractor, TextExtractor,
};
pub use pipeline::{BatchSummary, Pipeline};
pub use ports::{
    ClassScore, ImageSource, NoProgress, ProgressEvent, ProgressSink, ReasoningBackend,
    ReasoningRequest, ResultOutput, SubjectClassifier, TextRecognizer,
};
