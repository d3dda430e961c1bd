//! Signal extractor implementations.
//!
//! Each extractor implements the `SignalExtractor` trait for one kind of
//! visual evidence.

mod color;
mod sharpness;
mod subject;
mod text;

pub use color::{kmeans, Clustering, ColorConfig, ColorExtractor};
pub use sharpness::{laplacian_variance, SharpnessConfig, SharpnessExtractor};
pub use subject::{SubjectConfig, SubjectExtractor};
pub use text::{binarize, TextExtractor};
