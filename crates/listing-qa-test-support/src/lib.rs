//! Test support utilities for listing-qa.
//!
//! Provides synthetic listing photos and fakes for every port, so the whole
//! pipeline can be exercised without model weights, an OCR engine or network
//! access.
//!
//! # Example
//!
//! ```
//! use listing_qa_test_support::{MockImageSource, SyntheticImageBuilder};
//!
//! let sharp = SyntheticImageBuilder::product_shot();
//! let blurry = SyntheticImageBuilder::blurry_product();
//!
//! let source = MockImageSource::new(vec![sharp, blurry]).with_broken("broken.png");
//! ```

mod builders;
mod mocks;

pub use builders::{SyntheticImageBuilder, BACKGROUND};
pub use mocks::{
    FakeClassifier, FakeReasoningBackend, FakeTextRecognizer, MockImageSource, MockProgressSink,
    MockResultOutput,
};
