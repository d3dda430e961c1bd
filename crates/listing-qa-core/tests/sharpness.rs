//! Sharpness scoring on synthetic edge patterns.

#![allow(clippy::unwrap_used)]

use listing_qa_core::extractors::{SharpnessConfig, SharpnessExtractor};
use listing_qa_core::SignalExtractor;
use listing_qa_test_support::SyntheticImageBuilder;

#[test]
fn checkerboard_is_sharp() {
    let signal = SharpnessExtractor::default()
        .extract(&SyntheticImageBuilder::checkerboard(64, 64))
        .unwrap();
    assert!(!signal.is_blurry);
    assert!(signal.blur_score > 1000.0);
    assert!((signal.threshold_used - 100.0).abs() < f64::EPSILON);
}

#[test]
fn flat_image_has_no_edges() {
    let signal = SharpnessExtractor::default()
        .extract(&SyntheticImageBuilder::uniform(64, 64, [245, 245, 245]))
        .unwrap();
    assert!(signal.is_blurry);
    assert!(signal.blur_score.abs() < f64::EPSILON);
}

#[test]
fn finer_patterns_score_higher() {
    let extractor = SharpnessExtractor::default();
    let fine = extractor
        .extract(&SyntheticImageBuilder::checkerboard_with_cell_size(64, 64, 4))
        .unwrap();
    let coarse = extractor
        .extract(&SyntheticImageBuilder::checkerboard_with_cell_size(64, 64, 16))
        .unwrap();
    assert!(fine.blur_score > coarse.blur_score);
}

#[test]
fn threshold_decides_blurriness() {
    let image = SyntheticImageBuilder::checkerboard_with_cell_size(64, 64, 16);
    let score = SharpnessExtractor::default().extract(&image).unwrap().blur_score;

    let strict = SharpnessExtractor::new(SharpnessConfig {
        threshold: score + 1.0,
    });
    assert!(strict.extract(&image).unwrap().is_blurry);

    let lenient = SharpnessExtractor::new(SharpnessConfig {
        threshold: score - 1.0,
    });
    assert!(!lenient.extract(&image).unwrap().is_blurry);
}
