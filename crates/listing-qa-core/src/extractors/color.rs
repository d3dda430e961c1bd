//! Color composition extractor.
//!
//! Estimates background complexity by clustering the colors of a downsampled
//! copy of the image with k-means. A clean product shot is dominated by one
//! background cluster; when the largest cluster covers less than half of the
//! pixels the background is considered cluttered.

// Allow common image code patterns
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

use image::imageops::FilterType;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::domain::{round_to, ColorSignal, DominantColor, ImageInfo, SignalExtractor};
use crate::error::PipelineError;

/// Center movement (squared, in RGB units) below which Lloyd iterations stop.
const CONVERGENCE_TOLERANCE: f64 = 1e-4;

/// Configuration for the color extractor.
#[derive(Debug, Clone)]
pub struct ColorConfig {
    /// Number of color clusters (k).
    pub clusters: usize,
    /// Independent k-means runs; the lowest-inertia run wins.
    pub restarts: usize,
    /// Maximum Lloyd iterations per run.
    pub max_iterations: usize,
    /// Side of the square the image is resized to before clustering.
    pub sample_size: u32,
    /// RNG seed. `None` seeds from OS entropy, making results vary run to run.
    pub seed: Option<u64>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            clusters: 3,
            restarts: 10,
            max_iterations: 300,
            sample_size: 100,
            seed: Some(0),
        }
    }
}

impl ColorConfig {
    /// Checks that the clustering parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if any parameter is zero or
    /// `clusters` exceeds the number of sampled pixels.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let pixels = u64::from(self.sample_size) * u64::from(self.sample_size);
        if self.clusters == 0 || self.clusters as u64 > pixels {
            return Err(PipelineError::InvalidConfig(format!(
                "color.clusters must be between 1 and {pixels}, got {}",
                self.clusters
            )));
        }
        if self.restarts == 0 || self.max_iterations == 0 || self.sample_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "color restarts, iterations and sample size must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Result of one k-means run.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Cluster centers in RGB space.
    pub centers: Vec<[f64; 3]>,
    /// Cluster index of every point.
    pub labels: Vec<usize>,
    /// Sum of squared distances of points to their center.
    pub inertia: f64,
}

impl Clustering {
    /// Number of points assigned to each cluster.
    #[must_use]
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.centers.len()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

fn nearest(point: &[f64; 3], centers: &[[f64; 3]]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, center) in centers.iter().enumerate() {
        let d = squared_distance(point, center);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// k-means++ seeding: each new center is drawn with probability proportional
/// to its squared distance from the nearest existing center.
fn seed_centers(points: &[[f64; 3]], k: usize, rng: &mut StdRng) -> Vec<[f64; 3]> {
    let mut centers = Vec::with_capacity(k);
    centers.push(points[rng.gen_range(0..points.len())]);

    let mut distances: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centers[0]))
        .collect();

    while centers.len() < k {
        let total: f64 = distances.iter().sum();
        let index = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            distances
                .iter()
                .position(|&d| {
                    target -= d;
                    target <= 0.0
                })
                .unwrap_or(points.len() - 1)
        } else {
            // Every point coincides with a center already.
            rng.gen_range(0..points.len())
        };

        let center = points[index];
        for (d, p) in distances.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &center));
        }
        centers.push(center);
    }

    centers
}

/// Runs one k-means (Lloyd) clustering from k-means++ seeds.
///
/// Empty clusters keep their previous center.
#[must_use]
pub fn kmeans(points: &[[f64; 3]], k: usize, max_iterations: usize, rng: &mut StdRng) -> Clustering {
    if points.is_empty() || k == 0 {
        return Clustering {
            centers: Vec::new(),
            labels: Vec::new(),
            inertia: 0.0,
        };
    }

    let mut centers = seed_centers(points, k, rng);
    let mut labels = vec![0usize; points.len()];

    for iteration in 0..max_iterations {
        for (label, point) in labels.iter_mut().zip(points) {
            *label = nearest(point, &centers).0;
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (&label, point) in labels.iter().zip(points) {
            for c in 0..3 {
                sums[label][c] += point[c];
            }
            counts[label] += 1;
        }

        let mut shift = 0.0f64;
        for (i, center) in centers.iter_mut().enumerate() {
            if counts[i] == 0 {
                continue;
            }
            let n = counts[i] as f64;
            let updated = [sums[i][0] / n, sums[i][1] / n, sums[i][2] / n];
            shift = shift.max(squared_distance(center, &updated));
            *center = updated;
        }

        if shift < CONVERGENCE_TOLERANCE {
            trace!("k-means converged after {} iterations", iteration + 1);
            break;
        }
    }

    let mut inertia = 0.0;
    for (label, point) in labels.iter_mut().zip(points) {
        let (index, distance) = nearest(point, &centers);
        *label = index;
        inertia += distance;
    }

    Clustering {
        centers,
        labels,
        inertia,
    }
}

/// k-means color clustering extractor.
pub struct ColorExtractor {
    config: ColorConfig,
}

impl ColorExtractor {
    /// Creates a new color extractor with the given configuration.
    #[must_use]
    pub const fn new(config: ColorConfig) -> Self {
        Self { config }
    }

    /// Returns the extractor configuration.
    #[must_use]
    pub const fn config(&self) -> &ColorConfig {
        &self.config
    }

    fn rng(&self) -> StdRng {
        self.config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }

    /// Downsamples the image and returns its pixels as RGB points.
    fn sample_pixels(&self, image: &ImageInfo) -> Vec<[f64; 3]> {
        let size = self.config.sample_size;
        image
            .image
            .resize_exact(size, size, FilterType::Triangle)
            .to_rgb8()
            .pixels()
            .map(|p| [f64::from(p.0[0]), f64::from(p.0[1]), f64::from(p.0[2])])
            .collect()
    }

    /// Clusters the points `restarts` times and keeps the tightest clustering.
    fn best_clustering(&self, points: &[[f64; 3]]) -> Clustering {
        let mut rng = self.rng();
        let k = self.config.clusters.min(points.len());
        let mut best: Option<Clustering> = None;

        for _ in 0..self.config.restarts {
            let candidate = kmeans(points, k, self.config.max_iterations, &mut rng);
            if best.as_ref().is_none_or(|b| candidate.inertia < b.inertia) {
                best = Some(candidate);
            }
        }

        best.unwrap_or_else(|| kmeans(points, k, self.config.max_iterations, &mut rng))
    }
}

impl Default for ColorExtractor {
    fn default() -> Self {
        Self::new(ColorConfig::default())
    }
}

impl SignalExtractor for ColorExtractor {
    type Signal = ColorSignal;

    fn name(&self) -> &'static str {
        "color"
    }

    fn extract(&self, image: &ImageInfo) -> Result<ColorSignal, PipelineError> {
        self.config.validate()?;

        let points = self.sample_pixels(image);
        let clustering = self.best_clustering(&points);
        let total = points.len() as f64;

        let colors = clustering
            .centers
            .iter()
            .zip(clustering.counts())
            .map(|(center, count)| DominantColor {
                // Float-to-int casts truncate and saturate to 0..=255.
                rgb: [center[0] as u8, center[1] as u8, center[2] as u8],
                coverage: round_to(count as f64 / total, 2),
            })
            .collect();

        let signal = ColorSignal::from_clusters(colors);
        debug!(
            "Color of {}: top coverage={:?} cluttered={} inertia={:.1}",
            image.path,
            signal.top_coverage(),
            signal.is_cluttered,
            clustering.inertia
        );
        Ok(signal)
    }
}
