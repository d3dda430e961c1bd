//! Filesystem adapter for loading listing photos.

use std::path::{Path, PathBuf};

use listing_qa_core::{ImageInfo, ImageSource, PipelineError};
use tracing::{debug, warn};

/// Supported image extensions (matched case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Filesystem image source adapter.
///
/// Files are yielded in path order so batch output is reproducible.
pub struct FsImageSource {
    paths: Vec<PathBuf>,
    recursive: bool,
}

impl FsImageSource {
    /// Creates a new filesystem image source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self { paths, recursive }
    }

    /// Lists the image files behind the configured paths.
    ///
    /// Explicit files keep their argument order; each directory contributes
    /// its images sorted by path.
    #[must_use]
    pub fn collect_files(&self) -> Vec<PathBuf> {
        self.paths
            .iter()
            .flat_map(|path| {
                if path.is_file() {
                    if is_supported_image(path) {
                        vec![path.clone()]
                    } else {
                        warn!("Skipping unsupported file {}", path.display());
                        Vec::new()
                    }
                } else if path.is_dir() {
                    scan_dir(path, self.recursive)
                } else {
                    warn!("Path does not exist: {}", path.display());
                    Vec::new()
                }
            })
            .collect()
    }
}

/// Walks `root` without recursion on the call stack.
fn scan_dir(root: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read {}: {e}", dir.display());
                continue;
            }
        };
        for path in entries.filter_map(Result::ok).map(|entry| entry.path()) {
            if path.is_dir() {
                if recursive {
                    pending.push(path);
                }
            } else if is_supported_image(&path) {
                found.push(path);
            }
        }
    }

    found.sort();
    found
}

impl ImageSource for FsImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo, PipelineError>> + Send + '_> {
        let files = self.collect_files();
        debug!("Found {} image files", files.len());

        Box::new(files.into_iter().map(ImageInfo::open))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.collect_files().len())
    }
}

/// Checks if a path has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}
