//! Decoded image handle.

use std::path::Path;

use image::{DynamicImage, GenericImageView};

use crate::error::PipelineError;

/// A decoded image ready for signal extraction.
///
/// Decoding happens once, when the handle is built. Every extractor works on
/// the same decoded pixels, so a file that does not decode fails before any
/// signal is computed.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Path to the image file (or a synthetic identifier).
    pub path: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded image data.
    pub image: DynamicImage,
}

impl ImageInfo {
    /// Wraps an already decoded image.
    #[must_use]
    pub fn new(path: impl Into<String>, image: DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            path: path.into(),
            width,
            height,
            image,
        }
    }

    /// Opens and decodes an image file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ImageLoad`] if the file cannot be read or decoded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let image = image::ImageReader::open(path)
            .map_err(|e| PipelineError::image_load(path, e))?
            .with_guessed_format()
            .map_err(|e| PipelineError::image_load(path, e))?
            .decode()
            .map_err(|e| PipelineError::image_load(path, e))?;
        Ok(Self::new(path.to_string_lossy(), image))
    }

    /// File name component of the path, used in report metadata.
    #[must_use]
    pub fn file_name(&self) -> String {
        Path::new(&self.path)
            .file_name()
            .map_or_else(|| self.path.clone(), |n| n.to_string_lossy().into_owned())
    }

    /// Grayscale copy of the image.
    #[must_use]
    pub fn to_luma8(&self) -> image::GrayImage {
        self.image.to_luma8()
    }

    /// RGB copy of the image.
    #[must_use]
    pub fn to_rgb8(&self) -> image::RgbImage {
        self.image.to_rgb8()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reads_dimensions() {
        let info = ImageInfo::new("a/b/shoe.png", DynamicImage::new_rgb8(40, 30));
        assert_eq!(info.width, 40);
        assert_eq!(info.height, 30);
    }

    #[test]
    fn test_file_name() {
        let info = ImageInfo::new("data/strawberry.jpeg", DynamicImage::new_rgb8(1, 1));
        assert_eq!(info.file_name(), "strawberry.jpeg");

        let synthetic = ImageInfo::new("synthetic://x", DynamicImage::new_rgb8(1, 1));
        assert_eq!(synthetic.file_name(), "x");
    }

    #[test]
    fn test_open_missing_file_is_image_load_error() {
        let err = ImageInfo::open("/nonexistent/product.jpg").unwrap_err();
        assert!(matches!(err, PipelineError::ImageLoad { .. }));
        assert!(err.to_string().contains("/nonexistent/product.jpg"));
    }
}
