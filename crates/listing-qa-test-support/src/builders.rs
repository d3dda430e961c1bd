//! Synthetic image builders for testing.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use listing_qa_core::domain::ImageInfo;

/// Near-white studio background.
pub const BACKGROUND: [u8; 3] = [245, 245, 245];

/// Builder for creating synthetic listing photos.
///
/// The images are shaped to land on a known side of the default extractor
/// thresholds: sharp or blurry, clean or cluttered.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    // === Sharpness ===

    /// Creates a high-contrast checkerboard (very sharp edges).
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> ImageInfo {
        Self::checkerboard_with_cell_size(width, height, 8)
    }

    /// Creates a checkerboard with custom cell size.
    #[must_use]
    pub fn checkerboard_with_cell_size(width: u32, height: u32, cell_size: u32) -> ImageInfo {
        let img = GrayImage::from_fn(width, height, |x, y| {
            if (x / cell_size + y / cell_size) % 2 == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        ImageInfo::new("synthetic://checkerboard", DynamicImage::ImageLuma8(img))
    }

    /// Creates a single-color image (no edges at all).
    #[must_use]
    pub fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> ImageInfo {
        let img = RgbImage::from_pixel(width, height, Rgb(rgb));
        ImageInfo::new("synthetic://uniform", DynamicImage::ImageRgb8(img))
    }

    // === Listing photos ===

    /// A sharp, textured red product centered on a clean background.
    ///
    /// The background covers roughly 85% of the frame.
    #[must_use]
    pub fn product_shot() -> ImageInfo {
        ImageInfo::new(
            "synthetic://product_shot",
            DynamicImage::ImageRgb8(Self::product_pixels(128)),
        )
    }

    /// The product shot, heavily defocused.
    #[must_use]
    pub fn blurry_product() -> ImageInfo {
        let blurred = image::imageops::blur(&Self::product_pixels(128), 6.0);
        ImageInfo::new("synthetic://blurry_product", DynamicImage::ImageRgb8(blurred))
    }

    /// A sharp image split evenly between three saturated colors.
    #[must_use]
    pub fn cluttered_scene() -> ImageInfo {
        const COLORS: [[u8; 3]; 3] = [[230, 20, 20], [20, 200, 40], [20, 30, 180]];
        let img = RgbImage::from_fn(96, 96, |x, y| {
            Rgb(COLORS[((x / 8 + y / 8) % 3) as usize])
        });
        ImageInfo::new("synthetic://cluttered_scene", DynamicImage::ImageRgb8(img))
    }

    fn product_pixels(size: u32) -> RgbImage {
        let lo = size * 5 / 16;
        let hi = size - lo;
        RgbImage::from_fn(size, size, |x, y| {
            let inside = (lo..hi).contains(&x) && (lo..hi).contains(&y);
            if !inside {
                Rgb(BACKGROUND)
            } else if (x / 4 + y / 4) % 2 == 0 {
                Rgb([205, 25, 35])
            } else {
                Rgb([90, 10, 15])
            }
        })
    }

    // === Files ===

    /// Renames an image (e.g. to give it a realistic file name).
    #[must_use]
    pub fn named(image: ImageInfo, path: impl Into<String>) -> ImageInfo {
        ImageInfo::new(path, image.image)
    }

    /// Encodes an image in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode(image: &ImageInfo, format: ImageFormat) -> anyhow::Result<Vec<u8>> {
        let mut bytes = std::io::Cursor::new(Vec::new());
        image.image.write_to(&mut bytes, format)?;
        Ok(bytes.into_inner())
    }

    /// Writes an image into `dir` as `file_name`, format taken from the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be encoded or written.
    pub fn write_file(dir: &Path, file_name: &str, image: &ImageInfo) -> anyhow::Result<PathBuf> {
        let path = dir.join(file_name);
        let format = ImageFormat::from_path(&path)?;
        std::fs::write(&path, Self::encode(image, format)?)?;
        Ok(path)
    }

    /// Writes bytes that look like an image by name but do not decode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_corrupt_file(dir: &Path, file_name: &str) -> anyhow::Result<PathBuf> {
        let path = dir.join(file_name);
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nthis is not really a png")?;
        Ok(path)
    }
}
