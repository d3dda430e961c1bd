//! Image source port for loading images from various sources.

use crate::domain::ImageInfo;
use crate::error::PipelineError;

/// Port for loading images from a source.
pub trait ImageSource: Send + Sync {
    /// Returns an iterator over images from this source.
    ///
    /// # Errors
    ///
    /// Individual items are [`PipelineError::ImageLoad`] if an image fails to
    /// decode. A failed item never ends the iteration.
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo, PipelineError>> + Send + '_>;

    /// Returns the total number of images, if known.
    fn count_hint(&self) -> Option<usize>;
}
