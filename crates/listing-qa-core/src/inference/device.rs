//! Device selection for inference.

use candle_core::Device;
use tracing::info;

/// Returns the device the classifier runs on.
///
/// Uses Metal or CUDA when the crate is built with the matching feature and a
/// GPU is present, the CPU otherwise.
#[must_use]
pub fn get_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            info!("Classifier running on Metal");
            return device;
        }
    }

    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            info!("Classifier running on CUDA");
            return device;
        }
    }

    info!("Classifier running on CPU");
    Device::Cpu
}
