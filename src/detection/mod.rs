pub mod classes;
pub mod postprocess;
pub mod preprocessing;
pub mod yolo;

use crate::models::DetectionResult;
use image::DynamicImage;

pub use yolo::YoloDetector;

/// Object-detection capability. Returns every detection it finds with its
/// raw confidence; no thresholding happens here. An empty result is a valid
/// answer, an `Err` means the model itself failed.
pub trait Detector {
    fn detect(&self, image: &DynamicImage) -> anyhow::Result<DetectionResult>;

    /// Human-readable name for this detector (used in logs)
    fn name(&self) -> &str;
}
