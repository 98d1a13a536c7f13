use crate::config::DetectorConfig;
use crate::detection::{postprocess, preprocessing, Detector};
use crate::error::AuditError;
use crate::models::DetectionResult;
use image::DynamicImage;
use rten::Model;
use rten_tensor::prelude::*;
use rten_tensor::NdTensor;
use std::path::Path;

/// YOLOv8-style object detector running an `.rten` model
pub struct YoloDetector {
    model: Model,
    config: DetectorConfig,
}

impl YoloDetector {
    /// Load the model, failing with `ModelNotFound` before touching the
    /// runtime when the file is absent.
    pub fn load(model_path: &Path, config: &DetectorConfig) -> anyhow::Result<Self> {
        if !model_path.exists() {
            return Err(AuditError::ModelNotFound {
                path: model_path.to_path_buf(),
            }
            .into());
        }

        let model = Model::load_file(model_path)
            .map_err(|e| anyhow::anyhow!("Failed to load model {}: {}", model_path.display(), e))?;

        tracing::info!("Loaded detector model from {}", model_path.display());

        Ok(Self {
            model,
            config: config.clone(),
        })
    }
}

impl Detector for YoloDetector {
    fn name(&self) -> &str {
        "yolo"
    }

    fn detect(&self, image: &DynamicImage) -> anyhow::Result<DetectionResult> {
        let size = self.config.input_size;
        let (canvas, letterbox) = preprocessing::letterbox(image, size);
        let data = preprocessing::to_chw(&canvas);
        let input = NdTensor::from_data([1, 3, size as usize, size as usize], data);

        let output: NdTensor<f32, 3> = self.model.run_one(input.view().into(), None)?.try_into()?;
        let [_, rows, anchors] = output.shape();
        let raw = output.to_vec();

        let candidates = postprocess::decode_yolo(&raw, rows, anchors, &letterbox, self.config.min_confidence);
        let kept = postprocess::non_max_suppression(candidates, self.config.iou_threshold, self.config.max_detections);

        Ok(DetectionResult::new(postprocess::to_detections(
            &kept,
            image.width(),
            image.height(),
        )))
    }
}
