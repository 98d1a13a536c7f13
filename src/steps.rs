use crate::detection::Detector;
use crate::error::{AuditError, AuditResult};
use crate::gates::{confidence, sharpness};
use crate::models::Verdict;
use crate::pipeline::{AuditContext, AuditItem, AuditStep, StepOutcome};

/// Layer 1: reject out-of-focus (or undecodable) images
pub struct SharpnessStep {
    pub threshold: f64,
}

impl SharpnessStep {
    fn save_debug_output(&self, item: &AuditItem, response: &sharpness::LaplacianResponse, context: &AuditContext) {
        let Some(dir) = context.debug_dir() else {
            return;
        };
        let path = dir.join(format!("{}_laplacian.png", item.record.stem()));
        match response.to_visualization().save(&path) {
            Ok(()) => tracing::debug!("Debug: saved {}", path.display()),
            Err(e) => tracing::warn!("Failed to save debug image {}: {}", path.display(), e),
        }
    }
}

impl AuditStep for SharpnessStep {
    fn process(&self, mut item: AuditItem, context: &AuditContext) -> AuditResult<StepOutcome> {
        let assessment = match &item.record.pixels {
            Some(img) => {
                let (assessment, response) = sharpness::assess_with_response(img, self.threshold);
                self.save_debug_output(&item, &response, context);
                assessment
            }
            None => {
                tracing::warn!("{}: unreadable image, treating as blurry", item.record.file_name);
                sharpness::assess_sharpness(None, self.threshold)
            }
        };

        tracing::debug!(
            "{}: sharpness {:.2} (threshold {:.2})",
            item.record.file_name,
            assessment.score,
            self.threshold
        );

        item.sharpness = Some(assessment);
        if assessment.is_blurry {
            Ok(StepOutcome::Terminal(item, Verdict::RejectedBlur))
        } else {
            Ok(StepOutcome::Continue(item))
        }
    }

    fn name(&self) -> &str {
        "Sharpness Gate"
    }
}

/// Run the detector and attach its normalized output
pub struct DetectionStep {
    pub detector: Box<dyn Detector>,
}

impl DetectionStep {
    pub fn new(detector: Box<dyn Detector>) -> Self {
        Self { detector }
    }
}

impl AuditStep for DetectionStep {
    fn process(&self, mut item: AuditItem, _context: &AuditContext) -> AuditResult<StepOutcome> {
        let Some(img) = &item.record.pixels else {
            return Err(AuditError::ImageDecode {
                path: item.record.path.clone(),
                message: "no pixel data to run detection on".to_string(),
            });
        };

        let result = self.detector.detect(img).map_err(|e| AuditError::Detection {
            file: item.record.file_name.clone(),
            message: format!("{:#}", e),
        })?;

        tracing::debug!(
            "{}: {} returned {} detections",
            item.record.file_name,
            self.detector.name(),
            result.len()
        );

        item.detections = Some(result);
        Ok(StepOutcome::Continue(item))
    }

    fn name(&self) -> &str {
        "Detection"
    }
}

/// Layer 2: flag images with no detections or any weak detection
pub struct ConfidenceStep {
    pub threshold: f32,
}

impl AuditStep for ConfidenceStep {
    fn process(&self, item: AuditItem, _context: &AuditContext) -> AuditResult<StepOutcome> {
        let low = match &item.detections {
            Some(result) => {
                if let Some(weakest) = confidence::weakest(result) {
                    tracing::debug!(
                        "{}: weakest detection {:.3} (threshold {:.3})",
                        item.record.file_name,
                        weakest.confidence,
                        self.threshold
                    );
                }
                confidence::is_low_confidence(result, self.threshold)
            }
            None => true,
        };

        if low {
            Ok(StepOutcome::Terminal(item, Verdict::FlaggedLowConfidence))
        } else {
            Ok(StepOutcome::Continue(item))
        }
    }

    fn name(&self) -> &str {
        "Confidence Gate"
    }
}

/// Build the standard two-gate audit pipeline:
/// sharpness, then detection, then confidence
pub fn build_standard_pipeline(
    config: &crate::config::AuditConfig,
    detector: Box<dyn Detector>,
) -> crate::pipeline::AuditPipeline {
    crate::pipeline::AuditPipeline::new()
        .add_step(SharpnessStep {
            threshold: config.blur_threshold,
        })
        .add_step(DetectionStep::new(detector))
        .add_step(ConfidenceStep {
            threshold: config.conf_auto_accept,
        })
}
