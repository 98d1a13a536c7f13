use crate::models::{Detection, DetectionResult};

/// A detection passes when its confidence is at least the threshold.
/// NaN never passes.
pub fn passes(detection: &Detection, threshold: f32) -> bool {
    detection.confidence >= threshold
}

/// Low confidence when nothing was detected, or any single detection is
/// below the threshold. One weak box flags the whole image.
pub fn is_low_confidence(result: &DetectionResult, threshold: f32) -> bool {
    result.is_empty() || result.iter().any(|d| !passes(d, threshold))
}

/// Lowest confidence in the result, if any
pub fn weakest(result: &DetectionResult) -> Option<&Detection> {
    result
        .iter()
        .min_by(|a, b| a.confidence.total_cmp(&b.confidence))
}
