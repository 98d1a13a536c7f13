use crate::detection::preprocessing::Letterbox;
use crate::models::{BoundingBox, Detection};

/// Axis-aligned candidate box in source-image pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub class_id: u32,
    pub score: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Candidate {
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    pub fn iou(&self, other: &Candidate) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 { 0.0 } else { inter / union }
    }
}

/// Decode a YOLOv8 head laid out as `[4 + classes, anchors]` (row-major,
/// batch dimension already stripped). Rows 0..4 are cx, cy, w, h in
/// model-input pixels; the remaining rows are per-class scores.
pub fn decode_yolo(
    raw: &[f32],
    rows: usize,
    anchors: usize,
    letterbox: &Letterbox,
    min_confidence: f32,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    if rows <= 4 || raw.len() < rows * anchors {
        return candidates;
    }

    for a in 0..anchors {
        let mut best_class = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for c in 4..rows {
            let s = raw[c * anchors + a];
            // A NaN score sticks so the confidence gate can reject it
            if s.is_nan() || s > best_score {
                best_score = s;
                best_class = c - 4;
                if s.is_nan() {
                    break;
                }
            }
        }
        if best_score < min_confidence {
            continue;
        }

        let cx = raw[a];
        let cy = raw[anchors + a];
        let w = raw[2 * anchors + a];
        let h = raw[3 * anchors + a];
        let (x1, y1) = letterbox.to_source(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_source(cx + w / 2.0, cy + h / 2.0);

        candidates.push(Candidate {
            class_id: best_class as u32,
            score: best_score,
            x1,
            y1,
            x2,
            y2,
        });
    }

    candidates
}

/// Greedy per-class non-maximum suppression, highest score first
pub fn non_max_suppression(mut candidates: Vec<Candidate>, iou_threshold: f32, max_detections: usize) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}

/// Convert surviving candidates into normalized detections
pub fn to_detections(candidates: &[Candidate], img_width: u32, img_height: u32) -> Vec<Detection> {
    candidates
        .iter()
        .map(|c| {
            Detection::new(
                c.class_id,
                c.score,
                BoundingBox::from_corners(c.x1, c.y1, c.x2, c.y2, img_width, img_height),
            )
        })
        .collect()
}
