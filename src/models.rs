use anyhow::Context;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Box in normalized image coordinates (all fields in [0, 1])
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_center: f32,
    pub y_center: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Build from pixel-space corners, normalizing against the image size
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32, img_width: u32, img_height: u32) -> Self {
        let w = img_width.max(1) as f32;
        let h = img_height.max(1) as f32;
        let x1 = x1.clamp(0.0, w);
        let x2 = x2.clamp(0.0, w);
        let y1 = y1.clamp(0.0, h);
        let y2 = y2.clamp(0.0, h);

        Self {
            x_center: (x1 + x2) / 2.0 / w,
            y_center: (y1 + y2) / 2.0 / h,
            width: (x2 - x1).abs() / w,
            height: (y2 - y1).abs() / h,
        }
    }

    /// Pixel-space (x, y, width, height) for an image of the given size
    pub fn to_pixels(&self, img_width: u32, img_height: u32) -> (i32, i32, u32, u32) {
        let w = img_width as f32;
        let h = img_height as f32;
        let x = ((self.x_center - self.width / 2.0) * w).round() as i32;
        let y = ((self.y_center - self.height / 2.0) * h).round() as i32;
        let bw = (self.width * w).round().max(1.0) as u32;
        let bh = (self.height * h).round().max(1.0) as u32;
        (x, y, bw, bh)
    }
}

/// One predicted object instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: u32,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(class_id: u32, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            class_id,
            confidence,
            bbox,
        }
    }

    /// Render as a YOLO label line: `class cx cy w h [conf]`
    pub fn label_line(&self, save_conf: bool) -> String {
        let b = &self.bbox;
        let line = format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, b.x_center, b.y_center, b.width, b.height
        );
        if save_conf {
            format!("{} {:.6}", line, self.confidence)
        } else {
            line
        }
    }
}

/// All detections the detector produced for one image (may be empty)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub detections: Vec<Detection>,
}

impl DetectionResult {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }

    /// Label file contents, one line per detection
    pub fn to_label_text(&self, save_conf: bool) -> String {
        let mut text = String::new();
        for detection in &self.detections {
            text.push_str(&detection.label_line(save_conf));
            text.push('\n');
        }
        text
    }
}

/// Terminal classification of one image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    RejectedBlur,
    FlaggedLowConfidence,
    AutoAccepted,
}

impl Verdict {
    /// Filename prefix used in the review area (None for accepted images)
    pub fn review_prefix(&self) -> Option<&'static str> {
        match self {
            Verdict::RejectedBlur => Some("BLUR_"),
            Verdict::FlaggedLowConfidence => Some("LOWCONF_"),
            Verdict::AutoAccepted => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::RejectedBlur => "rejected (blur)",
            Verdict::FlaggedLowConfidence => "flagged for review (low confidence)",
            Verdict::AutoAccepted => "auto-accepted",
        }
    }
}

/// One source image. `pixels` is None when the file could not be decoded.
#[derive(Clone)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub file_name: String,
    pub pixels: Option<DynamicImage>,
}

impl ImageRecord {
    /// Read and decode an image file. Decode failures are kept on the record
    /// (the sharpness gate fails them closed); a file that cannot be opened
    /// or has no usable name is an error.
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid image file name: {}", path.display()))?
            .to_string();

        let reader = image::ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let pixels = match reader.decode() {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!("Failed to decode {}: {}", path.display(), e);
                None
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            pixels,
        })
    }

    pub fn from_image(file_name: impl Into<String>, image: DynamicImage) -> Self {
        let file_name = file_name.into();
        Self {
            path: PathBuf::from(&file_name),
            file_name,
            pixels: Some(image),
        }
    }

    /// File name without its extension (label file stem)
    pub fn stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }
}

impl std::fmt::Debug for ImageRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageRecord")
            .field("path", &self.path)
            .field("decoded", &self.pixels.is_some())
            .finish()
    }
}

/// Aggregate counters for a batch.
/// `total == auto_accepted + flagged_blur + flagged_low_confidence + errored`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub total: usize,
    pub auto_accepted: usize,
    pub flagged_blur: usize,
    pub flagged_low_confidence: usize,
    pub errored: usize,
}

impl BatchStatistics {
    pub fn record_verdict(&mut self, verdict: Verdict) {
        self.total += 1;
        match verdict {
            Verdict::RejectedBlur => self.flagged_blur += 1,
            Verdict::FlaggedLowConfidence => self.flagged_low_confidence += 1,
            Verdict::AutoAccepted => self.auto_accepted += 1,
        }
    }

    pub fn record_error(&mut self) {
        self.total += 1;
        self.errored += 1;
    }

    pub fn is_consistent(&self) -> bool {
        self.total == self.auto_accepted + self.flagged_blur + self.flagged_low_confidence + self.errored
    }
}
