use crate::error::{AuditError, AuditResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default sharpness cutoff (variance of the Laplacian). Tunable per dataset.
pub const DEFAULT_BLUR_THRESHOLD: f64 = 100.0;

/// Default confidence every detection must reach for auto-acceptance
pub const DEFAULT_CONF_AUTO_ACCEPT: f32 = 0.85;

/// Settings for the YOLO detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Square model input size in pixels
    pub input_size: u32,
    /// Candidates below this class score are dropped before NMS
    pub min_confidence: f32,
    /// IoU above which overlapping boxes of the same class are suppressed
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_size: 640,
            min_confidence: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
        }
    }
}

/// Audit settings, passed explicitly into the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub blur_threshold: f64,
    pub conf_auto_accept: f32,
    pub source_dir: PathBuf,
    pub auto_dir: PathBuf,
    pub review_dir: PathBuf,
    pub model_path: PathBuf,
    /// Append the confidence to each label line
    pub save_conf: bool,
    pub detector: DetectorConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            blur_threshold: DEFAULT_BLUR_THRESHOLD,
            conf_auto_accept: DEFAULT_CONF_AUTO_ACCEPT,
            source_dir: PathBuf::from("data/raw"),
            auto_dir: PathBuf::from("data/auto_labeled"),
            review_dir: PathBuf::from("data/needs_review"),
            model_path: PathBuf::from("models/yolov8n.rten"),
            save_conf: false,
            detector: DetectorConfig::default(),
        }
    }
}

impl AuditConfig {
    /// Load from a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> AuditResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AuditError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> AuditResult<Self> {
        toml::from_str(content).map_err(|e| AuditError::Config(e.to_string()))
    }

    pub fn with_thresholds(mut self, blur_threshold: f64, conf_auto_accept: f32) -> Self {
        self.blur_threshold = blur_threshold;
        self.conf_auto_accept = conf_auto_accept;
        self
    }

    pub fn with_dirs(
        mut self,
        source_dir: impl Into<PathBuf>,
        auto_dir: impl Into<PathBuf>,
        review_dir: impl Into<PathBuf>,
    ) -> Self {
        self.source_dir = source_dir.into();
        self.auto_dir = auto_dir.into();
        self.review_dir = review_dir.into();
        self
    }

    pub fn validate(&self) -> AuditResult<()> {
        if !self.blur_threshold.is_finite() || self.blur_threshold < 0.0 {
            return Err(AuditError::Config(format!(
                "blur_threshold must be a non-negative number, got {}",
                self.blur_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.conf_auto_accept) {
            return Err(AuditError::Config(format!(
                "conf_auto_accept must be within [0, 1], got {}",
                self.conf_auto_accept
            )));
        }
        if self.detector.input_size == 0 || self.detector.input_size % 32 != 0 {
            return Err(AuditError::Config(format!(
                "detector.input_size must be a positive multiple of 32, got {}",
                self.detector.input_size
            )));
        }
        if !(0.0..=1.0).contains(&self.detector.min_confidence)
            || !(0.0..=1.0).contains(&self.detector.iou_threshold)
        {
            return Err(AuditError::Config(
                "detector.min_confidence and detector.iou_threshold must be within [0, 1]".to_string(),
            ));
        }
        let source = resolved(&self.source_dir);
        let auto = resolved(&self.auto_dir);
        let review = resolved(&self.review_dir);
        if auto == review {
            return Err(AuditError::Config(format!(
                "auto_dir and review_dir must differ (both are {})",
                self.auto_dir.display()
            )));
        }
        for (key, dir, path) in [("auto_dir", &auto, &self.auto_dir), ("review_dir", &review, &self.review_dir)] {
            if *dir == source {
                return Err(AuditError::Config(format!(
                    "{} must not be the source directory ({})",
                    key,
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Path used for directory comparisons: canonical when it exists, otherwise
/// the canonical parent joined with the last component.
fn resolved(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            std::fs::canonicalize(parent)
                .map(|p| p.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}
