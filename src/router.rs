use crate::error::{AuditError, AuditResult};
use crate::models::{DetectionResult, ImageRecord, Verdict};
use std::fs;
use std::path::{Path, PathBuf};

/// Where one image ended up
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingOutcome {
    pub verdict: Verdict,
    pub image_path: PathBuf,
    /// Only set for auto-accepted images
    pub label_path: Option<PathBuf>,
}

/// Copies images (and labels) into the auto-labeled or review area.
/// Existing destination files are overwritten, so re-runs are safe.
#[derive(Debug, Clone)]
pub struct Router {
    auto_dir: PathBuf,
    review_dir: PathBuf,
    save_conf: bool,
}

impl Router {
    pub fn new(auto_dir: impl Into<PathBuf>, review_dir: impl Into<PathBuf>) -> Self {
        Self {
            auto_dir: auto_dir.into(),
            review_dir: review_dir.into(),
            save_conf: false,
        }
    }

    pub fn with_save_conf(mut self, save_conf: bool) -> Self {
        self.save_conf = save_conf;
        self
    }

    pub fn auto_dir(&self) -> &Path {
        &self.auto_dir
    }

    pub fn review_dir(&self) -> &Path {
        &self.review_dir
    }

    /// Ensure both destination directories exist
    pub fn prepare(&self) -> AuditResult<()> {
        for dir in [&self.auto_dir, &self.review_dir] {
            fs::create_dir_all(dir).map_err(|source| AuditError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Write the image (and label file, when accepted) to its destination
    pub fn route(
        &self,
        record: &ImageRecord,
        verdict: Verdict,
        detections: Option<&DetectionResult>,
    ) -> AuditResult<RoutingOutcome> {
        match verdict.review_prefix() {
            Some(prefix) => {
                let dest = self.review_dir.join(format!("{}{}", prefix, record.file_name));
                copy_image(record, &dest)?;
                Ok(RoutingOutcome {
                    verdict,
                    image_path: dest,
                    label_path: None,
                })
            }
            None => self.accept(record, verdict, detections),
        }
    }

    fn accept(
        &self,
        record: &ImageRecord,
        verdict: Verdict,
        detections: Option<&DetectionResult>,
    ) -> AuditResult<RoutingOutcome> {
        let label_path = self.auto_dir.join(format!("{}.txt", record.stem()));
        let text = detections
            .map(|d| d.to_label_text(self.save_conf))
            .unwrap_or_default();
        fs::write(&label_path, text).map_err(|source| AuditError::DestinationWrite {
            path: label_path.clone(),
            source,
        })?;

        let dest = self.auto_dir.join(&record.file_name);
        if let Err(e) = copy_image(record, &dest) {
            // Don't leave a label without its image
            let _ = fs::remove_file(&label_path);
            return Err(e);
        }

        Ok(RoutingOutcome {
            verdict,
            image_path: dest,
            label_path: Some(label_path),
        })
    }
}

fn copy_image(record: &ImageRecord, dest: &Path) -> AuditResult<()> {
    fs::copy(&record.path, dest)
        .map(|_| ())
        .map_err(|source| AuditError::DestinationWrite {
            path: dest.to_path_buf(),
            source,
        })
}
