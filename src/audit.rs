use crate::config::AuditConfig;
use crate::detection::Detector;
use crate::error::{AuditError, AuditResult};
use crate::models::{BatchStatistics, ImageRecord};
use crate::pipeline::AuditPipeline;
use crate::router::Router;
use crate::steps::build_standard_pipeline;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Recognised image extensions (compared case-insensitively)
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
        .unwrap_or(false)
}

/// All supported image files directly inside `dir`, sorted by name.
/// Other files and subdirectories are ignored.
pub fn enumerate_images(dir: &Path) -> AuditResult<Vec<PathBuf>> {
    let io_err = |source: std::io::Error| AuditError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && is_supported_image(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Source file could not be read into a record
    Input,
    /// The detector errored
    Detection,
    /// Copying the image or writing its label failed
    DestinationWrite,
}

/// A per-image failure, counted under `errored`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFailure {
    pub file_name: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Result of one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub statistics: BatchStatistics,
    pub failures: Vec<ImageFailure>,
    pub auto_dir: PathBuf,
    pub review_dir: PathBuf,
    pub started_at: String,
    pub finished_at: String,
}

impl BatchReport {
    pub fn to_json(&self) -> AuditResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json(&self, path: &Path) -> AuditResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| AuditError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.statistics;
        writeln!(f, "{}", "=".repeat(30))?;
        writeln!(f, "AUDIT COMPLETE")?;
        writeln!(f, "Total processed:   {}", s.total)?;
        writeln!(f, "Auto-labeled:      {}", s.auto_accepted)?;
        writeln!(f, "Flagged (blur):    {}", s.flagged_blur)?;
        writeln!(f, "Flagged (conf):    {}", s.flagged_low_confidence)?;
        writeln!(f, "Errored:           {}", s.errored)?;
        writeln!(f, "{}", "=".repeat(30))?;
        for failure in &self.failures {
            writeln!(f, "  {} ({:?}): {}", failure.file_name, failure.kind, failure.message)?;
        }
        write!(
            f,
            "Output folders: {} and {}",
            self.auto_dir.display(),
            self.review_dir.display()
        )
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

/// Batch orchestrator: enumerate, gate, route, count
pub struct Auditor {
    config: AuditConfig,
    pipeline: AuditPipeline,
    router: Router,
}

impl Auditor {
    /// Validates the configuration before anything else happens
    pub fn new(config: AuditConfig, detector: Box<dyn Detector>) -> AuditResult<Self> {
        config.validate()?;
        let pipeline = build_standard_pipeline(&config, detector);
        let router = Router::new(&config.auto_dir, &config.review_dir).with_save_conf(config.save_conf);
        Ok(Self {
            config,
            pipeline,
            router,
        })
    }

    /// Write Laplacian debug images into `dir` (must be empty or absent)
    pub fn with_debug(mut self, dir: PathBuf) -> AuditResult<Self> {
        self.pipeline = self.pipeline.with_debug(dir)?;
        Ok(self)
    }

    /// Process every supported image in the source directory once.
    /// Only startup problems return `Err`; per-image failures land in the report.
    pub fn run(&self) -> AuditResult<BatchReport> {
        let source = &self.config.source_dir;
        if !source.is_dir() {
            return Err(AuditError::SourceNotFound { path: source.clone() });
        }
        self.router.prepare()?;

        let started_at = now_rfc3339();
        let images = enumerate_images(source)?;
        tracing::info!("Starting audit pipeline on {} images from {}", images.len(), source.display());

        let mut statistics = BatchStatistics::default();
        let mut failures = Vec::new();

        for path in &images {
            match self.process_image(path) {
                Ok(verdict) => statistics.record_verdict(verdict),
                Err(failure) => {
                    tracing::warn!("Skipping {}: {}", failure.file_name, failure.message);
                    statistics.record_error();
                    failures.push(failure);
                }
            }
        }

        debug_assert!(statistics.is_consistent());
        tracing::info!(
            "Audit finished: {} auto, {} blur, {} low confidence, {} errored",
            statistics.auto_accepted,
            statistics.flagged_blur,
            statistics.flagged_low_confidence,
            statistics.errored
        );

        Ok(BatchReport {
            statistics,
            failures,
            auto_dir: self.router.auto_dir().to_path_buf(),
            review_dir: self.router.review_dir().to_path_buf(),
            started_at,
            finished_at: now_rfc3339(),
        })
    }

    fn process_image(&self, path: &Path) -> Result<crate::models::Verdict, ImageFailure> {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let record = ImageRecord::read(path).map_err(|e| ImageFailure {
            file_name: display_name.clone(),
            kind: FailureKind::Input,
            message: format!("{:#}", e),
        })?;

        let evaluation = self.pipeline.run(record).map_err(|e| ImageFailure {
            file_name: display_name.clone(),
            kind: match e {
                AuditError::Detection { .. } | AuditError::ImageDecode { .. } => FailureKind::Detection,
                _ => FailureKind::Input,
            },
            message: e.to_string(),
        })?;

        let outcome = self
            .router
            .route(&evaluation.record, evaluation.verdict, evaluation.detections.as_ref())
            .map_err(|e| ImageFailure {
                file_name: display_name.clone(),
                kind: FailureKind::DestinationWrite,
                message: e.to_string(),
            })?;

        tracing::info!("{} -> {} ({})", display_name, outcome.image_path.display(), outcome.verdict.label());
        Ok(outcome.verdict)
    }
}

/// Run a full audit with the given configuration and detector
pub fn run_audit(config: AuditConfig, detector: Box<dyn Detector>) -> AuditResult<BatchReport> {
    Auditor::new(config, detector)?.run()
}
