use crate::error::{AuditError, AuditResult};
use crate::gates::SharpnessAssessment;
use crate::models::{DetectionResult, ImageRecord, Verdict};
use std::path::PathBuf;

/// Data that flows through the gate pipeline for one image
#[derive(Debug, Clone)]
pub struct AuditItem {
    pub record: ImageRecord,

    /// Filled in by the sharpness step
    pub sharpness: Option<SharpnessAssessment>,

    /// Filled in by the detection step (None if the image never got there)
    pub detections: Option<DetectionResult>,
}

impl AuditItem {
    pub fn new(record: ImageRecord) -> Self {
        Self {
            record,
            sharpness: None,
            detections: None,
        }
    }
}

/// What a step decided about an item
#[derive(Debug)]
pub enum StepOutcome {
    /// Hand the item to the next step
    Continue(AuditItem),
    /// Stop here; the verdict is final
    Terminal(AuditItem, Verdict),
}

/// Final result of running the pipeline on one image
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub record: ImageRecord,
    pub verdict: Verdict,
    pub sharpness: Option<SharpnessAssessment>,
    pub detections: Option<DetectionResult>,
}

impl Evaluation {
    fn from_item(item: AuditItem, verdict: Verdict) -> Self {
        Self {
            record: item.record,
            verdict,
            sharpness: item.sharpness,
            detections: item.detections,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Debug, Default)]
pub struct AuditContext {
    pub debug: Option<DebugConfig>,
}

impl AuditContext {
    /// Debug output directory, if debug mode is on
    pub fn debug_dir(&self) -> Option<&PathBuf> {
        self.debug.as_ref().map(|d| &d.output_dir)
    }
}

/// Trait that all pipeline steps must implement
pub trait AuditStep {
    /// Inspect (and possibly enrich) an item. An `Err` fails this image only.
    fn process(&self, item: AuditItem, context: &AuditContext) -> AuditResult<StepOutcome>;

    /// Human-readable name for this step (used in log output)
    fn name(&self) -> &str;
}

/// Ordered gate pipeline. The first terminal outcome wins; an item that
/// passes every step is auto-accepted.
pub struct AuditPipeline {
    steps: Vec<Box<dyn AuditStep>>,
    context: AuditContext,
}

impl AuditPipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: AuditContext::default(),
        }
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> AuditResult<Self> {
        let io_err = |source: std::io::Error| AuditError::Io {
            path: output_dir.clone(),
            source,
        };

        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir).map_err(io_err)?;
            if entries.count() > 0 {
                return Err(AuditError::Config(format!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir).map_err(io_err)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step<S: AuditStep + 'static>(mut self, step: S) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Helper method to add a step from a Box
    pub fn add_step_boxed(mut self, step: Box<dyn AuditStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order on one image
    pub fn run(&self, record: ImageRecord) -> AuditResult<Evaluation> {
        let mut item = AuditItem::new(record);

        for step in &self.steps {
            match step.process(item, &self.context)? {
                StepOutcome::Continue(next) => {
                    tracing::trace!("{}: passed {}", next.record.file_name, step.name());
                    item = next;
                }
                StepOutcome::Terminal(done, verdict) => {
                    tracing::debug!("{}: {} at {}", done.record.file_name, verdict.label(), step.name());
                    return Ok(Evaluation::from_item(done, verdict));
                }
            }
        }

        Ok(Evaluation::from_item(item, Verdict::AutoAccepted))
    }
}

impl Default for AuditPipeline {
    fn default() -> Self {
        Self::new()
    }
}
