pub mod audit;
pub mod config;
pub mod detection;
pub mod error;
pub mod gates;
pub mod inspect;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod router;
pub mod steps;

pub use audit::{run_audit, Auditor, BatchReport, FailureKind, ImageFailure};
pub use config::{AuditConfig, DetectorConfig};
pub use detection::{Detector, YoloDetector};
pub use error::{AuditError, AuditResult};
pub use models::{BatchStatistics, BoundingBox, Detection, DetectionResult, ImageRecord, Verdict};
pub use pipeline::{AuditContext, AuditItem, AuditPipeline, AuditStep, Evaluation, StepOutcome};
pub use router::{Router, RoutingOutcome};
