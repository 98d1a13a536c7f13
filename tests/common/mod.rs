#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from labelgate for tests
pub use labelgate::{
    AuditConfig, AuditError, Auditor, BatchReport, BatchStatistics, DetectionResult, FailureKind,
    ImageRecord, Router, Verdict,
};
