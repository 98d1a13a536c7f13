//! Pure pass/fail decisions. Nothing here touches the filesystem.

pub mod confidence;
pub mod sharpness;

pub use sharpness::SharpnessAssessment;
