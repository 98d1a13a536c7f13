//! Tests for configuration defaults, TOML loading and validation.

mod common;

use common::*;
use std::path::PathBuf;

#[test]
fn test_defaults() {
    let config = AuditConfig::default();

    assert_eq!(config.blur_threshold, 100.0);
    assert_eq!(config.conf_auto_accept, 0.85);
    assert_eq!(config.source_dir, PathBuf::from("data/raw"));
    assert_eq!(config.auto_dir, PathBuf::from("data/auto_labeled"));
    assert_eq!(config.review_dir, PathBuf::from("data/needs_review"));
    assert_eq!(config.detector.input_size, 640);
    assert!(!config.save_conf);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_keeps_defaults() -> anyhow::Result<()> {
    let config = AuditConfig::from_toml_str(
        r#"
        blur_threshold = 60.0
        source_dir = "/data/site_a"

        [detector]
        min_confidence = 0.1
        "#,
    )?;

    assert_eq!(config.blur_threshold, 60.0);
    assert_eq!(config.conf_auto_accept, 0.85);
    assert_eq!(config.source_dir, PathBuf::from("/data/site_a"));
    assert_eq!(config.detector.min_confidence, 0.1);
    assert_eq!(config.detector.iou_threshold, 0.7);

    Ok(())
}

#[test]
fn test_from_file() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("labelgate.toml");
    std::fs::write(&path, "conf_auto_accept = 0.9\nsave_conf = true\n")?;

    let config = AuditConfig::from_file(&path)?;

    assert_eq!(config.conf_auto_accept, 0.9);
    assert!(config.save_conf);

    Ok(())
}

#[test]
fn test_missing_file_is_io_error() {
    let result = AuditConfig::from_file(std::path::Path::new("/nonexistent/labelgate.toml"));
    assert!(matches!(result, Err(AuditError::Io { .. })));
}

#[test]
fn test_malformed_toml_is_config_error() {
    let result = AuditConfig::from_toml_str("blur_threshold = \"high\"");
    assert!(matches!(result, Err(AuditError::Config(_))));
}

#[test]
fn test_validation_rejects_bad_values() {
    let bad = [
        AuditConfig::default().with_thresholds(-1.0, 0.85),
        AuditConfig::default().with_thresholds(f64::NAN, 0.85),
        AuditConfig::default().with_thresholds(100.0, 1.01),
        AuditConfig::default().with_thresholds(100.0, -0.1),
        AuditConfig::default().with_dirs("raw", "same", "same"),
        AuditConfig::default().with_dirs("raw", "raw", "review"),
        AuditConfig::default().with_dirs("raw", "auto", "raw"),
        AuditConfig::default().with_dirs("raw", "./raw", "review"),
    ];
    for config in bad {
        assert!(
            matches!(config.validate(), Err(AuditError::Config(_))),
            "expected rejection for {:?}",
            config
        );
    }

    let mut odd_size = AuditConfig::default();
    odd_size.detector.input_size = 500;
    assert!(odd_size.validate().is_err());
}

#[test]
fn test_boundary_thresholds_are_valid() {
    assert!(AuditConfig::default().with_thresholds(0.0, 0.0).validate().is_ok());
    assert!(AuditConfig::default().with_thresholds(0.0, 1.0).validate().is_ok());
}
