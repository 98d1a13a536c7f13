//! Tests for single-image inspection and annotation.

mod common;

use common::*;
use labelgate::inspect::{annotate, inspect_image, save_annotated};

#[test]
fn test_inspect_blurry_image_skips_detection() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = write_image(dir.path(), "blank.png", &blank_image(40, 40));
    let detector = ScriptedDetector::new();
    let calls = detector.call_counter();

    let inspection = inspect_image(&path, &AuditConfig::default(), detector.boxed())?;

    assert_eq!(inspection.verdict, Verdict::RejectedBlur);
    assert!(inspection.sharpness.is_blurry);
    assert!(inspection.detections.is_none());
    assert_eq!(calls.get(), 0);
    assert!(inspection.to_string().contains("too blurry"));

    Ok(())
}

#[test]
fn test_inspect_writes_nothing() -> anyhow::Result<()> {
    let ws = Workspace::new();
    let path = ws.add("good.png", &sharp_image(72, 64));
    let detector = ScriptedDetector::new().with(72, &[0.9, 0.99]);

    let inspection = inspect_image(&path, &ws.config(), detector.boxed())?;

    assert_eq!(inspection.verdict, Verdict::AutoAccepted);
    assert_eq!(inspection.detections.as_ref().map(|d| d.len()), Some(2));
    assert!(!ws.auto.exists());
    assert!(!ws.review.exists());
    assert!(inspection.to_string().contains("auto-accepted"));

    Ok(())
}

#[test]
fn test_annotate_draws_boxes() {
    let img = blank_image(100, 100);
    let result = detections(&[0.99, 0.2]);

    let canvas = annotate(&img, &result, 0.85);

    // First box spans x 15..25, y 40..60; its outline is green
    assert_eq!(canvas.get_pixel(15, 40).0, [0, 200, 0]);
    // Second box (weak) starts at x 25 and is red
    assert_eq!(canvas.get_pixel(25, 50).0, [230, 40, 40]);
    // Interior untouched
    assert_eq!(canvas.get_pixel(20, 50).0, [120, 130, 140]);
}

#[test]
fn test_save_annotated() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = write_image(dir.path(), "good.png", &sharp_image(72, 64));
    let detector = ScriptedDetector::new().with(72, &[0.9]);
    let inspection = inspect_image(&path, &AuditConfig::default(), detector.boxed())?;

    let out = dir.path().join("annotated.png");
    save_annotated(&path, &inspection, 0.85, &out)?;

    let saved = image::open(&out)?;
    assert_eq!((saved.width(), saved.height()), (72, 64));

    Ok(())
}
