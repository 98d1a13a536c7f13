//! Tests for destination routing and label files.

mod common;

use common::*;

fn record(ws: &Workspace, name: &str) -> anyhow::Result<ImageRecord> {
    let path = ws.add(name, &sharp_image(64, 64));
    ImageRecord::read(&path)
}

#[test]
fn test_review_prefixes() -> anyhow::Result<()> {
    let ws = Workspace::new();
    let router = Router::new(&ws.auto, &ws.review);
    router.prepare()?;

    let blurry = router.route(&record(&ws, "one.png")?, Verdict::RejectedBlur, None)?;
    let weak = router.route(&record(&ws, "two.png")?, Verdict::FlaggedLowConfidence, None)?;

    assert_eq!(blurry.image_path, ws.review.join("BLUR_one.png"));
    assert_eq!(weak.image_path, ws.review.join("LOWCONF_two.png"));
    assert!(blurry.label_path.is_none());
    assert!(weak.label_path.is_none());
    assert_eq!(list_files(&ws.review), vec!["BLUR_one.png", "LOWCONF_two.png"]);

    Ok(())
}

#[test]
fn test_accepted_image_gets_label_file() -> anyhow::Result<()> {
    let ws = Workspace::new();
    let router = Router::new(&ws.auto, &ws.review);
    router.prepare()?;
    let result = detections(&[0.9, 0.95]);

    let outcome = router.route(&record(&ws, "frame.01.png")?, Verdict::AutoAccepted, Some(&result))?;

    assert_eq!(outcome.image_path, ws.auto.join("frame.01.png"));
    assert_eq!(outcome.label_path, Some(ws.auto.join("frame.01.txt")));

    let label = std::fs::read_to_string(ws.auto.join("frame.01.txt"))?;
    assert_eq!(label, "0 0.200000 0.500000 0.100000 0.200000\n0 0.300000 0.500000 0.100000 0.200000\n");

    Ok(())
}

#[test]
fn test_save_conf_appends_confidence() -> anyhow::Result<()> {
    let ws = Workspace::new();
    let router = Router::new(&ws.auto, &ws.review).with_save_conf(true);
    router.prepare()?;
    let result = detections(&[0.875]);

    router.route(&record(&ws, "img.png")?, Verdict::AutoAccepted, Some(&result))?;

    let label = std::fs::read_to_string(ws.auto.join("img.txt"))?;
    assert_eq!(label.trim_end(), "0 0.200000 0.500000 0.100000 0.200000 0.875000");

    Ok(())
}

#[test]
fn test_routing_overwrites_existing_files() -> anyhow::Result<()> {
    let ws = Workspace::new();
    let router = Router::new(&ws.auto, &ws.review);
    router.prepare()?;
    std::fs::write(ws.review.join("BLUR_dup.png"), b"stale")?;

    let rec = record(&ws, "dup.png")?;
    router.route(&rec, Verdict::RejectedBlur, None)?;
    router.route(&rec, Verdict::RejectedBlur, None)?;

    let copied = std::fs::read(ws.review.join("BLUR_dup.png"))?;
    assert_eq!(copied, std::fs::read(&rec.path)?);

    Ok(())
}

#[test]
fn test_write_failure_surfaces_error() -> anyhow::Result<()> {
    let ws = Workspace::new();
    let router = Router::new(&ws.auto, &ws.review);
    router.prepare()?;
    std::fs::create_dir_all(ws.review.join("LOWCONF_blocked.png"))?;

    let result = router.route(&record(&ws, "blocked.png")?, Verdict::FlaggedLowConfidence, None);

    assert!(matches!(result, Err(AuditError::DestinationWrite { .. })));

    Ok(())
}

#[test]
fn test_prepare_creates_directories() -> anyhow::Result<()> {
    let ws = Workspace::new();
    let router = Router::new(ws.auto.join("deep/nested"), &ws.review);

    router.prepare()?;

    assert!(ws.auto.join("deep/nested").is_dir());
    assert!(ws.review.is_dir());

    Ok(())
}
