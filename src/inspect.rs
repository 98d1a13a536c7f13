use crate::config::AuditConfig;
use crate::detection::{classes, Detector};
use crate::error::{AuditError, AuditResult};
use crate::gates::SharpnessAssessment;
use crate::models::{DetectionResult, ImageRecord, Verdict};
use crate::steps::build_standard_pipeline;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::fmt;
use std::path::Path;

const ACCEPT_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
const WEAK_COLOR: Rgb<u8> = Rgb([230, 40, 40]);

/// Both gates applied to a single image, with no files written
#[derive(Debug, Clone)]
pub struct Inspection {
    pub file_name: String,
    pub verdict: Verdict,
    pub sharpness: SharpnessAssessment,
    /// None when the image was rejected before detection
    pub detections: Option<DetectionResult>,
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Image: {}", self.file_name)?;
        writeln!(
            f,
            "Layer 1 (quality): {} (variance {:.2})",
            if self.sharpness.is_blurry { "too blurry" } else { "passed" },
            self.sharpness.score
        )?;
        if let Some(result) = &self.detections {
            writeln!(f, "Layer 2 (annotation): {} detections", result.len())?;
            for d in result.iter() {
                writeln!(f, "  {} {:.2}", classes::class_name(d.class_id), d.confidence)?;
            }
        }
        write!(f, "Result: {}", self.verdict.label())
    }
}

/// Run the same two gates the batch audit uses on one image
pub fn inspect_image(path: &Path, config: &AuditConfig, detector: Box<dyn Detector>) -> AuditResult<Inspection> {
    config.validate()?;
    let record = ImageRecord::read(path).map_err(|e| AuditError::ImageDecode {
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    })?;

    let evaluation = build_standard_pipeline(config, detector).run(record)?;
    let sharpness = evaluation.sharpness.unwrap_or(SharpnessAssessment {
        score: 0.0,
        is_blurry: true,
    });

    Ok(Inspection {
        file_name: evaluation.record.file_name,
        verdict: evaluation.verdict,
        sharpness,
        detections: evaluation.detections,
    })
}

/// Draw detection boxes on a copy of the image. Boxes that would fail the
/// confidence gate are drawn in red.
pub fn annotate(image: &DynamicImage, detections: &DetectionResult, conf_auto_accept: f32) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let (w, h) = canvas.dimensions();

    for d in detections.iter() {
        let (x, y, bw, bh) = d.bbox.to_pixels(w, h);
        let color = if crate::gates::confidence::passes(d, conf_auto_accept) {
            ACCEPT_COLOR
        } else {
            WEAK_COLOR
        };
        // Two nested outlines for visibility
        draw_hollow_rect_mut(&mut canvas, Rect::at(x, y).of_size(bw, bh), color);
        if bw > 2 && bh > 2 {
            draw_hollow_rect_mut(&mut canvas, Rect::at(x + 1, y + 1).of_size(bw - 2, bh - 2), color);
        }
    }

    canvas
}

/// Annotate the inspected image and save it
pub fn save_annotated(
    source: &Path,
    inspection: &Inspection,
    conf_auto_accept: f32,
    out: &Path,
) -> AuditResult<()> {
    let image = image::open(source).map_err(|e| AuditError::ImageDecode {
        path: source.to_path_buf(),
        message: e.to_string(),
    })?;
    let empty = DetectionResult::empty();
    let detections = inspection.detections.as_ref().unwrap_or(&empty);

    annotate(&image, detections, conf_auto_accept)
        .save(out)
        .map_err(|e| AuditError::DestinationWrite {
            path: out.to_path_buf(),
            source: std::io::Error::other(e.to_string()),
        })
}
