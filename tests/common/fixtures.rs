use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb};
use labelgate::{AuditConfig, BoundingBox, Detection, DetectionResult, Detector};
use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// What the scripted detector answers for an image of a given width
#[derive(Clone, Debug)]
pub enum Script {
    Confidences(Vec<f32>),
    Fail(String),
}

/// Fake detector keyed on image width, so answers don't depend on order.
/// Unknown widths yield an empty result.
pub struct ScriptedDetector {
    by_width: HashMap<u32, Script>,
    calls: Rc<Cell<usize>>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self {
            by_width: HashMap::new(),
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn with(mut self, width: u32, confidences: &[f32]) -> Self {
        self.by_width.insert(width, Script::Confidences(confidences.to_vec()));
        self
    }

    pub fn failing(mut self, width: u32, message: &str) -> Self {
        self.by_width.insert(width, Script::Fail(message.to_string()));
        self
    }

    /// Shared counter of detect() calls
    pub fn call_counter(&self) -> Rc<Cell<usize>> {
        self.calls.clone()
    }

    pub fn boxed(self) -> Box<dyn Detector> {
        Box::new(self)
    }
}

impl Detector for ScriptedDetector {
    fn detect(&self, image: &DynamicImage) -> anyhow::Result<DetectionResult> {
        self.calls.set(self.calls.get() + 1);
        match self.by_width.get(&image.width()) {
            Some(Script::Confidences(confs)) => Ok(detections(confs)),
            Some(Script::Fail(message)) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(DetectionResult::empty()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// One class-0 detection per confidence, spread horizontally
pub fn detections(confidences: &[f32]) -> DetectionResult {
    DetectionResult::new(
        confidences
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Detection::new(
                    0,
                    c,
                    BoundingBox {
                        x_center: 0.2 + 0.1 * i as f32,
                        y_center: 0.5,
                        width: 0.1,
                        height: 0.2,
                    },
                )
            })
            .collect(),
    )
}

/// High-contrast checkerboard (8px cells): far above the default blur threshold
pub fn sharp_image(width: u32, height: u32) -> DynamicImage {
    let img: GrayImage = ImageBuffer::from_fn(width, height, |x, y| {
        if ((x / 8) + (y / 8)) % 2 == 0 {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    });
    DynamicImage::ImageLuma8(img)
}

/// Solid colour: zero Laplacian variance
pub fn blank_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([120u8, 130u8, 140u8])))
}

/// Smooth horizontal gradient: low but non-zero edge response
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let img: GrayImage = ImageBuffer::from_fn(width, height, |x, _| Luma([(x * 255 / width.max(1)) as u8]));
    DynamicImage::ImageLuma8(img)
}

pub fn write_image(dir: &Path, name: &str, image: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    image.save(&path).expect("Failed to save test image");
    path
}

/// Source, auto and review directories under one temp root.
/// Keep the TempDir alive for the duration of the test.
pub struct Workspace {
    pub root: tempfile::TempDir,
    pub source: PathBuf,
    pub auto: PathBuf,
    pub review: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::TempDir::new().expect("Failed to create temp directory");
        let source = root.path().join("raw");
        std::fs::create_dir_all(&source).expect("Failed to create source directory");
        Self {
            source,
            auto: root.path().join("auto_labeled"),
            review: root.path().join("needs_review"),
            root,
        }
    }

    pub fn config(&self) -> AuditConfig {
        AuditConfig::default().with_dirs(&self.source, &self.auto, &self.review)
    }

    pub fn add(&self, name: &str, image: &DynamicImage) -> PathBuf {
        write_image(&self.source, name, image)
    }

    pub fn add_raw(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.source.join(name);
        std::fs::write(&path, bytes).expect("Failed to write test file");
        path
    }
}

/// Sorted file names in a directory (empty if it doesn't exist)
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}
