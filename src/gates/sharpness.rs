use image::{DynamicImage, GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Outcome of the sharpness gate for one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharpnessAssessment {
    /// Variance of the Laplacian response (0 for unreadable images)
    pub score: f64,
    pub is_blurry: bool,
}

/// Laplacian response of a grayscale plane, row-major
pub struct LaplacianResponse {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f64>,
}

impl LaplacianResponse {
    /// Population variance of the response
    pub fn variance(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let n = self.values.len() as f64;
        let mean = self.values.iter().sum::<f64>() / n;
        let var = self.values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        var.max(0.0)
    }

    /// Absolute response scaled to 0..=255, for debug output
    pub fn to_visualization(&self) -> GrayImage {
        let max = self.values.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        let scale = if max > 0.0 { 255.0 / max } else { 0.0 };
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let v = self.values[y as usize * self.width as usize + x as usize].abs() * scale;
            Luma([v.round().clamp(0.0, 255.0) as u8])
        })
    }
}

/// Single-channel luminance with BT.601 weights, rounded to 8 bits
pub fn to_luminance(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let p = rgb.get_pixel(x, y).0;
        let luma = 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

// Mirror without repeating the edge pixel: -1 -> 1, n -> n - 2
fn reflect101(i: i64, n: i64) -> u32 {
    if n == 1 {
        return 0;
    }
    let mut i = i;
    if i < 0 {
        i = -i;
    }
    if i >= n {
        i = 2 * n - 2 - i;
    }
    i as u32
}

/// Apply the 4-neighbour Laplacian kernel `[0 1 0; 1 -4 1; 0 1 0]`
pub fn laplacian(gray: &GrayImage) -> LaplacianResponse {
    let (w, h) = gray.dimensions();
    let (wi, hi) = (w as i64, h as i64);
    let mut values = Vec::with_capacity(w as usize * h as usize);

    let at = |x: i64, y: i64| -> f64 { gray.get_pixel(reflect101(x, wi), reflect101(y, hi)).0[0] as f64 };

    for y in 0..hi {
        for x in 0..wi {
            let v = at(x, y - 1) + at(x, y + 1) + at(x - 1, y) + at(x + 1, y) - 4.0 * at(x, y);
            values.push(v);
        }
    }

    LaplacianResponse {
        width: w,
        height: h,
        values,
    }
}

/// Sharpness score of an image: variance of its Laplacian
pub fn sharpness_score(img: &DynamicImage) -> f64 {
    laplacian(&to_luminance(img)).variance()
}

pub fn is_blurry(score: f64, threshold: f64) -> bool {
    score < threshold
}

/// Score and classify a decoded image, keeping the Laplacian response
pub fn assess_with_response(img: &DynamicImage, threshold: f64) -> (SharpnessAssessment, LaplacianResponse) {
    let response = laplacian(&to_luminance(img));
    let score = response.variance();
    let assessment = SharpnessAssessment {
        score,
        is_blurry: is_blurry(score, threshold),
    };
    (assessment, response)
}

/// Score and classify an image. `None` (undecodable) fails closed as blurry.
pub fn assess_sharpness(img: Option<&DynamicImage>, threshold: f64) -> SharpnessAssessment {
    match img {
        Some(img) => assess_with_response(img, threshold).0,
        None => SharpnessAssessment {
            score: 0.0,
            is_blurry: true,
        },
    }
}
