use image::{imageops::FilterType, DynamicImage, Rgb, RgbImage};

/// Padding colour used by YOLO letterboxing
const PAD_VALUE: u8 = 114;

/// How a source image was placed inside the square model input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub src_width: u32,
    pub src_height: u32,
}

impl Letterbox {
    pub fn new(src_width: u32, src_height: u32, target: u32) -> Self {
        let scale = (target as f32 / src_width.max(1) as f32).min(target as f32 / src_height.max(1) as f32);
        let new_w = (src_width as f32 * scale).round();
        let new_h = (src_height as f32 * scale).round();
        Self {
            scale,
            pad_x: ((target as f32 - new_w) / 2.0).floor(),
            pad_y: ((target as f32 - new_h) / 2.0).floor(),
            src_width,
            src_height,
        }
    }

    /// Map a point from model-input space back to source pixels
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }

    pub fn resized_dimensions(&self) -> (u32, u32) {
        (
            ((self.src_width as f32 * self.scale).round() as u32).max(1),
            ((self.src_height as f32 * self.scale).round() as u32).max(1),
        )
    }
}

/// Resize keeping aspect ratio and pad to a `target`x`target` RGB canvas
pub fn letterbox(img: &DynamicImage, target: u32) -> (RgbImage, Letterbox) {
    let lb = Letterbox::new(img.width(), img.height(), target);
    let (new_w, new_h) = lb.resized_dimensions();
    let resized = img.resize_exact(new_w, new_h, FilterType::Triangle).to_rgb8();

    let mut canvas = RgbImage::from_pixel(target, target, Rgb([PAD_VALUE; 3]));
    image::imageops::overlay(&mut canvas, &resized, lb.pad_x as i64, lb.pad_y as i64);

    (canvas, lb)
}

/// Planar CHW float data scaled to [0, 1]
pub fn to_chw(img: &RgbImage) -> Vec<f32> {
    let (w, h) = img.dimensions();
    let plane = w as usize * h as usize;
    let mut data = vec![0.0f32; 3 * plane];
    for (x, y, pixel) in img.enumerate_pixels() {
        let idx = y as usize * w as usize + x as usize;
        for c in 0..3 {
            data[c * plane + idx] = pixel.0[c] as f32 / 255.0;
        }
    }
    data
}
