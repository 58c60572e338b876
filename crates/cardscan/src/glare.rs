//! Specular glare suppression on rectified cards.
//!
//! Glare shows up as bright, colorless blobs. Pixels that are both
//! unsaturated and bright are flattened to a neutral gray so the
//! fingerprint sees a uniform patch instead of a hot spot.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Thresholds for [`remove_glare`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlareParams {
    /// Saturation strictly below this counts as colorless.
    pub saturation_max: u8,
    /// Value strictly above this counts as bright.
    pub value_min: u8,
    /// Gray level written over glare pixels.
    pub fill: u8,
}

impl Default for GlareParams {
    fn default() -> Self {
        Self {
            saturation_max: 32,
            value_min: 200,
            fill: 200,
        }
    }
}

/// 8-bit HSV saturation and value planes.
///
/// `V = max(r, g, b)`, `S = 255 * (V - min) / V` rounded, and `S = 0` for
/// black pixels.
pub fn saturation_value(img: &RgbImage) -> (GrayImage, GrayImage) {
    let (w, h) = img.dimensions();
    let mut sat = GrayImage::new(w, h);
    let mut val = GrayImage::new(w, h);

    for (x, y, Rgb([r, g, b])) in img.enumerate_pixels() {
        let v = (*r).max(*g).max(*b) as u32;
        let lo = (*r).min(*g).min(*b) as u32;
        let s = if v == 0 { 0 } else { (255 * (v - lo) + v / 2) / v };
        sat.put_pixel(x, y, Luma([s as u8]));
        val.put_pixel(x, y, Luma([v as u8]));
    }

    (sat, val)
}

/// Replace glare pixels with a flat gray.
///
/// Low-saturation pixels are eroded by a 3×3 square so thin neutral lines
/// survive; of the remaining area, bright pixels are dilated back by 3×3
/// and filled. Every other pixel is copied unchanged.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", skip(img, params), fields(width = img.width(), height = img.height()))
)]
pub fn remove_glare(img: &RgbImage, params: &GlareParams) -> RgbImage {
    let (sat, val) = saturation_value(img);
    let (w, h) = img.dimensions();

    let colorless = GrayImage::from_fn(w, h, |x, y| {
        Luma([if sat.get_pixel(x, y)[0] < params.saturation_max { 255 } else { 0 }])
    });
    let colorless = erode(&colorless, Norm::LInf, 1);

    let bright = GrayImage::from_fn(w, h, |x, y| {
        let v = if colorless.get_pixel(x, y)[0] > 0 {
            val.get_pixel(x, y)[0]
        } else {
            0
        };
        Luma([if v > params.value_min { 255 } else { 0 }])
    });
    let glare = dilate(&bright, Norm::LInf, 1);

    let fill = Rgb([params.fill; 3]);
    let mut out = img.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        if glare.get_pixel(x, y)[0] > 0 {
            *px = fill;
        }
    }
    out
}
