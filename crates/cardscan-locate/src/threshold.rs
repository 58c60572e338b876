//! Adaptive mean thresholding.

use image::{GrayImage, Luma};

/// Summed-area table with one row/column of zero padding.
struct IntegralImage {
    width: usize,
    sums: Vec<u64>,
}

impl IntegralImage {
    fn new(img: &GrayImage) -> Self {
        let w = img.width() as usize;
        let h = img.height() as usize;
        let stride = w + 1;
        let mut sums = vec![0u64; stride * (h + 1)];
        for y in 0..h {
            let mut row = 0u64;
            for x in 0..w {
                row += img.get_pixel(x as u32, y as u32)[0] as u64;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }
        Self { width: w, sums }
    }

    /// Sum over the inclusive pixel rectangle `[x0, x1] × [y0, y1]`.
    #[inline]
    fn sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let s = self.width + 1;
        self.sums[(y1 + 1) * s + x1 + 1] + self.sums[y0 * s + x0]
            - self.sums[y0 * s + x1 + 1]
            - self.sums[(y1 + 1) * s + x0]
    }
}

/// Inverted adaptive mean threshold.
///
/// A pixel becomes foreground (255) when it is at most `mean - c`, where
/// `mean` is the average over the `block_size × block_size` window centred
/// on it. Windows are clipped at the image border, so flat regions stay
/// background all the way to the edge.
pub fn adaptive_threshold_mean_inv(img: &GrayImage, block_size: u32, c: f32) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut out = GrayImage::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }

    let r = (block_size.max(1) / 2) as usize;
    let integral = IntegralImage::new(img);
    let (wu, hu) = (w as usize, h as usize);

    for y in 0..hu {
        let y0 = y.saturating_sub(r);
        let y1 = (y + r).min(hu - 1);
        for x in 0..wu {
            let x0 = x.saturating_sub(r);
            let x1 = (x + r).min(wu - 1);
            let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as f32;
            let mean = integral.sum(x0, y0, x1, y1) as f32 / count;
            let v = img.get_pixel(x as u32, y as u32)[0] as f32;
            if v <= mean - c {
                out.put_pixel(x as u32, y as u32, Luma([255]));
            }
        }
    }

    out
}
