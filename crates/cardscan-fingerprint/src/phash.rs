//! DCT perceptual hash.

use image::imageops::{self, FilterType};
use image::GrayImage;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Low-frequency oversampling: the image is shrunk to `HIGHFREQ_FACTOR *
/// hash_size` pixels per side before the DCT.
const HIGHFREQ_FACTOR: u32 = 4;

/// Fixed-length bit vector, packed little-endian into `u64` words.
///
/// Bit `k` is `(words[k / 64] >> (k % 64)) & 1`; bits are laid out row-major
/// over the `hash_size × hash_size` coefficient block.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    bits: usize,
    words: Vec<u64>,
}

impl Fingerprint {
    pub fn from_bools(bits: impl IntoIterator<Item = bool>) -> Self {
        let mut words = Vec::new();
        let mut n = 0usize;
        for b in bits {
            if n % 64 == 0 {
                words.push(0);
            }
            if b {
                words[n / 64] |= 1u64 << (n % 64);
            }
            n += 1;
        }
        Self { bits: n, words }
    }

    /// Number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    #[inline]
    pub fn bit(&self, k: usize) -> bool {
        k < self.bits && (self.words[k / 64] >> (k % 64)) & 1 == 1
    }

    /// Number of differing bits (XOR popcount).
    ///
    /// Fingerprints of different lengths additionally count every bit the
    /// shorter one lacks.
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        let common: u32 = self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        common + self.bits.abs_diff(other.bits) as u32
    }

    /// Lowercase hex of the packed words, most significant word first.
    pub fn to_hex(&self) -> String {
        self.words.iter().rev().map(|w| format!("{w:016x}")).collect()
    }
}

fn dct_matrix(n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |k, i| {
        (std::f64::consts::PI * (2 * i + 1) as f64 * k as f64 / (2 * n) as f64).cos()
    })
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let m = values.len() / 2;
    if values.len() % 2 == 0 {
        0.5 * (values[m - 1] + values[m])
    } else {
        values[m]
    }
}

/// Perceptual hash with `hash_size²` bits.
///
/// The image is shrunk to a `4·hash_size` square, transformed with a 2-D
/// DCT-II and the top-left `hash_size × hash_size` coefficients are
/// compared against their median.
pub fn phash(gray: &GrayImage, hash_size: u32) -> Fingerprint {
    let hs = hash_size.max(2) as usize;
    let side = hash_size.max(2) * HIGHFREQ_FACTOR;
    let small = imageops::resize(gray, side, side, FilterType::Lanczos3);

    let n = side as usize;
    let x = DMatrix::from_fn(n, n, |r, c| small.get_pixel(c as u32, r as u32)[0] as f64);
    let c = dct_matrix(n);
    let coeffs = &c * x * c.transpose();

    let mut low: Vec<f64> = Vec::with_capacity(hs * hs);
    for r in 0..hs {
        for col in 0..hs {
            low.push(coeffs[(r, col)]);
        }
    }
    let mut sorted = low.clone();
    let med = median(&mut sorted);

    Fingerprint::from_bools(low.into_iter().map(|v| v > med))
}
