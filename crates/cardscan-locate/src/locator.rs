use crate::contours::{approx_poly_closed, closed_perimeter, contour_area, ContourTree};
use crate::threshold::adaptive_threshold_mean_inv;
use cardscan_core::Quad;
use image::{imageops, GrayImage, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::median_filter;
use imageproc::morphology::{dilate, erode};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Parameters for card region location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocateParams {
    /// Constant subtracted from the local mean before thresholding.
    pub thresh_c: f32,
    /// Adaptive threshold window side (odd).
    pub block_size: u32,
    /// Median blur window side (odd).
    pub blur_kernel: u32,
    /// Side of the square element used to close gaps (dilate, then erode).
    pub kernel_size: u32,
    /// Minimal enclosed contour area in px² for a card candidate.
    pub size_threshold: f64,
    /// Polygon approximation tolerance relative to the contour perimeter.
    pub approx_epsilon_rel: f64,
}

impl Default for LocateParams {
    fn default() -> Self {
        Self {
            thresh_c: 5.0,
            block_size: 11,
            blur_kernel: 5,
            kernel_size: 3,
            size_threshold: 10_000.0,
            approx_epsilon_rel: 0.04,
        }
    }
}

/// Grayscale, denoise and binarize a frame so card borders become closed
/// foreground outlines.
pub fn binarize_frame(frame: &RgbImage, params: &LocateParams) -> GrayImage {
    let gray = imageops::grayscale(frame);
    let r = params.blur_kernel / 2;
    let blurred = median_filter(&gray, r, r);
    let binary = adaptive_threshold_mean_inv(&blurred, params.block_size, params.thresh_c);

    let k = (params.kernel_size / 2).min(u8::MAX as u32) as u8;
    if k == 0 {
        return binary;
    }
    erode(&dilate(&binary, Norm::LInf, k), Norm::LInf, k)
}

/// Four corners of the contour if it is large enough and approximates to a quad.
fn as_card_quad(points: &[nalgebra::Point2<f32>], params: &LocateParams) -> Option<Quad> {
    if contour_area(points) < params.size_threshold {
        return None;
    }
    let eps = params.approx_epsilon_rel * closed_perimeter(points);
    let poly = approx_poly_closed(points, eps);
    poly.try_into().ok()
}

/// Walk the contour hierarchy and collect the topmost quadrilateral of each
/// branch.
///
/// Accepted contours are not descended into, so a card's inner artwork frame
/// is never reported next to the card itself. The walk uses an explicit
/// stack; depth of nesting does not grow the call stack.
pub fn collect_quads(tree: &ContourTree, params: &LocateParams) -> Vec<Quad> {
    let mut out = Vec::new();
    let mut stack: Vec<usize> = tree.first_root.into_iter().collect();

    while let Some(idx) = stack.pop() {
        let node = &tree.nodes[idx];
        if let Some(next) = node.next_sibling {
            stack.push(next);
        }
        match as_card_quad(&node.points, params) {
            Some(quad) => out.push(quad),
            None => {
                if let Some(child) = node.first_child {
                    stack.push(child);
                }
            }
        }
    }

    out
}

/// Find card-shaped quadrilaterals in a frame.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame, params), fields(width = frame.width(), height = frame.height()))
)]
pub fn locate_candidates(frame: &RgbImage, params: &LocateParams) -> Vec<Quad> {
    let binary = binarize_frame(frame, params);
    let tree = ContourTree::from_binary(&binary);
    let quads = collect_quads(&tree, params);
    log::debug!(
        "located {} candidate(s) among {} contour(s)",
        quads.len(),
        tree.len()
    );
    quads
}
