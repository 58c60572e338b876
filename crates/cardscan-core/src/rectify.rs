use crate::{homography_from_4pt, order_points, warp_perspective_rgb, ColorImage, ColorImageView, Quad};
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A card region warped onto an axis-aligned rectangle.
#[derive(Clone, Debug)]
pub struct RectifiedCard {
    /// Warped pixels, always portrait (`height >= width`).
    pub image: ColorImage,
    /// Corners in source coordinates, ordered TL, TR, BR, BL.
    pub corners: Quad,
    /// Whether the landscape warp was turned to portrait.
    pub rotated: bool,
}

fn dist(a: Point2<f32>, b: Point2<f32>) -> f32 {
    (a - b).norm()
}

/// Warp the quadrilateral `pts` of `src` onto a canonical rectangle.
///
/// The output size is the longest of each pair of opposite edges, truncated
/// to whole pixels. Landscape results are rotated 270° clockwise so that
/// every card ends up in portrait orientation. Returns `None` when the quad
/// collapses to less than one pixel or the transform is singular.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(src)))]
pub fn rectify(src: &ColorImageView<'_>, pts: &Quad) -> Option<RectifiedCard> {
    let [tl, tr, br, bl] = order_points(pts);

    let w = dist(br, bl).max(dist(tr, tl)).floor();
    let h = dist(tr, br).max(dist(tl, bl)).floor();
    if !(w >= 1.0 && h >= 1.0) {
        return None;
    }

    let dst = [
        Point2::new(0.0, 0.0),
        Point2::new(w - 1.0, 0.0),
        Point2::new(w - 1.0, h - 1.0),
        Point2::new(0.0, h - 1.0),
    ];
    let h_src_from_dst = homography_from_4pt(&dst, &[tl, tr, br, bl])?;
    let warped = warp_perspective_rgb(src, h_src_from_dst, w as usize, h as usize);

    let rotated = warped.width > warped.height;
    let image = if rotated { warped.rotate270() } else { warped };

    Some(RectifiedCard {
        image,
        corners: [tl, tr, br, bl],
        rotated,
    })
}
