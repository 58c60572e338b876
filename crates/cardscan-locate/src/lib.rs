//! Card region location.
//!
//! A frame is binarized with an inverted adaptive mean threshold, cleaned
//! with a morphological close and traced into a contour hierarchy. The
//! hierarchy is walked top-down; the first contour of each branch that is
//! large enough and approximates to four vertices becomes a candidate.
//!
//! ```
//! use cardscan_locate::{locate_candidates, LocateParams};
//! use image::RgbImage;
//!
//! let frame = RgbImage::new(64, 48);
//! let quads = locate_candidates(&frame, &LocateParams::default());
//! assert!(quads.is_empty());
//! ```

mod contours;
mod locator;
mod threshold;

pub use contours::{approx_poly_closed, closed_perimeter, contour_area, ContourNode, ContourTree};
pub use locator::{binarize_frame, collect_quads, locate_candidates, LocateParams};
pub use threshold::adaptive_threshold_mean_inv;
