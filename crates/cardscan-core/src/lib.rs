//! Core geometry for card scanning: point ordering, 4-point homographies
//! and perspective rectification onto a portrait rectangle.
//!
//! This crate does not depend on any concrete image library. Frames are
//! passed as borrowed interleaved RGB views.

mod homography;
mod image;
mod logger;
mod quad;
mod rectify;

pub use homography::{homography_from_4pt, warp_perspective_rgb, Homography};
pub use image::{sample_bilinear_rgb, ColorImage, ColorImageView};
pub use quad::{order_points, quad_bounds, Quad};
pub use rectify::{rectify, RectifiedCard};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{filter_directive, init_with_level, level_from_verbosity};
