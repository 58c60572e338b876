#![allow(dead_code)]

use cardscan::{build_database, FingerprintDatabase, FingerprintParams};
use image::{Rgb, RgbImage};
use std::path::Path;

pub const INK: Rgb<u8> = Rgb([40, 40, 40]);
pub const PAPER: Rgb<u8> = Rgb([255, 255, 255]);

/// White rectangles, in tenths of the card, on a dark card face.
pub type Layout = &'static [(u32, u32, u32, u32)];

pub const ALPHA: Layout = &[(1, 1, 4, 4)];
pub const BETA: Layout = &[(5, 6, 8, 8)];
pub const GAMMA: Layout = &[(1, 4, 8, 5), (6, 1, 8, 2)];

/// A patch in the top-left corner plus a block right of center. The other
/// three are its mirror images and half turn, so only an upright,
/// unmirrored rectification matches `MARKED`.
pub const MARKED: Layout = &[(1, 1, 3, 2), (5, 5, 8, 7)];
pub const MARKED_FLIPPED: Layout = &[(1, 7, 3, 8), (5, 2, 8, 4)];
pub const MARKED_MIRRORED: Layout = &[(6, 1, 8, 2), (1, 5, 4, 7)];
pub const MARKED_TURNED: Layout = &[(6, 7, 8, 8), (1, 2, 4, 4)];

fn face_color(layout: Layout, u: u32, v: u32) -> Rgb<u8> {
    let lit = layout
        .iter()
        .any(|&(u0, v0, u1, v1)| (u0..=u1).contains(&u) && (v0..=v1).contains(&v));
    if lit {
        PAPER
    } else {
        INK
    }
}

/// Portrait card art of the given size.
pub fn card_face(w: u32, h: u32, layout: Layout) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| face_color(layout, x * 10 / w, y * 10 / h))
}

/// White frame with an upright `w × h` card at `(x0, y0)`.
pub fn frame_with_card(fw: u32, fh: u32, x0: u32, y0: u32, w: u32, h: u32, layout: Layout) -> RgbImage {
    let face = card_face(w, h, layout);
    let mut frame = RgbImage::from_pixel(fw, fh, PAPER);
    for (x, y, px) in face.enumerate_pixels() {
        frame.put_pixel(x0 + x, y0 + y, *px);
    }
    frame
}

/// White frame with a portrait card lying on its side (turned 90° clockwise),
/// occupying `h × w` pixels at `(x0, y0)`.
pub fn frame_with_sideways_card(
    fw: u32,
    fh: u32,
    x0: u32,
    y0: u32,
    w: u32,
    h: u32,
    layout: Layout,
) -> RgbImage {
    let mut frame = RgbImage::from_pixel(fw, fh, PAPER);
    for ly in 0..w {
        for lx in 0..h {
            let (px, py) = (ly, h - 1 - lx);
            let color = face_color(layout, px * 10 / w, py * 10 / h);
            frame.put_pixel(x0 + lx, y0 + ly, color);
        }
    }
    frame
}

pub fn fingerprint_params() -> FingerprintParams {
    FingerprintParams {
        hash_size: 8,
        ..FingerprintParams::default()
    }
}

/// Plain dark card of `w × h` centered at `center`, turned `degrees`
/// clockwise.
pub fn paint_tilted_card(frame: &mut RgbImage, center: (f32, f32), w: f32, h: f32, degrees: f32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    for (x, y, px) in frame.enumerate_pixels_mut() {
        let (dx, dy) = (x as f32 - center.0, y as f32 - center.1);
        let u = dx * cos + dy * sin;
        let v = -dx * sin + dy * cos;
        if u.abs() <= w / 2.0 && v.abs() <= h / 2.0 {
            *px = INK;
        }
    }
}

/// Write 400×600 references named `<name>.png`.
pub fn write_layouts(dir: &Path, cards: &[(&str, Layout)]) {
    for (name, layout) in cards {
        card_face(400, 600, layout)
            .save(dir.join(format!("{name}.png")))
            .expect("write reference");
    }
}

/// Write 400×600 references for the three layouts.
pub fn write_references(dir: &Path) {
    write_layouts(dir, &[("alpha-1", ALPHA), ("beta-2", BETA), ("gamma-3", GAMMA)]);
}

pub fn reference_database(dir: &Path) -> FingerprintDatabase {
    write_references(dir);
    build_database(dir, &fingerprint_params()).expect("database")
}
