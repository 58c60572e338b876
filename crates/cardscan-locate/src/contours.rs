//! Contour hierarchy and polygon helpers.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use nalgebra::Point2;

/// One traced boundary with its links in the hierarchy.
#[derive(Clone, Debug)]
pub struct ContourNode {
    pub points: Vec<Point2<f32>>,
    pub is_hole: bool,
    pub parent: Option<usize>,
    pub first_child: Option<usize>,
    pub next_sibling: Option<usize>,
}

/// Every contour of a binary image plus parent/child/sibling links.
#[derive(Clone, Debug, Default)]
pub struct ContourTree {
    pub nodes: Vec<ContourNode>,
    /// First top-level contour in trace order.
    pub first_root: Option<usize>,
}

impl ContourTree {
    /// Trace all borders of the non-zero regions of `binary`.
    pub fn from_binary(binary: &GrayImage) -> Self {
        let traced = find_contours::<i32>(binary);
        let mut nodes: Vec<ContourNode> = Vec::with_capacity(traced.len());
        let mut last_child: Vec<Option<usize>> = vec![None; traced.len()];
        let mut first_root = None;
        let mut last_root: Option<usize> = None;

        for (idx, c) in traced.into_iter().enumerate() {
            nodes.push(ContourNode {
                points: c
                    .points
                    .iter()
                    .map(|p| Point2::new(p.x as f32, p.y as f32))
                    .collect(),
                is_hole: c.border_type == BorderType::Hole,
                parent: c.parent,
                first_child: None,
                next_sibling: None,
            });

            // parents are always traced before their children
            let prev = match c.parent {
                Some(p) => last_child[p].replace(idx),
                None => last_root.replace(idx),
            };
            match (prev, c.parent) {
                (Some(prev), _) => nodes[prev].next_sibling = Some(idx),
                (None, Some(p)) => nodes[p].first_child = Some(idx),
                (None, None) => first_root = Some(idx),
            }
        }

        Self { nodes, first_root }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Shoelace area enclosed by a closed point sequence.
pub fn contour_area(points: &[Point2<f32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0_f64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    acc.abs() * 0.5
}

/// Length of the closed polyline through `points`.
pub fn closed_perimeter(points: &[Point2<f32>]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| (points[(i + 1) % n] - points[i]).norm() as f64)
        .sum()
}

fn farthest_from(points: &[Point2<f32>], from: usize) -> usize {
    let origin = points[from];
    let mut best = from;
    let mut best_d = -1.0_f32;
    for (i, p) in points.iter().enumerate() {
        let d = (p - origin).norm_squared();
        if d > best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

fn segment_distance(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (dx, dy) = (b.x as f64 - ax, b.y as f64 - ay);
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-12 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    ((py - ay) * dx - (px - ax) * dy).abs() / len
}

/// Douglas–Peucker on the open chain `points[idx[0]] .. points[idx[last]]`.
///
/// Returns the indices of the kept interior vertices, in chain order.
fn simplify_chain(points: &[Point2<f32>], idx: &[usize], epsilon: f64) -> Vec<usize> {
    let mut keep = vec![false; idx.len()];
    let mut stack = vec![(0usize, idx.len() - 1)];

    while let Some((i, j)) = stack.pop() {
        if j <= i + 1 {
            continue;
        }
        let a = points[idx[i]];
        let b = points[idx[j]];
        let mut dmax = 0.0;
        let mut kmax = i;
        for k in (i + 1)..j {
            let d = segment_distance(points[idx[k]], a, b);
            if d > dmax {
                dmax = d;
                kmax = k;
            }
        }
        if dmax > epsilon {
            keep[kmax] = true;
            stack.push((kmax, j));
            stack.push((i, kmax));
        }
    }

    (1..idx.len() - 1)
        .filter(|&k| keep[k])
        .map(|k| idx[k])
        .collect()
}

/// Douglas–Peucker approximation of a closed contour.
///
/// The ring is split at two mutually distant vertices and each half is
/// simplified with an explicit stack.
pub fn approx_poly_closed(points: &[Point2<f32>], epsilon: f64) -> Vec<Point2<f32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let b = farthest_from(points, 0);
    let a = farthest_from(points, b);
    if a == b {
        return vec![points[a]];
    }

    let forward: Vec<usize> = (0..=((b + n - a) % n)).map(|k| (a + k) % n).collect();
    let backward: Vec<usize> = (0..=((a + n - b) % n)).map(|k| (b + k) % n).collect();

    let mut out = Vec::new();
    out.push(points[a]);
    out.extend(simplify_chain(points, &forward, epsilon).into_iter().map(|i| points[i]));
    out.push(points[b]);
    out.extend(simplify_chain(points, &backward, epsilon).into_iter().map(|i| points[i]));
    out
}
