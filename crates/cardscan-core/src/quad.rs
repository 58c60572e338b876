//! Four-corner card outlines.

use nalgebra::Point2;

/// Four image points outlining a card candidate.
pub type Quad = [Point2<f32>; 4];

/// Order four points as (top-left, top-right, bottom-right, bottom-left).
///
/// Top-left has the smallest `x + y`, bottom-right the largest. Top-right
/// has the largest `x - y`, bottom-left the smallest. When several points
/// share an extremum the first one wins. For a convex quad the result runs
/// clockwise on screen (y pointing down).
pub fn order_points(pts: &Quad) -> Quad {
    let sum = |p: &Point2<f32>| p.x + p.y;
    let diff = |p: &Point2<f32>| p.x - p.y;

    let pick = |key: &dyn Fn(&Point2<f32>) -> f32, want_max: bool| -> Point2<f32> {
        let mut best = pts[0];
        for p in &pts[1..] {
            let better = if want_max {
                key(p) > key(&best)
            } else {
                key(p) < key(&best)
            };
            if better {
                best = *p;
            }
        }
        best
    };

    [
        pick(&sum, false),
        pick(&diff, true),
        pick(&sum, true),
        pick(&diff, false),
    ]
}

/// Axis-aligned integer bounds `(x, y, width, height)` enclosing the quad.
pub fn quad_bounds(q: &Quad) -> (i32, i32, u32, u32) {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for p in q {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let x = min_x.floor() as i32;
    let y = min_y.floor() as i32;
    let w = (max_x.ceil() as i32 - x + 1).max(1) as u32;
    let h = (max_y.ceil() as i32 - y + 1).max(1) as u32;
    (x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point2<f32> {
        Point2::new(x, y)
    }

    fn assert_extremal(ordered: &Quad, all: &Quad) {
        for q in all {
            assert!(ordered[0].x + ordered[0].y <= q.x + q.y);
            assert!(ordered[2].x + ordered[2].y >= q.x + q.y);
            assert!(ordered[1].x - ordered[1].y >= q.x - q.y);
            assert!(ordered[3].x - ordered[3].y <= q.x - q.y);
        }
    }

    #[test]
    fn shuffled_rectangle_is_ordered_clockwise_from_top_left() {
        let pts = [p(110.0, 60.0), p(10.0, 10.0), p(10.0, 60.0), p(110.0, 10.0)];
        let o = order_points(&pts);
        assert_eq!(o, [p(10.0, 10.0), p(110.0, 10.0), p(110.0, 60.0), p(10.0, 60.0)]);
        assert_extremal(&o, &pts);
    }

    #[test]
    fn tilted_convex_quads_satisfy_extremal_ordering() {
        let quads = [
            [p(50.0, 5.0), p(120.0, 40.0), p(80.0, 130.0), p(12.0, 90.0)],
            [p(300.0, 210.0), p(140.0, 220.0), p(150.0, 20.0), p(310.0, 30.0)],
            [p(0.0, 0.0), p(40.0, 3.0), p(43.0, 61.0), p(2.0, 58.0)],
        ];
        for q in &quads {
            assert_extremal(&order_points(q), q);
        }
    }

    /// Shoelace sum; positive when the corners run clockwise with y down.
    fn signed_area2(q: &Quad) -> f32 {
        (0..4)
            .map(|i| {
                let (a, b) = (q[i], q[(i + 1) % 4]);
                a.x * b.y - b.x * a.y
            })
            .sum()
    }

    #[test]
    fn tilted_quads_come_out_clockwise() {
        let quads = [
            [p(50.0, 5.0), p(120.0, 40.0), p(80.0, 130.0), p(12.0, 90.0)],
            [p(300.0, 210.0), p(140.0, 220.0), p(150.0, 20.0), p(310.0, 30.0)],
            [p(12.0, 90.0), p(80.0, 130.0), p(120.0, 40.0), p(50.0, 5.0)],
        ];
        for q in &quads {
            let o = order_points(q);
            assert!(signed_area2(&o) > 0.0, "{o:?} is not clockwise");
        }
        let o = order_points(&quads[0]);
        assert_eq!(o, [p(50.0, 5.0), p(120.0, 40.0), p(80.0, 130.0), p(12.0, 90.0)]);
    }

    #[test]
    fn bounds_cover_every_corner() {
        let q = [p(10.2, 5.9), p(40.0, 7.0), p(38.5, 30.1), p(9.0, 28.0)];
        assert_eq!(quad_bounds(&q), (9, 5, 32, 27));
    }
}
