//! Bottom-right corner estimate for symbols without a usable alignment pattern
//!
//! The right edge of the top-right finder and the bottom edge of the
//! bottom-left finder lie on the symbol border, so their intersection is the
//! far corner even under perspective.

use crate::detector::alignment::ModuleAxes;
use crate::detector::finder::FinderTriangle;
use crate::models::{Bitmap, Point};

/// Offsets along the finder side, in modules, where its outer edge is sampled
const EDGE_OFFSETS: [f32; 13] = [
    -3.0, -2.5, -2.0, -1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0,
];

/// Fewest edge points needed to fit a border line
const MIN_EDGE_POINTS: usize = 7;

/// How far past the finder centre an edge walk looks, in modules
const EDGE_WALK_MODULES: f32 = 5.0;

/// Walk step in pixels
const WALK_STEP: f32 = 0.5;

/// Line through `point` along `direction`
#[derive(Debug, Clone, Copy)]
struct Line {
    point: Point,
    direction: Point,
}

/// Pixel position of the symbol's bottom-right corner (module `(dim, dim)`)
pub fn estimate_far_corner(bitmap: &Bitmap, finders: &FinderTriangle, axes: ModuleAxes) -> Option<Point> {
    let right = outer_edge_line(bitmap, finders.top_right.center, axes.u, axes.v)?;
    let bottom = outer_edge_line(bitmap, finders.bottom_left.center, axes.v, axes.u)?;
    let corner = intersect(&right, &bottom)?;
    log::trace!("far corner from finder edges: ({:.1}, {:.1})", corner.x, corner.y);
    Some(corner)
}

/// Least-squares line through the outer edge of the finder at `center`,
/// walking outward along `outward` from points spread along `along`
fn outer_edge_line(bitmap: &Bitmap, center: Point, outward: Point, along: Point) -> Option<Line> {
    let module = outward.x.hypot(outward.y);
    if module <= 0.0 {
        return None;
    }
    let unit = Point::new(outward.x / module, outward.y / module);
    let limit = EDGE_WALK_MODULES * module;

    let samples: Vec<(f32, Point)> = EDGE_OFFSETS
        .iter()
        .filter_map(|&t| {
            let start = Point::new(center.x + along.x * t, center.y + along.y * t);
            last_dark_edge(bitmap, start, unit, limit).map(|edge| (t, edge))
        })
        .collect();
    if samples.len() < MIN_EDGE_POINTS {
        return None;
    }

    let n = samples.len() as f32;
    let t_mean = samples.iter().map(|(t, _)| t).sum::<f32>() / n;
    let point = Point::new(
        samples.iter().map(|(_, p)| p.x).sum::<f32>() / n,
        samples.iter().map(|(_, p)| p.y).sum::<f32>() / n,
    );
    let mut stt = 0.0;
    let mut direction = Point::default();
    for (t, p) in &samples {
        let dt = t - t_mean;
        stt += dt * dt;
        direction.x += dt * (p.x - point.x);
        direction.y += dt * (p.y - point.y);
    }
    if stt == 0.0 || (direction.x == 0.0 && direction.y == 0.0) {
        return None;
    }
    Some(Line { point, direction })
}

/// Midpoint of the last dark-to-light transition along a walk from `start`
fn last_dark_edge(bitmap: &Bitmap, start: Point, unit: Point, limit: f32) -> Option<Point> {
    let mut edge = None;
    let mut prev_dark = false;
    let mut t = 0.0f32;
    while t <= limit {
        let x = (start.x + unit.x * t).floor() as isize;
        let y = (start.y + unit.y * t).floor() as isize;
        let Some(dark) = bitmap.try_get(x, y) else {
            break;
        };
        if prev_dark && !dark {
            edge = Some(t - WALK_STEP / 2.0);
        }
        prev_dark = dark;
        t += WALK_STEP;
    }
    edge.map(|t| Point::new(start.x + unit.x * t, start.y + unit.y * t))
}

fn intersect(a: &Line, b: &Line) -> Option<Point> {
    let denom = a.direction.x * b.direction.y - a.direction.y * b.direction.x;
    let scale = a.direction.x.hypot(a.direction.y) * b.direction.x.hypot(b.direction.y);
    // Near-parallel borders
    if denom.abs() < 1e-3 * scale {
        return None;
    }
    let dx = b.point.x - a.point.x;
    let dy = b.point.y - a.point.y;
    let s = (dx * b.direction.y - dy * b.direction.x) / denom;
    Some(Point::new(a.point.x + a.direction.x * s, a.point.y + a.direction.y * s))
}
