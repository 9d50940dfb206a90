/// Alignment pattern search around a predicted position
/// Alignment patterns appear in QR codes version 2 and above: a 5x5 module
/// dark ring, light ring and dark centre
use crate::models::{Bitmap, Point};

/// Search radii in modules, nearest first
pub const SEARCH_RADII: [f32; 3] = [4.0, 8.0, 16.0];

/// Fewest of the 25 template cells that must match
const MIN_TEMPLATE_SCORE: usize = 23;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentPattern {
    pub center: Point,
    pub module_size: f32,
}

/// Module axes of the symbol in pixel space
#[derive(Debug, Clone, Copy)]
pub struct ModuleAxes {
    pub u: Point,
    pub v: Point,
}

impl ModuleAxes {
    fn module_size(&self) -> f32 {
        (self.u.distance(&Point::default()) + self.v.distance(&Point::default())) / 2.0
    }
}

/// Look for the alignment pattern nearest to `predicted`, widening the
/// window through [`SEARCH_RADII`]. Within a window every pixel position is
/// scored against the 5x5 template laid along `axes`; the centroid of the
/// best-scoring positions is the pattern centre.
pub fn find_alignment(bitmap: &Bitmap, predicted: Point, axes: ModuleAxes) -> Option<AlignmentPattern> {
    let module_size = axes.module_size();
    if module_size <= 0.0 {
        return None;
    }

    for radius in SEARCH_RADII {
        if let Some(center) = search_window(bitmap, predicted, axes, radius * module_size) {
            log::trace!(
                "alignment: found ({:.1}, {:.1}) within {radius} modules of prediction",
                center.x,
                center.y
            );
            return Some(AlignmentPattern {
                center,
                module_size,
            });
        }
    }
    None
}

fn search_window(bitmap: &Bitmap, predicted: Point, axes: ModuleAxes, radius: f32) -> Option<Point> {
    let min_x = (predicted.x - radius).floor().max(0.0) as usize;
    let min_y = (predicted.y - radius).floor().max(0.0) as usize;
    let max_x = ((predicted.x + radius).ceil() as usize).min(bitmap.width().saturating_sub(1));
    let max_y = ((predicted.y + radius).ceil() as usize).min(bitmap.height().saturating_sub(1));
    if min_x > max_x || min_y > max_y {
        return None;
    }

    let mut best_score = MIN_TEMPLATE_SCORE;
    let mut sum = (0.0f64, 0.0f64);
    let mut hits = 0usize;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            // Only dark pixels can be the centre
            if !bitmap.get(x, y) {
                continue;
            }
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let score = template_score(bitmap, center, axes);
            if score > best_score {
                best_score = score;
                sum = (0.0, 0.0);
                hits = 0;
            }
            if score == best_score {
                sum.0 += center.x as f64;
                sum.1 += center.y as f64;
                hits += 1;
            }
        }
    }

    (hits > 0).then(|| Point::new((sum.0 / hits as f64) as f32, (sum.1 / hits as f64) as f32))
}

/// Cells of the 5x5 template matching the bitmap around `center`
fn template_score(bitmap: &Bitmap, center: Point, axes: ModuleAxes) -> usize {
    let mut score = 0;
    for dy in -2i32..=2 {
        for dx in -2i32..=2 {
            let expected_dark = dx.abs().max(dy.abs()) != 1;
            let px = center.x + dx as f32 * axes.u.x + dy as f32 * axes.v.x;
            let py = center.y + dx as f32 * axes.u.y + dy as f32 * axes.v.y;
            let sample = bitmap.try_get(px.floor() as isize, py.floor() as isize);
            if sample == Some(expected_dark) {
                score += 1;
            }
        }
    }
    score
}
