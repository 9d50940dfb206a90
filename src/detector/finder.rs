/// Finder pattern detection using 1:1:3:1:1 ratio scanning with cross-checks
use crate::models::{Bitmap, Point};
use crate::utils::geometry::cos_angle;

/// Legs shorter than this many modules cannot span a version 1 symbol
const MIN_LEG_MODULES: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderPattern {
    pub center: Point,
    pub module_size: f32,
    /// Number of row hits merged into this pattern
    pub count: usize,
}

impl FinderPattern {
    pub fn new(x: f32, y: f32, module_size: f32) -> Self {
        Self {
            center: Point::new(x, y),
            module_size,
            count: 1,
        }
    }

    fn is_near(&self, other: &FinderPattern) -> bool {
        let reach = 2.0 * self.module_size.max(other.module_size);
        self.center.distance_squared(&other.center) < reach * reach
    }

    /// Weighted average with another hit of the same pattern
    fn merge(&mut self, other: &FinderPattern) {
        let total = (self.count + other.count) as f32;
        let w_self = self.count as f32 / total;
        let w_other = other.count as f32 / total;
        self.center = Point::new(
            self.center.x * w_self + other.center.x * w_other,
            self.center.y * w_self + other.center.y * w_other,
        );
        self.module_size = self.module_size * w_self + other.module_size * w_other;
        self.count += other.count;
    }
}

/// Three finders in reading order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderTriangle {
    pub top_left: FinderPattern,
    pub top_right: FinderPattern,
    pub bottom_left: FinderPattern,
}

pub struct FinderDetector;

impl FinderDetector {
    /// All confirmed finder candidates, merged, in discovery order
    pub fn detect(bitmap: &Bitmap) -> Vec<FinderPattern> {
        let mut merged: Vec<FinderPattern> = Vec::new();

        for y in 0..bitmap.height() {
            for hit in Self::scan_row(bitmap, y) {
                match merged.iter_mut().find(|p| p.is_near(&hit)) {
                    Some(existing) => existing.merge(&hit),
                    None => merged.push(hit),
                }
            }
        }

        log::trace!("finder: {} candidate(s)", merged.len());
        merged
    }

    /// Candidates centred on row `y` that survive both cross-checks
    fn scan_row(bitmap: &Bitmap, y: usize) -> Vec<FinderPattern> {
        let width = bitmap.width();
        let mut candidates = Vec::new();
        // Last five runs, oldest first, with the colour of the newest
        let mut runs = [0usize; 5];
        let mut filled = 0usize;
        let mut current_color = bitmap.get(0, y);
        let mut run_len = 1usize;

        for x in 1..=width {
            let color = if x < width { bitmap.get(x, y) } else { !current_color };
            if color == current_color {
                run_len += 1;
                continue;
            }

            runs.rotate_left(1);
            runs[4] = run_len;
            filled = (filled + 1).min(5);

            // Newest run dark means the five runs are D L D L D
            if current_color && filled == 5 && found_pattern_cross(&runs) {
                let center_x = x as f32 - runs[4] as f32 - runs[3] as f32 - runs[2] as f32 / 2.0;
                if let Some(pattern) = Self::confirm(bitmap, center_x, y as f32 + 0.5, &runs) {
                    candidates.push(pattern);
                }
            }

            current_color = color;
            run_len = 1;
        }

        candidates
    }

    /// Vertical then horizontal cross-check; refines the centre
    fn confirm(bitmap: &Bitmap, center_x: f32, center_y: f32, runs: &[usize; 5]) -> Option<FinderPattern> {
        let total: usize = runs.iter().sum();
        let max_count = runs[2];

        let (y, vertical) = cross_check(bitmap, center_x, center_y, (0, 1), max_count)?;
        if 5 * vertical.abs_diff(total) >= 2 * total {
            return None;
        }
        let (x, horizontal) = cross_check(bitmap, center_x, y, (1, 0), max_count)?;
        if 5 * horizontal.abs_diff(total) >= 2 * total {
            return None;
        }

        let module_size = (horizontal + vertical) as f32 / 14.0;
        Some(FinderPattern::new(x, y, module_size))
    }

    /// Pick the best right isosceles triangle out of the candidates.
    ///
    /// The right-angle vertex is the point opposite the longest side. A triple
    /// qualifies when `|cos|` at that vertex and the relative leg mismatch are
    /// both within `tolerance` and the module sizes spread by at most twice it.
    /// The lowest `|cos| + mismatch` wins; ties keep the earlier triple.
    pub fn select_triangle(patterns: &[FinderPattern], tolerance: f32) -> Option<FinderTriangle> {
        let mut best: Option<(f32, FinderTriangle)> = None;
        let n = patterns.len();

        for i in 0..n {
            for j in i + 1..n {
                for k in j + 1..n {
                    let Some((score, triangle)) =
                        Self::score_triple([&patterns[i], &patterns[j], &patterns[k]], tolerance)
                    else {
                        continue;
                    };
                    if best.as_ref().is_none_or(|(s, _)| score < *s) {
                        best = Some((score, triangle));
                    }
                }
            }
        }

        if let Some((score, t)) = &best {
            log::debug!(
                "finder triangle: tl ({:.1}, {:.1}) tr ({:.1}, {:.1}) bl ({:.1}, {:.1}) score {score:.3}",
                t.top_left.center.x,
                t.top_left.center.y,
                t.top_right.center.x,
                t.top_right.center.y,
                t.bottom_left.center.x,
                t.bottom_left.center.y,
            );
        }
        best.map(|(_, t)| t)
    }

    fn score_triple(triple: [&FinderPattern; 3], tolerance: f32) -> Option<(f32, FinderTriangle)> {
        let [a, b, c] = triple;
        let ab = a.center.distance(&b.center);
        let bc = b.center.distance(&c.center);
        let ac = a.center.distance(&c.center);

        // Vertex opposite the longest side
        let (vertex, p, q) = if bc >= ab && bc >= ac {
            (a, b, c)
        } else if ac >= ab && ac >= bc {
            (b, a, c)
        } else {
            (c, a, b)
        };

        let leg_p = vertex.center.distance(&p.center);
        let leg_q = vertex.center.distance(&q.center);
        let longest_leg = leg_p.max(leg_q);
        if longest_leg == 0.0 {
            return None;
        }

        let cos = cos_angle(&p.center, &vertex.center, &q.center).abs();
        let mismatch = (leg_p - leg_q).abs() / longest_leg;
        let sizes = [a.module_size, b.module_size, c.module_size];
        let min_size = sizes.iter().copied().fold(f32::INFINITY, f32::min);
        let max_size = sizes.iter().copied().fold(0.0, f32::max);
        let mean_size = sizes.iter().sum::<f32>() / 3.0;
        let spread = (max_size - min_size) / mean_size;

        if cos > tolerance || mismatch > tolerance || spread > 2.0 * tolerance {
            return None;
        }
        if leg_p.min(leg_q) < MIN_LEG_MODULES * mean_size {
            return None;
        }

        // Clockwise in image coordinates: tl -> tr -> bl has positive cross
        let (top_right, bottom_left) = if vertex.center.cross(&p.center, &q.center) > 0.0 {
            (*p, *q)
        } else {
            (*q, *p)
        };

        Some((
            cos + mismatch,
            FinderTriangle {
                top_left: *vertex,
                top_right,
                bottom_left,
            },
        ))
    }
}

/// 1:1:3:1:1 within half a module per unit run and 1.5 modules on the centre
fn found_pattern_cross(runs: &[usize; 5]) -> bool {
    let total: usize = runs.iter().sum();
    if total < 7 || runs.contains(&0) {
        return false;
    }
    let module = total as f32 / 7.0;
    let max_variance = module / 2.0;
    (module - runs[0] as f32).abs() < max_variance
        && (module - runs[1] as f32).abs() < max_variance
        && (3.0 * module - runs[2] as f32).abs() < 3.0 * max_variance
        && (module - runs[3] as f32).abs() < max_variance
        && (module - runs[4] as f32).abs() < max_variance
}

/// Walk both ways from `(cx, cy)` along `step`, counting the five runs of a
/// finder. Returns the refined centre coordinate along the walk axis and the
/// total run length.
fn cross_check(
    bitmap: &Bitmap,
    cx: f32,
    cy: f32,
    step: (isize, isize),
    max_count: usize,
) -> Option<(f32, usize)> {
    let start_x = cx.floor() as isize;
    let start_y = cy.floor() as isize;
    if bitmap.try_get(start_x, start_y) != Some(true) {
        return None;
    }

    let at = |i: isize| bitmap.try_get(start_x + step.0 * i, start_y + step.1 * i);
    let mut runs = [0usize; 5];

    // Backward: centre, light ring, dark ring
    let mut i = 0isize;
    while at(i) == Some(true) {
        runs[2] += 1;
        i -= 1;
    }
    while at(i) == Some(false) && runs[1] <= max_count {
        runs[1] += 1;
        i -= 1;
    }
    while at(i) == Some(true) && runs[0] <= max_count {
        runs[0] += 1;
        i -= 1;
    }

    // Forward
    let mut i = 1isize;
    while at(i) == Some(true) {
        runs[2] += 1;
        i += 1;
    }
    while at(i) == Some(false) && runs[3] <= max_count {
        runs[3] += 1;
        i += 1;
    }
    while at(i) == Some(true) && runs[4] <= max_count {
        runs[4] += 1;
        i += 1;
    }
    let end = i;

    if runs[0] > max_count || runs[1] > max_count || runs[3] > max_count || runs[4] > max_count {
        return None;
    }
    if !found_pattern_cross(&runs) {
        return None;
    }

    let origin = if step.0 != 0 { start_x } else { start_y } as f32;
    let center = origin + end as f32 - runs[4] as f32 - runs[3] as f32 - runs[2] as f32 / 2.0;
    Some((center, runs.iter().sum()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Draw a 7x7 finder with `unit` pixels per module, top-left at (x, y)
    fn draw_finder(bitmap: &mut Bitmap, x: usize, y: usize, unit: usize) {
        for dy in 0..7 * unit {
            for dx in 0..7 * unit {
                let mx = (dx / unit) as isize;
                let my = (dy / unit) as isize;
                let ring = (mx - 3).abs().max((my - 3).abs());
                bitmap.set(x + dx, y + dy, ring != 2);
            }
        }
    }

    #[test]
    fn test_single_finder_is_found() {
        let mut bitmap = Bitmap::new(60, 60);
        draw_finder(&mut bitmap, 10, 12, 4);

        let patterns = FinderDetector::detect(&bitmap);
        assert_eq!(patterns.len(), 1, "{patterns:?}");
        let p = patterns[0];
        assert!((p.center.x - 24.0).abs() < 1.0, "{p:?}");
        assert!((p.center.y - 26.0).abs() < 1.0, "{p:?}");
        assert!((p.module_size - 4.0).abs() < 0.5);
        assert!(p.count > 1);
    }

    #[test]
    fn test_found_pattern_cross() {
        assert!(found_pattern_cross(&[3, 3, 9, 3, 3]));
        assert!(found_pattern_cross(&[4, 3, 10, 3, 4]));
        // Centre run 1.5 modules short of 3 is still accepted, a flat run is not
        assert!(found_pattern_cross(&[3, 3, 5, 3, 3]));
        assert!(!found_pattern_cross(&[3, 3, 3, 3, 3]));
        assert!(!found_pattern_cross(&[0, 3, 9, 3, 3]));
        assert!(!found_pattern_cross(&[1, 1, 1, 1, 1]));
    }

    #[test]
    fn test_stripes_are_rejected_by_cross_check() {
        // A horizontal 1:1:3:1:1 bar code with nothing above or below
        let mut bitmap = Bitmap::new(40, 40);
        for (start, len) in [(5, 3), (11, 9), (23, 3)] {
            for x in start..start + len {
                bitmap.set(x, 20, true);
            }
        }
        assert!(FinderDetector::detect(&bitmap).is_empty());
    }

    fn pattern(x: f32, y: f32) -> FinderPattern {
        FinderPattern::new(x, y, 4.0)
    }

    #[test]
    fn test_triangle_ordering() {
        // Given in arbitrary order
        let patterns = [pattern(114.0, 14.0), pattern(14.0, 114.0), pattern(14.0, 14.0)];
        let t = FinderDetector::select_triangle(&patterns, 0.25).unwrap();
        assert_eq!(t.top_left.center, Point::new(14.0, 14.0));
        assert_eq!(t.top_right.center, Point::new(114.0, 14.0));
        assert_eq!(t.bottom_left.center, Point::new(14.0, 114.0));
    }

    #[test]
    fn test_triangle_ordering_when_rotated() {
        // Rotated 180 degrees: top-left finder sits bottom-right in the image
        let patterns = [pattern(114.0, 114.0), pattern(14.0, 114.0), pattern(114.0, 14.0)];
        let t = FinderDetector::select_triangle(&patterns, 0.25).unwrap();
        assert_eq!(t.top_left.center, Point::new(114.0, 114.0));
        assert_eq!(t.top_right.center, Point::new(14.0, 114.0));
        assert_eq!(t.bottom_left.center, Point::new(114.0, 14.0));
    }

    #[test]
    fn test_non_right_triangle_is_rejected() {
        let patterns = [pattern(0.0, 0.0), pattern(100.0, 0.0), pattern(150.0, 80.0)];
        assert!(FinderDetector::select_triangle(&patterns, 0.25).is_none());
        assert!(FinderDetector::select_triangle(&patterns[..2], 0.25).is_none());
    }

    #[test]
    fn test_best_triangle_wins_among_decoys() {
        let patterns = [
            pattern(14.0, 14.0),
            pattern(300.0, 250.0),
            pattern(114.0, 16.0),
            pattern(14.0, 114.0),
        ];
        let t = FinderDetector::select_triangle(&patterns, 0.25).unwrap();
        assert_eq!(t.top_left.center, Point::new(14.0, 14.0));
        assert_eq!(t.bottom_left.center, Point::new(14.0, 114.0));
    }
}
