/// Module grid sampling through a module-to-pixel homography
use crate::error::{DecodeError, Result};
use crate::models::{Bitmap, Point};
use crate::utils::geometry::PerspectiveTransform;

/// Modules at least this wide (in pixels) are read by a 3x3 majority vote
pub const MAJORITY_MIN_MODULE_SIZE: f32 = 3.0;

/// Homography taking module coordinates (`src`) to pixels (`dst`)
pub fn module_to_pixel(src: &[Point; 4], dst: &[Point; 4]) -> Result<PerspectiveTransform> {
    PerspectiveTransform::from_points(src, dst)
        .ok_or(DecodeError::GeometryInvalid("singular homography"))
}

/// Read a `dimension x dimension` grid by sampling each module centre
pub fn sample_grid(
    bitmap: &Bitmap,
    transform: &PerspectiveTransform,
    dimension: usize,
    module_size: f32,
) -> Result<Bitmap> {
    let majority = module_size >= MAJORITY_MIN_MODULE_SIZE;
    let mut grid = Bitmap::new(dimension, dimension);

    for y in 0..dimension {
        for x in 0..dimension {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let pixel = transform
                .transform(&center)
                .ok_or(DecodeError::GeometryInvalid("module maps to infinity"))?;
            let px = pixel.x.floor() as isize;
            let py = pixel.y.floor() as isize;
            let Some(dark) = bitmap.try_get(px, py) else {
                return Err(DecodeError::GeometryInvalid("module sample outside image"));
            };

            let value = if majority {
                let mut dark_votes = 0;
                let mut total = 0;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        if let Some(sample) = bitmap.try_get(px + dx, py + dy) {
                            total += 1;
                            dark_votes += sample as usize;
                        }
                    }
                }
                dark_votes * 2 > total
            } else {
                dark
            };
            grid.set(x, y, value);
        }
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale(factor: f32, offset: f32) -> PerspectiveTransform {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let dst = src.map(|p| Point::new(p.x * factor + offset, p.y * factor + offset));
        module_to_pixel(&src, &dst).unwrap()
    }

    #[test]
    fn test_samples_scaled_checkerboard() {
        let mut bitmap = Bitmap::new(50, 50);
        for y in 0..50 {
            for x in 0..50 {
                bitmap.set(x, y, ((x - x % 4) / 4 + (y - y % 4) / 4) % 2 == 0 && x < 40 && y < 40);
            }
        }
        let grid = sample_grid(&bitmap, &scale(4.0, 0.0), 10, 4.0).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(grid.get(x, y), (x + y) % 2 == 0, "module ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_majority_vote_ignores_single_speck() {
        let mut bitmap = Bitmap::new(40, 40);
        // Light module with a 2x2 dark speck at its centre
        for (x, y) in [(5, 5), (5, 6), (6, 5), (6, 6)] {
            bitmap.set(x, y, true);
        }
        let grid = sample_grid(&bitmap, &scale(4.0, 0.0), 10, 4.0).unwrap();
        assert!(!grid.get(1, 1));
        // Without the vote the speck wins
        let grid = sample_grid(&bitmap, &scale(4.0, 0.0), 10, 2.0).unwrap();
        assert!(grid.get(1, 1));
    }

    #[test]
    fn test_sample_outside_image_fails() {
        let bitmap = Bitmap::new(30, 30);
        assert_eq!(
            sample_grid(&bitmap, &scale(4.0, 0.0), 10, 4.0),
            Err(DecodeError::GeometryInvalid("module sample outside image"))
        );
    }

    #[test]
    fn test_singular_homography() {
        let p = Point::new(1.0, 1.0);
        assert!(module_to_pixel(&[p; 4], &[p; 4]).is_err());
    }
}
