//! QR code detection modules
//!
//! Binarized image in, module grid out:
//! - Finder pattern detection (the three square markers) and triangle choice
//! - Module size and version estimate from the finder geometry
//! - Alignment pattern search (version 2 and above)
//! - Homography and per-module sampling

/// Alignment pattern detection for QR versions 2+
pub mod alignment;
/// Far corner estimate from finder edges
pub mod corner;
/// Finder pattern detection using 1:1:3:1:1 ratio scanning
pub mod finder;
/// Sample grid extraction and perspective correction
pub mod transform;

use crate::config::DecoderConfig;
use crate::decoder::version::VersionInfo;
use crate::error::{DecodeError, Result};
use crate::models::{Bitmap, Point, Version};

/// Largest accepted distance between the edge-fitted far corner and the
/// parallelogram estimate, as a fraction of the symbol side
const MAX_CORNER_SHIFT: f32 = 0.25;

use alignment::{AlignmentPattern, ModuleAxes, find_alignment};
use finder::{FinderDetector, FinderTriangle};

/// A located symbol and its sampled module grid
#[derive(Debug, Clone)]
pub struct DetectedSymbol {
    pub grid: Bitmap,
    pub version: Version,
    pub finders: FinderTriangle,
    pub alignment: Option<AlignmentPattern>,
    pub module_size: f32,
    /// Symbol corners in pixels: TL, TR, BR, BL
    pub corners: [Point; 4],
}

/// Locate a symbol in `bitmap` and sample its modules
pub fn detect(bitmap: &Bitmap, config: &DecoderConfig) -> Result<DetectedSymbol> {
    let candidates = FinderDetector::detect(bitmap);
    log::debug!("finder: {} candidate(s)", candidates.len());
    let finders = FinderDetector::select_triangle(&candidates, config.finder_tolerance)
        .ok_or(DecodeError::PatternNotFound)?;

    let module_size = estimate_module_size(bitmap, &finders);
    let version = estimate_version(&finders, module_size)?;
    log::debug!(
        "detector: module size {module_size:.2}, provisional version {}",
        version.number()
    );

    let symbol = sample_symbol(bitmap, finders, module_size, version, config)?;
    if version.number() < 7 {
        return Ok(symbol);
    }

    // The finder spacing can be off by a version or two on large symbols
    match VersionInfo::read_blocks(&symbol.grid) {
        Ok(read) if read != version => {
            log::debug!(
                "version blocks say {} instead of {}, resampling",
                read.number(),
                version.number()
            );
            sample_symbol(bitmap, finders, module_size, read, config)
        }
        _ => Ok(symbol),
    }
}

/// Module size from black-white-black run walks between the finders, falling
/// back to the finders' own estimates
pub fn estimate_module_size(bitmap: &Bitmap, finders: &FinderTriangle) -> f32 {
    let tl = finders.top_left.center;
    let tr = finders.top_right.center;
    let bl = finders.bottom_left.center;

    let estimates: Vec<f32> = [(tl, tr), (tr, tl), (tl, bl), (bl, tl)]
        .iter()
        .filter_map(|(from, to)| module_size_one_way(bitmap, *from, *to))
        .collect();

    if estimates.is_empty() {
        return (finders.top_left.module_size
            + finders.top_right.module_size
            + finders.bottom_left.module_size)
            / 3.0;
    }
    estimates.iter().sum::<f32>() / estimates.len() as f32
}

/// Width of the finder at `from` measured toward and away from `to`, in modules
fn module_size_one_way(bitmap: &Bitmap, from: Point, to: Point) -> Option<f32> {
    let length = from.distance(&to);
    if length == 0.0 {
        return None;
    }
    let direction = Point::new((to.x - from.x) / length, (to.y - from.y) / length);
    let toward = black_white_black_run(bitmap, from, direction, length)?;
    let away = black_white_black_run(bitmap, from, Point::new(-direction.x, -direction.y), length)?;
    // The centre pixel is counted by both walks
    Some((toward + away - 1.0) / 7.0)
}

/// Distance from a finder centre to the outer edge of its dark ring
fn black_white_black_run(bitmap: &Bitmap, from: Point, direction: Point, limit: f32) -> Option<f32> {
    let mut state = 0;
    let mut t = 0.0f32;
    while t <= limit {
        let x = (from.x + direction.x * t).floor() as isize;
        let y = (from.y + direction.y * t).floor() as isize;
        let Some(dark) = bitmap.try_get(x, y) else {
            return (state == 2).then_some(t);
        };
        // dark centre -> light ring -> dark ring -> out
        match (state, dark) {
            (0, false) | (1, true) => state += 1,
            (2, false) => return Some(t),
            _ => {}
        }
        t += 1.0;
    }
    None
}

/// Nearest valid version for the mean finder spacing
pub fn estimate_version(finders: &FinderTriangle, module_size: f32) -> Result<Version> {
    if !(module_size.is_finite() && module_size > 0.0) {
        return Err(DecodeError::GeometryInvalid("module size is not positive"));
    }
    let tl = finders.top_left.center;
    let across = tl.distance(&finders.top_right.center) / module_size;
    let down = tl.distance(&finders.bottom_left.center) / module_size;
    let dimension = (across + down) / 2.0 + 7.0;
    let number = ((dimension - 17.0) / 4.0).round().clamp(1.0, 40.0) as u8;
    Version::new(number).ok_or(DecodeError::GeometryInvalid("no version fits finder spacing"))
}

/// Fit the homography for `version` and sample the grid
fn sample_symbol(
    bitmap: &Bitmap,
    finders: FinderTriangle,
    module_size: f32,
    version: Version,
    config: &DecoderConfig,
) -> Result<DetectedSymbol> {
    let dimension = version.dimension();
    let dim = dimension as f32;
    let tl = finders.top_left.center;
    let tr = finders.top_right.center;
    let bl = finders.bottom_left.center;

    // Finder centres sit 3.5 modules in from the corners
    let span = dim - 7.0;
    let axes = ModuleAxes {
        u: Point::new((tr.x - tl.x) / span, (tr.y - tl.y) / span),
        v: Point::new((bl.x - tl.x) / span, (bl.y - tl.y) / span),
    };
    let affine = |mx: f32, my: f32| {
        let du = mx - 3.5;
        let dv = my - 3.5;
        Point::new(
            tl.x + axes.u.x * du + axes.v.x * dv,
            tl.y + axes.u.y * du + axes.v.y * dv,
        )
    };

    let mut alignment = None;
    if version.number() >= 2 {
        let module = dim - 6.5;
        let predicted = affine(module, module);
        alignment = find_alignment(bitmap, predicted, axes);
        if alignment.is_none() && config.require_alignment {
            return Err(DecodeError::AlignmentNotFound {
                x: predicted.x,
                y: predicted.y,
            });
        }
    }

    let (anchor_module, anchor_pixel) = match alignment {
        Some(found) => (dim - 6.5, found.center),
        None => {
            let parallelogram = affine(dim, dim);
            match corner::estimate_far_corner(bitmap, &finders, axes) {
                Some(corner) if corner.distance(&parallelogram) <= MAX_CORNER_SHIFT * dim * module_size => {
                    (dim, corner)
                }
                _ => {
                    log::debug!("far corner not found, using 3-point estimate");
                    (dim - 3.5, affine(dim - 3.5, dim - 3.5))
                }
            }
        }
    };

    let src = [
        Point::new(3.5, 3.5),
        Point::new(dim - 3.5, 3.5),
        Point::new(3.5, dim - 3.5),
        Point::new(anchor_module, anchor_module),
    ];
    let dst = [tl, tr, bl, anchor_pixel];
    let homography = transform::module_to_pixel(&src, &dst)?;
    let grid = transform::sample_grid(bitmap, &homography, dimension, module_size)?;

    let mut corners = [Point::default(); 4];
    for (corner, module) in corners.iter_mut().zip([(0.0, 0.0), (dim, 0.0), (dim, dim), (0.0, dim)]) {
        *corner = homography
            .transform(&Point::new(module.0, module.1))
            .ok_or(DecodeError::GeometryInvalid("corner maps to infinity"))?;
    }

    Ok(DetectedSymbol {
        grid,
        version,
        finders,
        alignment,
        module_size,
        corners,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ECLevel, MaskPattern};
    use crate::decoder::QrDecoder;
    use crate::decoder::modes::eci::EciTable;
    use crate::test_utils::{encode_text, keystone, render};
    use crate::utils::binarization::threshold_binarize;

    fn rendered(version: u8, module_px: usize) -> (Bitmap, Bitmap) {
        let grid = encode_text(
            "detector",
            Version::new(version).unwrap(),
            ECLevel::M,
            MaskPattern::Pattern2,
        );
        let (pixels, w, h) = render(&grid, module_px, 4);
        (grid, threshold_binarize(&pixels, w, h, 128))
    }

    #[test]
    fn test_detects_and_samples_version_1() {
        let (grid, bitmap) = rendered(1, 4);
        let symbol = detect(&bitmap, &DecoderConfig::default()).unwrap();
        assert_eq!(symbol.version.number(), 1);
        assert_eq!(symbol.grid, grid);
        assert!((symbol.module_size - 4.0).abs() < 0.5);
        assert!(symbol.corners[0].distance(&Point::new(16.0, 16.0)) < 2.0);
    }

    #[test]
    fn test_uses_alignment_pattern() {
        let (grid, bitmap) = rendered(5, 3);
        let symbol = detect(&bitmap, &DecoderConfig::default()).unwrap();
        assert_eq!(symbol.version.number(), 5);
        assert!(symbol.alignment.is_some());
        assert_eq!(symbol.grid, grid);
    }

    #[test]
    fn test_large_version_reads_version_blocks() {
        let (grid, bitmap) = rendered(9, 3);
        let symbol = detect(&bitmap, &DecoderConfig::default()).unwrap();
        assert_eq!(symbol.version.number(), 9);
        assert_eq!(symbol.grid, grid);
    }

    #[test]
    fn test_blank_bitmap_has_no_pattern() {
        let bitmap = Bitmap::new(100, 100);
        assert_eq!(
            detect(&bitmap, &DecoderConfig::default()).unwrap_err(),
            DecodeError::PatternNotFound
        );
    }

    /// Only the three finders of a version 3 symbol, nothing else
    fn finders_only() -> Bitmap {
        let mut grid = Bitmap::new(29, 29);
        for (ox, oy) in [(0, 0), (22, 0), (0, 22)] {
            for dy in 0..7isize {
                for dx in 0..7isize {
                    let ring = (dx - 3).abs().max((dy - 3).abs());
                    grid.set(ox + dx as usize, oy + dy as usize, ring != 2);
                }
            }
        }
        grid
    }

    #[test]
    fn test_required_alignment_missing() {
        let grid = finders_only();
        let (pixels, w, h) = render(&grid, 4, 4);
        let bitmap = threshold_binarize(&pixels, w, h, 128);

        let config = DecoderConfig::default().with_require_alignment(true);
        assert!(matches!(
            detect(&bitmap, &config),
            Err(DecodeError::AlignmentNotFound { .. })
        ));

        // Without the requirement the finder edges give the far corner
        let symbol = detect(&bitmap, &DecoderConfig::default()).unwrap();
        assert_eq!(symbol.version.number(), 3);
        assert!(symbol.alignment.is_none());
        assert_eq!(symbol.grid, grid);
    }

    #[test]
    fn test_version_1_under_keystone() {
        let grid = encode_text(
            "keystone",
            Version::new(1).unwrap(),
            ECLevel::M,
            MaskPattern::Pattern4,
        );
        let (pixels, side, _) = render(&grid, 6, 4);
        let (warped, out, _) = keystone(&pixels, side, 0.85);
        let bitmap = threshold_binarize(&warped, out, out, 128);

        let symbol = detect(&bitmap, &DecoderConfig::default()).unwrap();
        assert_eq!(symbol.version.number(), 1);
        let decoded = QrDecoder::decode_grid(&symbol.grid, &EciTable::default()).unwrap();
        assert_eq!(decoded.content, "keystone");
    }

    #[test]
    fn test_estimate_version_rounds_to_nearest() {
        let finders = FinderTriangle {
            top_left: finder::FinderPattern::new(0.0, 0.0, 1.0),
            top_right: finder::FinderPattern::new(19.0, 0.0, 1.0),
            bottom_left: finder::FinderPattern::new(0.0, 18.0, 1.0),
        };
        // Spacing 18.5 modules -> dimension 25.5 -> version 2
        assert_eq!(estimate_version(&finders, 1.0).unwrap().number(), 2);
        assert!(estimate_version(&finders, 0.0).is_err());
    }
}
