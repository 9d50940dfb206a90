//! Decoder tuning knobs.
//!
//! [`DecoderConfig::default`] gives the documented defaults; `from_env` lets a
//! deployment override them through `QR_*` environment variables without a
//! rebuild. Invalid values are ignored and leave the default in place.

use crate::decoder::modes::eci::EciTable;

/// Threshold offsets tried by default, baseline first
pub const DEFAULT_THRESHOLD_OFFSETS: [i16; 3] = [0, -5, 5];
/// Default finder triangle tolerance
pub const DEFAULT_FINDER_TOLERANCE: f32 = 0.25;

/// Settings for one decode call
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    /// Binarization offsets, tried in order
    pub threshold_offsets: Vec<i16>,
    /// Retry each offset with the bitmap negated (light-on-dark symbols)
    pub try_inverted: bool,
    /// Allowed deviation from a right isosceles finder triangle
    pub finder_tolerance: f32,
    /// Fail with `AlignmentNotFound` instead of falling back to the 3-point estimate
    pub require_alignment: bool,
    /// ECI designator to charset mapping
    pub eci_table: EciTable,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            threshold_offsets: DEFAULT_THRESHOLD_OFFSETS.to_vec(),
            try_inverted: true,
            finder_tolerance: DEFAULT_FINDER_TOLERANCE,
            require_alignment: false,
            eci_table: EciTable::default(),
        }
    }
}

impl DecoderConfig {
    /// Defaults overlaid with `QR_THRESHOLD_OFFSETS`, `QR_TRY_INVERTED`,
    /// `QR_FINDER_TOLERANCE` and `QR_REQUIRE_ALIGNMENT`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            threshold_offsets: parse_env_offsets("QR_THRESHOLD_OFFSETS", defaults.threshold_offsets),
            try_inverted: parse_env_bool_u8("QR_TRY_INVERTED", defaults.try_inverted),
            finder_tolerance: parse_env_f32("QR_FINDER_TOLERANCE", defaults.finder_tolerance)
                .clamp(0.01, 1.0),
            require_alignment: parse_env_bool_u8("QR_REQUIRE_ALIGNMENT", defaults.require_alignment),
            eci_table: defaults.eci_table,
        }
    }

    pub fn with_threshold_offsets(mut self, offsets: impl Into<Vec<i16>>) -> Self {
        self.threshold_offsets = offsets.into();
        self
    }

    pub fn with_try_inverted(mut self, try_inverted: bool) -> Self {
        self.try_inverted = try_inverted;
        self
    }

    pub fn with_finder_tolerance(mut self, tolerance: f32) -> Self {
        self.finder_tolerance = tolerance;
        self
    }

    pub fn with_require_alignment(mut self, require: bool) -> Self {
        self.require_alignment = require;
        self
    }

    pub fn with_eci_table(mut self, table: EciTable) -> Self {
        self.eci_table = table;
        self
    }
}

fn parse_env_f32(name: &str, default: f32) -> f32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}

fn parse_env_offsets(name: &str, default: Vec<i16>) -> Vec<i16> {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_offsets(&v))
        .unwrap_or(default)
}

/// Comma separated offsets; `None` if any entry is malformed or the list is empty
fn parse_offsets(value: &str) -> Option<Vec<i16>> {
    let offsets = value
        .split(',')
        .map(|part| part.trim().parse::<i16>().ok())
        .collect::<Option<Vec<_>>>()?;
    (!offsets.is_empty()).then_some(offsets)
}
