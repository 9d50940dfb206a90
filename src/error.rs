//! Error type shared by every decode stage

use thiserror::Error;

/// Why a decode attempt failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Pixel buffer does not match the declared geometry
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Image is smaller than a version 1 symbol
    #[error("image too small: {width}x{height} (minimum 21x21)")]
    ImageTooSmall {
        /// Image width in pixels
        width: usize,
        /// Image height in pixels
        height: usize,
    },

    /// No three finder patterns forming a plausible symbol
    #[error("no QR finder pattern triple found")]
    PatternNotFound,

    /// Alignment pattern required but not located near the predicted centre
    #[error("alignment pattern not found near ({x:.1}, {y:.1})")]
    AlignmentNotFound {
        /// Predicted x in pixels
        x: f32,
        /// Predicted y in pixels
        y: f32,
    },

    /// Perspective model is degenerate or samples fall outside the image
    #[error("invalid symbol geometry: {0}")]
    GeometryInvalid(&'static str),

    /// Format information could not be corrected or the two copies disagree
    #[error("format information unrecoverable")]
    FormatInfoUnrecoverable,

    /// Version information could not be corrected or contradicts the grid
    #[error("version information unrecoverable")]
    VersionInfoUnrecoverable,

    /// A Reed-Solomon block holds more errors than its ECC can fix
    #[error("Reed-Solomon block unrecoverable ({ecc_codewords} ecc codewords)")]
    ReedSolomonUnrecoverable {
        /// ECC codewords of the failing block
        ecc_codewords: usize,
    },

    /// Codeword stream length differs from the version/ECC table
    #[error("codeword count mismatch: expected {expected}, got {actual}")]
    CodewordCountMismatch {
        /// Count required by the block table
        expected: usize,
        /// Count actually read
        actual: usize,
    },

    /// ECI designator with no known charset
    #[error("unsupported ECI designator {0}")]
    UnsupportedEci(u32),

    /// Bitstream grammar violation (unknown mode, truncated segment, bad value)
    #[error("invalid bitstream: {0}")]
    InvalidBitStream(&'static str),
}

/// Result alias used across the crate
pub type Result<T, E = DecodeError> = std::result::Result<T, E>;
