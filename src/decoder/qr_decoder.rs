/// Module grid to payload: format, version, unmask, codewords, RS, segments
use crate::decoder::bitstream::BitstreamExtractor;
use crate::decoder::format::FormatInfo;
use crate::decoder::function_mask::FunctionMask;
use crate::decoder::interleave::deinterleave;
use crate::decoder::modes::eci::EciTable;
use crate::decoder::reed_solomon::ReedSolomonDecoder;
use crate::decoder::segments::decode_payload;
use crate::decoder::unmask::unmask;
use crate::decoder::version::VersionInfo;
use crate::error::{DecodeError, Result};
use crate::models::{Bitmap, DecodedQr, Point};

/// Decodes a sampled `dimension x dimension` module grid
pub struct QrDecoder;

impl QrDecoder {
    /// Decode a module grid (`true` = dark). A grid that fails as sampled is
    /// retried transposed; a mirrored read sets `DecodedQr::mirrored`, and if
    /// the mirrored read fails too the error of the first attempt is kept.
    ///
    /// `position` is reported in module coordinates; the image-level decoder
    /// replaces it with pixel corners.
    pub fn decode_grid(grid: &Bitmap, eci_table: &EciTable) -> Result<DecodedQr> {
        if grid.width() != grid.height() {
            return Err(DecodeError::GeometryInvalid("module grid is not square"));
        }
        let err = match Self::decode_oriented(grid, eci_table) {
            Ok(decoded) => return Ok(decoded),
            Err(err) => err,
        };
        log::debug!("grid decode failed ({err}), retrying mirrored");
        match Self::decode_oriented(&grid.transpose(), eci_table) {
            Ok(mut decoded) => {
                decoded.mirrored = true;
                Ok(decoded)
            }
            Err(_) => Err(err),
        }
    }

    fn decode_oriented(grid: &Bitmap, eci_table: &EciTable) -> Result<DecodedQr> {
        let format = FormatInfo::extract(grid)?;
        let version = VersionInfo::extract(grid)?;
        log::debug!(
            "grid: version {} level {:?} mask {:?}",
            version.number(),
            format.ec_level,
            format.mask_pattern
        );

        let func = FunctionMask::new(version);
        let mut unmasked = grid.clone();
        unmask(&mut unmasked, format.mask_pattern, &func);

        let codewords = BitstreamExtractor::extract_codewords(&unmasked, &func);
        let mut blocks = deinterleave(&codewords, version, format.ec_level)?;

        let mut data = Vec::with_capacity(codewords.len());
        let mut corrected = 0;
        for block in blocks.iter_mut() {
            let ecc = block.codewords.len() - block.num_data;
            corrected += ReedSolomonDecoder::new(ecc).decode(&mut block.codewords)?;
            data.extend_from_slice(block.data());
        }
        if corrected > 0 {
            log::debug!("rs: corrected {corrected} codeword(s)");
        }

        let payload = decode_payload(&data, version, eci_table)?;
        let size = grid.width() as f32;

        Ok(DecodedQr {
            content: payload.content,
            data: payload.data,
            segments: payload.segments,
            version,
            ec_level: format.ec_level,
            mask: format.mask_pattern,
            structured_append: payload.structured_append,
            inverted: false,
            mirrored: false,
            position: [
                Point::new(0.0, 0.0),
                Point::new(size, 0.0),
                Point::new(size, size),
                Point::new(0.0, size),
            ],
        })
    }
}
