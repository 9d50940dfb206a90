/// BCH codes protecting format info (15,5) and version info (18,6)
///
/// Both codes have minimum distance 7, so nearest-codeword search with a
/// Hamming radius of 3 is exact decoding.
const FORMAT_GENERATOR: u32 = 0x537;
const FORMAT_MASK: u16 = 0x5412;
const VERSION_GENERATOR: u32 = 0x1F25;
const MAX_CORRECTABLE: u32 = 3;

/// Remainder of `value` (already shifted left) divided by `generator`
fn poly_remainder(mut value: u32, generator: u32) -> u32 {
    let generator_degree = 31 - generator.leading_zeros();
    while value != 0 && 31 - value.leading_zeros() >= generator_degree {
        let shift = (31 - value.leading_zeros()) - generator_degree;
        value ^= generator << shift;
    }
    value
}

/// 15-bit masked format codeword for the 5 data bits (2 EC + 3 mask)
pub fn format_codeword(data: u8) -> u16 {
    let data = (data & 0x1F) as u32;
    let bits = (data << 10) | poly_remainder(data << 10, FORMAT_GENERATOR);
    (bits as u16) ^ FORMAT_MASK
}

/// 18-bit version codeword for versions 7..=40
pub fn version_codeword(version: u8) -> u32 {
    let data = (version & 0x3F) as u32;
    (data << 12) | poly_remainder(data << 12, VERSION_GENERATOR)
}

/// Correct a raw 15-bit format read to its 5 data bits
pub fn decode_format(raw: u16) -> Option<u8> {
    (0u8..32)
        .map(|data| (data, (format_codeword(data) ^ raw).count_ones()))
        .min_by_key(|&(_, distance)| distance)
        .filter(|&(_, distance)| distance <= MAX_CORRECTABLE)
        .map(|(data, _)| data)
}

/// Correct a raw 18-bit version read to a version number in 7..=40
pub fn decode_version(raw: u32) -> Option<u8> {
    (7u8..=40)
        .map(|v| (v, (version_codeword(v) ^ raw).count_ones()))
        .min_by_key(|&(_, distance)| distance)
        .filter(|&(_, distance)| distance <= MAX_CORRECTABLE)
        .map(|(v, _)| v)
}
