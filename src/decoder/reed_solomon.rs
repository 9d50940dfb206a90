/// Reed-Solomon error correction for QR codes
/// RS over GF(256), generator roots alpha^0 .. alpha^(ecc-1)
use crate::decoder::galois::Gf256;
use crate::error::{DecodeError, Result};

/// Reed-Solomon decoder for one block of `[data | ecc]` codewords
pub struct ReedSolomonDecoder {
    num_ecc_codewords: usize,
}

impl ReedSolomonDecoder {
    pub fn new(num_ecc_codewords: usize) -> Self {
        Self { num_ecc_codewords }
    }

    /// Correct `received` in place, returning the number of symbols fixed.
    ///
    /// `received[0]` is the coefficient of the highest power of x.
    pub fn decode(&self, received: &mut [u8]) -> Result<usize> {
        let n = received.len();
        if n <= self.num_ecc_codewords || n > 255 {
            return Err(self.unrecoverable());
        }

        let syndrome = self.calculate_syndrome(received);
        if syndrome.iter().all(|&s| s == 0) {
            return Ok(0);
        }

        let (sigma, degree) = self.find_error_locator(&syndrome);
        if degree == 0 || degree > self.num_ecc_codewords / 2 {
            return Err(self.unrecoverable());
        }

        let error_positions = self.find_error_positions(&sigma, n);
        if error_positions.len() != degree {
            return Err(self.unrecoverable());
        }

        let error_values = self.find_error_values(&sigma, &syndrome, &error_positions, n)?;
        for (&pos, &value) in error_positions.iter().zip(&error_values) {
            received[pos] ^= value;
        }

        if self.calculate_syndrome(received).iter().any(|&s| s != 0) {
            return Err(self.unrecoverable());
        }

        log::trace!("rs: corrected {degree} symbol(s) in block of {n}");
        Ok(degree)
    }

    fn unrecoverable(&self) -> DecodeError {
        DecodeError::ReedSolomonUnrecoverable {
            ecc_codewords: self.num_ecc_codewords,
        }
    }

    /// S_j = r(alpha^j) for j in 0..ecc
    fn calculate_syndrome(&self, received: &[u8]) -> Vec<u8> {
        (0..self.num_ecc_codewords)
            .map(|j| Gf256::eval_poly(received, Gf256::exp(j)))
            .collect()
    }

    /// Berlekamp-Massey. Returns the locator (ascending coefficients, sigma[0] = 1)
    /// and its linear complexity.
    fn find_error_locator(&self, syndrome: &[u8]) -> (Vec<u8>, usize) {
        let mut sigma = vec![1u8];
        let mut b = vec![1u8];
        let mut delta_b: u8 = 1;
        let mut l = 0usize;
        let mut m = 1usize;

        for i in 0..syndrome.len() {
            let mut delta = syndrome[i];
            for j in 1..=l.min(sigma.len() - 1) {
                delta ^= Gf256::mul(sigma[j], syndrome[i - j]);
            }

            if delta == 0 {
                m += 1;
                continue;
            }

            let factor = Gf256::div(delta, delta_b);
            let previous = sigma.clone();
            if sigma.len() < b.len() + m {
                sigma.resize(b.len() + m, 0);
            }
            // sigma -= factor * x^m * b
            for (j, &bj) in b.iter().enumerate() {
                sigma[j + m] ^= Gf256::mul(factor, bj);
            }

            if 2 * l <= i {
                l = i + 1 - l;
                b = previous;
                delta_b = delta;
                m = 1;
            } else {
                m += 1;
            }
        }

        sigma.truncate(l + 1);
        (sigma, l)
    }

    /// Chien search: position p carries an error when sigma(X_p^-1) = 0,
    /// with X_p = alpha^(n-1-p).
    fn find_error_positions(&self, sigma: &[u8], n: usize) -> Vec<usize> {
        (0..n)
            .filter(|&p| {
                let x_inv = Gf256::exp(255 - (n - 1 - p) % 255);
                eval_ascending(sigma, x_inv) == 0
            })
            .collect()
    }

    /// Forney: e = X * omega(X^-1) / sigma'(X^-1), omega = S * sigma mod x^ecc
    fn find_error_values(
        &self,
        sigma: &[u8],
        syndrome: &[u8],
        error_positions: &[usize],
        n: usize,
    ) -> Result<Vec<u8>> {
        let ecc = self.num_ecc_codewords;
        let mut omega = vec![0u8; ecc];
        for (i, &s) in syndrome.iter().enumerate() {
            for (j, &c) in sigma.iter().enumerate() {
                if i + j < ecc {
                    omega[i + j] ^= Gf256::mul(s, c);
                }
            }
        }

        // Formal derivative: only odd powers survive in characteristic 2
        let derivative: Vec<u8> = sigma
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &c)| if i % 2 == 1 { c } else { 0 })
            .collect();

        error_positions
            .iter()
            .map(|&pos| {
                let x = Gf256::exp(n - 1 - pos);
                let x_inv = Gf256::inv(x);
                let denominator = eval_ascending(&derivative, x_inv);
                if denominator == 0 {
                    return Err(self.unrecoverable());
                }
                let numerator = Gf256::mul(x, eval_ascending(&omega, x_inv));
                Ok(Gf256::div(numerator, denominator))
            })
            .collect()
    }
}

fn eval_ascending(coefficients: &[u8], x: u8) -> u8 {
    coefficients
        .iter()
        .rev()
        .fold(0u8, |acc, &c| Gf256::mul(acc, x) ^ c)
}

/// Reed-Solomon encoder producing the ECC codewords for a data block
pub struct ReedSolomonEncoder {
    // Generator coefficients, highest degree first, leading 1 omitted
    generator: Vec<u8>,
}

impl ReedSolomonEncoder {
    pub fn new(num_ecc_codewords: usize) -> Self {
        let degree = num_ecc_codewords;
        let mut generator = vec![0u8; degree];
        if degree > 0 {
            generator[degree - 1] = 1;
        }
        let mut root = 1u8;
        for _ in 0..degree {
            for j in 0..degree {
                generator[j] = Gf256::mul(generator[j], root);
                if j + 1 < degree {
                    generator[j] ^= generator[j + 1];
                }
            }
            root = Gf256::mul(root, 2);
        }
        Self { generator }
    }

    /// Remainder of `data * x^ecc` divided by the generator
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut remainder = vec![0u8; self.generator.len()];
        if remainder.is_empty() {
            return remainder;
        }
        for &byte in data {
            let factor = byte ^ remainder[0];
            remainder.rotate_left(1);
            if let Some(last) = remainder.last_mut() {
                *last = 0;
            }
            for (r, &g) in remainder.iter_mut().zip(&self.generator) {
                *r ^= Gf256::mul(g, factor);
            }
        }
        remainder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codeword(data: &[u8], ecc: usize) -> Vec<u8> {
        let mut block = data.to_vec();
        block.extend(ReedSolomonEncoder::new(ecc).encode(data));
        block
    }

    #[test]
    fn test_known_version1_m_block() {
        // "01234567" numeric, 1-M, from ISO/IEC 18004 Annex I
        let data = [
            0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11,
            0xEC, 0x11,
        ];
        let ecc = ReedSolomonEncoder::new(10).encode(&data);
        assert_eq!(
            ecc,
            vec![0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55]
        );
    }

    #[test]
    fn test_clean_block_needs_no_correction() {
        let mut block = codeword(b"hello reed solomon", 12);
        let original = block.clone();
        let decoder = ReedSolomonDecoder::new(12);
        assert_eq!(decoder.decode(&mut block), Ok(0));
        assert_eq!(block, original);
    }

    #[test]
    fn test_corrects_up_to_capacity() {
        let data: Vec<u8> = (0..16u8).map(|i| i.wrapping_mul(37).wrapping_add(5)).collect();
        let original = codeword(&data, 10);
        let decoder = ReedSolomonDecoder::new(10);

        for errors in 1..=5usize {
            let mut block = original.clone();
            for k in 0..errors {
                block[k * 5 + 1] ^= 0x5A ^ k as u8;
            }
            assert_eq!(decoder.decode(&mut block), Ok(errors));
            assert_eq!(block, original);
        }
    }

    #[test]
    fn test_errors_in_ecc_region_and_first_symbol() {
        let original = codeword(&[0xFF; 20], 16);
        let mut block = original.clone();
        block[0] ^= 0x01;
        block[35] ^= 0x80;
        block[25] ^= 0x42;
        let decoder = ReedSolomonDecoder::new(16);
        assert_eq!(decoder.decode(&mut block), Ok(3));
        assert_eq!(block, original);
    }

    #[test]
    fn test_one_past_capacity_is_unrecoverable() {
        let data: Vec<u8> = (0..16u8).collect();
        let mut block = codeword(&data, 10);
        for k in 0..6usize {
            block[k * 4] ^= 0x33;
        }
        let decoder = ReedSolomonDecoder::new(10);
        assert_eq!(
            decoder.decode(&mut block),
            Err(DecodeError::ReedSolomonUnrecoverable { ecc_codewords: 10 })
        );
    }

    #[test]
    fn test_odd_ecc_count() {
        // 1-L blocks carry 7 ecc codewords: floor(7/2) = 3 correctable
        let data = [
            0x40, 0x56, 0x86, 0x56, 0xC6, 0xC6, 0xF0, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC,
            0x11, 0xEC, 0x11, 0xEC, 0x11,
        ];
        let original = codeword(&data, 7);
        let mut block = original.clone();
        block[2] ^= 0xAA;
        block[9] ^= 0x01;
        block[20] ^= 0x10;
        assert_eq!(ReedSolomonDecoder::new(7).decode(&mut block), Ok(3));
        assert_eq!(block, original);
    }
}
