/// GF(256) arithmetic for QR Reed-Solomon codes
/// Primitive polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11d), generator alpha = 2
pub struct Gf256;

const PRIMITIVE: u16 = 0x11d;

// EXP is doubled so a product of two logs never needs a modulo.
const fn build_exp_table() -> [u8; 512] {
    let mut table = [0u8; 512];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        table[i] = x as u8;
        table[i + 255] = x as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    table[510] = table[0];
    table[511] = table[1];
    table
}

const fn build_log_table(exp: &[u8; 512]) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 255 {
        table[exp[i] as usize] = i as u8;
        i += 1;
    }
    table
}

const EXP: [u8; 512] = build_exp_table();
static EXP_TABLE: [u8; 512] = EXP;
static LOG_TABLE: [u8; 256] = build_log_table(&EXP);

impl Gf256 {
    /// Addition is XOR
    #[inline]
    pub fn add(a: u8, b: u8) -> u8 {
        a ^ b
    }

    /// Subtraction equals addition in characteristic 2
    #[inline]
    pub fn sub(a: u8, b: u8) -> u8 {
        a ^ b
    }

    #[inline]
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        EXP_TABLE[LOG_TABLE[a as usize] as usize + LOG_TABLE[b as usize] as usize]
    }

    /// # Panics
    /// Panics when `b == 0`.
    pub fn div(a: u8, b: u8) -> u8 {
        if b == 0 {
            panic!("GF(256) division by zero");
        }
        if a == 0 {
            return 0;
        }
        EXP_TABLE[LOG_TABLE[a as usize] as usize + 255 - LOG_TABLE[b as usize] as usize]
    }

    /// Multiplicative inverse.
    ///
    /// # Panics
    /// Panics when `a == 0`.
    pub fn inv(a: u8) -> u8 {
        if a == 0 {
            panic!("GF(256) inverse of zero");
        }
        EXP_TABLE[255 - LOG_TABLE[a as usize] as usize]
    }

    /// `a^n`; `0^0` is 1
    pub fn pow(a: u8, n: usize) -> u8 {
        if n == 0 {
            return 1;
        }
        if a == 0 {
            return 0;
        }
        EXP_TABLE[(LOG_TABLE[a as usize] as usize * (n % 255)) % 255]
    }

    /// alpha^n
    #[inline]
    pub fn exp(n: usize) -> u8 {
        EXP_TABLE[n % 255]
    }

    /// Discrete log base alpha.
    ///
    /// # Panics
    /// Panics when `a == 0`.
    pub fn log(a: u8) -> usize {
        if a == 0 {
            panic!("GF(256) log of zero");
        }
        LOG_TABLE[a as usize] as usize
    }

    /// Evaluate a polynomial with coefficients highest degree first (Horner)
    pub fn eval_poly(coefficients: &[u8], x: u8) -> u8 {
        coefficients
            .iter()
            .fold(0u8, |acc, &c| Self::mul(acc, x) ^ c)
    }
}
