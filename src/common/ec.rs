// Error correction codeword generator
//------------------------------------------------------------------------------

/// Produces the parity codewords appended after the data codewords.
///
/// The symbol format fixes the code: Reed-Solomon over GF(256) with the
/// primitive polynomial `x^8 + x^4 + x^3 + x^2 + 1` and a generator whose roots
/// are `a^0 .. a^(count - 1)`. Implementations must return exactly `count`
/// bytes.
pub trait ParityCodec {
    fn parity(&self, data: &[u8], count: usize) -> Vec<u8>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReedSolomon;

impl ParityCodec for ReedSolomon {
    // Performs polynomial long division with data polynomial(num)
    // and generator polynomial(den) to compute remainder polynomial,
    // the coefficients of which are the ecc
    fn parity(&self, data: &[u8], count: usize) -> Vec<u8> {
        let len = data.len();
        let gen_poly = generator_polynomial(count);

        let mut res = data.to_vec();
        res.resize(len + count, 0);

        for i in 0..len {
            let lead_coeff = res[i];
            if lead_coeff == 0 {
                continue;
            }

            for (u, v) in res[i + 1..].iter_mut().zip(gen_poly[1..].iter()) {
                *u ^= gf_mul(*v, lead_coeff);
            }
        }

        res.split_off(len)
    }
}

// Highest degree first, monic
fn generator_polynomial(count: usize) -> Vec<u8> {
    let mut poly = vec![1u8];
    for i in 0..count {
        let root = EXP_TABLE[i % 255];
        let mut next = vec![0u8; poly.len() + 1];
        for (j, &coeff) in poly.iter().enumerate() {
            next[j] ^= coeff;
            next[j + 1] ^= gf_mul(coeff, root);
        }
        poly = next;
    }
    poly
}

fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let log_sum = LOG_TABLE[a as usize] as usize + LOG_TABLE[b as usize] as usize;
    EXP_TABLE[log_sum % 255]
}

const fn build_exp_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        table[i] = x as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE_POLYNOMIAL;
        }
        i += 1;
    }
    table[255] = table[0];
    table
}

const fn build_log_table(exp: &[u8; 256]) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 255 {
        table[exp[i] as usize] = i as u8;
        i += 1;
    }
    table
}


// Global constants
//------------------------------------------------------------------------------

const PRIMITIVE_POLYNOMIAL: u16 = 0x11d;

const EXP: [u8; 256] = build_exp_table();

static EXP_TABLE: [u8; 256] = EXP;

static LOG_TABLE: [u8; 256] = build_log_table(&EXP);
