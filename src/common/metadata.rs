use std::fmt::{Display, Error, Formatter};
use std::ops::{Deref, Not};

use super::error::{QRError, QRResult};
use super::mask::MaskPattern;

// Module
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum Module {
    #[default]
    Light,
    Dark,
}

impl Module {
    pub fn select<T>(&self, light: T, dark: T) -> T {
        match self {
            Self::Light => light,
            Self::Dark => dark,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Self::Dark)
    }
}

impl From<bool> for Module {
    fn from(bit: bool) -> Self {
        if bit {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

impl Not for Module {
    type Output = Self;
    fn not(self) -> Self::Output {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

// Version
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub struct Version(usize);

impl Version {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(2);

    /// Panics unless `version` is 1 or 2. Use `Version::try_from` for
    /// untrusted values.
    pub const fn new(version: usize) -> Self {
        assert!(1 <= version && version <= 2, "Invalid version");
        Self(version)
    }

    pub const fn width(self) -> usize {
        self.0 * 4 + 17
    }

    pub fn data_bit_capacity(self, ecl: ECLevel) -> usize {
        DATA_CODEWORDS[self.0 - 1][ecl as usize] << 3
    }

    pub fn data_codewords(self, ecl: ECLevel) -> usize {
        DATA_CODEWORDS[self.0 - 1][ecl as usize]
    }

    pub fn ecc_codewords(self, ecl: ECLevel) -> usize {
        ECC_CODEWORDS[self.0 - 1][ecl as usize]
    }

    pub fn total_codewords(self) -> usize {
        // Data + parity is constant across ec levels for single block versions
        self.data_codewords(ECLevel::L) + self.ecc_codewords(ECLevel::L)
    }

    pub fn remainder_bits(self) -> usize {
        REMAINDER_BITS[self.0 - 1]
    }

    pub fn next(self) -> Option<Self> {
        (self < Self::MAX).then(|| Self(self.0 + 1))
    }
}

impl Deref for Version {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for Version {
    type Error = QRError;
    fn try_from(version: usize) -> QRResult<Self> {
        match version {
            1..=2 => Ok(Self(version)),
            _ => Err(QRError::InvalidVersion),
        }
    }
}

// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub enum ECLevel {
    L = 0,
    M = 1,
    Q = 2,
    H = 3,
}

impl ECLevel {
    pub fn weaker(self) -> Option<Self> {
        match self {
            Self::L => None,
            Self::M => Some(Self::L),
            Self::Q => Some(Self::M),
            Self::H => Some(Self::Q),
        }
    }

    // Two bit code used by format information
    pub fn format_bits(self) -> u32 {
        match self {
            Self::L => 0b01,
            Self::M => 0b00,
            Self::Q => 0b11,
            Self::H => 0b10,
        }
    }
}

// Format information
//------------------------------------------------------------------------------

pub fn format_info(ecl: ECLevel, mask: MaskPattern) -> u32 {
    let data = (ecl.format_bits() << 3) | *mask as u32;
    let rem = bch_remainder(data << FORMAT_ERROR_BIT_LEN);
    ((data << FORMAT_ERROR_BIT_LEN) | rem) ^ FORMAT_MASK
}

// Remainder of binary polynomial division by the format generator
pub fn bch_remainder(mut poly: u32) -> u32 {
    for i in (FORMAT_ERROR_BIT_LEN..FORMAT_INFO_BIT_LEN).rev() {
        if (poly >> i) & 1 == 1 {
            poly ^= FORMAT_GENERATOR << (i - FORMAT_ERROR_BIT_LEN);
        }
    }
    poly
}

#[cfg(test)]
mod format_info_tests {
    use test_case::test_case;

    use super::{bch_remainder, format_info, ECLevel, FORMAT_MASK};
    use crate::common::mask::MaskPattern;

    #[test_case(ECLevel::L, 0, 0b111011111000100)]
    #[test_case(ECLevel::L, 4, 0b110011000101111)]
    #[test_case(ECLevel::M, 0, 0b101010000010010)]
    #[test_case(ECLevel::M, 5, 0b100000011001110)]
    #[test_case(ECLevel::Q, 0, 0b011010101011111)]
    #[test_case(ECLevel::Q, 7, 0b010101111101101)]
    #[test_case(ECLevel::H, 0, 0b001011010001001)]
    #[test_case(ECLevel::H, 3, 0b001100111010000)]
    fn test_format_info(ecl: ECLevel, mask: u8, exp: u32) {
        assert_eq!(format_info(ecl, MaskPattern::new(mask)), exp);
    }

    #[test]
    fn test_format_info_zero_syndrome() {
        for ecl in [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H] {
            for m in 0..8 {
                let info = format_info(ecl, MaskPattern::new(m)) ^ FORMAT_MASK;
                assert_eq!(bch_remainder(info), 0, "ecl {ecl:?}, mask {m}");
                assert!(info < 1 << 15);
            }
        }
    }

    #[test]
    fn test_format_info_distinct() {
        let mut infos = Vec::new();
        for ecl in [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H] {
            for m in 0..8 {
                infos.push(format_info(ecl, MaskPattern::new(m)));
            }
        }
        infos.sort_unstable();
        infos.dedup();
        assert_eq!(infos.len(), 32);
    }
}


// Global constants
//------------------------------------------------------------------------------

pub const MAX_QR_SIZE: usize = 625;

pub const FORMAT_INFO_BIT_LEN: u32 = 15;

pub const FORMAT_ERROR_BIT_LEN: u32 = 10;

pub const FORMAT_GENERATOR: u32 = 0b10100110111;

pub const FORMAT_MASK: u32 = 0b101010000010010;

// Indexed by [version - 1][ec level]
static DATA_CODEWORDS: [[usize; 4]; 2] = [[19, 16, 13, 9], [34, 28, 22, 16]];

static ECC_CODEWORDS: [[usize; 4]; 2] = [[7, 10, 13, 17], [10, 16, 22, 28]];

static REMAINDER_BITS: [usize; 2] = [0, 7];

// Most significant bit first
pub static FORMAT_INFO_COORDS_QR_MAIN: [(i16, i16); 15] = [
    (8, 0),
    (8, 1),
    (8, 2),
    (8, 3),
    (8, 4),
    (8, 5),
    (8, 7),
    (8, 8),
    (7, 8),
    (5, 8),
    (4, 8),
    (3, 8),
    (2, 8),
    (1, 8),
    (0, 8),
];

pub static FORMAT_INFO_COORDS_QR_SIDE: [(i16, i16); 15] = [
    (-1, 8),
    (-2, 8),
    (-3, 8),
    (-4, 8),
    (-5, 8),
    (-6, 8),
    (-7, 8),
    (8, -8),
    (8, -7),
    (8, -6),
    (8, -5),
    (8, -4),
    (8, -3),
    (8, -2),
    (8, -1),
];
