use tracing::trace;

use super::bitstream::BitStream;
use super::error::{QRError, QRResult};
use super::metadata::{ECLevel, Version};

// Byte mode writer
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub(crate) struct CapacityExceeded {
    pub required: usize,
    pub capacity: usize,
}

// Bits needed before the pad codewords: mode, count, data, terminator, alignment
pub(crate) fn unpadded_bit_len(data_len: usize) -> usize {
    let len = MODE_INDICATOR_LEN + CHAR_COUNT_LEN + (data_len << 3) + TERMINATOR_LEN;
    (len + 7) & !7
}

pub(crate) fn try_build(
    data: &[u8],
    ver: Version,
    ecl: ECLevel,
) -> Result<BitStream, CapacityExceeded> {
    let capacity = ver.data_bit_capacity(ecl);
    let required = unpadded_bit_len(data.len());
    if required > capacity || data.len() > MAX_CHAR_COUNT {
        return Err(CapacityExceeded { required, capacity });
    }

    let mut bs = BitStream::new(capacity);
    bs.push_bits(BYTE_MODE, MODE_INDICATOR_LEN);
    bs.push_bits(data.len() as u8, CHAR_COUNT_LEN);
    for b in data {
        bs.push_bits(*b, 8);
    }
    bs.push_bits(0u8, TERMINATOR_LEN);
    pad_remaining_capacity(&mut bs);

    debug_assert_eq!(bs.len(), capacity, "Padded bitstream doesn't match capacity");
    Ok(bs)
}

fn pad_remaining_capacity(out: &mut BitStream) {
    push_padding_bits(out);
    push_padding_codewords(out);
}

fn push_padding_bits(out: &mut BitStream) {
    let offset = out.len() & 7;
    if offset > 0 {
        out.push_bits(0u8, 8 - offset);
    }
}

fn push_padding_codewords(out: &mut BitStream) {
    debug_assert!(out.len() & 7 == 0, "Bit offset should be zero before padding codewords");

    let remain_byte_capacity = (out.capacity() - out.len()) >> 3;
    PADDING_CODEWORDS.iter().copied().cycle().take(remain_byte_capacity).for_each(|pc| {
        out.push_bits(pc, 8);
    });
}


// Capacity negotiation
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub(crate) struct CapacitySearch {
    ver: Version,
    ecl: ECLevel,
    min_ver: Version,
    max_ver: Version,
}

impl CapacitySearch {
    pub fn new(ecl: ECLevel, pinned: Option<Version>) -> Self {
        let (min_ver, max_ver) = match pinned {
            Some(v) => (v, v),
            None => (Version::MIN, Version::MAX),
        };
        Self { ver: min_ver, ecl, min_ver, max_ver }
    }

    pub fn current(&self) -> (Version, ECLevel) {
        (self.ver, self.ecl)
    }

    // Version grows first, then ec level relaxes with version reset
    pub fn escalate(&mut self) -> bool {
        if let Some(v) = self.ver.next().filter(|v| *v <= self.max_ver) {
            self.ver = v;
            return true;
        }
        match self.ecl.weaker() {
            Some(ecl) => {
                self.ecl = ecl;
                self.ver = self.min_ver;
                true
            }
            None => false,
        }
    }
}

pub fn encode(
    data: &[u8],
    ecl: ECLevel,
    pinned: Option<Version>,
) -> QRResult<(BitStream, Version, ECLevel)> {
    let mut search = CapacitySearch::new(ecl, pinned);
    loop {
        let (ver, ecl) = search.current();
        match try_build(data, ver, ecl) {
            Ok(bs) => return Ok((bs, ver, ecl)),
            Err(CapacityExceeded { required, capacity }) => {
                trace!(version = *ver, ?ecl, required, capacity, "Capacity exceeded");
                if !search.escalate() {
                    return Err(QRError::InputTooLarge { version: ver, ec_level: ecl });
                }
            }
        }
    }
}


// Global constants
//------------------------------------------------------------------------------

const BYTE_MODE: u8 = 0b0100;

const MODE_INDICATOR_LEN: usize = 4;

const CHAR_COUNT_LEN: usize = 8;

const TERMINATOR_LEN: usize = 4;

const MAX_CHAR_COUNT: usize = 255;

static PADDING_CODEWORDS: [u8; 2] = [0b11101100, 0b00010001];
