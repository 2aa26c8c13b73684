use std::ops::Deref;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::error::{QRError, QRResult};
use super::metadata::Module;
use crate::builder::QR;

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub struct MaskPattern(u8);

impl MaskPattern {
    /// Panics unless `pattern` is below 8. Use `MaskPattern::try_from` for
    /// untrusted values.
    pub const fn new(pattern: u8) -> Self {
        assert!(pattern < 8, "Invalid masking pattern");
        Self(pattern)
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u8> for MaskPattern {
    type Error = QRError;
    fn try_from(pattern: u8) -> QRResult<Self> {
        match pattern {
            0..=7 => Ok(Self(pattern)),
            _ => Err(QRError::InvalidMaskingPattern),
        }
    }
}

mod mask_functions {
    pub fn checkerboard(r: i16, c: i16) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i16, _: i16) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i16, c: i16) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i16, c: i16) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i16, c: i16) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i16, c: i16) -> bool {
        ((r * c) & 1) + ((r * c) % 3) == 0
    }

    pub fn diamonds(r: i16, c: i16) -> bool {
        (((r * c) & 1) + ((r * c) % 3)) & 1 == 0
    }

    pub fn meadow(r: i16, c: i16) -> bool {
        (((r + c) & 1) + ((r * c) % 3)) & 1 == 0
    }
}

impl MaskPattern {
    pub fn mask_functions(self) -> fn(i16, i16) -> bool {
        debug_assert!(*self < 8, "Invalid pattern");

        match *self {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!(),
        }
    }
}

// Mask selection
//------------------------------------------------------------------------------

// Scores every pattern on its own copy of the placed grid and returns the
// masked copy with the lowest penalty, lower pattern index on ties
#[cfg(feature = "parallel")]
pub fn apply_best_mask(qr: &QR) -> (MaskPattern, QR) {
    let (_, m, masked) = (0..8u8)
        .into_par_iter()
        .map(|m| mask_trial(qr, m))
        .min_by_key(|(pen, m, _)| (*pen, *m))
        .expect("Should return atleast 1 mask");
    (MaskPattern(m), masked)
}

#[cfg(not(feature = "parallel"))]
pub fn apply_best_mask(qr: &QR) -> (MaskPattern, QR) {
    best_mask_sequential(qr)
}

#[cfg(any(test, not(feature = "parallel")))]
fn best_mask_sequential(qr: &QR) -> (MaskPattern, QR) {
    let (_, m, masked) = (0..8u8)
        .map(|m| mask_trial(qr, m))
        .min_by_key(|(pen, m, _)| (*pen, *m))
        .expect("Should return atleast 1 mask");
    (MaskPattern(m), masked)
}

fn mask_trial(qr: &QR, m: u8) -> (u32, u8, QR) {
    let mut candidate = qr.clone();
    candidate.apply_mask(MaskPattern(m));
    (compute_total_penalty(&candidate), m, candidate)
}

pub fn compute_total_penalty(qr: &QR) -> u32 {
    let adj_pen = compute_adjacent_penalty(qr);
    let blk_pen = compute_block_penalty(qr);
    let fp_pen_h = compute_finder_pattern_penalty(qr, true);
    let fp_pen_v = compute_finder_pattern_penalty(qr, false);
    let bal_pen = compute_balance_penalty(qr);
    adj_pen + blk_pen + fp_pen_h + fp_pen_v + bal_pen
}

// Reserved modules are None
fn line(qr: &QR, i: i16, is_hor: bool) -> impl Iterator<Item = Option<Module>> + '_ {
    let w = qr.width() as i16;
    (0..w).map(move |j| {
        let (r, c) = if is_hor { (i, j) } else { (j, i) };
        (!qr.is_reserved(r, c)).then(|| qr.get(r, c))
    })
}

fn compute_adjacent_penalty(qr: &QR) -> u32 {
    let w = qr.width() as i16;
    (0..w).map(|i| run_penalty(line(qr, i, true)) + run_penalty(line(qr, i, false))).sum()
}

pub(crate) fn run_penalty(line: impl Iterator<Item = Option<Module>>) -> u32 {
    let mut pen = 0;
    let mut last = None;
    let mut consec_len = 0;
    for m in line {
        if m.is_none() || m != last {
            consec_len = 0;
        }
        last = m;
        if m.is_none() {
            continue;
        }
        consec_len += 1;
        match consec_len {
            5 => pen += 3,
            6.. => pen += 1,
            _ => {}
        }
    }
    pen
}

fn compute_block_penalty(qr: &QR) -> u32 {
    let mut pen = 0;
    let w = qr.width() as i16;
    for r in 0..w - 1 {
        for c in 0..w - 1 {
            let block = [(r, c), (r + 1, c), (r, c + 1), (r + 1, c + 1)];
            if block.iter().any(|&(i, j)| qr.is_reserved(i, j)) {
                continue;
            }
            let clr = qr.get(r, c);
            if block.iter().all(|&(i, j)| qr.get(i, j) == clr) {
                pen += 3;
            }
        }
    }
    pen
}

fn compute_finder_pattern_penalty(qr: &QR, is_hor: bool) -> u32 {
    let w = qr.width() as i16;
    (0..w)
        .map(|i| {
            let modules = line(qr, i, is_hor).collect::<Vec<_>>();
            finder_pattern_penalty(&modules)
        })
        .sum()
}

pub(crate) fn finder_pattern_penalty(line: &[Option<Module>]) -> u32 {
    let matches = |window: &[Option<Module>], pattern: &[Module; 11]| {
        window.iter().zip(pattern.iter()).all(|(m, p)| *m == Some(*p))
    };
    line.windows(11)
        .map(|win| {
            let hits = FINDER_PATTERNS.iter().filter(|p| matches(win, *p)).count();
            hits as u32 * 40
        })
        .sum()
}

fn compute_balance_penalty(qr: &QR) -> u32 {
    let w = qr.width() as i16;
    let mut dark_cnt = 0;
    let mut tot = 0;
    for r in 0..w {
        for c in 0..w {
            if qr.is_reserved(r, c) {
                continue;
            }
            tot += 1;
            if qr.get(r, c).is_dark() {
                dark_cnt += 1;
            }
        }
    }
    balance_penalty(dark_cnt, tot)
}

pub(crate) fn balance_penalty(dark_cnt: usize, tot: usize) -> u32 {
    debug_assert!(tot > 0, "No modules to balance");

    let percent = dark_cnt * 100 / tot;
    let prev = percent / 5 * 5;
    let next = if percent % 5 == 0 { prev } else { prev + 5 };
    let dev = prev.abs_diff(50).min(next.abs_diff(50));
    (dev / 5 * 10) as u32
}


// Global constants
//------------------------------------------------------------------------------

use Module::{Dark as D, Light as L};

static FINDER_PATTERNS: [[Module; 11]; 2] =
    [[D, L, D, D, D, L, D, L, L, L, L], [L, L, L, L, D, L, D, D, D, L, D]];
