use super::metadata::Version;

// Iterator for placing data in encoding region of QR
//------------------------------------------------------------------------------

// Walks two-column strips from the bottom right corner. Right column is
// visited before left, direction flips after each strip, and the strip
// that would hold the vertical timing column shifts one column left.
pub struct EncRegionIter {
    r: i16,
    // Right column of the current strip
    c: i16,
    width: i16,
    upward: bool,
    left: bool,
}

impl EncRegionIter {
    pub const fn new(version: Version) -> Self {
        let w = version.width() as i16;
        Self { r: w - 1, c: w - 1, width: w, upward: true, left: false }
    }

    fn next_strip(&mut self) {
        self.c -= 2;
        if self.c == VERT_TIMING_COL {
            self.c -= 1;
        }
        self.upward = !self.upward;
    }
}

impl Iterator for EncRegionIter {
    type Item = (i16, i16);
    fn next(&mut self) -> Option<Self::Item> {
        if self.c < 0 {
            return None;
        }
        let res = if self.left { (self.r, self.c - 1) } else { (self.r, self.c) };
        if !self.left {
            self.left = true;
            return Some(res);
        }

        self.left = false;
        match self.upward {
            true if self.r > 0 => self.r -= 1,
            false if self.r < self.width - 1 => self.r += 1,
            _ => self.next_strip(),
        }
        Some(res)
    }
}


// Global constants
//------------------------------------------------------------------------------

static VERT_TIMING_COL: i16 = 6;
