use image::{GrayImage, Luma};

use crate::common::bitstream::BitStream;
use crate::common::iter::EncRegionIter;
use crate::common::metadata::*;
use crate::MaskPattern;

// Layout
//------------------------------------------------------------------------------

/// Decides which modules belong to function patterns or format information.
///
/// Reserved modules are never stored in the grid. Every consumer asks the
/// layout, so placement, masking and scoring can't disagree.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct LayoutConfig {
    version: Version,
    // Centred 5x5 box kept clear of data, version 2 only
    logo_reserved: bool,
}

impl LayoutConfig {
    pub fn new(version: Version, logo_reserved: bool) -> Self {
        Self { version, logo_reserved }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn logo_reserved(&self) -> bool {
        self.logo_reserved && *self.version == 2
    }

    pub fn width(&self) -> usize {
        self.version.width()
    }

    pub fn is_reserved(&self, r: i16, c: i16) -> bool {
        let w = self.width() as i16;
        debug_assert!(-w <= r && r < w, "row should be within width");
        debug_assert!(-w <= c && c < w, "column should be within width");

        let r = if r < 0 { r + w } else { r };
        let c = if c < 0 { c + w } else { c };

        // Finders, separators and format area, dark module included
        if (r < 9 && c < 9) || (r < 9 && c >= w - 8) || (r >= w - 8 && c < 9) {
            return true;
        }

        if r == 6 || c == 6 {
            return true;
        }

        if *self.version == 2 {
            let in_align = |i: i16| (w - 9..=w - 5).contains(&i);
            if in_align(r) && in_align(c) {
                return true;
            }
        }

        if self.logo_reserved() {
            let mid = w / 2;
            let in_logo = |i: i16| (mid - 2..=mid + 2).contains(&i);
            if in_logo(r) && in_logo(c) {
                return true;
            }
        }

        false
    }

    /// Modules left for data and remainder bits once every reserved area is
    /// taken out.
    pub fn data_module_count(&self) -> usize {
        let w = self.width() as i16;
        (0..w)
            .flat_map(|r| (0..w).map(move |c| (r, c)))
            .filter(|&(r, c)| !self.is_reserved(r, c))
            .count()
    }
}


// QR grid
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct QR {
    grid: Box<[Module; MAX_QR_SIZE]>,
    w: usize,
    layout: LayoutConfig,
    ecl: ECLevel,
    mask: Option<MaskPattern>,
}

impl QR {
    pub fn new(layout: LayoutConfig, ecl: ECLevel) -> Self {
        let w = layout.width();
        Self { grid: Box::new([Module::Light; MAX_QR_SIZE]), w, layout, ecl, mask: None }
    }

    pub fn grid(&self) -> &[Module] {
        &self.grid[..self.w * self.w]
    }

    pub fn layout(&self) -> LayoutConfig {
        self.layout
    }

    pub fn version(&self) -> Version {
        self.layout.version()
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ecl
    }

    pub fn mask(&self) -> Option<MaskPattern> {
        self.mask
    }

    pub fn is_reserved(&self, r: i16, c: i16) -> bool {
        self.layout.is_reserved(r, c)
    }

    pub fn count_dark_modules(&self) -> usize {
        self.grid().iter().filter(|m| m.is_dark()).count()
    }

    #[cfg(test)]
    pub fn to_debug_str(&self) -> String {
        let w = self.w as i16;
        let mut res = String::with_capacity((w * (w + 1)) as usize);
        res.push('\n');
        for i in 0..w {
            for j in 0..w {
                let c = match (self.is_reserved(i, j), self.get(i, j)) {
                    (true, Module::Dark) => 'f',
                    (true, Module::Light) => 'F',
                    (false, Module::Dark) => 'd',
                    (false, Module::Light) => '.',
                };
                res.push(c);
            }
            res.push('\n');
        }
        res
    }

    fn coord_to_index(&self, r: i16, c: i16) -> usize {
        let w = self.w as i16;
        debug_assert!(-w <= r && r < w, "row should be greater than or equal to w");
        debug_assert!(-w <= c && c < w, "column should be greater than or equal to w");

        let r = if r < 0 { r + w } else { r };
        let c = if c < 0 { c + w } else { c };
        (r * w + c) as _
    }

    pub fn get(&self, r: i16, c: i16) -> Module {
        self.grid[self.coord_to_index(r, c)]
    }

    pub fn get_mut(&mut self, r: i16, c: i16) -> &mut Module {
        let index = self.coord_to_index(r, c);
        &mut self.grid[index]
    }

    pub fn set(&mut self, r: i16, c: i16, module: Module) {
        *self.get_mut(r, c) = module;
    }
}

#[cfg(test)]
mod qr_util_tests {
    use super::{LayoutConfig, QR};
    use crate::common::metadata::{ECLevel, Module, Version};

    fn blank() -> QR {
        QR::new(LayoutConfig::new(Version::new(1), false), ECLevel::L)
    }

    #[test]
    fn test_index_wrap() {
        let mut qr = blank();
        let w = qr.w as i16;
        qr.set(-1, -1, Module::Dark);
        assert_eq!(qr.get(w - 1, w - 1), Module::Dark);
        qr.set(0, 0, Module::Dark);
        assert_eq!(qr.get(-w, -w), Module::Dark);
        assert_eq!(qr.count_dark_modules(), 2);
    }

    #[test]
    #[should_panic]
    fn test_row_out_of_bound() {
        let qr = blank();
        let w = qr.w as i16;
        qr.get(w, 0);
    }

    #[test]
    #[should_panic]
    fn test_col_index_overwrap() {
        let qr = blank();
        let w = qr.w as i16;
        qr.get(0, -(w + 1));
    }
}

// Function patterns
//------------------------------------------------------------------------------

impl QR {
    fn draw_finder_patterns(&mut self) {
        self.draw_finder_pattern_at(3, 3);
        self.draw_finder_pattern_at(3, -4);
        self.draw_finder_pattern_at(-4, 3);
    }

    // Includes the one module separator on the sides facing the symbol
    fn draw_finder_pattern_at(&mut self, r: i16, c: i16) {
        let (dr_left, dr_right) = if r > 0 { (-3, 4) } else { (-4, 3) };
        let (dc_top, dc_bottom) = if c > 0 { (-3, 4) } else { (-4, 3) };
        for i in dr_left..=dr_right {
            for j in dc_top..=dc_bottom {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (4 | -4, _) | (_, 4 | -4) => Module::Light,
                        (3 | -3, _) | (_, 3 | -3) => Module::Dark,
                        (2 | -2, _) | (_, 2 | -2) => Module::Light,
                        _ => Module::Dark,
                    },
                );
            }
        }
    }

    fn draw_timing_pattern(&mut self) {
        let w = self.w as i16;
        self.draw_line(6, 8, 6, w - 9);
        self.draw_line(8, 6, w - 9, 6);
    }

    fn draw_line(&mut self, r1: i16, c1: i16, r2: i16, c2: i16) {
        debug_assert!(r1 == r2 || c1 == c2, "Line is neither vertical nor horizontal");

        if r1 == r2 {
            for j in c1..=c2 {
                self.set(r1, j, Module::from(j & 1 == 0));
            }
        } else {
            for i in r1..=r2 {
                self.set(i, c1, Module::from(i & 1 == 0));
            }
        }
    }

    // Version 2 carries a single pattern, the only one not overlapping a finder
    fn draw_alignment_patterns(&mut self) {
        if *self.version() == 2 {
            self.draw_alignment_pattern_at(-7, -7);
        }
    }

    fn draw_alignment_pattern_at(&mut self, r: i16, c: i16) {
        for i in -2..=2 {
            for j in -2..=2 {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (-2 | 2, _) | (_, -2 | 2) | (0, 0) => Module::Dark,
                        _ => Module::Light,
                    },
                )
            }
        }
    }

    fn draw_dark_module(&mut self) {
        self.set(-8, 8, Module::Dark);
    }

    pub fn draw_all_function_patterns(&mut self) {
        self.draw_finder_patterns();
        self.draw_timing_pattern();
        self.draw_alignment_patterns();
        self.draw_dark_module();
    }
}

#[cfg(test)]
mod function_pattern_tests {
    use super::{LayoutConfig, QR};
    use crate::common::metadata::{ECLevel, Module, Version};

    #[test]
    fn test_all_function_patterns_1() {
        let mut qr = QR::new(LayoutConfig::new(Version::new(1), false), ECLevel::L);
        qr.draw_all_function_patterns();
        assert_eq!(
            qr.to_debug_str(),
            "\n\
             fffffffFF....Ffffffff\n\
             fFFFFFfFF....FfFFFFFf\n\
             fFfffFfFF....FfFfffFf\n\
             fFfffFfFF....FfFfffFf\n\
             fFfffFfFF....FfFfffFf\n\
             fFFFFFfFF....FfFFFFFf\n\
             fffffffFfFfFfFfffffff\n\
             FFFFFFFFF....FFFFFFFF\n\
             FFFFFFfFF....FFFFFFFF\n\
             ......F..............\n\
             ......f..............\n\
             ......F..............\n\
             ......f..............\n\
             FFFFFFFFf............\n\
             fffffffFF............\n\
             fFFFFFfFF............\n\
             fFfffFfFF............\n\
             fFfffFfFF............\n\
             fFfffFfFF............\n\
             fFFFFFfFF............\n\
             fffffffFF............\n"
        );
    }

    #[test]
    fn test_alignment_pattern_2() {
        let mut qr = QR::new(LayoutConfig::new(Version::new(2), false), ECLevel::L);
        qr.draw_all_function_patterns();
        assert_eq!(qr.get(18, 18), Module::Dark);
        assert_eq!(qr.get(17, 18), Module::Light);
        assert_eq!(qr.get(16, 16), Module::Dark);
        assert_eq!(qr.get(20, 18), Module::Dark);
        assert_eq!(qr.get(15, 15), Module::Light);
        // Finders 3 x 33, timing 2 x 5, alignment 17, dark module 1
        assert_eq!(qr.count_dark_modules(), 99 + 10 + 17 + 1);
    }

    #[test]
    fn test_function_patterns_stay_reserved() {
        for (ver, logo) in [(1, false), (2, false), (2, true)] {
            let mut qr = QR::new(LayoutConfig::new(Version::new(ver), logo), ECLevel::L);
            qr.draw_all_function_patterns();
            let w = qr.width() as i16;
            for r in 0..w {
                for c in 0..w {
                    if qr.get(r, c).is_dark() {
                        assert!(qr.is_reserved(r, c), "Dark module outside layout at {r} {c}");
                    }
                }
            }
        }
    }
}

// Format information
//------------------------------------------------------------------------------

impl QR {
    pub fn draw_format_info(&mut self, format_info: u32) {
        self.draw_number(format_info, FORMAT_INFO_BIT_LEN, &FORMAT_INFO_COORDS_QR_MAIN);
        self.draw_number(format_info, FORMAT_INFO_BIT_LEN, &FORMAT_INFO_COORDS_QR_SIDE);
    }

    // Most significant bit goes to the first coordinate
    fn draw_number(&mut self, number: u32, bit_len: u32, coords: &[(i16, i16)]) {
        let mut mask = 1 << (bit_len - 1);
        for &(r, c) in coords {
            debug_assert!(self.is_reserved(r, c), "Format info outside reserved area: {r} {c}");

            self.set(r, c, Module::from(number & mask != 0));
            mask >>= 1;
        }
    }

    pub fn read_format_info(&self, coords: &[(i16, i16)]) -> u32 {
        coords.iter().fold(0, |acc, &(r, c)| (acc << 1) | self.get(r, c).is_dark() as u32)
    }
}


// Encoding region
//------------------------------------------------------------------------------

impl QR {
    // Every payload bit lands on the grid. Callers check the payload against
    // `LayoutConfig::data_module_count` first.
    pub fn draw_encoding_region(&mut self, payload: &BitStream) {
        let mut coords = EncRegionIter::new(self.version());
        for (i, bit) in payload.iter().enumerate() {
            let Some((r, c)) = coords.by_ref().find(|&(r, c)| !self.is_reserved(r, c)) else {
                panic!("Encoding region exhausted after {i} of {} bits", payload.len());
            };
            self.set_data(r, c, Module::from(bit));
        }
    }

    fn set_data(&mut self, r: i16, c: i16, module: Module) {
        assert!(!self.is_reserved(r, c), "Data written to reserved module at {r} {c}");
        self.set(r, c, module);
    }

    pub fn apply_mask(&mut self, pattern: MaskPattern) {
        self.mask = Some(pattern);
        let mask_fn = pattern.mask_functions();
        let w = self.w as i16;
        for r in 0..w {
            for c in 0..w {
                if mask_fn(r, c) && !self.is_reserved(r, c) {
                    let m = self.get_mut(r, c);
                    *m = !*m;
                }
            }
        }
    }
}

#[cfg(test)]
mod encoding_region_tests {
    use super::{LayoutConfig, QR};
    use crate::common::bitstream::BitStream;
    use crate::common::iter::EncRegionIter;
    use crate::common::metadata::{ECLevel, Module, Version};

    fn ones(len: usize) -> BitStream {
        let mut bs = BitStream::new(len);
        bs.extend(&vec![0xff; len >> 3]);
        bs
    }

    fn dark_data_modules(qr: &QR) -> usize {
        let w = qr.width() as i16;
        (0..w)
            .flat_map(|r| (0..w).map(move |c| (r, c)))
            .filter(|&(r, c)| !qr.is_reserved(r, c) && qr.get(r, c).is_dark())
            .count()
    }

    #[test]
    fn test_payload_fills_version_1() {
        let mut qr = QR::new(LayoutConfig::new(Version::new(1), false), ECLevel::M);
        qr.draw_all_function_patterns();
        qr.draw_encoding_region(&ones(208));
        assert_eq!(dark_data_modules(&qr), 208);
        assert!(qr.to_debug_str().chars().all(|c| c != '.'));
    }

    #[test]
    fn test_remainder_bits_stay_light() {
        let mut qr = QR::new(LayoutConfig::new(Version::new(2), false), ECLevel::M);
        qr.draw_all_function_patterns();
        qr.draw_encoding_region(&ones(352));
        assert_eq!(dark_data_modules(&qr), 352);

        let tail = EncRegionIter::new(Version::new(2))
            .filter(|&(r, c)| !qr.is_reserved(r, c))
            .skip(352)
            .collect::<Vec<_>>();
        assert_eq!(tail.len(), 7);
        assert!(tail.iter().all(|&(r, c)| qr.get(r, c) == Module::Light));
    }

    #[test]
    fn test_logo_clearance_fills_around_box() {
        let layout = LayoutConfig::new(Version::new(2), true);
        let mut bs = BitStream::new(334);
        bs.extend(&[0xff; 41]);
        bs.push_bits(0b111111u8, 6);
        assert_eq!(bs.len(), layout.data_module_count());

        let mut qr = QR::new(layout, ECLevel::M);
        qr.draw_all_function_patterns();
        qr.draw_encoding_region(&bs);
        assert_eq!(dark_data_modules(&qr), 334);
        for r in 10..=14 {
            for c in 10..=14 {
                assert_eq!(qr.get(r, c), Module::Light);
            }
        }
    }

    #[test]
    #[should_panic(expected = "Encoding region exhausted after 334 of 352 bits")]
    fn test_logo_clearance_overflow_panics() {
        let mut qr = QR::new(LayoutConfig::new(Version::new(2), true), ECLevel::M);
        qr.draw_all_function_patterns();
        qr.draw_encoding_region(&ones(352));
    }

    #[test]
    fn test_every_codeword_bit_lands() {
        for ver in [Version::new(1), Version::new(2)] {
            let layout = LayoutConfig::new(ver, false);
            let bits = ver.total_codewords() << 3;
            assert!(bits <= layout.data_module_count());

            let mut qr = QR::new(layout, ECLevel::L);
            qr.draw_encoding_region(&ones(bits));
            assert_eq!(dark_data_modules(&qr), bits);
        }
    }

    #[test]
    fn test_placement_order() {
        let mut qr = QR::new(LayoutConfig::new(Version::new(1), false), ECLevel::M);
        let mut bs = BitStream::new(8);
        bs.push_bits(0b10100000u8, 8);
        qr.draw_encoding_region(&bs);
        assert_eq!(qr.get(20, 20), Module::Dark);
        assert_eq!(qr.get(20, 19), Module::Light);
        assert_eq!(qr.get(19, 20), Module::Dark);
        assert_eq!(qr.count_dark_modules(), 2);
    }
}

// Render
//------------------------------------------------------------------------------

impl QR {
    pub fn render(&self, module_sz: u32) -> GrayImage {
        let qz_sz = QUIET_ZONE * module_sz;
        let qr_sz = self.w as u32 * module_sz;
        let total_sz = qz_sz + qr_sz + qz_sz;

        let mut canvas = GrayImage::new(total_sz, total_sz);
        for i in 0..total_sz {
            for j in 0..total_sz {
                if i < qz_sz || i >= qz_sz + qr_sz || j < qz_sz || j >= qz_sz + qr_sz {
                    canvas.put_pixel(j, i, Luma([255]));
                    continue;
                }
                let r = (i - qz_sz) / module_sz;
                let c = (j - qz_sz) / module_sz;

                let pixel = self.get(r as i16, c as i16).select(Luma([255]), Luma([0]));
                canvas.put_pixel(j, i, pixel);
            }
        }

        canvas
    }

    // Light modules are drawn as blocks, for dark terminal backgrounds
    pub fn to_str(&self, module_sz: usize) -> String {
        let qz_sz = QUIET_ZONE as usize * module_sz;
        let qr_sz = self.w * module_sz;
        let total_sz = qz_sz + qr_sz + qz_sz;

        let mut canvas = String::new();
        for i in 0..total_sz {
            for j in 0..total_sz {
                if i < qz_sz || i >= qz_sz + qr_sz || j < qz_sz || j >= qz_sz + qr_sz {
                    canvas.push('█');
                    continue;
                }
                let r = ((i - qz_sz) / module_sz) as i16;
                let c = ((j - qz_sz) / module_sz) as i16;
                canvas.push(self.get(r, c).select('█', ' '));
            }
            canvas.push('\n');
        }

        canvas
    }
}


// Global constants
//------------------------------------------------------------------------------

static QUIET_ZONE: u32 = 4;
