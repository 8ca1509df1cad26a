#![forbid(unsafe_code)]
//! QR code encoding functionality.
//!
//! This module provides the core logic for encoding alphanumeric text into QR
//! codes conforming to the QR Code Model 2 specification: bitstream assembly,
//! Reed-Solomon error correction over GF(256), function pattern layout,
//! codeword placement, and penalty-driven mask selection. It covers versions
//! 1 to 40 and all four error correction levels.

use core::cmp::min;
use core::fmt;

/*---- Error types ----*/

/// The error type returned by the encoding functions in this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A caller-supplied argument violated a documented precondition, such as
    /// text containing characters outside the alphanumeric alphabet, an
    /// inverted version range, or a codeword slice of the wrong length.
    InvalidArgument(&'static str),
    /// The data does not fit in any version within the requested range.
    ///
    /// Unlike [`Error::InvalidArgument`] this is not a programming mistake;
    /// ways to handle it include shortening the input text, raising the
    /// maximum version, or lowering the error correction level.
    DataTooLong(DataTooLong),
}

/// Detail for [`Error::DataTooLong`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataTooLong {
    /// A segment's character count does not fit its count field at any
    /// version in the requested range.
    SegmentTooLong,
    /// The data length in bits exceeds the capacity of the largest version
    /// tried. Carries the required and available bit counts.
    DataOverCapacity(usize, usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Self::DataTooLong(detail) => write!(f, "{}", detail),
        }
    }
}

impl fmt::Display for DataTooLong {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::SegmentTooLong => write!(f, "Segment too long"),
            Self::DataOverCapacity(datalen, maxcapacity) =>
                write!(f, "Data length = {} bits, Max capacity = {} bits", datalen, maxcapacity),
        }
    }
}

impl std::error::Error for Error {}

/*---- QrCode ----*/

/// A QR Code symbol, representing a square grid of dark and light modules.
///
/// Instances are immutable after creation. The grid is queried through
/// [`get_module`](QrCode::get_module), which treats every coordinate outside
/// the symbol as a light module, so renderers can scan a bordered area
/// without bounds checks of their own.
///
/// # Creation
///
/// - High-level: [`QrCode::encode_text`].
/// - Mid-level: [`QrSegment::make_segments`] followed by
///   [`QrCode::encode_segments`].
/// - Low-level: [`QrCode::with_codewords`] for callers that produce their own
///   data codewords.
///
/// # Example
///
/// ```rust
/// use qrsym::qrcode::{QrCode, QrCodeEcc};
///
/// let qr = QrCode::encode_text("HELLO WORLD", QrCodeEcc::Low).unwrap();
/// assert_eq!(qr.size(), 21);
/// assert_eq!(qr.version().value(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrCode {
    /// The version number, between 1 and 40.
    version: Version,

    /// The width and height of the symbol in modules. Equal to version * 4 + 17.
    size: i32,

    /// The error correction level used in the symbol.
    errorcorrectionlevel: QrCodeEcc,

    /// The mask pattern applied to the symbol, always resolved to 0 to 7.
    mask: Mask,

    /// The module colors (false = light, true = dark), row-major.
    modules: Vec<bool>,

    /// Which modules belong to function patterns and must not be masked.
    isfunction: Vec<bool>,
}

impl QrCode {
    /// Encodes a text string into a QR code at the given error correction
    /// level.
    ///
    /// The smallest version that fits the data is chosen automatically, the
    /// error correction level is boosted if that costs nothing, and the mask
    /// is selected by penalty scoring. Only alphanumeric text (digits,
    /// uppercase letters, and ` $%*+-./:`) can be encoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the text contains unencodable
    /// characters, or [`Error::DataTooLong`] if it does not fit in version 40.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrsym::qrcode::{QrCode, QrCodeEcc};
    ///
    /// let qr = QrCode::encode_text("HTTPS://EXAMPLE.COM", QrCodeEcc::Medium).unwrap();
    /// assert!(qr.get_module(0, 0));
    /// ```
    pub fn encode_text(text: &str, ecl: QrCodeEcc) -> Result<Self, Error> {
        let segs = QrSegment::make_segments(text)?;
        Self::encode_segments(&segs, ecl, Version::MIN, Version::MAX, None, true)
    }

    /// Encodes the given segments into a QR code.
    ///
    /// The smallest version within `[minversion, maxversion]` that can hold
    /// the data is selected. If `boostecl` is `true`, the error correction
    /// level may be raised above `ecl` as long as the chosen version still
    /// fits; the version is never changed by boosting. The `mask` can be
    /// `None` for automatic selection (slower) or a fixed pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `minversion > maxversion`, or
    /// [`Error::DataTooLong`] when no version in the range has enough
    /// capacity.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrsym::qrcode::{QrCode, QrCodeEcc, QrSegment, Version};
    ///
    /// let segs = QrSegment::make_segments("HELLO WORLD").unwrap();
    /// let qr = QrCode::encode_segments(&segs, QrCodeEcc::Quartile,
    ///     Version::MIN, Version::MAX, None, false).unwrap();
    /// assert_eq!(qr.error_correction_level(), QrCodeEcc::Quartile);
    /// ```
    pub fn encode_segments(
        segs: &[QrSegment],
        mut ecl: QrCodeEcc,
        minversion: Version,
        maxversion: Version,
        mask: Option<Mask>,
        boostecl: bool,
    ) -> Result<Self, Error> {
        if minversion > maxversion {
            return Err(Error::InvalidArgument("minversion is greater than maxversion"));
        }

        // Find the minimal version number to use
        let mut version = minversion;
        let datausedbits: usize = loop {
            // Number of data bits available at this version
            let datacapacitybits = Self::get_num_data_codewords(version, ecl) * 8;
            let dataused = QrSegment::get_total_bits(segs, version);
            match dataused {
                Some(n) if n <= datacapacitybits => break n,
                _ if version >= maxversion => {
                    return Err(match dataused {
                        None => Error::DataTooLong(DataTooLong::SegmentTooLong),
                        Some(n) =>
                            Error::DataTooLong(DataTooLong::DataOverCapacity(n, datacapacitybits)),
                    });
                }
                _ => version = Version::new(version.value() + 1),
            }
        };

        // Increase the error correction level while the data still fits
        for &newecl in &[QrCodeEcc::Medium, QrCodeEcc::Quartile, QrCodeEcc::High] {
            if boostecl && datausedbits <= Self::get_num_data_codewords(version, newecl) * 8 {
                ecl = newecl;
            }
        }

        let datacodewords = Self::assemble_codewords(segs, version, ecl)?;
        Self::with_codewords(version, ecl, &datacodewords, mask)
    }

    /// Creates a new QR Code with the given version number, error correction
    /// level, data codeword bytes, and mask.
    ///
    /// This is a low-level API that most users should not use directly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `datacodewords` does not have
    /// exactly the data codeword length for the version and level.
    pub fn with_codewords(
        version: Version,
        ecl: QrCodeEcc,
        datacodewords: &[u8],
        mask: Option<Mask>,
    ) -> Result<Self, Error> {
        if datacodewords.len() != Self::get_num_data_codewords(version, ecl) {
            return Err(Error::InvalidArgument(
                "data codeword length does not match the version and ECC level",
            ));
        }
        let size = i32::from(version.value()) * 4 + 17;
        let numcells = (size * size) as usize;
        let mut result = Self {
            version,
            size,
            errorcorrectionlevel: ecl,
            mask: Mask::new(0),
            modules: vec![false; numcells],
            isfunction: vec![false; numcells],
        };
        result.draw_function_patterns();
        let allcodewords = result.add_ecc_and_interleave(datacodewords)?;
        result.draw_codewords(&allcodewords);
        result.mask = result.handle_mask(mask);
        Ok(result)
    }

    /// Returns this QR Code's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this QR Code's size, in the range [21, 177].
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Returns this QR Code's error correction level.
    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.errorcorrectionlevel
    }

    /// Returns this QR Code's mask, in the range [0, 7].
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules.
    /// Coordinates outside the symbol's bounds return `false`, as if the
    /// symbol sat on an infinite light background.
    ///
    /// # Arguments
    ///
    /// * `x` - X-coordinate (0 is left).
    /// * `y` - Y-coordinate (0 is top).
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size;
        range.contains(&x) && range.contains(&y) && self.module(x, y)
    }

    /*---- Bitstream assembly ----*/

    // Concatenates the segment headers and payloads, then appends the
    // terminator, byte-alignment bits, and alternating pad bytes until the
    // data capacity of the given version and level is reached exactly.
    fn assemble_codewords(
        segs: &[QrSegment],
        version: Version,
        ecl: QrCodeEcc,
    ) -> Result<Vec<u8>, Error> {
        let datacapacitybits = Self::get_num_data_codewords(version, ecl) * 8;
        let mut bb = BitBuffer::new();
        for seg in segs {
            bb.append_bits(seg.mode.mode_bits(), 4)?;
            bb.append_bits(seg.numchars as u32, seg.mode.num_char_count_bits(version))?;
            bb.append_segment(seg);
        }
        debug_assert!(bb.len() <= datacapacitybits);

        // Add the terminator and pad up to a byte boundary, if applicable
        let numzerobits = min(4, datacapacitybits - bb.len());
        bb.append_bits(0, numzerobits as u8)?;
        bb.append_bits(0, (bb.len().wrapping_neg() & 7) as u8)?;
        debug_assert_eq!(bb.len() % 8, 0);

        // Pad with alternating bytes until the data capacity is reached
        for &padbyte in [0xec, 0x11].iter().cycle() {
            if bb.len() >= datacapacitybits {
                break;
            }
            bb.append_bits(padbyte, 8)?;
        }
        debug_assert_eq!(bb.len(), datacapacitybits);
        Ok(bb.to_bytes())
    }

    /*---- Error correction coding ----*/

    // Splits the data codewords into blocks, appends Reed-Solomon ECC to each
    // block, and interleaves (not concatenates) the bytes from every block
    // into a single sequence of raw codewords.
    fn add_ecc_and_interleave(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let ver = self.version;
        let ecl = self.errorcorrectionlevel;
        debug_assert_eq!(data.len(), Self::get_num_data_codewords(ver, ecl));

        let numblocks = Self::table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl);
        let blockecclen = Self::table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl);
        let rawcodewords = Self::get_num_raw_data_modules(ver) / 8;
        let numshortblocks = numblocks - rawcodewords % numblocks;
        let shortblocklen = rawcodewords / numblocks;

        let rs = ReedSolomonGenerator::new(blockecclen)?;
        let mut blocks: Vec<Vec<u8>> = Vec::with_capacity(numblocks);
        let mut k: usize = 0;
        for i in 0..numblocks {
            let datlen = shortblocklen - blockecclen + usize::from(i >= numshortblocks);
            let dat = &data[k..k + datlen];
            k += datlen;
            // Long blocks are one byte longer; short blocks leave the extra
            // position as padding that the interleaver skips
            let mut block = dat.to_vec();
            block.resize(shortblocklen + 1, 0);
            let ecc = rs.remainder(dat);
            block[shortblocklen + 1 - blockecclen..].copy_from_slice(&ecc);
            blocks.push(block);
        }
        debug_assert_eq!(k, data.len());

        let mut result: Vec<u8> = Vec::with_capacity(rawcodewords);
        for i in 0..blocks[0].len() {
            for (j, block) in blocks.iter().enumerate() {
                if i != shortblocklen - blockecclen || j >= numshortblocks {
                    result.push(block[i]);
                }
            }
        }
        debug_assert_eq!(result.len(), rawcodewords);
        Ok(result)
    }

    /*---- Drawing function patterns ----*/

    // Draws function patterns onto an all-light grid: timing patterns, the
    // three finder patterns with separators, alignment patterns, a
    // placeholder for the format bits, and the version information.
    fn draw_function_patterns(&mut self) {
        let size = self.size;

        // Horizontal and vertical timing patterns (the finders overwrite the ends)
        for i in 0..size {
            self.set_function_module(6, i, i % 2 == 0);
            self.set_function_module(i, 6, i % 2 == 0);
        }

        // Finder patterns in all corners except the bottom right
        self.draw_finder_pattern(3, 3);
        self.draw_finder_pattern(size - 4, 3);
        self.draw_finder_pattern(3, size - 4);

        // Alignment patterns, skipping the three positions under finders
        let alignpatpos = self.get_alignment_pattern_positions();
        let numalign = alignpatpos.len();
        for i in 0..numalign {
            for j in 0..numalign {
                if (i == 0 && j == 0)
                    || (i == 0 && j == numalign - 1)
                    || (i == numalign - 1 && j == 0)
                {
                    continue;
                }
                self.draw_alignment_pattern(alignpatpos[i], alignpatpos[j]);
            }
        }

        // Reserve the format info area with a placeholder; the real bits are
        // redrawn once the mask is resolved
        self.draw_format_bits(Mask::new(0));
        self.draw_version();
    }

    // Draws the 15 format bits (error correction level and mask) with their
    // own BCH code, in both of the standard redundant placements.
    fn draw_format_bits(&mut self, mask: Mask) {
        let data = u32::from((self.errorcorrectionlevel.format_bits() << 3) | mask.value());
        let mut rem = data;
        for _ in 0..10 {
            rem = (rem << 1) ^ ((rem >> 9) * 0x537);
        }
        let bits = ((data << 10) | rem) ^ 0x5412;
        debug_assert_eq!(bits >> 15, 0);

        // First copy, around the top left finder
        for i in 0..6 {
            self.set_function_module(8, i, get_bit(bits, i));
        }
        self.set_function_module(8, 7, get_bit(bits, 6));
        self.set_function_module(8, 8, get_bit(bits, 7));
        self.set_function_module(7, 8, get_bit(bits, 8));
        for i in 9..15 {
            self.set_function_module(14 - i, 8, get_bit(bits, i));
        }

        // Second copy, split between the top right and bottom left strips
        let size = self.size;
        for i in 0..8 {
            self.set_function_module(size - 1 - i, 8, get_bit(bits, i));
        }
        for i in 8..15 {
            self.set_function_module(8, size - 15 + i, get_bit(bits, i));
        }
        self.set_function_module(8, size - 8, true); // Always dark
    }

    // Draws two copies of the version bits with their own BCH code, for
    // versions 7 and above only.
    fn draw_version(&mut self) {
        let ver = u32::from(self.version.value());
        if ver < 7 {
            return;
        }
        let mut rem = ver;
        for _ in 0..12 {
            rem = (rem << 1) ^ ((rem >> 11) * 0x1f25);
        }
        let bits = (ver << 12) | rem;
        debug_assert_eq!(bits >> 18, 0);

        // Two 6x3 blocks, mirrored across the main diagonal
        for i in 0..18 {
            let bit = get_bit(bits, i);
            let a = self.size - 11 + i % 3;
            let b = i / 3;
            self.set_function_module(a, b, bit);
            self.set_function_module(b, a, bit);
        }
    }

    // Draws a 9x9 finder pattern including the separator ring, centered at
    // (x, y), clipping at the symbol edges.
    fn draw_finder_pattern(&mut self, x: i32, y: i32) {
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let dist: i32 = dx.abs().max(dy.abs());
                let (xx, yy) = (x + dx, y + dy);
                if 0 <= xx && xx < self.size && 0 <= yy && yy < self.size {
                    self.set_function_module(xx, yy, dist != 2 && dist != 4);
                }
            }
        }
    }

    // Draws a 5x5 alignment pattern centered at (x, y). Never clips.
    fn draw_alignment_pattern(&mut self, x: i32, y: i32) {
        for dy in -2..=2 {
            for dx in -2..=2 {
                self.set_function_module(x + dx, y + dy, dx.abs().max(dy.abs()) != 1);
            }
        }
    }

    /*---- Drawing data modules and masking ----*/

    // Draws the raw codeword bits into all non-function modules using the
    // zig-zag scan over column pairs, right to left, skipping the vertical
    // timing column. The final bits of the symbol stay light (remainder bits).
    fn draw_codewords(&mut self, data: &[u8]) {
        debug_assert_eq!(data.len(), Self::get_num_raw_data_modules(self.version) / 8);
        let size = self.size;
        let mut i: usize = 0; // Bit index into the data
        let mut right = size - 1; // Right column of the current column pair
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            for vert in 0..size {
                for j in 0..2 {
                    let x = right - j;
                    let upward = ((right + 1) & 2) == 0;
                    let y = if upward { size - 1 - vert } else { vert };
                    if !self.is_function(x, y) && i < data.len() * 8 {
                        let bit = (data[i >> 3] >> (7 - (i & 7))) & 1 != 0;
                        self.set_module(x, y, bit);
                        i += 1;
                    }
                }
            }
            right -= 2;
        }
        debug_assert_eq!(i, data.len() * 8);
    }

    // XORs the mask pattern into all non-function modules. Calling this with
    // the same mask twice restores the previous state.
    fn apply_mask(&mut self, mask: Mask) {
        for y in 0..self.size {
            for x in 0..self.size {
                let invert = match mask.value() {
                    0 => (x + y) % 2 == 0,
                    1 => y % 2 == 0,
                    2 => x % 3 == 0,
                    3 => (x + y) % 3 == 0,
                    4 => (x / 3 + y / 2) % 2 == 0,
                    5 => (x * y) % 2 + (x * y) % 3 == 0,
                    6 => ((x * y) % 2 + (x * y) % 3) % 2 == 0,
                    7 => ((x + y) % 2 + (x * y) % 3) % 2 == 0,
                    _ => unreachable!(),
                };
                let idx = (y * self.size + x) as usize;
                self.modules[idx] ^= invert & !self.isfunction[idx];
            }
        }
    }

    // Resolves the requested mask (None means automatic selection over all 8
    // patterns, lowest penalty wins and ties keep the lowest index), then
    // draws the final format bits and applies the mask permanently. The
    // symbol must be in an unmasked state when this is called.
    fn handle_mask(&mut self, mask: Option<Mask>) -> Mask {
        let mask: Mask = match mask {
            Some(m) => m,
            None => {
                let mut minpenalty = i32::MAX;
                let mut best = Mask::new(0);
                for i in 0..8u8 {
                    let m = Mask::new(i);
                    self.draw_format_bits(m);
                    self.apply_mask(m);
                    let penalty = self.get_penalty_score();
                    if penalty < minpenalty {
                        best = m;
                        minpenalty = penalty;
                    }
                    self.apply_mask(m); // Undoes the mask due to XOR
                }
                best
            }
        };
        self.draw_format_bits(mask); // Overwrite the placeholder format bits
        self.apply_mask(mask);
        mask
    }

    // Computes the penalty score of the current module state, for the
    // automatic mask choice. Lower is better.
    fn get_penalty_score(&self) -> i32 {
        let mut result: i32 = 0;
        let size = self.size;

        // Adjacent modules in a row with the same color
        for y in 0..size {
            let mut runcolor = false;
            let mut runx: i32 = 0;
            for x in 0..size {
                if x == 0 || self.module(x, y) != runcolor {
                    runcolor = self.module(x, y);
                    runx = 1;
                } else {
                    runx += 1;
                    if runx == 5 {
                        result += PENALTY_N1;
                    } else if runx > 5 {
                        result += 1;
                    }
                }
            }
        }
        // Adjacent modules in a column with the same color
        for x in 0..size {
            let mut runcolor = false;
            let mut runy: i32 = 0;
            for y in 0..size {
                if y == 0 || self.module(x, y) != runcolor {
                    runcolor = self.module(x, y);
                    runy = 1;
                } else {
                    runy += 1;
                    if runy == 5 {
                        result += PENALTY_N1;
                    } else if runy > 5 {
                        result += 1;
                    }
                }
            }
        }

        // 2x2 blocks of modules with the same color
        for y in 0..size - 1 {
            for x in 0..size - 1 {
                let color = self.module(x, y);
                if color == self.module(x + 1, y)
                    && color == self.module(x, y + 1)
                    && color == self.module(x + 1, y + 1)
                {
                    result += PENALTY_N2;
                }
            }
        }

        // Finder-like patterns in rows, as a sliding 11-bit window
        for y in 0..size {
            let mut bits: u32 = 0;
            for x in 0..size {
                bits = ((bits << 1) & 0x7ff) | u32::from(self.module(x, y));
                if x >= 10 && (bits == 0x05d || bits == 0x5d0) {
                    result += PENALTY_N3;
                }
            }
        }
        // Finder-like patterns in columns
        for x in 0..size {
            let mut bits: u32 = 0;
            for y in 0..size {
                bits = ((bits << 1) & 0x7ff) | u32::from(self.module(x, y));
                if y >= 10 && (bits == 0x05d || bits == 0x5d0) {
                    result += PENALTY_N3;
                }
            }
        }

        // Balance of dark and light modules: penalize each 5% step that the
        // dark ratio deviates from the 45% to 55% band
        let dark = self.modules.iter().filter(|&&color| color).count() as i32;
        let total = size * size;
        let mut k: i32 = 0;
        while dark * 20 < (9 - k) * total || dark * 20 > (11 + k) * total {
            result += PENALTY_N4;
            k += 1;
        }
        result
    }

    /*---- Grid access ----*/

    fn module(&self, x: i32, y: i32) -> bool {
        self.modules[(y * self.size + x) as usize]
    }

    fn is_function(&self, x: i32, y: i32) -> bool {
        self.isfunction[(y * self.size + x) as usize]
    }

    fn set_module(&mut self, x: i32, y: i32, isdark: bool) {
        self.modules[(y * self.size + x) as usize] = isdark;
    }

    // Sets the module color and marks it as a function module, excluding it
    // from masking and codeword placement.
    fn set_function_module(&mut self, x: i32, y: i32, isdark: bool) {
        let idx = (y * self.size + x) as usize;
        self.modules[idx] = isdark;
        self.isfunction[idx] = true;
    }

    /*---- Static tables and capacity arithmetic ----*/

    // Returns the center positions of the alignment patterns in ascending
    // order, used for both axes.
    fn get_alignment_pattern_positions(&self) -> Vec<i32> {
        let ver = i32::from(self.version.value());
        if ver == 1 {
            return Vec::new();
        }
        let numalign = ver / 7 + 2;
        let step: i32 = if ver == 32 {
            26
        } else {
            (ver * 4 + numalign * 2 + 1) / (numalign * 2 - 2) * 2
        };
        let mut result = vec![0i32; numalign as usize];
        result[0] = 6;
        let mut pos = self.size - 7;
        for i in (1..result.len()).rev() {
            result[i] = pos;
            pos -= step;
        }
        result
    }

    // Returns the number of data bits that can be stored in a symbol of the
    // given version, after all function modules are excluded. Includes
    // remainder bits, so the result may not be a multiple of 8.
    fn get_num_raw_data_modules(ver: Version) -> usize {
        let ver = usize::from(ver.value());
        let size = ver * 4 + 17;
        let mut result = size * size; // Whole grid
        result -= 64 * 3; // Finder patterns with separators
        result -= 15 * 2 + 1; // Format info and dark module
        result -= (size - 16) * 2; // Timing patterns
        if ver >= 2 {
            let numalign = ver / 7 + 2;
            result -= (numalign - 1) * (numalign - 1) * 25; // Alignment patterns off the timing lines
            result -= (numalign - 2) * 2 * 20; // Alignment patterns crossing a timing line
            if ver >= 7 {
                result -= 18 * 2; // Version info
            }
        }
        result
    }

    // Returns the number of 8-bit data codewords (excluding error correction)
    // in a symbol of the given version and error correction level.
    fn get_num_data_codewords(ver: Version, ecl: QrCodeEcc) -> usize {
        Self::get_num_raw_data_modules(ver) / 8
            - Self::table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl)
                * Self::table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl)
    }

    fn table_get(table: &'static [[i8; 41]; 4], ver: Version, ecl: QrCodeEcc) -> usize {
        table[ecl.ordinal()][usize::from(ver.value())] as usize
    }
}

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

/*---- Reed-Solomon error correction ----*/

// Computes the Reed-Solomon error correction codewords for a sequence of
// data codewords at a given degree. Immutable, keyed solely by the degree;
// one instance serves every block of a symbol because the divisor polynomial
// never changes between blocks.
struct ReedSolomonGenerator {
    // Coefficients of the divisor polynomial, from highest to lowest power,
    // excluding the leading term which is always 1.
    coefficients: Vec<u8>,
}

impl ReedSolomonGenerator {
    fn new(degree: usize) -> Result<Self, Error> {
        if !(1..=255).contains(&degree) {
            return Err(Error::InvalidArgument("degree out of range"));
        }
        // Start with the monomial x^0
        let mut coefficients = vec![0u8; degree];
        coefficients[degree - 1] = 1;

        // Compute the product polynomial (x - r^0) * (x - r^1) * ... *
        // (x - r^{degree-1}), dropping the always-1 highest term
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                coefficients[j] = Self::multiply(coefficients[j], root);
                if j + 1 < degree {
                    coefficients[j] ^= coefficients[j + 1];
                }
            }
            root = Self::multiply(root, 0x02);
        }
        Ok(Self { coefficients })
    }

    // Returns the remainder of data(x) * x^degree divided by the divisor
    // polynomial, computed in a shift register. Always exactly degree bytes.
    fn remainder(&self, data: &[u8]) -> Vec<u8> {
        let mut result = vec![0u8; self.coefficients.len()];
        for &b in data {
            let factor = b ^ result[0];
            result.copy_within(1.., 0);
            let last = result.len() - 1;
            result[last] = 0;
            for (x, &coef) in result.iter_mut().zip(self.coefficients.iter()) {
                *x ^= Self::multiply(coef, factor);
            }
        }
        result
    }

    // Product of two field elements modulo GF(2^8 / 0x11D).
    fn multiply(x: u8, y: u8) -> u8 {
        let mut z: u8 = 0;
        for i in (0..8).rev() {
            z = (z << 1) ^ ((z >> 7) * 0x1d);
            z ^= ((y >> i) & 1) * x;
        }
        z
    }
}

/*---- QrSegment ----*/

/// A segment of character data encoded for inclusion in a QR code symbol.
///
/// Segments are immutable: a factory packs the source characters into the
/// segment's bit payload once, and the payload is copied verbatim into the
/// symbol's bitstream later. Only the alphanumeric mode is currently
/// supported; the mode enum is the extension point for further modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrSegment {
    mode: QrSegmentMode,
    numchars: usize,
    data: Vec<u8>,
    bitlength: usize,
}

impl QrSegment {
    /// Creates a segment for alphanumeric text.
    ///
    /// Allowed characters: 0-9, A-Z (uppercase only), space, `$`, `%`, `*`,
    /// `+`, `-`, `.`, `/`, `:`. Characters are packed in pairs of 11 bits
    /// (`a * 45 + b`), with a trailing odd character packed into 6 bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the text contains a character
    /// outside the alphanumeric alphabet.
    pub fn make_alphanumeric(text: &str) -> Result<Self, Error> {
        let mut values: Vec<u32> = Vec::with_capacity(text.len());
        for c in text.chars() {
            match ALPHANUMERIC_CHARSET.find(c) {
                Some(i) => values.push(i as u32),
                None => {
                    return Err(Error::InvalidArgument(
                        "text contains characters unencodable in alphanumeric mode",
                    ));
                }
            }
        }
        let mut bb = BitBuffer::new();
        for pair in values.chunks(2) {
            match *pair {
                [a, b] => bb.append_bits(a * 45 + b, 11)?,
                [a] => bb.append_bits(a, 6)?,
                _ => unreachable!(),
            }
        }
        Self::new(QrSegmentMode::Alphanumeric, values.len(), bb.to_bytes(), bb.len())
    }

    /// Returns the ordered list of segments representing the given text.
    ///
    /// Empty input yields an empty list. Input matching the alphanumeric
    /// alphabet yields a single alphanumeric segment. No fallback mode
    /// exists, so any other input is rejected rather than silently dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for text with characters outside
    /// the alphanumeric alphabet.
    pub fn make_segments(text: &str) -> Result<Vec<Self>, Error> {
        if text.is_empty() {
            Ok(Vec::new())
        } else if Self::is_alphanumeric(text) {
            Ok(vec![Self::make_alphanumeric(text)?])
        } else {
            Err(Error::InvalidArgument(
                "text contains characters unencodable in alphanumeric mode",
            ))
        }
    }

    /// Creates a segment from its parts. The payload is trimmed to the exact
    /// byte length implied by `bitlength`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `bitlength` exceeds the number
    /// of bits in `data`.
    pub fn new(
        mode: QrSegmentMode,
        numchars: usize,
        mut data: Vec<u8>,
        bitlength: usize,
    ) -> Result<Self, Error> {
        if bitlength > data.len().saturating_mul(8) {
            return Err(Error::InvalidArgument("bit length exceeds the payload length"));
        }
        data.truncate((bitlength + 7) / 8);
        Ok(Self { mode, numchars, data, bitlength })
    }

    /// Returns the encoding mode of this segment.
    pub fn mode(&self) -> QrSegmentMode {
        self.mode
    }

    /// Returns the number of source characters in this segment, which is
    /// always zero or positive.
    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    /// Returns the length of this segment's payload, in bits.
    pub fn bit_length(&self) -> usize {
        self.bitlength
    }

    /// Returns the payload bytes, MSB-first, with zero bits past
    /// [`bit_length`](Self::bit_length) in the final byte.
    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    /// Tests whether the string can be encoded as an alphanumeric segment.
    pub fn is_alphanumeric(text: &str) -> bool {
        text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
    }

    // Returns the number of bits needed to encode the segments at the given
    // version: per segment, 4 mode bits, the version-dependent count field,
    // and the payload. None is the "cannot fit" sentinel, returned when a
    // character count overflows its count field or the total overflows the
    // 31-bit accumulator; the version search treats it as "try the next
    // version", not as an error.
    fn get_total_bits(segs: &[Self], version: Version) -> Option<usize> {
        let mut result: usize = 0;
        for seg in segs {
            let ccbits = seg.mode.num_char_count_bits(version);
            if seg.numchars >= 1usize << ccbits {
                return None;
            }
            result = result.checked_add(4 + usize::from(ccbits))?;
            result = result.checked_add(seg.bitlength)?;
            if result > i32::MAX as usize {
                return None;
            }
        }
        Some(result)
    }
}

/// The alphanumeric mode alphabet, in value order: character `c` encodes as
/// its index in this string.
static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// The encoding mode of a [`QrSegment`].
///
/// Only the alphanumeric mode is populated; adding a mode means adding a
/// variant here plus its mode indicator and count-field widths below.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QrSegmentMode {
    /// Digits, uppercase letters, and the nine symbols ` $%*+-./:`, packed
    /// at 5.5 bits per character.
    Alphanumeric,
}

impl QrSegmentMode {
    // The 4-bit mode indicator written before each segment.
    fn mode_bits(self) -> u32 {
        match self {
            Self::Alphanumeric => 0x2,
        }
    }

    // The bit width of the character count field for this mode at the given
    // version: one width per version band 1-9, 10-26, 27-40.
    fn num_char_count_bits(self, ver: Version) -> u8 {
        let widths: [u8; 3] = match self {
            Self::Alphanumeric => [9, 11, 13],
        };
        widths[usize::from((ver.value() + 7) / 17)]
    }
}

/*---- BitBuffer ----*/

/// An append-only sequence of bits, packed MSB-first into a growable byte
/// buffer.
///
/// Bits past the logical length in the final partial byte are always zero.
/// There is no removal and no random-access write; the buffer is filled by
/// the append operations and drained once via [`to_bytes`](Self::to_bytes).
pub struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    /// Creates an empty bit buffer.
    pub fn new() -> Self {
        Self { data: Vec::new(), length: 0 }
    }

    /// Returns the number of bits appended so far.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if no bits have been appended.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns a copy of the buffered bytes: exactly `ceil(len / 8)` bytes,
    /// with the final partial byte zero-padded.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data[..(self.length + 7) / 8].to_vec()
    }

    /// Appends the low `len` bits of `val`, most significant bit first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `len` exceeds 32 or if `val`
    /// has a set bit at position `len` or above.
    pub fn append_bits(&mut self, val: u32, len: u8) -> Result<(), Error> {
        if len > 32 || (len < 32 && (val >> len) != 0) {
            return Err(Error::InvalidArgument("value does not fit in the given bit width"));
        }
        let newlength = self.length + usize::from(len);
        self.data.resize((newlength + 7) / 8, 0);
        for i in (0..len).rev() {
            let bit = ((val >> i) & 1) as u8;
            self.data[self.length >> 3] |= bit << (7 - (self.length & 7));
            self.length += 1;
        }
        Ok(())
    }

    /// Appends the payload of the given segment: exactly
    /// [`bit_length`](QrSegment::bit_length) bits, copied verbatim.
    pub fn append_segment(&mut self, seg: &QrSegment) {
        let newlength = self.length + seg.bitlength;
        self.data.resize((newlength + 7) / 8, 0);
        for i in 0..seg.bitlength {
            let bit = (seg.data[i >> 3] >> (7 - (i & 7))) & 1;
            self.data[self.length >> 3] |= bit << (7 - (self.length & 7));
            self.length += 1;
        }
    }
}

impl Default for BitBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/*---- Small value types ----*/

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum QrCodeEcc {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl QrCodeEcc {
    // Row index into the capacity tables.
    fn ordinal(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::Quartile => 2,
            Self::High => 3,
        }
    }

    // The 2-bit value written into the format information.
    fn format_bits(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 0,
            Self::Quartile => 3,
            Self::High => 2,
        }
    }
}

/// A QR code version (1-40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40]. Use the `TryFrom`
    /// impl for fallible construction.
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.0 <= ver && ver <= Version::MAX.0,
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Version {
    type Error = Error;

    fn try_from(ver: u8) -> Result<Self, Error> {
        if (Version::MIN.0..=Version::MAX.0).contains(&ver) {
            Ok(Self(ver))
        } else {
            Err(Error::InvalidArgument("version number out of range"))
        }
    }
}

/// A mask pattern (0-7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Mask(u8);

impl Mask {
    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7]. Use the `TryFrom`
    /// impl for fallible construction.
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Mask {
    type Error = Error;

    fn try_from(mask: u8) -> Result<Self, Error> {
        if mask <= 7 {
            Ok(Self(mask))
        } else {
            Err(Error::InvalidArgument("mask value out of range"))
        }
    }
}

fn get_bit(x: u32, i: i32) -> bool {
    (x >> i) & 1 != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_bits_packs_msb_first() {
        let mut bb = BitBuffer::new();
        bb.append_bits(0b101, 3).unwrap();
        bb.append_bits(0, 2).unwrap();
        bb.append_bits(0x5a, 8).unwrap();
        assert_eq!(bb.len(), 13);
        // 101 00 01011010 -> 10100010 11010...
        assert_eq!(bb.to_bytes(), vec![0b1010_0010, 0b1101_0000]);
    }

    #[test]
    fn test_append_bits_rejects_oversized_value() {
        let mut bb = BitBuffer::new();
        let err = bb.append_bits(0b1000, 3).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(bb.len(), 0);
    }

    #[test]
    fn test_append_bits_width_bounds() {
        let mut bb = BitBuffer::new();
        assert!(bb.append_bits(0, 33).is_err());
        bb.append_bits(u32::MAX, 32).unwrap();
        assert_eq!(bb.len(), 32);
        bb.append_bits(0, 0).unwrap();
        assert_eq!(bb.len(), 32);
    }

    #[test]
    fn test_to_bytes_pads_final_byte_with_zeros() {
        let mut bb = BitBuffer::new();
        bb.append_bits(1, 1).unwrap();
        assert_eq!(bb.to_bytes(), vec![0x80]);
        assert!(!bb.is_empty());
    }

    #[test]
    fn test_append_segment_copies_exact_bit_count() {
        let seg = QrSegment::make_alphanumeric("AC-42").unwrap();
        let mut bb = BitBuffer::new();
        bb.append_bits(0b111, 3).unwrap();
        bb.append_segment(&seg);
        assert_eq!(bb.len(), 3 + seg.bit_length());
    }

    #[test]
    fn test_make_alphanumeric_pairs() {
        // A=10, C=12 -> 462; -=41, 4=4 -> 1849; trailing 2 -> 6 bits
        let seg = QrSegment::make_alphanumeric("AC-42").unwrap();
        assert_eq!(seg.mode(), QrSegmentMode::Alphanumeric);
        assert_eq!(seg.num_chars(), 5);
        assert_eq!(seg.bit_length(), 28);
        assert_eq!(seg.payload(), &[0x39, 0xdc, 0xe4, 0x20]);
    }

    #[test]
    fn test_make_alphanumeric_rejects_lowercase() {
        assert!(QrSegment::make_alphanumeric("abc").is_err());
        assert!(QrSegment::make_alphanumeric("HELLO,WORLD").is_err());
    }

    #[test]
    fn test_is_alphanumeric() {
        assert!(QrSegment::is_alphanumeric("HELLO WORLD"));
        assert!(QrSegment::is_alphanumeric("0123456789 $%*+-./:"));
        assert!(QrSegment::is_alphanumeric(""));
        assert!(!QrSegment::is_alphanumeric("Hello World"));
    }

    #[test]
    fn test_make_segments_policy() {
        assert_eq!(QrSegment::make_segments("").unwrap(), Vec::new());
        let segs = QrSegment::make_segments("HELLO WORLD").unwrap();
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].num_chars(), 11);
        assert!(matches!(
            QrSegment::make_segments("hello"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_segment_new_rejects_overlong_bitlength() {
        assert!(QrSegment::new(QrSegmentMode::Alphanumeric, 1, vec![0xff], 9).is_err());
        let seg = QrSegment::new(QrSegmentMode::Alphanumeric, 1, vec![0xff, 0x00], 6).unwrap();
        assert_eq!(seg.payload().len(), 1); // Trimmed to the exact byte length
    }

    #[test]
    fn test_get_total_bits_per_version_band() {
        // 11 chars: 5 pairs * 11 + 6 = 61 payload bits, plus 4 mode bits
        // and the 9/11/13-bit count field
        let segs = QrSegment::make_segments("HELLO WORLD").unwrap();
        assert_eq!(QrSegment::get_total_bits(&segs, Version::new(1)), Some(74));
        assert_eq!(QrSegment::get_total_bits(&segs, Version::new(9)), Some(74));
        assert_eq!(QrSegment::get_total_bits(&segs, Version::new(10)), Some(76));
        assert_eq!(QrSegment::get_total_bits(&segs, Version::new(26)), Some(76));
        assert_eq!(QrSegment::get_total_bits(&segs, Version::new(27)), Some(78));
        assert_eq!(QrSegment::get_total_bits(&segs, Version::new(40)), Some(78));
    }

    #[test]
    fn test_get_total_bits_count_field_overflow() {
        // 512 claimed chars do not fit the 9-bit count field of version 1
        let seg = QrSegment::new(QrSegmentMode::Alphanumeric, 512, Vec::new(), 0).unwrap();
        assert_eq!(QrSegment::get_total_bits(&[seg.clone()], Version::new(1)), None);
        assert!(QrSegment::get_total_bits(&[seg], Version::new(10)).is_some());
    }

    #[test]
    fn test_field_multiply_properties() {
        for x in 0..=255u8 {
            assert_eq!(ReedSolomonGenerator::multiply(x, 0), 0);
            assert_eq!(ReedSolomonGenerator::multiply(x, 1), x);
        }
        for &x in &[0u8, 1, 2, 3, 0x53, 0x8e, 0xb1, 0xff] {
            for &y in &[0u8, 1, 2, 7, 0x20, 0xca, 0xfe, 0xff] {
                assert_eq!(
                    ReedSolomonGenerator::multiply(x, y),
                    ReedSolomonGenerator::multiply(y, x)
                );
                for &z in &[0u8, 5, 0x80, 0xff] {
                    // Distributes over the field's addition (XOR)
                    assert_eq!(
                        ReedSolomonGenerator::multiply(x, y ^ z),
                        ReedSolomonGenerator::multiply(x, y)
                            ^ ReedSolomonGenerator::multiply(x, z)
                    );
                }
            }
        }
        // x^7 * x = x^8 = 0x1d in this field
        assert_eq!(ReedSolomonGenerator::multiply(0x80, 0x02), 0x1d);
    }

    #[test]
    fn test_rs_remainder_length_equals_degree() {
        for &degree in &[1usize, 7, 10, 30, 255] {
            let rs = ReedSolomonGenerator::new(degree).unwrap();
            assert_eq!(rs.remainder(&[]).len(), degree);
            assert_eq!(rs.remainder(&[42]).len(), degree);
            assert_eq!(rs.remainder(&vec![0x5a; 19]).len(), degree);
        }
    }

    #[test]
    fn test_rs_degree_bounds() {
        assert!(ReedSolomonGenerator::new(0).is_err());
        assert!(ReedSolomonGenerator::new(256).is_err());
        assert!(ReedSolomonGenerator::new(1).is_ok());
        assert!(ReedSolomonGenerator::new(255).is_ok());
    }

    #[test]
    fn test_rs_remainder_of_zero_data_is_zero() {
        let rs = ReedSolomonGenerator::new(10).unwrap();
        assert_eq!(rs.remainder(&[0; 16]), vec![0u8; 10]);
    }

    #[test]
    fn test_num_data_codewords_version1() {
        assert_eq!(QrCode::get_num_data_codewords(Version::new(1), QrCodeEcc::Low), 19);
        assert_eq!(QrCode::get_num_data_codewords(Version::new(1), QrCodeEcc::Medium), 16);
        assert_eq!(QrCode::get_num_data_codewords(Version::new(1), QrCodeEcc::Quartile), 13);
        assert_eq!(QrCode::get_num_data_codewords(Version::new(1), QrCodeEcc::High), 9);
    }

    #[test]
    fn test_assemble_codewords_golden_vector() {
        // Mode 0010, count 000001011, pairs, terminator, alignment, then
        // alternating pad bytes up to the 19-codeword capacity of v1/Low
        let segs = QrSegment::make_segments("HELLO WORLD").unwrap();
        let codewords =
            QrCode::assemble_codewords(&segs, Version::new(1), QrCodeEcc::Low).unwrap();
        assert_eq!(
            codewords,
            vec![
                0x20, 0x5b, 0x0b, 0x78, 0xd1, 0x72, 0xdc, 0x4d, 0x43, 0x40, 0xec, 0x11, 0xec,
                0x11, 0xec, 0x11, 0xec, 0x11, 0xec,
            ]
        );
    }

    #[test]
    fn test_assemble_codewords_always_fills_capacity() {
        for &(text, ver, ecl) in &[
            ("", 1u8, QrCodeEcc::Low),
            ("HELLO WORLD", 1, QrCodeEcc::Low),
            ("HELLO WORLD", 5, QrCodeEcc::High),
            ("PI*314159265358979", 10, QrCodeEcc::Quartile),
        ] {
            let segs = QrSegment::make_segments(text).unwrap();
            let version = Version::new(ver);
            let codewords = QrCode::assemble_codewords(&segs, version, ecl).unwrap();
            assert_eq!(codewords.len(), QrCode::get_num_data_codewords(version, ecl));
        }
    }

    #[test]
    fn test_hello_world_chooses_version1() {
        let segs = QrSegment::make_segments("HELLO WORLD").unwrap();
        let qr = QrCode::encode_segments(
            &segs, QrCodeEcc::Low, Version::MIN, Version::MAX, None, false,
        )
        .unwrap();
        assert_eq!(qr.version().value(), 1);
        assert_eq!(qr.size(), 21);
        assert_eq!(qr.error_correction_level(), QrCodeEcc::Low);

        // Finder pattern footprints: dark outer ring, light ring at
        // distance 2, dark 3x3 center, light separator at distance 4
        for &(cx, cy) in &[(3, 3), (17, 3), (3, 17)] {
            assert!(qr.get_module(cx, cy));
            assert!(qr.get_module(cx - 3, cy - 3));
            assert!(!qr.get_module(cx - 2, cy - 2));
            assert!(qr.get_module(cx - 1, cy - 1));
        }
        assert!(qr.get_module(0, 0));
        assert!(qr.get_module(20, 0));
        assert!(qr.get_module(0, 20));
        // Separator between the top left finder and the data region
        for i in 0..8 {
            assert!(!qr.get_module(7, i));
            assert!(!qr.get_module(i, 7));
        }
        // Dark module next to the bottom left finder
        assert!(qr.get_module(8, 13));
        // Outside the symbol is always light
        assert!(!qr.get_module(-1, -1));
        assert!(!qr.get_module(21, 21));
        assert!(!qr.get_module(0, -1));
    }

    #[test]
    fn test_mask_selection_is_deterministic() {
        let segs = QrSegment::make_segments("DETERMINISM TEST 123").unwrap();
        let a = QrCode::encode_segments(
            &segs, QrCodeEcc::Medium, Version::MIN, Version::MAX, None, true,
        )
        .unwrap();
        let b = QrCode::encode_segments(
            &segs, QrCodeEcc::Medium, Version::MIN, Version::MAX, None, true,
        )
        .unwrap();
        assert_eq!(a.mask(), b.mask());
        assert!(a == b);
    }

    #[test]
    fn test_forced_masks_preserve_function_modules() {
        let segs = QrSegment::make_segments("MASK TRIAL").unwrap();
        let mut symbols = Vec::new();
        for m in 0..8u8 {
            let qr = QrCode::encode_segments(
                &segs,
                QrCodeEcc::Low,
                Version::MIN,
                Version::MAX,
                Some(Mask::new(m)),
                false,
            )
            .unwrap();
            assert_eq!(qr.mask().value(), m);
            symbols.push(qr);
        }
        // Timing pattern and finder patterns are identical no matter the mask
        let first = &symbols[0];
        for qr in &symbols[1..] {
            for i in 8..13 {
                assert_eq!(qr.get_module(i, 6), first.get_module(i, 6));
                assert_eq!(qr.get_module(6, i), first.get_module(6, i));
            }
            for y in 0..7 {
                for x in 0..7 {
                    assert_eq!(qr.get_module(x, y), first.get_module(x, y));
                }
            }
        }
    }

    #[test]
    fn test_auto_mask_matches_best_forced_mask() {
        let segs = QrSegment::make_segments("HELLO WORLD").unwrap();
        let auto = QrCode::encode_segments(
            &segs, QrCodeEcc::Low, Version::MIN, Version::MAX, None, false,
        )
        .unwrap();
        let forced = QrCode::encode_segments(
            &segs,
            QrCodeEcc::Low,
            Version::MIN,
            Version::MAX,
            Some(auto.mask()),
            false,
        )
        .unwrap();
        assert!(auto == forced);
    }

    #[test]
    fn test_boost_ecl_upgrades_without_changing_version() {
        // 74 data bits fit Quartile (104 bits) but not High (72 bits) at v1
        let segs = QrSegment::make_segments("HELLO WORLD").unwrap();
        let qr = QrCode::encode_segments(
            &segs, QrCodeEcc::Low, Version::MIN, Version::MAX, None, true,
        )
        .unwrap();
        assert_eq!(qr.version().value(), 1);
        assert_eq!(qr.error_correction_level(), QrCodeEcc::Quartile);
    }

    #[test]
    fn test_min_version_is_respected() {
        let segs = QrSegment::make_segments("HELLO WORLD").unwrap();
        let qr = QrCode::encode_segments(
            &segs, QrCodeEcc::Low, Version::new(3), Version::MAX, None, false,
        )
        .unwrap();
        assert_eq!(qr.version().value(), 3);
        assert_eq!(qr.size(), 29);
    }

    #[test]
    fn test_data_too_long() {
        let text: String = "0".repeat(3000);
        let segs = QrSegment::make_segments(&text).unwrap();
        let err = QrCode::encode_segments(
            &segs, QrCodeEcc::High, Version::MIN, Version::MAX, None, false,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DataTooLong(DataTooLong::DataOverCapacity(_, _))));
    }

    #[test]
    fn test_inverted_version_range() {
        let segs = QrSegment::make_segments("HELLO WORLD").unwrap();
        let err = QrCode::encode_segments(
            &segs, QrCodeEcc::Low, Version::new(5), Version::new(2), None, false,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_with_codewords_validates_length() {
        let err =
            QrCode::with_codewords(Version::new(1), QrCodeEcc::Low, &[0u8; 18], None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(QrCode::with_codewords(Version::new(1), QrCodeEcc::Low, &[0u8; 19], None).is_ok());
    }

    #[test]
    fn test_empty_text_encodes() {
        let qr = QrCode::encode_text("", QrCodeEcc::Low).unwrap();
        assert_eq!(qr.version().value(), 1);
    }

    #[test]
    fn test_version7_carries_version_info() {
        // Force version 7; the two 6x3 version info blocks must agree with
        // the BCH-encoded value 0x07C94
        let segs = QrSegment::make_segments("VERSION SEVEN").unwrap();
        let qr = QrCode::encode_segments(
            &segs, QrCodeEcc::Low, Version::new(7), Version::new(7), None, false,
        )
        .unwrap();
        assert_eq!(qr.size(), 45);
        let bits: u32 = 0x07c94;
        for i in 0..18 {
            let expect = (bits >> i) & 1 != 0;
            let a = qr.size() - 11 + i % 3;
            let b = i / 3;
            assert_eq!(qr.get_module(a, b), expect);
            assert_eq!(qr.get_module(b, a), expect);
        }
    }

    #[test]
    fn test_version_and_mask_try_from() {
        assert!(Version::try_from(0).is_err());
        assert!(Version::try_from(41).is_err());
        assert_eq!(Version::try_from(40).unwrap(), Version::MAX);
        assert!(Mask::try_from(8).is_err());
        assert_eq!(Mask::try_from(7).unwrap().value(), 7);
    }

    #[test]
    fn test_error_display() {
        let err = Error::DataTooLong(DataTooLong::DataOverCapacity(100, 72));
        assert_eq!(err.to_string(), "Data length = 100 bits, Max capacity = 72 bits");
        let err = Error::InvalidArgument("mask value out of range");
        assert!(err.to_string().contains("mask value out of range"));
    }
}
