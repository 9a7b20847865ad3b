//! PKWARE Data Compression Library "implode", binary (uncoded literal) mode.
//!
//! Stream layout: one byte literal mode (0 = binary), one byte dictionary
//! bits (4, 5 or 6), then an LSB-first bit stream of literals and
//! length/distance pairs closed by the end-of-stream length code.

use tracing::trace;

use crate::codec::Compressor;
use crate::config::DictionarySize;
use crate::error::Result;

pub(crate) const LEN_BITS: [u8; 16] = [3, 2, 3, 3, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 7, 7];
pub(crate) const LEN_CODE: [u8; 16] = [
    0x05, 0x03, 0x01, 0x06, 0x0A, 0x02, 0x0C, 0x14, 0x04, 0x18, 0x08, 0x30, 0x10, 0x20, 0x40, 0x00,
];
pub(crate) const EX_LEN_BITS: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8];
pub(crate) const LEN_BASE: [u16; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 10, 14, 22, 38, 70, 134, 262];

pub(crate) const DIST_BITS: [u8; 64] = [
    2, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 7, 7, 7, 7, 7, 7, 7, 7, 7,
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8,
    8, 8,
];
pub(crate) const DIST_CODE: [u8; 64] = [
    0x03, 0x0D, 0x05, 0x19, 0x09, 0x11, 0x01, 0x3E, 0x1E, 0x2E, 0x0E, 0x36, 0x16, 0x26, 0x06, 0x3A,
    0x1A, 0x2A, 0x0A, 0x32, 0x12, 0x22, 0x42, 0x02, 0x7C, 0x3C, 0x5C, 0x1C, 0x6C, 0x2C, 0x4C, 0x0C,
    0x74, 0x34, 0x54, 0x14, 0x64, 0x24, 0x44, 0x04, 0x78, 0x38, 0x58, 0x18, 0x68, 0x28, 0x48, 0x08,
    0xF0, 0x70, 0xB0, 0x30, 0xD0, 0x50, 0x90, 0x10, 0xE0, 0x60, 0xA0, 0x20, 0xC0, 0x40, 0x80, 0x00,
];

pub(crate) const BINARY_MODE: u8 = 0;
pub(crate) const MIN_MATCH: usize = 2;
pub(crate) const MAX_MATCH: usize = 518;
/// Length value (`length - 2`) reserved for the end-of-stream marker.
pub(crate) const END_OF_STREAM: u16 = 517;
/// Two-byte matches only have two low distance bits.
const MAX_SHORT_DISTANCE: usize = 256;
const MAX_CHAIN: usize = 128;
const NIL: usize = usize::MAX;

/// LSB-first bit packer.
struct BitWriter {
    out: Vec<u8>,
    acc: u32,
    nbits: u32,
}

impl BitWriter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            acc: 0,
            nbits: 0,
        }
    }

    fn write(&mut self, value: u32, bits: u8) {
        self.acc |= value << self.nbits;
        self.nbits += u32::from(bits);
        while self.nbits >= 8 {
            self.out.push(self.acc as u8);
            self.acc >>= 8;
            self.nbits -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            self.out.push(self.acc as u8);
        }
        self.out
    }
}

/// Hash chains over two-byte prefixes, newest position first.
struct MatchFinder {
    head: Vec<usize>,
    prev: Vec<usize>,
}

impl MatchFinder {
    fn new(len: usize) -> Self {
        Self {
            head: vec![NIL; 1 << 16],
            prev: vec![NIL; len],
        }
    }

    fn key(input: &[u8], pos: usize) -> Option<usize> {
        let pair = input.get(pos..pos + 2)?;
        Some((usize::from(pair[0]) << 8) | usize::from(pair[1]))
    }

    fn insert(&mut self, input: &[u8], pos: usize) {
        if let Some(key) = Self::key(input, pos) {
            self.prev[pos] = self.head[key];
            self.head[key] = pos;
        }
    }

    /// Longest earlier match for `pos` within `window` bytes, as (length, distance).
    fn longest(&self, input: &[u8], pos: usize, window: usize) -> (usize, usize) {
        let Some(key) = Self::key(input, pos) else {
            return (0, 0);
        };
        let limit = MAX_MATCH.min(input.len() - pos);

        let mut best = (0, 0);
        let mut candidate = self.head[key];
        let mut chain = 0;
        while candidate != NIL && pos - candidate <= window && chain < MAX_CHAIN {
            // matches may overlap the current position
            let len = (0..limit)
                .take_while(|&k| input[candidate + k] == input[pos + k])
                .count();
            if len > best.0 {
                best = (len, pos - candidate);
                if len == limit {
                    break;
                }
            }
            candidate = self.prev[candidate];
            chain += 1;
        }
        best
    }
}

/// Implode compressor with a fixed dictionary size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Implode {
    dictionary: DictionarySize,
}

impl Implode {
    pub fn new(dictionary: DictionarySize) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> DictionarySize {
        self.dictionary
    }

    fn write_literal(out: &mut BitWriter, byte: u8) {
        out.write(u32::from(byte) << 1, 9);
    }

    fn write_length(out: &mut BitWriter, value: u16) {
        let idx = LEN_BASE.iter().rposition(|&base| base <= value).unwrap_or(0);
        out.write(1, 1);
        out.write(u32::from(LEN_CODE[idx]), LEN_BITS[idx]);
        out.write(u32::from(value - LEN_BASE[idx]), EX_LEN_BITS[idx]);
    }

    fn write_distance(&self, out: &mut BitWriter, length: usize, distance: usize) {
        let low_bits = if length == MIN_MATCH {
            2
        } else {
            self.dictionary.bits()
        };
        let value = (distance - 1) as u32;
        let high = (value >> low_bits) as usize;
        out.write(u32::from(DIST_CODE[high]), DIST_BITS[high]);
        out.write(value & ((1 << low_bits) - 1), low_bits);
    }
}

impl Default for Implode {
    fn default() -> Self {
        Self::new(DictionarySize::Large)
    }
}

impl Compressor for Implode {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let window = self.dictionary.window();
        let mut out = BitWriter::with_capacity(input.len() / 2 + 8);
        out.write(u32::from(BINARY_MODE), 8);
        out.write(u32::from(self.dictionary.bits()), 8);

        let mut finder = MatchFinder::new(input.len());
        let mut pos = 0;
        let mut matches = 0usize;
        while pos < input.len() {
            let (length, distance) = finder.longest(input, pos, window);
            let usable = length > MIN_MATCH
                || (length == MIN_MATCH && distance <= MAX_SHORT_DISTANCE);

            if usable {
                Self::write_length(&mut out, (length - MIN_MATCH) as u16);
                self.write_distance(&mut out, length, distance);
                for p in pos..pos + length {
                    finder.insert(input, p);
                }
                pos += length;
                matches += 1;
            } else {
                Self::write_literal(&mut out, input[pos]);
                finder.insert(input, pos);
                pos += 1;
            }
        }

        Self::write_length(&mut out, END_OF_STREAM);
        let compressed = out.finish();
        trace!(
            input = input.len(),
            output = compressed.len(),
            matches,
            dictionary = %self.dictionary,
            "Imploded buffer"
        );
        Ok(compressed)
    }
}
