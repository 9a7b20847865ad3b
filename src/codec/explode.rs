//! Decoder for binary-mode implode streams, used to check the compressor.

use crate::codec::implode::{
    BINARY_MODE, DIST_BITS, DIST_CODE, END_OF_STREAM, EX_LEN_BITS, LEN_BASE, LEN_BITS, LEN_CODE,
    MIN_MATCH,
};
use crate::error::{LevelCompilerError, Result};

struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    acc: u32,
    nbits: u32,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            acc: 0,
            nbits: 0,
        }
    }

    fn read(&mut self, bits: u8) -> Result<u32> {
        let bits = u32::from(bits);
        while self.nbits < bits {
            let byte = *self.data.get(self.pos).ok_or_else(|| {
                LevelCompilerError::Compression("stream ends before the end marker".into())
            })?;
            self.acc |= u32::from(byte) << self.nbits;
            self.nbits += 8;
            self.pos += 1;
        }
        let value = self.acc & ((1 << bits) - 1);
        self.acc >>= bits;
        self.nbits -= bits;
        Ok(value)
    }

    /// Read one prefix code from an (lengths, codes) table, returning its index.
    fn decode(&mut self, lengths: &[u8], codes: &[u8]) -> Result<usize> {
        let mut code = 0u32;
        for len in 1..=8u8 {
            code |= self.read(1)? << (len - 1);
            if let Some(idx) = (0..lengths.len())
                .find(|&i| lengths[i] == len && u32::from(codes[i]) == code)
            {
                return Ok(idx);
            }
        }
        Err(LevelCompilerError::Compression(format!(
            "invalid prefix code {code:#x}"
        )))
    }
}

pub(crate) fn explode(data: &[u8]) -> Result<Vec<u8>> {
    let [mode, dict_bits, ..] = data else {
        return Err(LevelCompilerError::Compression("missing stream header".into()));
    };
    if *mode != BINARY_MODE {
        return Err(LevelCompilerError::Compression(format!(
            "unsupported literal mode {mode}"
        )));
    }
    if !(4..=6).contains(dict_bits) {
        return Err(LevelCompilerError::Compression(format!(
            "invalid dictionary bits {dict_bits}"
        )));
    }

    let mut reader = BitReader::new(&data[2..]);
    let mut out = Vec::new();
    loop {
        if reader.read(1)? == 0 {
            out.push(reader.read(8)? as u8);
            continue;
        }

        let idx = reader.decode(&LEN_BITS, &LEN_CODE)?;
        let value = LEN_BASE[idx] + reader.read(EX_LEN_BITS[idx])? as u16;
        if value == END_OF_STREAM {
            return Ok(out);
        }
        let length = usize::from(value) + MIN_MATCH;

        let low_bits = if length == MIN_MATCH { 2 } else { *dict_bits };
        let high = reader.decode(&DIST_BITS, &DIST_CODE)? as u32;
        let distance = ((high << low_bits) | reader.read(low_bits)?) as usize + 1;
        if distance > out.len() {
            return Err(LevelCompilerError::Compression(format!(
                "distance {distance} reaches before the start of the output"
            )));
        }

        let start = out.len() - distance;
        for k in 0..length {
            out.push(out[start + k]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_stream_decodes() {
        let data = [0x00, 0x04, 0x82, 0x24, 0x25, 0x8F, 0x80, 0x7F];
        assert_eq!(explode(&data).unwrap(), b"AIAIAIAIAIAIA".to_vec());
    }

    #[test]
    fn truncated_stream_fails() {
        let data = [0x00, 0x04, 0x82, 0x24, 0x25];
        assert!(explode(&data).is_err());
    }

    #[test]
    fn rejects_coded_literals() {
        assert!(explode(&[0x01, 0x06, 0x01, 0xFF]).is_err());
    }
}
