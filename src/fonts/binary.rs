//! Big-endian cursor over font data

use crate::errors::FontError;

/// Bounds-checked reader; every read past the end is a [`FontError::Malformed`]
#[derive(Debug, Clone)]
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], FontError> {
        if len > self.remaining() {
            return Err(FontError::malformed(format!(
                "need {} bytes at offset {}, only {} left",
                len,
                self.pos,
                self.remaining()
            )));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), FontError> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, FontError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, FontError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_i16(&mut self) -> Result<i16, FontError> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, FontError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_tag(&mut self) -> Result<[u8; 4], FontError> {
        let b = self.read_bytes(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    /// WOFF2 `UIntBase128`: up to five 7-bit groups, no leading zeros
    pub fn read_base128(&mut self) -> Result<u32, FontError> {
        let mut value: u32 = 0;
        for i in 0..5 {
            let byte = self.read_u8()?;
            if i == 0 && byte == 0x80 {
                return Err(FontError::malformed("UIntBase128 with leading zero"));
            }
            if value & 0xFE00_0000 != 0 {
                return Err(FontError::malformed("UIntBase128 overflow"));
            }
            value = (value << 7) | (byte & 0x7F) as u32;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(FontError::malformed("UIntBase128 longer than five bytes"))
    }

    /// WOFF2 `255UInt16`
    pub fn read_255_u16(&mut self) -> Result<u16, FontError> {
        const WORD_CODE: u8 = 253;
        const ONE_MORE_BYTE_CODE_2: u8 = 254;
        const ONE_MORE_BYTE_CODE_1: u8 = 255;
        const LOWEST_U_CODE: u16 = 253;

        match self.read_u8()? {
            WORD_CODE => self.read_u16(),
            ONE_MORE_BYTE_CODE_1 => Ok(self.read_u8()? as u16 + LOWEST_U_CODE),
            ONE_MORE_BYTE_CODE_2 => Ok(self.read_u8()? as u16 + LOWEST_U_CODE * 2),
            code => Ok(code as u16),
        }
    }
}
