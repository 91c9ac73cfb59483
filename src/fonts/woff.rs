//! WOFF 1.0 decoding

use std::io::Read;

use flate2::read::ZlibDecoder;

use super::binary::Reader;
use super::sfnt::{SfntBuilder, MAX_TABLES};
use crate::errors::FontError;

/// `wOFF`
pub const WOFF_SIGNATURE: u32 = 0x774F_4646;

const HEADER_SIZE: usize = 44;

/// Decode a WOFF 1.0 file into plain SFNT bytes
pub fn decode_woff(data: &[u8]) -> Result<Vec<u8>, FontError> {
    let mut header = Reader::new(data);
    if header.read_u32()? != WOFF_SIGNATURE {
        return Err(FontError::malformed("missing wOFF signature"));
    }
    let flavor = header.read_u32()?;
    let length = header.read_u32()? as usize;
    if length != data.len() {
        return Err(FontError::malformed(format!(
            "header length {} does not match file size {}",
            length,
            data.len()
        )));
    }
    let num_tables = header.read_u16()?;
    if num_tables as usize > MAX_TABLES {
        return Err(FontError::malformed(format!("{} tables in directory", num_tables)));
    }
    if header.read_u16()? != 0 {
        return Err(FontError::malformed("reserved header field is not zero"));
    }
    // totalSfntSize, version, metadata and private blocks are not needed
    header.skip(HEADER_SIZE - header.position())?;

    let mut builder = SfntBuilder::new(flavor);
    for _ in 0..num_tables {
        let tag = header.read_tag()?;
        let offset = header.read_u32()? as usize;
        let comp_length = header.read_u32()? as usize;
        let orig_length = header.read_u32()? as usize;
        let _orig_checksum = header.read_u32()?;

        let end = offset
            .checked_add(comp_length)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                FontError::malformed(format!(
                    "table {} extends past end of file",
                    String::from_utf8_lossy(&tag)
                ))
            })?;
        let stored = &data[offset..end];

        let table = if comp_length == orig_length {
            stored.to_vec()
        } else if comp_length < orig_length {
            let mut table = Vec::new();
            ZlibDecoder::new(stored)
                .take(orig_length as u64 + 1)
                .read_to_end(&mut table)?;
            if table.len() != orig_length {
                return Err(FontError::malformed(format!(
                    "table {} inflated to {} bytes, expected {}",
                    String::from_utf8_lossy(&tag),
                    table.len(),
                    orig_length
                )));
            }
            table
        } else {
            return Err(FontError::malformed(format!(
                "table {} compressed length exceeds original",
                String::from_utf8_lossy(&tag)
            )));
        };
        builder.insert(tag, table);
    }

    builder.finish()
}
