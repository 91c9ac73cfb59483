//! SFNT (TrueType/OpenType) container writer

use std::collections::BTreeMap;

use crate::errors::FontError;

/// Four-byte table tag
pub type Tag = [u8; 4];

pub const TAG_HEAD: Tag = *b"head";
pub const TAG_HHEA: Tag = *b"hhea";
pub const TAG_MAXP: Tag = *b"maxp";
pub const TAG_HMTX: Tag = *b"hmtx";
pub const TAG_GLYF: Tag = *b"glyf";
pub const TAG_LOCA: Tag = *b"loca";

/// `sfntVersion` of TrueType-outline fonts
pub const TRUETYPE_FLAVOR: u32 = 0x0001_0000;

/// Most tables whose directory size still fits the u16 `rangeShift`
pub const MAX_TABLES: usize = 4095;

const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;
const HEAD_ADJUSTMENT_OFFSET: usize = 8;
const HEADER_SIZE: usize = 12;
const TABLE_RECORD_SIZE: usize = 16;

/// Collects tables and serialises them as a single SFNT font
#[derive(Debug, Clone)]
pub struct SfntBuilder {
    flavor: u32,
    tables: BTreeMap<Tag, Vec<u8>>,
}

impl SfntBuilder {
    pub fn new(flavor: u32) -> Self {
        Self {
            flavor,
            tables: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, tag: Tag, data: Vec<u8>) {
        self.tables.insert(tag, data);
    }

    pub fn get(&self, tag: &Tag) -> Option<&[u8]> {
        self.tables.get(tag).map(Vec::as_slice)
    }

    /// Serialise with a sorted directory, padded tables and valid checksums
    pub fn finish(mut self) -> Result<Vec<u8>, FontError> {
        if let Some(head) = self.tables.get_mut(&TAG_HEAD) {
            if head.len() >= HEAD_ADJUSTMENT_OFFSET + 4 {
                head[HEAD_ADJUSTMENT_OFFSET..HEAD_ADJUSTMENT_OFFSET + 4].fill(0);
            }
        }

        let (num_tables, search_range, entry_selector, range_shift) =
            search_params(self.tables.len())?;

        let mut out = Vec::new();
        out.extend_from_slice(&self.flavor.to_be_bytes());
        out.extend_from_slice(&num_tables.to_be_bytes());
        out.extend_from_slice(&search_range.to_be_bytes());
        out.extend_from_slice(&entry_selector.to_be_bytes());
        out.extend_from_slice(&range_shift.to_be_bytes());

        let mut offset = HEADER_SIZE + TABLE_RECORD_SIZE * self.tables.len();
        let mut head_offset = None;
        for (tag, data) in &self.tables {
            if *tag == TAG_HEAD {
                head_offset = Some(offset);
            }
            out.extend_from_slice(tag);
            out.extend_from_slice(&checksum(data).to_be_bytes());
            out.extend_from_slice(&(offset as u32).to_be_bytes());
            out.extend_from_slice(&(data.len() as u32).to_be_bytes());
            offset += padded_len(data.len());
        }

        for data in self.tables.values() {
            out.extend_from_slice(data);
            out.resize(out.len() + padded_len(data.len()) - data.len(), 0);
        }

        if let Some(head_offset) = head_offset {
            let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(&out));
            let at = head_offset + HEAD_ADJUSTMENT_OFFSET;
            if at + 4 <= out.len() {
                out[at..at + 4].copy_from_slice(&adjustment.to_be_bytes());
            }
        }
        Ok(out)
    }
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

/// `numTables`, `searchRange`, `entrySelector` and `rangeShift`
fn search_params(num_tables: usize) -> Result<(u16, u16, u16, u16), FontError> {
    if num_tables > MAX_TABLES {
        return Err(FontError::malformed(format!(
            "{} tables, at most {} fit an SFNT directory",
            num_tables, MAX_TABLES
        )));
    }
    if num_tables == 0 {
        return Ok((0, 0, 0, 0));
    }
    let num_tables = num_tables as u32;
    let entry_selector = 31 - num_tables.leading_zeros();
    let search_range = (1u32 << entry_selector) * TABLE_RECORD_SIZE as u32;
    let range_shift = num_tables * TABLE_RECORD_SIZE as u32 - search_range;

    let narrow = |value: u32| {
        u16::try_from(value).map_err(|_| FontError::malformed("SFNT directory field overflow"))
    };
    Ok((
        narrow(num_tables)?,
        narrow(search_range)?,
        narrow(entry_selector)?,
        narrow(range_shift)?,
    ))
}

/// Sum of big-endian words, the final word zero-padded
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_pads_final_word() {
        assert_eq!(checksum(&[0, 0, 0, 1, 0x01]), 1 + 0x0100_0000);
    }

    #[test]
    fn test_search_params() {
        assert_eq!(search_params(1).unwrap(), (1, 16, 0, 0));
        assert_eq!(search_params(9).unwrap(), (9, 128, 3, 16));
        assert_eq!(search_params(16).unwrap(), (16, 256, 4, 0));
        assert_eq!(search_params(MAX_TABLES).unwrap(), (4095, 32768, 11, 32752));
    }

    #[test]
    fn test_too_many_tables_is_error() {
        assert!(matches!(search_params(MAX_TABLES + 1), Err(FontError::Malformed(_))));

        let mut builder = SfntBuilder::new(TRUETYPE_FLAVOR);
        for i in 0..=MAX_TABLES as u32 {
            builder.insert(i.to_be_bytes(), Vec::new());
        }
        assert!(builder.finish().is_err());
    }

    #[test]
    fn test_finish_layout_and_adjustment() {
        let mut builder = SfntBuilder::new(TRUETYPE_FLAVOR);
        builder.insert(*b"zzzz", vec![1, 2, 3]);
        builder.insert(TAG_HEAD, vec![0xAA; 54]);
        let font = builder.finish().unwrap();

        // Directory is sorted: head before zzzz
        assert_eq!(&font[12..16], b"head");
        assert_eq!(&font[28..32], b"zzzz");
        // 12 + 2*16 header, 56 padded head, 4 padded zzzz
        assert_eq!(font.len(), 44 + 56 + 4);
        // Whole-font checksum equals the magic once the adjustment is in place
        assert_eq!(checksum(&font), CHECKSUM_MAGIC);
    }
}
