//! WOFF2 decoding
//!
//! Handles the table directory, the Brotli-compressed table stream, and the
//! `glyf`/`loca` and `hmtx` transforms. Font collections are not supported.

use std::io::Read;

use brotli_decompressor::Decompressor;

use super::binary::Reader;
use super::glyf::reconstruct_glyf;
use super::sfnt::{SfntBuilder, Tag, MAX_TABLES, TAG_GLYF, TAG_HEAD, TAG_HHEA, TAG_HMTX, TAG_LOCA, TAG_MAXP};
use crate::errors::FontError;

/// `wOF2`
pub const WOFF2_SIGNATURE: u32 = 0x774F_4632;

const TTC_FLAVOR: u32 = 0x7474_6366;
const HEADER_SIZE: usize = 48;
const ARBITRARY_TAG: u8 = 0x3F;
const BROTLI_BUFFER_SIZE: usize = 4096;

/// Tags addressable by index in the table directory
const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post",
    b"cvt ", b"fpgm", b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT",
    b"EBLC", b"gasp", b"hdmx", b"kern", b"LTSH", b"PCLT", b"VDMX", b"vhea",
    b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC", b"JSTF", b"MATH",
    b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar",
    b"gvar", b"hsty", b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop",
    b"trak", b"Zapf", b"Silf", b"Glat", b"Gloc", b"Feat", b"Sill",
];

/// One entry of the WOFF2 table directory
#[derive(Debug, Clone, PartialEq, Eq)]
struct TableEntry {
    tag: Tag,
    orig_length: usize,
    /// Length in the decompressed stream
    stream_length: usize,
    transformed: bool,
}

fn tag_name(tag: &Tag) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

fn read_table_entry(reader: &mut Reader<'_>) -> Result<TableEntry, FontError> {
    let flags = reader.read_u8()?;
    let tag_index = flags & ARBITRARY_TAG;
    let tag = if tag_index == ARBITRARY_TAG {
        reader.read_tag()?
    } else {
        *KNOWN_TAGS[tag_index as usize]
    };
    let transform_version = flags >> 6;
    let orig_length = reader.read_base128()? as usize;

    // For glyf and loca version 0 is the transform and 3 the null transform;
    // every other table uses version 0 for the null transform.
    let transformed = if tag == TAG_GLYF || tag == TAG_LOCA {
        transform_version == 0
    } else {
        transform_version != 0
    };
    let stream_length = if transformed {
        reader.read_base128()? as usize
    } else {
        orig_length
    };

    if tag == TAG_LOCA && transformed && stream_length != 0 {
        return Err(FontError::malformed("transformed loca must be empty"));
    }
    Ok(TableEntry {
        tag,
        orig_length,
        stream_length,
        transformed,
    })
}

/// Decode a WOFF2 file into plain SFNT bytes
pub fn decode_woff2(data: &[u8]) -> Result<Vec<u8>, FontError> {
    let mut reader = Reader::new(data);
    if reader.read_u32()? != WOFF2_SIGNATURE {
        return Err(FontError::malformed("missing wOF2 signature"));
    }
    let flavor = reader.read_u32()?;
    if flavor == TTC_FLAVOR {
        return Err(FontError::Unsupported("WOFF2 font collections".to_string()));
    }
    let length = reader.read_u32()? as usize;
    if length != data.len() {
        return Err(FontError::malformed(format!(
            "header length {} does not match file size {}",
            length,
            data.len()
        )));
    }
    let num_tables = reader.read_u16()?;
    if num_tables as usize > MAX_TABLES {
        return Err(FontError::malformed(format!("{} tables in directory", num_tables)));
    }
    if reader.read_u16()? != 0 {
        return Err(FontError::malformed("reserved header field is not zero"));
    }
    let total_sfnt_size = reader.read_u32()? as usize;
    let total_compressed_size = reader.read_u32()? as usize;
    // Version, metadata and private blocks are not needed
    reader.skip(HEADER_SIZE - reader.position())?;

    let entries = (0..num_tables)
        .map(|_| read_table_entry(&mut reader))
        .collect::<Result<Vec<_>, _>>()?;

    // The table stream never outgrows the font it decodes to
    let expected = entries
        .iter()
        .try_fold(0usize, |sum, e| sum.checked_add(e.stream_length))
        .filter(|&sum| sum <= total_sfnt_size)
        .ok_or_else(|| {
            FontError::malformed(format!("table stream exceeds totalSfntSize {}", total_sfnt_size))
        })?;

    let compressed = reader.read_bytes(total_compressed_size)?;
    let mut stream = Vec::new();
    Decompressor::new(compressed, BROTLI_BUFFER_SIZE)
        .take(expected as u64 + 1)
        .read_to_end(&mut stream)
        .map_err(|e| FontError::malformed(format!("brotli stream: {}", e)))?;

    if stream.len() > expected {
        return Err(FontError::malformed(format!(
            "table stream is longer than the {} bytes the directory describes",
            expected
        )));
    }
    if stream.len() < expected {
        return Err(FontError::malformed(format!(
            "decompressed {} bytes, directory needs {}",
            stream.len(),
            expected
        )));
    }

    let mut tables: Vec<(&TableEntry, &[u8])> = Vec::with_capacity(entries.len());
    let mut offset = 0;
    for entry in &entries {
        tables.push((entry, &stream[offset..offset + entry.stream_length]));
        offset += entry.stream_length;
    }

    assemble(flavor, &tables)
}

fn find<'a>(tables: &[(&TableEntry, &'a [u8])], tag: Tag) -> Option<(&'a [u8], bool, usize)> {
    tables
        .iter()
        .find(|(entry, _)| entry.tag == tag)
        .map(|(entry, data)| (*data, entry.transformed, entry.orig_length))
}

fn assemble(flavor: u32, tables: &[(&TableEntry, &[u8])]) -> Result<Vec<u8>, FontError> {
    let mut builder = SfntBuilder::new(flavor);
    let mut x_mins = None;

    if let Some((glyf, true, _)) = find(tables, TAG_GLYF) {
        let (_, _, loca_length) = find(tables, TAG_LOCA)
            .ok_or_else(|| FontError::malformed("transformed glyf without loca"))?;
        let rebuilt = reconstruct_glyf(glyf)?;
        if rebuilt.loca.len() != loca_length {
            return Err(FontError::malformed(format!(
                "rebuilt loca is {} bytes, directory says {}",
                rebuilt.loca.len(),
                loca_length
            )));
        }
        log::debug!(
            "Rebuilt glyf ({} bytes) for {} glyphs",
            rebuilt.glyf.len(),
            rebuilt.x_mins.len()
        );
        builder.insert(TAG_GLYF, rebuilt.glyf);
        builder.insert(TAG_LOCA, rebuilt.loca);
        x_mins = Some(rebuilt.x_mins);
    } else if let Some((_, true, _)) = find(tables, TAG_LOCA) {
        return Err(FontError::malformed("transformed loca without transformed glyf"));
    }

    for (entry, data) in tables {
        if entry.tag == TAG_GLYF || entry.tag == TAG_LOCA {
            if entry.transformed {
                continue;
            }
        } else if entry.transformed {
            if entry.tag != TAG_HMTX {
                return Err(FontError::Unsupported(format!(
                    "transform of table {}",
                    tag_name(&entry.tag)
                )));
            }
            let x_mins = x_mins
                .as_deref()
                .ok_or_else(|| FontError::malformed("transformed hmtx requires transformed glyf"))?;
            let hmtx = reconstruct_hmtx(data, tables, x_mins)?;
            if hmtx.len() != entry.orig_length {
                return Err(FontError::malformed("rebuilt hmtx has the wrong length"));
            }
            builder.insert(TAG_HMTX, hmtx);
            continue;
        }

        if data.len() != entry.orig_length {
            return Err(FontError::malformed(format!(
                "table {} is {} bytes, directory says {}",
                tag_name(&entry.tag),
                data.len(),
                entry.orig_length
            )));
        }
        builder.insert(entry.tag, data.to_vec());
    }

    if builder.get(&TAG_HEAD).is_none() {
        return Err(FontError::malformed("font has no head table"));
    }
    builder.finish()
}

fn reconstruct_hmtx(
    data: &[u8],
    tables: &[(&TableEntry, &[u8])],
    x_mins: &[i16],
) -> Result<Vec<u8>, FontError> {
    let (hhea, _, _) = find(tables, TAG_HHEA).ok_or_else(|| FontError::malformed("hmtx without hhea"))?;
    let (maxp, _, _) = find(tables, TAG_MAXP).ok_or_else(|| FontError::malformed("hmtx without maxp"))?;
    let mut hhea = Reader::new(hhea);
    hhea.skip(34)?;
    let num_hmetrics = hhea.read_u16()? as usize;
    let mut maxp = Reader::new(maxp);
    maxp.skip(4)?;
    let num_glyphs = maxp.read_u16()? as usize;

    if num_hmetrics == 0 || num_hmetrics > num_glyphs || x_mins.len() != num_glyphs {
        return Err(FontError::malformed("inconsistent hmtx glyph counts"));
    }

    let mut reader = Reader::new(data);
    let flags = reader.read_u8()?;
    if flags & 0xFC != 0 || flags & 0x03 == 0 {
        return Err(FontError::malformed(format!("invalid hmtx flags {:#04x}", flags)));
    }
    let has_proportional_lsb = flags & 0x01 == 0;
    let has_monospace_lsb = flags & 0x02 == 0;

    let advances = (0..num_hmetrics)
        .map(|_| reader.read_u16())
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = Vec::with_capacity(num_hmetrics * 4 + (num_glyphs - num_hmetrics) * 2);
    let mut lsbs = Vec::with_capacity(num_glyphs);
    for glyph in 0..num_glyphs {
        let explicit = if glyph < num_hmetrics {
            has_proportional_lsb
        } else {
            has_monospace_lsb
        };
        lsbs.push(if explicit { reader.read_i16()? } else { x_mins[glyph] });
    }

    for (advance, lsb) in advances.iter().zip(&lsbs) {
        out.extend_from_slice(&advance.to_be_bytes());
        out.extend_from_slice(&lsb.to_be_bytes());
    }
    for lsb in &lsbs[num_hmetrics..] {
        out.extend_from_slice(&lsb.to_be_bytes());
    }
    Ok(out)
}
