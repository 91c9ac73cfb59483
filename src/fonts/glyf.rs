//! Reconstruction of the WOFF2 transformed `glyf`/`loca` tables

use super::binary::Reader;
use crate::errors::FontError;

const HEADER_SIZE: usize = 36;
const OPTION_OVERLAP_BITMAP: u16 = 1;

// Simple glyph flags
const ON_CURVE: u8 = 0x01;
const X_SHORT: u8 = 0x02;
const Y_SHORT: u8 = 0x04;
const REPEAT: u8 = 0x08;
const X_SAME_OR_POSITIVE: u8 = 0x10;
const Y_SAME_OR_POSITIVE: u8 = 0x20;
const OVERLAP_SIMPLE: u8 = 0x40;

// Composite glyph flags
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;
const WE_HAVE_INSTRUCTIONS: u16 = 0x0100;

/// A decoded outline point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GlyphPoint {
    pub x: i32,
    pub y: i32,
    pub on_curve: bool,
}

/// Rebuilt `glyf` and `loca` plus per-glyph `xMin` for `hmtx` reconstruction
#[derive(Debug, Clone)]
pub(crate) struct ReconstructedGlyf {
    pub glyf: Vec<u8>,
    pub loca: Vec<u8>,
    pub x_mins: Vec<i16>,
    pub index_format: u16,
}

/// The seven substreams of a transformed `glyf` table
struct Streams<'a> {
    n_contours: Reader<'a>,
    n_points: Reader<'a>,
    flags: Reader<'a>,
    glyphs: Reader<'a>,
    composites: Reader<'a>,
    bbox_bitmap: &'a [u8],
    bboxes: Reader<'a>,
    instructions: Reader<'a>,
    overlap_bitmap: Option<&'a [u8]>,
}

impl<'a> Streams<'a> {
    fn has_bbox(&self, glyph: usize) -> bool {
        bit_set(self.bbox_bitmap, glyph)
    }

    fn has_overlap(&self, glyph: usize) -> bool {
        self.overlap_bitmap.map_or(false, |bits| bit_set(bits, glyph))
    }

    fn read_bbox(&mut self) -> Result<[i16; 4], FontError> {
        Ok([
            self.bboxes.read_i16()?,
            self.bboxes.read_i16()?,
            self.bboxes.read_i16()?,
            self.bboxes.read_i16()?,
        ])
    }
}

fn bit_set(bitmap: &[u8], index: usize) -> bool {
    bitmap
        .get(index >> 3)
        .map_or(false, |byte| byte & (0x80 >> (index & 7)) != 0)
}

/// Rebuild `glyf` and `loca` from a transformed `glyf` table
pub(crate) fn reconstruct_glyf(data: &[u8]) -> Result<ReconstructedGlyf, FontError> {
    let mut header = Reader::new(data);
    let _version = header.read_u16()?;
    let option_flags = header.read_u16()?;
    let num_glyphs = header.read_u16()? as usize;
    let index_format = header.read_u16()?;
    if index_format > 1 {
        return Err(FontError::malformed(format!(
            "unknown loca index format {}",
            index_format
        )));
    }

    let mut sizes = [0usize; 7];
    for size in sizes.iter_mut() {
        *size = header.read_u32()? as usize;
    }
    debug_assert_eq!(header.position(), HEADER_SIZE);

    let mut body = header;
    let n_contours = Reader::new(body.read_bytes(sizes[0])?);
    let n_points = Reader::new(body.read_bytes(sizes[1])?);
    let flags = Reader::new(body.read_bytes(sizes[2])?);
    let glyphs = Reader::new(body.read_bytes(sizes[3])?);
    let composites = Reader::new(body.read_bytes(sizes[4])?);
    let bbox_stream = body.read_bytes(sizes[5])?;
    let instructions = Reader::new(body.read_bytes(sizes[6])?);
    let overlap_bitmap = if option_flags & OPTION_OVERLAP_BITMAP != 0 {
        Some(body.read_bytes((num_glyphs + 7) / 8)?)
    } else {
        None
    };

    let bitmap_len = ((num_glyphs + 31) / 32) * 4;
    if bbox_stream.len() < bitmap_len {
        return Err(FontError::malformed("bbox stream shorter than its bitmap"));
    }
    let mut streams = Streams {
        n_contours,
        n_points,
        flags,
        glyphs,
        composites,
        bbox_bitmap: &bbox_stream[..bitmap_len],
        bboxes: Reader::new(&bbox_stream[bitmap_len..]),
        instructions,
        overlap_bitmap,
    };

    let mut glyf = Vec::new();
    let mut offsets = Vec::with_capacity(num_glyphs + 1);
    let mut x_mins = Vec::with_capacity(num_glyphs);

    for glyph_id in 0..num_glyphs {
        offsets.push(glyf.len());
        let n_contours = streams.n_contours.read_i16()?;
        let x_min = match n_contours {
            0 => {
                if streams.has_bbox(glyph_id) {
                    return Err(FontError::malformed(format!(
                        "empty glyph {} has an explicit bbox",
                        glyph_id
                    )));
                }
                0
            }
            -1 => decode_composite(&mut streams, glyph_id, &mut glyf)?,
            n if n > 0 => decode_simple(&mut streams, glyph_id, n as usize, &mut glyf)?,
            n => {
                return Err(FontError::malformed(format!(
                    "glyph {} has invalid contour count {}",
                    glyph_id, n
                )))
            }
        };
        x_mins.push(x_min);
        glyf.resize((glyf.len() + 3) & !3, 0);
    }
    offsets.push(glyf.len());

    let loca = encode_loca(&offsets, index_format)?;
    Ok(ReconstructedGlyf {
        glyf,
        loca,
        x_mins,
        index_format,
    })
}

fn decode_composite(streams: &mut Streams<'_>, glyph_id: usize, out: &mut Vec<u8>) -> Result<i16, FontError> {
    if !streams.has_bbox(glyph_id) {
        return Err(FontError::malformed(format!(
            "composite glyph {} has no bbox",
            glyph_id
        )));
    }
    let bbox = streams.read_bbox()?;

    // Measure the component records, then copy them verbatim
    let mut scan = streams.composites.clone();
    let start = scan.position();
    let mut have_instructions = false;
    loop {
        let flags = scan.read_u16()?;
        let _glyph_index = scan.read_u16()?;
        let mut arg_len = if flags & ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 };
        if flags & WE_HAVE_A_SCALE != 0 {
            arg_len += 2;
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            arg_len += 4;
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            arg_len += 8;
        }
        scan.skip(arg_len)?;
        have_instructions |= flags & WE_HAVE_INSTRUCTIONS != 0;
        if flags & MORE_COMPONENTS == 0 {
            break;
        }
    }
    let components = streams.composites.read_bytes(scan.position() - start)?;

    out.extend_from_slice(&(-1i16).to_be_bytes());
    for value in bbox {
        out.extend_from_slice(&value.to_be_bytes());
    }
    out.extend_from_slice(components);
    if have_instructions {
        let len = streams.glyphs.read_255_u16()?;
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(streams.instructions.read_bytes(len as usize)?);
    }
    Ok(bbox[0])
}

fn decode_simple(
    streams: &mut Streams<'_>,
    glyph_id: usize,
    n_contours: usize,
    out: &mut Vec<u8>,
) -> Result<i16, FontError> {
    let mut end_points = Vec::with_capacity(n_contours);
    let mut total_points: usize = 0;
    for _ in 0..n_contours {
        total_points += streams.n_points.read_255_u16()? as usize;
        if total_points == 0 || total_points > u16::MAX as usize + 1 {
            return Err(FontError::malformed(format!(
                "glyph {} has an invalid point count",
                glyph_id
            )));
        }
        end_points.push((total_points - 1) as u16);
    }

    let flags = streams.flags.read_bytes(total_points)?;
    let points = decode_triplets(flags, &mut streams.glyphs)?;
    let instruction_len = streams.glyphs.read_255_u16()?;
    let instructions = streams.instructions.read_bytes(instruction_len as usize)?;

    let bbox = if streams.has_bbox(glyph_id) {
        streams.read_bbox()?
    } else {
        compute_bbox(&points)
    };

    encode_simple_glyph(
        &end_points,
        &points,
        instructions,
        bbox,
        streams.has_overlap(glyph_id),
        out,
    );
    Ok(bbox[0])
}

fn with_sign(flag: u8, value: i32) -> i32 {
    if flag & 1 != 0 {
        value
    } else {
        -value
    }
}

/// Decode triplet-encoded coordinates into absolute points
pub(crate) fn decode_triplets(flags: &[u8], data: &mut Reader<'_>) -> Result<Vec<GlyphPoint>, FontError> {
    let mut points = Vec::with_capacity(flags.len());
    let (mut x, mut y) = (0i32, 0i32);

    for &raw in flags {
        let on_curve = raw & 0x80 == 0;
        let flag = raw & 0x7F;

        let (dx, dy) = if flag < 10 {
            let b0 = data.read_u8()? as i32;
            (0, with_sign(flag, ((flag as i32 & 14) << 7) + b0))
        } else if flag < 20 {
            let b0 = data.read_u8()? as i32;
            (with_sign(flag, (((flag as i32 - 10) & 14) << 7) + b0), 0)
        } else if flag < 84 {
            let b0 = flag as i32 - 20;
            let b1 = data.read_u8()? as i32;
            (
                with_sign(flag, 1 + (b0 & 0x30) + (b1 >> 4)),
                with_sign(flag >> 1, 1 + ((b0 & 0x0C) << 2) + (b1 & 0x0F)),
            )
        } else if flag < 120 {
            let b0 = flag as i32 - 84;
            let b1 = data.read_u8()? as i32;
            let b2 = data.read_u8()? as i32;
            (
                with_sign(flag, 1 + ((b0 / 12) << 8) + b1),
                with_sign(flag >> 1, 1 + (((b0 % 12) >> 2) << 8) + b2),
            )
        } else if flag < 124 {
            let b1 = data.read_u8()? as i32;
            let b2 = data.read_u8()? as i32;
            let b3 = data.read_u8()? as i32;
            (
                with_sign(flag, (b1 << 4) + (b2 >> 4)),
                with_sign(flag >> 1, ((b2 & 0x0F) << 8) + b3),
            )
        } else {
            let b1 = data.read_u8()? as i32;
            let b2 = data.read_u8()? as i32;
            let b3 = data.read_u8()? as i32;
            let b4 = data.read_u8()? as i32;
            (
                with_sign(flag, (b1 << 8) + b2),
                with_sign(flag >> 1, (b3 << 8) + b4),
            )
        };

        x += dx;
        y += dy;
        points.push(GlyphPoint { x, y, on_curve });
    }
    Ok(points)
}

fn compute_bbox(points: &[GlyphPoint]) -> [i16; 4] {
    let Some(first) = points.first() else {
        return [0; 4];
    };
    let mut bbox = [first.x, first.y, first.x, first.y];
    for p in points {
        bbox[0] = bbox[0].min(p.x);
        bbox[1] = bbox[1].min(p.y);
        bbox[2] = bbox[2].max(p.x);
        bbox[3] = bbox[3].max(p.y);
    }
    bbox.map(|v| v as i16)
}

/// Write a simple glyph in the standard TrueType encoding
fn encode_simple_glyph(
    end_points: &[u16],
    points: &[GlyphPoint],
    instructions: &[u8],
    bbox: [i16; 4],
    overlap: bool,
    out: &mut Vec<u8>,
) {
    out.extend_from_slice(&(end_points.len() as i16).to_be_bytes());
    for value in bbox {
        out.extend_from_slice(&value.to_be_bytes());
    }
    for end in end_points {
        out.extend_from_slice(&end.to_be_bytes());
    }
    out.extend_from_slice(&(instructions.len() as u16).to_be_bytes());
    out.extend_from_slice(instructions);

    let mut flags: Vec<u8> = Vec::with_capacity(points.len());
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let (mut last_x, mut last_y) = (0i32, 0i32);

    for (i, point) in points.iter().enumerate() {
        let mut flag = if point.on_curve { ON_CURVE } else { 0 };
        if overlap && i == 0 {
            flag |= OVERLAP_SIMPLE;
        }

        let dx = point.x - last_x;
        if dx == 0 {
            flag |= X_SAME_OR_POSITIVE;
        } else if dx.abs() < 256 {
            flag |= X_SHORT;
            if dx > 0 {
                flag |= X_SAME_OR_POSITIVE;
            }
            xs.push(dx.unsigned_abs() as u8);
        } else {
            xs.extend_from_slice(&(dx as i16).to_be_bytes());
        }

        let dy = point.y - last_y;
        if dy == 0 {
            flag |= Y_SAME_OR_POSITIVE;
        } else if dy.abs() < 256 {
            flag |= Y_SHORT;
            if dy > 0 {
                flag |= Y_SAME_OR_POSITIVE;
            }
            ys.push(dy.unsigned_abs() as u8);
        } else {
            ys.extend_from_slice(&(dy as i16).to_be_bytes());
        }

        flags.push(flag);
        last_x = point.x;
        last_y = point.y;
    }

    // Run-length encode repeated flags
    let mut i = 0;
    while i < flags.len() {
        let flag = flags[i];
        let mut run = 1;
        while i + run < flags.len() && flags[i + run] == flag && run < 256 {
            run += 1;
        }
        if run > 1 {
            out.push(flag | REPEAT);
            out.push((run - 1) as u8);
        } else {
            out.push(flag);
        }
        i += run;
    }
    out.extend_from_slice(&xs);
    out.extend_from_slice(&ys);
}

fn encode_loca(offsets: &[usize], index_format: u16) -> Result<Vec<u8>, FontError> {
    let mut loca = Vec::with_capacity(offsets.len() * if index_format == 0 { 2 } else { 4 });
    for &offset in offsets {
        if index_format == 0 {
            let half = offset / 2;
            if half > u16::MAX as usize {
                return Err(FontError::malformed("glyf too large for short loca"));
            }
            loca.extend_from_slice(&(half as u16).to_be_bytes());
        } else {
            loca.extend_from_slice(&(offset as u32).to_be_bytes());
        }
    }
    Ok(loca)
}
