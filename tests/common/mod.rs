// Shared fixtures for the integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use grubtheme::{FontError, FontTransport};

/// Longest stored meta-block a four-nibble length can describe
const MAX_STORED_BLOCK: usize = 1 << 16;

/// Wrap `data` in a Brotli stream of uncompressed meta-blocks
pub fn stored_brotli(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, chunk) in data.chunks(MAX_STORED_BLOCK).enumerate() {
        // WBITS=16 is a single zero bit in front of the first block
        let shift = if i == 0 { 1 } else { 0 };
        let header = ((((chunk.len() - 1) as u32) << 3) | (1 << 19)) << shift;
        out.extend_from_slice(&header.to_le_bytes()[..3]);
        out.extend_from_slice(chunk);
    }
    if data.is_empty() {
        // WBITS, ISLAST, ISLASTEMPTY
        out.push(0b110);
    } else {
        // ISLAST, ISLASTEMPTY
        out.push(0b11);
    }
    out
}

fn be16(v: u16) -> [u8; 2] {
    v.to_be_bytes()
}

/// `head` with 1000 units per em and short loca offsets
pub fn head_table() -> Vec<u8> {
    let mut head = vec![0u8; 54];
    head[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    head[12..16].copy_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
    head[18..20].copy_from_slice(&be16(1000));
    head[40..42].copy_from_slice(&be16(60));
    head[42..44].copy_from_slice(&be16(100));
    head
}

pub fn hhea_table(num_hmetrics: u16) -> Vec<u8> {
    let mut hhea = vec![0u8; 36];
    hhea[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    hhea[4..6].copy_from_slice(&be16(800));
    hhea[34..36].copy_from_slice(&be16(num_hmetrics));
    hhea
}

pub fn maxp_table(num_glyphs: u16) -> Vec<u8> {
    let mut maxp = Vec::new();
    maxp.extend_from_slice(&0x0000_5000u32.to_be_bytes());
    maxp.extend_from_slice(&be16(num_glyphs));
    maxp
}

/// Transformed `glyf` holding an empty glyph and a 50x100 rectangle at x=10
pub fn transformed_glyf() -> Vec<u8> {
    let n_contours: Vec<u8> = [0i16, 1].iter().flat_map(|v| v.to_be_bytes()).collect();
    let n_points = vec![4u8];
    // (10,0) (60,0) (60,100) (10,100), all on-curve
    let flags = vec![11u8, 11, 1, 10];
    let glyphs = vec![10u8, 50, 100, 50, 0];
    let composites = Vec::new();
    let bbox = vec![0u8; 4];
    let instructions = Vec::new();
    let streams = [&n_contours, &n_points, &flags, &glyphs, &composites, &bbox, &instructions];

    let mut out = Vec::new();
    for field in [0u16, 0, 2, 0] {
        out.extend_from_slice(&be16(field));
    }
    for stream in streams {
        out.extend_from_slice(&(stream.len() as u32).to_be_bytes());
    }
    for stream in streams {
        out.extend_from_slice(stream);
    }
    out
}

/// Length of the rebuilt short `loca` for [`transformed_glyf`]
pub const SAMPLE_LOCA_LENGTH: u32 = 6;

/// Transformed `hmtx` with advances 0 and 600 and both lsbs derived from glyf
pub fn transformed_hmtx() -> Vec<u8> {
    let mut out = vec![0x01];
    out.extend_from_slice(&be16(0));
    out.extend_from_slice(&be16(600));
    out
}

fn push_base128(out: &mut Vec<u8>, mut value: u32) {
    let mut bytes = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    out.extend(bytes.iter().rev());
}

/// Directory index that is followed by a literal four byte tag
pub const ARBITRARY_TAG_INDEX: u8 = 0x3F;

/// One directory entry: known-tag index, transform version, original and stream lengths
pub struct Woff2Table {
    pub tag_index: u8,
    pub version: u8,
    pub orig_length: u32,
    pub data: Vec<u8>,
    pub transformed: bool,
}

impl Woff2Table {
    /// Untransformed table stored under its known-tag index
    pub fn plain(tag_index: u8, data: Vec<u8>) -> Self {
        Self {
            tag_index,
            version: 0,
            orig_length: data.len() as u32,
            data,
            transformed: false,
        }
    }
}

/// Assemble a WOFF2 file with a stored Brotli stream
pub fn build_woff2(tables: &[Woff2Table]) -> Vec<u8> {
    let tagged: Vec<(&Woff2Table, Option<[u8; 4]>)> = tables.iter().map(|table| (table, None)).collect();
    build_woff2_tagged(&tagged)
}

/// Like [`build_woff2`], with a literal tag for entries using [`ARBITRARY_TAG_INDEX`]
pub fn build_woff2_tagged(tables: &[(&Woff2Table, Option<[u8; 4]>)]) -> Vec<u8> {
    let mut directory = Vec::new();
    let mut stream = Vec::new();
    let mut total_sfnt_size = 12 + 16 * tables.len() as u32;
    for (table, tag) in tables {
        directory.push(table.tag_index | (table.version << 6));
        if let Some(tag) = tag {
            directory.extend_from_slice(tag);
        }
        push_base128(&mut directory, table.orig_length);
        total_sfnt_size += (table.orig_length + 3) & !3;
        if table.transformed {
            push_base128(&mut directory, table.data.len() as u32);
        }
        stream.extend_from_slice(&table.data);
    }
    let compressed = stored_brotli(&stream);

    let total = 48 + directory.len() + compressed.len();
    let mut out = Vec::new();
    out.extend_from_slice(b"wOF2");
    out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    out.extend_from_slice(&(total as u32).to_be_bytes());
    out.extend_from_slice(&be16(tables.len() as u16));
    out.extend_from_slice(&be16(0));
    out.extend_from_slice(&total_sfnt_size.to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.resize(48, 0);
    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    out
}

/// Two-glyph font exercising the glyf, loca and hmtx transforms
pub fn sample_woff2() -> Vec<u8> {
    let plain = Woff2Table::plain;
    build_woff2(&[
        plain(1, head_table()),
        plain(2, hhea_table(2)),
        Woff2Table {
            tag_index: 3,
            version: 1,
            orig_length: 8,
            data: transformed_hmtx(),
            transformed: true,
        },
        plain(4, maxp_table(2)),
        Woff2Table {
            tag_index: 10,
            version: 0,
            orig_length: 24,
            data: transformed_glyf(),
            transformed: true,
        },
        Woff2Table {
            tag_index: 11,
            version: 0,
            orig_length: SAMPLE_LOCA_LENGTH,
            data: Vec::new(),
            transformed: true,
        },
    ])
}

/// Stylesheet declaring `url` the way the font service does
pub fn stylesheet(family: &str, url: &str) -> String {
    format!(
        "@font-face {{\n  font-family: '{}';\n  font-style: normal;\n  font-weight: 400;\n  src: url({}) format('woff2');\n}}\n",
        family, url
    )
}

/// Requests seen by a [`RecordingTransport`], shared with the test body
#[derive(Clone, Default)]
pub struct RequestLog(Rc<RefCell<Vec<(String, Option<String>)>>>);

impl RequestLog {
    fn push(&self, url: &str, user_agent: Option<&str>) {
        self.0
            .borrow_mut()
            .push((url.to_string(), user_agent.map(str::to_string)));
    }

    pub fn urls(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn user_agents(&self) -> Vec<Option<String>> {
        self.0.borrow().iter().map(|(_, ua)| ua.clone()).collect()
    }
}

/// Transport answering from fixed maps and recording every request
#[derive(Default)]
pub struct RecordingTransport {
    pub stylesheets: HashMap<String, String>,
    pub binaries: HashMap<String, Vec<u8>>,
    log: RequestLog,
}

impl RecordingTransport {
    pub fn with_stylesheet(mut self, url: &str, css: String) -> Self {
        self.stylesheets.insert(url.to_string(), css);
        self
    }

    pub fn with_binary(mut self, url: &str, data: Vec<u8>) -> Self {
        self.binaries.insert(url.to_string(), data);
        self
    }

    /// Handle that stays readable after the transport moves into a fetcher
    pub fn log(&self) -> RequestLog {
        self.log.clone()
    }
}

impl FontTransport for RecordingTransport {
    fn fetch_stylesheet(&self, url: &str, user_agent: &str) -> Result<String, FontError> {
        self.log.push(url, Some(user_agent));
        self.stylesheets.get(url).cloned().ok_or_else(|| FontError::Status {
            url: url.to_string(),
            status: 404,
        })
    }

    fn fetch_binary(&self, url: &str) -> Result<Vec<u8>, FontError> {
        self.log.push(url, None);
        self.binaries.get(url).cloned().ok_or_else(|| FontError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}
