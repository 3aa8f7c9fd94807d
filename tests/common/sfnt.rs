//! A minimal TrueType font built in memory for tests.
//!
//! Every requested character maps to its own empty glyph with a 600-unit
//! advance; glyph 0 is `.notdef`. Enough for ttf-parser, pdfium text
//! extraction, and ToUnicode checks, without shipping a font file.

/// A font whose cmap covers exactly the characters of `chars`.
pub fn build_test_font(chars: &str) -> Vec<u8> {
    let mut mapped: Vec<char> = chars.chars().collect();
    mapped.sort_unstable();
    mapped.dedup();
    let num_glyphs = (mapped.len() + 1) as u16;

    // Sorted by tag.
    let tables: Vec<(&[u8; 4], Vec<u8>)> = vec![
        (b"cmap", cmap(&mapped)),
        (b"glyf", vec![0; 4]),
        (b"head", head()),
        (b"hhea", hhea(num_glyphs)),
        (b"hmtx", hmtx(num_glyphs)),
        (b"loca", vec![0; 2 * (num_glyphs as usize + 1)]),
        (b"maxp", maxp(num_glyphs)),
        (b"name", name("PdfTranslateTest")),
    ];

    let count = tables.len() as u16;
    let mut power = 1u16;
    let mut selector = 0u16;
    while power * 2 <= count {
        power *= 2;
        selector += 1;
    }

    let mut out = Vec::new();
    put_u32(&mut out, 0x0001_0000);
    put_u16(&mut out, count);
    put_u16(&mut out, power * 16);
    put_u16(&mut out, selector);
    put_u16(&mut out, count * 16 - power * 16);

    let mut offset = 12 + 16 * tables.len();
    let mut body = Vec::new();
    for (tag, data) in &tables {
        out.extend_from_slice(&tag[..]);
        put_u32(&mut out, 0);
        put_u32(&mut out, offset as u32);
        put_u32(&mut out, data.len() as u32);

        body.extend_from_slice(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
        offset = 12 + 16 * tables.len() + body.len();
    }
    out.extend_from_slice(&body);
    out
}

fn head() -> Vec<u8> {
    let mut t = Vec::new();
    put_u32(&mut t, 0x0001_0000); // version
    put_u32(&mut t, 0x0001_0000); // fontRevision
    put_u32(&mut t, 0); // checksumAdjustment
    put_u32(&mut t, 0x5F0F_3CF5); // magic
    put_u16(&mut t, 0); // flags
    put_u16(&mut t, 1000); // unitsPerEm
    t.extend_from_slice(&[0; 16]); // created, modified
    put_i16(&mut t, 0);
    put_i16(&mut t, -200);
    put_i16(&mut t, 1000);
    put_i16(&mut t, 800);
    put_u16(&mut t, 0); // macStyle
    put_u16(&mut t, 8); // lowestRecPPEM
    put_i16(&mut t, 2); // fontDirectionHint
    put_i16(&mut t, 0); // indexToLocFormat: short
    put_i16(&mut t, 0); // glyphDataFormat
    t
}

fn hhea(num_glyphs: u16) -> Vec<u8> {
    let mut t = Vec::new();
    put_u32(&mut t, 0x0001_0000);
    put_i16(&mut t, 800); // ascender
    put_i16(&mut t, -200); // descender
    put_i16(&mut t, 0); // lineGap
    put_u16(&mut t, 600); // advanceWidthMax
    put_i16(&mut t, 0);
    put_i16(&mut t, 0);
    put_i16(&mut t, 600);
    put_i16(&mut t, 1); // caretSlopeRise
    put_i16(&mut t, 0);
    put_i16(&mut t, 0);
    t.extend_from_slice(&[0; 8]); // reserved
    put_i16(&mut t, 0); // metricDataFormat
    put_u16(&mut t, num_glyphs);
    t
}

fn hmtx(num_glyphs: u16) -> Vec<u8> {
    let mut t = Vec::new();
    for _ in 0..num_glyphs {
        put_u16(&mut t, 600);
        put_i16(&mut t, 0);
    }
    t
}

fn maxp(num_glyphs: u16) -> Vec<u8> {
    let mut t = Vec::new();
    put_u32(&mut t, 0x0000_5000);
    put_u16(&mut t, num_glyphs);
    t
}

/// Format 12 subtable under Windows / Unicode full repertoire.
fn cmap(chars: &[char]) -> Vec<u8> {
    let mut t = Vec::new();
    put_u16(&mut t, 0);
    put_u16(&mut t, 1);
    put_u16(&mut t, 3);
    put_u16(&mut t, 10);
    put_u32(&mut t, 12);

    put_u16(&mut t, 12);
    put_u16(&mut t, 0);
    put_u32(&mut t, 16 + 12 * chars.len() as u32);
    put_u32(&mut t, 0);
    put_u32(&mut t, chars.len() as u32);
    for (i, c) in chars.iter().enumerate() {
        put_u32(&mut t, *c as u32);
        put_u32(&mut t, *c as u32);
        put_u32(&mut t, i as u32 + 1);
    }
    t
}

/// A single PostScript-name record, Windows platform, UTF-16BE.
fn name(postscript: &str) -> Vec<u8> {
    let encoded: Vec<u8> = postscript
        .encode_utf16()
        .flat_map(|u| u.to_be_bytes())
        .collect();
    let mut t = Vec::new();
    put_u16(&mut t, 0); // format
    put_u16(&mut t, 1); // count
    put_u16(&mut t, 6 + 12); // storage offset
    put_u16(&mut t, 3); // platform
    put_u16(&mut t, 1); // encoding
    put_u16(&mut t, 0x0409); // language
    put_u16(&mut t, 6); // PostScript name
    put_u16(&mut t, encoded.len() as u16);
    put_u16(&mut t, 0);
    t.extend_from_slice(&encoded);
    t
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_i16(out: &mut Vec<u8>, v: i16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}
