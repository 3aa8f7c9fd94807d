//! PDF writer: turn a paginated [`OutputDocument`] into PDF bytes with lopdf.
//!
//! Every page gets its own content stream. Each line is drawn in its own
//! text object:
//!
//! ```text
//! BT /F1 12 Tf 10 750 Td (line text) Tj ET
//! ```
//!
//! Two font modes:
//!
//! * no [`UnicodeFont`]: one of the 14 standard Type1 fonts with
//!   WinAnsiEncoding, nothing embedded. A character outside WinAnsi fails
//!   the render with `RenderFailed`; text is never replaced.
//! * a [`UnicodeFont`]: embedded as a Type0 font with Identity-H encoding.
//!   Strings are glyph IDs and a ToUnicode CMap maps them back to text, so
//!   the output stays searchable and extractable.
//!
//! No dates or IDs are written, so output is byte-identical across runs.

use super::font::{Outlines, UnicodeFont};
use super::paginate::{OutputDocument, RenderedPage};
use crate::config::{BaseFont, PageLayout};
use crate::error::TranslateError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;
use tracing::debug;
use ttf_parser::Face;

const FONT_RESOURCE: &str = "F1";

/// Serialise `document` as a PDF 1.7 file.
///
/// With `font` unset, every character must be representable in WinAnsi.
pub fn render_pdf(
    document: &OutputDocument,
    font: Option<&UnicodeFont>,
) -> Result<Vec<u8>, TranslateError> {
    let layout = document.layout();
    let mut encoder = match font {
        Some(font) => TextEncoder::Embedded(EmbeddedText::new(font)?),
        None => TextEncoder::Standard(layout.font),
    };

    let mut contents = Vec::with_capacity(document.page_count());
    for page in document.pages() {
        let content = page_content(page, layout, &mut encoder)?;
        let encoded = content
            .encode()
            .map_err(|e| TranslateError::RenderFailed(format!("page {}: {}", page.number, e)))?;
        contents.push(encoded);
    }

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = encoder.write_font(&mut doc);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(contents.len());
    for encoded in contents {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => media_box(layout),
        }),
    );

    let catalog_id: ObjectId = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| TranslateError::RenderFailed(e.to_string()))?;

    debug!(
        "Rendered {} page(s), {} line(s) into {} bytes",
        document.page_count(),
        document.line_count(),
        buffer.len()
    );
    Ok(buffer)
}

fn media_box(layout: &PageLayout) -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(layout.width),
        Object::Real(layout.height),
    ]
}

fn page_content(
    page: &RenderedPage,
    layout: &PageLayout,
    encoder: &mut TextEncoder<'_>,
) -> Result<Content, TranslateError> {
    let mut operations = Vec::with_capacity(page.lines.len() * 5);
    for (index, line) in page.lines.iter().enumerate() {
        if line.text.is_empty() {
            continue;
        }
        let shown = encoder.encode(&line.text).map_err(|c| {
            TranslateError::RenderFailed(format!(
                "page {}, line {}: {}",
                page.number,
                index + 1,
                encoder.describe_missing(c)
            ))
        })?;
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![FONT_RESOURCE.into(), Object::Real(layout.font_size)],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Real(line.x), Object::Real(line.y)],
        ));
        operations.push(Operation::new("Tj", vec![shown]));
        operations.push(Operation::new("ET", vec![]));
    }
    Ok(Content { operations })
}

enum TextEncoder<'a> {
    Standard(BaseFont),
    Embedded(EmbeddedText<'a>),
}

impl TextEncoder<'_> {
    /// The `Tj` operand for `text`, or the first character the font cannot show.
    fn encode(&mut self, text: &str) -> Result<Object, char> {
        match self {
            TextEncoder::Standard(_) => {
                encode_win_ansi(text).map(|bytes| Object::String(bytes, StringFormat::Literal))
            }
            TextEncoder::Embedded(embedded) => embedded.encode(text),
        }
    }

    fn describe_missing(&self, c: char) -> String {
        match self {
            TextEncoder::Standard(base) => format!(
                "'{}' (U+{:04X}) is outside WinAnsi and cannot be shown in {}; \
configure a Unicode font (--font) for this language",
                c,
                c as u32,
                base.pdf_name()
            ),
            TextEncoder::Embedded(embedded) => format!(
                "font '{}' has no glyph for '{}' (U+{:04X})",
                embedded.font.path().display(),
                c,
                c as u32
            ),
        }
    }

    fn write_font(self, doc: &mut Document) -> ObjectId {
        match self {
            TextEncoder::Standard(base) => doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base.pdf_name(),
                "Encoding" => "WinAnsiEncoding",
            }),
            TextEncoder::Embedded(embedded) => embedded.write(doc),
        }
    }
}

/// Glyph encoding state for an embedded font: which glyphs the document
/// uses, and the character each one stands for.
struct EmbeddedText<'a> {
    font: &'a UnicodeFont,
    face: Face<'a>,
    used: BTreeMap<u16, char>,
}

impl<'a> EmbeddedText<'a> {
    fn new(font: &'a UnicodeFont) -> Result<Self, TranslateError> {
        Ok(Self {
            font,
            face: font.face()?,
            used: BTreeMap::new(),
        })
    }

    fn encode(&mut self, text: &str) -> Result<Object, char> {
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for c in text.chars() {
            let c = if c.is_control() { ' ' } else { c };
            let glyph = self.face.glyph_index(c).ok_or(c)?;
            self.used.entry(glyph.0).or_insert(c);
            bytes.extend_from_slice(&glyph.0.to_be_bytes());
        }
        Ok(Object::String(bytes, StringFormat::Hexadecimal))
    }

    fn scale(&self, units: i32) -> i64 {
        (units as f32 * 1000.0 / self.face.units_per_em() as f32).round() as i64
    }

    // TODO: subset the font program to the used glyphs; CJK fonts embed whole.
    fn write(self, doc: &mut Document) -> ObjectId {
        let name = self.font.postscript_name().as_bytes().to_vec();
        let face = &self.face;
        let bbox = face.global_bounding_box();

        let (file_key, file_stream) = match self.font.outlines() {
            Outlines::TrueType => (
                "FontFile2",
                Stream::new(
                    dictionary! { "Length1" => self.font.data().len() as i64 },
                    self.font.data().to_vec(),
                ),
            ),
            Outlines::Cff => (
                "FontFile3",
                Stream::new(
                    dictionary! { "Subtype" => "OpenType" },
                    self.font.data().to_vec(),
                ),
            ),
        };
        let file_id = doc.add_object(file_stream);

        let ascent = self.scale(face.ascender().into());
        let cap_height = face.capital_height().map_or(ascent, |h| self.scale(h.into()));
        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => Object::Name(name.clone()),
            "Flags" => Object::Integer(4),
            "FontBBox" => vec![
                Object::Integer(self.scale(bbox.x_min.into())),
                Object::Integer(self.scale(bbox.y_min.into())),
                Object::Integer(self.scale(bbox.x_max.into())),
                Object::Integer(self.scale(bbox.y_max.into())),
            ],
            "ItalicAngle" => Object::Integer(0),
            "Ascent" => Object::Integer(ascent),
            "Descent" => Object::Integer(self.scale(face.descender().into())),
            "CapHeight" => Object::Integer(cap_height),
            "StemV" => Object::Integer(80),
            file_key => file_id,
        });

        let mut widths = Vec::with_capacity(self.used.len() * 2);
        for &glyph in self.used.keys() {
            let advance = face
                .glyph_hor_advance(ttf_parser::GlyphId(glyph))
                .unwrap_or(0);
            widths.push(Object::Integer(glyph.into()));
            widths.push(Object::Array(vec![Object::Integer(
                self.scale(advance.into()),
            )]));
        }

        let mut cid_font = dictionary! {
            "Type" => "Font",
            "Subtype" => match self.font.outlines() {
                Outlines::TrueType => "CIDFontType2",
                Outlines::Cff => "CIDFontType0",
            },
            "BaseFont" => Object::Name(name.clone()),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::String(b"Adobe".to_vec(), StringFormat::Literal),
                "Ordering" => Object::String(b"Identity".to_vec(), StringFormat::Literal),
                "Supplement" => Object::Integer(0),
            },
            "FontDescriptor" => descriptor_id,
            "W" => widths,
        };
        if self.font.outlines() == Outlines::TrueType {
            cid_font.set("CIDToGIDMap", "Identity");
        }
        let cid_font_id = doc.add_object(cid_font);

        let to_unicode_id = doc.add_object(Stream::new(
            Dictionary::new(),
            to_unicode_cmap(&self.used),
        ));

        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => Object::Name(name),
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => to_unicode_id,
        })
    }
}

const CMAP_HEADER: &str = "/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
";

const CMAP_FOOTER: &str = "endcmap
CMapName currentdict /defineresource pop
end
end
";

/// ToUnicode CMap from glyph ID to UTF-16BE. `bfchar` blocks hold at most
/// 100 entries.
fn to_unicode_cmap(used: &BTreeMap<u16, char>) -> Vec<u8> {
    let mut out = String::from(CMAP_HEADER);
    let entries: Vec<(&u16, &char)> = used.iter().collect();
    for block in entries.chunks(100) {
        out.push_str(&format!("{} beginbfchar\n", block.len()));
        for (glyph, c) in block {
            let mut units = [0u16; 2];
            let hex: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{u:04X}"))
                .collect();
            out.push_str(&format!("<{glyph:04X}> <{hex}>\n"));
        }
        out.push_str("endbfchar\n");
    }
    out.push_str(CMAP_FOOTER);
    out.into_bytes()
}

/// Encode text for a WinAnsiEncoding font. Control characters (tabs) become
/// spaces. Returns the first character with no WinAnsi code point.
pub fn encode_win_ansi(text: &str) -> Result<Vec<u8>, char> {
    text.chars()
        .map(|c| {
            if c.is_control() {
                Ok(b' ')
            } else {
                win_ansi_byte(c).ok_or(c)
            }
        })
        .collect()
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}
