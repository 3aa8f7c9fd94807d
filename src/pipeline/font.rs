//! Unicode font embedded in the output PDF.
//!
//! The standard Type1 fonts only cover WinAnsi. Anything else (Cyrillic,
//! CJK, Hangul) needs a real font program, which is loaded here and
//! embedded by the renderer as a Type0 font with Identity-H encoding.

use crate::error::TranslateError;
use std::fmt;
use std::path::{Path, PathBuf};
use ttf_parser::{name_id, Face};

/// Glyph outline format of a font program. Decides how it is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outlines {
    /// `glyf` outlines: CIDFontType2 + FontFile2.
    TrueType,
    /// `CFF ` outlines: CIDFontType0 + FontFile3/OpenType.
    Cff,
}

/// A single TrueType or OpenType font, validated and ready to embed.
#[derive(Clone)]
pub struct UnicodeFont {
    path: PathBuf,
    data: Vec<u8>,
    postscript_name: String,
    outlines: Outlines,
}

impl fmt::Debug for UnicodeFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnicodeFont")
            .field("path", &self.path)
            .field("postscript_name", &self.postscript_name)
            .field("outlines", &self.outlines)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl UnicodeFont {
    /// Read and validate a font file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, TranslateError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| font_error(path, e.to_string()))?;
        Self::from_bytes(path, data)
    }

    /// Validate an in-memory font program. `path` is only used in messages.
    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<Self, TranslateError> {
        let path = path.into();
        if ttf_parser::fonts_in_collection(&data).is_some() {
            return Err(font_error(
                &path,
                "font collections (.ttc) are not supported, use a single .ttf or .otf",
            ));
        }

        let (postscript_name, outlines) = {
            let face = Face::parse(&data, 0).map_err(|e| font_error(&path, e.to_string()))?;
            let tables = face.tables();
            let outlines = if tables.glyf.is_some() {
                Outlines::TrueType
            } else if tables.cff.is_some() {
                Outlines::Cff
            } else {
                return Err(font_error(&path, "font has no glyf or CFF outlines"));
            };
            (postscript_name(&face), outlines)
        };

        Ok(Self {
            path,
            data,
            postscript_name,
            outlines,
        })
    }

    /// Parse the font again for glyph lookups. Never fails for a font that
    /// passed [`UnicodeFont::from_bytes`].
    pub fn face(&self) -> Result<Face<'_>, TranslateError> {
        Face::parse(&self.data, 0).map_err(|e| font_error(&self.path, e.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// PostScript name, reduced to characters valid in a PDF name.
    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    pub fn outlines(&self) -> Outlines {
        self.outlines
    }
}

fn postscript_name(face: &Face<'_>) -> String {
    face.names()
        .into_iter()
        .filter(|n| n.name_id == name_id::POST_SCRIPT_NAME)
        .find_map(|n| n.to_string())
        .map(|n| {
            n.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect::<String>()
        })
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "EmbeddedFont".to_string())
}

fn font_error(path: &Path, reason: impl Into<String>) -> TranslateError {
    TranslateError::FontLoadFailed {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}
