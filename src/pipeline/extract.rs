//! Text extraction: load a PDF with pdfium and read each page's text layer.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and is CPU-bound. Loading runs on tokio's blocking pool so the async
//! workers stay free for backend I/O.
//!
//! Once loaded, a [`SourceDocument`] owns plain strings only; pdfium is
//! dropped before this module returns.

use super::input::SourceBytes;
use crate::config::TranslationConfig;
use crate::error::TranslateError;
use pdfium_render::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One source page and the text pdfium found on it (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcePage {
    /// 1-based page number.
    pub number: usize,
    pub text: String,
}

/// A loaded source document. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    name: String,
    pages: Vec<SourcePage>,
}

impl SourceDocument {
    /// Build a document from already-extracted page texts, in order.
    ///
    /// Page text is normalised exactly as pdfium output is.
    pub fn from_page_texts<I, S>(name: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(i, t)| SourcePage {
                number: i + 1,
                text: normalize_page_text(t.as_ref()),
            })
            .collect();
        Self {
            name: name.into(),
            pages,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pages(&self) -> &[SourcePage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// The document's text as one stream, pages separated by `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when nothing but whitespace was extracted.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Concatenate page texts in order, one `\n` between pages.
///
/// Empty pages contribute an empty segment; zero pages give empty text.
pub fn extract(document: &SourceDocument) -> ExtractedText {
    let text = document
        .pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    debug!(
        "Extracted {} chars from {} page(s) of '{}'",
        text.chars().count(),
        document.page_count(),
        document.name
    );
    ExtractedText(text)
}

/// Load a PDF and read every page's text.
pub async fn load_document(
    source: SourceBytes,
    config: &TranslationConfig,
) -> Result<SourceDocument, TranslateError> {
    let password = config.password.clone();
    let library_path = config.pdfium_library_path.clone();

    tokio::task::spawn_blocking(move || {
        load_document_blocking(source, password.as_deref(), library_path.as_deref())
    })
    .await
    .map_err(|e| TranslateError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Blocking implementation of [`load_document`].
fn load_document_blocking(
    source: SourceBytes,
    password: Option<&str>,
    library_path: Option<&Path>,
) -> Result<SourceDocument, TranslateError> {
    let pdfium = bind_pdfium(library_path)?;

    let document = pdfium
        .load_pdf_from_byte_slice(&source.bytes, password)
        .map_err(|e| classify_load_error(&source.name, password.is_some(), &format!("{:?}", e)))?;

    let pages = document.pages();
    let total = pages.len() as usize;
    info!("PDF '{}' loaded: {} pages", source.name, total);

    let mut out = Vec::with_capacity(total);
    for (index, page) in pages.iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| TranslateError::ExtractionFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })?
            .all();
        debug!("Page {}: {} chars", index + 1, text.chars().count());
        out.push(SourcePage {
            number: index + 1,
            text: normalize_page_text(&text),
        });
    }

    Ok(SourceDocument {
        name: source.name.clone(),
        pages: out,
    })
}

fn bind_pdfium(library_path: Option<&Path>) -> Result<Pdfium, TranslateError> {
    let bindings = match library_path {
        Some(path) => Pdfium::bind_to_library(resolve_library_file(path)),
        None => Pdfium::bind_to_system_library(),
    };
    bindings
        .map(Pdfium::new)
        .map_err(|e| TranslateError::PdfiumBindingFailed(e.to_string()))
}

/// Accept either the library file itself or the directory containing it.
fn resolve_library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

fn classify_load_error(name: &str, had_password: bool, detail: &str) -> TranslateError {
    if detail.contains("Password") || detail.contains("password") {
        if had_password {
            TranslateError::WrongPassword {
                name: name.to_string(),
            }
        } else {
            TranslateError::PasswordRequired {
                name: name.to_string(),
            }
        }
    } else {
        TranslateError::CorruptPdf {
            name: name.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// Unify line endings to `\n` and drop control characters other than
/// newline and tab.
fn normalize_page_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_joined_with_newline() {
        let doc = SourceDocument::from_page_texts("d", ["一ページ", "", "三ページ"]);
        assert_eq!(extract(&doc).as_str(), "一ページ\n\n三ページ");
    }

    #[test]
    fn zero_pages_give_empty_text() {
        let doc = SourceDocument::from_page_texts("d", Vec::<String>::new());
        let text = extract(&doc);
        assert_eq!(doc.page_count(), 0);
        assert_eq!(text.as_str(), "");
        assert!(text.is_blank());
    }

    #[test]
    fn blank_pages_are_blank_text() {
        let doc = SourceDocument::from_page_texts("d", [" ", "\n", ""]);
        assert!(extract(&doc).is_blank());
    }

    #[test]
    fn page_text_is_normalized() {
        let doc = SourceDocument::from_page_texts("d", ["a\r\nb\rc\u{0}\u{c}d\te"]);
        assert_eq!(doc.pages()[0].text, "a\nb\ncd\te");
        assert_eq!(doc.pages()[0].number, 1);
    }

    #[test]
    fn load_errors_classified_by_message() {
        assert!(matches!(
            classify_load_error("x", false, "PdfiumLibraryInternalError(PasswordError)"),
            TranslateError::PasswordRequired { .. }
        ));
        assert!(matches!(
            classify_load_error("x", true, "PasswordError"),
            TranslateError::WrongPassword { .. }
        ));
        assert!(matches!(
            classify_load_error("x", false, "FormatError"),
            TranslateError::CorruptPdf { .. }
        ));
    }

    #[test]
    fn char_count_counts_scalars() {
        assert_eq!(ExtractedText::new("日本語").char_count(), 3);
    }
}
