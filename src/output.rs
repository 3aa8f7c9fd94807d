//! Result types returned by the translation entry points.

use crate::pipeline::paginate::OutputDocument;
use serde::{Deserialize, Serialize};

/// Everything one translation run produced.
#[derive(Debug, Clone)]
pub struct TranslationOutput {
    /// The rendered PDF.
    pub pdf: Vec<u8>,
    /// The paginated layout the PDF was rendered from.
    pub document: OutputDocument,
    /// Full translated text, before any font-encoding substitution.
    pub translated_text: String,
    /// Present only when bundling was requested.
    pub bundle: Option<Bundle>,
    pub stats: TranslationStats,
}

/// JSON record stored next to the PDF in a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    pub source_language: String,
    pub target_language: String,
    pub translated_text: String,
}

/// The optional bundle: the record plus a zip archive holding the PDF and
/// the record.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub record: TranslationRecord,
    pub archive: Vec<u8>,
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationStats {
    pub source_pages: usize,
    pub extracted_chars: usize,
    pub chunks: usize,
    pub backend_calls: usize,
    pub translated_lines: usize,
    pub output_pages: usize,
    pub extract_duration_ms: u64,
    pub translate_duration_ms: u64,
    pub render_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Summary of a source PDF, produced without any backend call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub name: String,
    pub page_count: usize,
    /// Extracted characters per page, in page order.
    pub chars_per_page: Vec<usize>,
}

impl DocumentInfo {
    pub fn total_chars(&self) -> usize {
        self.chars_per_page.iter().sum()
    }

    /// True when no page has any extractable text.
    pub fn is_blank(&self) -> bool {
        self.total_chars() == 0
    }
}
