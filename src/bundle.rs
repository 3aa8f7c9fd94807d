//! Bundle packaging: the JSON translation record and the zip archive.
//!
//! Archive layout:
//!
//! ```text
//! translated_document_<target>.pdf
//! translation_<target>.json
//! ```
//!
//! Entry timestamps are pinned to the zip epoch (1980-01-01) so the same
//! inputs always give the same archive bytes.

use crate::error::TranslateError;
use crate::output::{Bundle, TranslationRecord};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Pretty-printed UTF-8 JSON for `record`. Non-ASCII text is written as-is,
/// not `\u` escaped.
pub fn record_json(record: &TranslationRecord) -> Result<String, TranslateError> {
    serde_json::to_string_pretty(record)
        .map_err(|e| TranslateError::RenderFailed(format!("translation record: {e}")))
}

/// Build the bundle for a rendered PDF.
pub fn build_bundle(pdf: &[u8], record: TranslationRecord) -> Result<Bundle, TranslateError> {
    let json = record_json(&record)?;
    let target = sanitize_component(&record.target_language);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    add_entry(
        &mut zip,
        &format!("translated_document_{target}.pdf"),
        pdf,
        options,
    )?;
    add_entry(
        &mut zip,
        &format!("translation_{target}.json"),
        json.as_bytes(),
        options,
    )?;

    let archive = zip
        .finish()
        .map_err(|e| TranslateError::RenderFailed(format!("bundle archive: {e}")))?
        .into_inner();

    Ok(Bundle { record, archive })
}

fn add_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> Result<(), TranslateError> {
    zip.start_file(name, options)
        .map_err(|e| TranslateError::RenderFailed(format!("bundle entry '{name}': {e}")))?;
    zip.write_all(bytes)
        .map_err(|e| TranslateError::RenderFailed(format!("bundle entry '{name}': {e}")))
}

/// Default output file name for a translation into `target`.
pub fn output_file_name(target: &str, bundled: bool) -> String {
    let ext = if bundled { "zip" } else { "pdf" };
    format!("translated_document_{}.{ext}", sanitize_component(target))
}

/// Keep `[A-Za-z0-9_-]`, map everything else to `_`.
fn sanitize_component(s: &str) -> String {
    let out: String = s
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() {
        "unknown".to_string()
    } else {
        out
    }
}
