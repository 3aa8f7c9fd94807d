//! Translation entry points.
//!
//! Every entry point runs the same strictly sequential pipeline:
//!
//! 1. validate the target language (no I/O, no backend) and load the output
//!    font, if one is configured
//! 2. read and load the source PDF
//! 3. extract text; blank text stops here with `EmptyContent`
//! 4. translate through the configured backend
//! 5. paginate and render the output PDF
//! 6. bundle, if requested
//!
//! Each request owns all of its state; a shared [`Translator`] holds only
//! immutable configuration and the backend handle.

use crate::bundle;
use crate::config::TranslationConfig;
use crate::error::TranslateError;
use crate::output::{DocumentInfo, TranslationOutput, TranslationRecord, TranslationStats};
use crate::pipeline::extract::{self, SourceDocument};
use crate::pipeline::font::UnicodeFont;
use crate::pipeline::input::{self, SourceBytes};
use crate::pipeline::paginate;
use crate::pipeline::render;
use crate::pipeline::translate::Translator;
use std::path::Path;
use std::time::Instant;
use tokio::io::AsyncRead;
use tracing::{debug, info};

/// Translate a PDF read from `reader` into `target`.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// - `UnsupportedLanguage` before anything is read
/// - `SourceRead` / `NotAPdf` / pdfium load errors
/// - `EmptyContent` when the PDF has no text layer
/// - `TranslationBackend` on the first failed backend call
/// - `RenderFailed` if the output cannot be serialised
///
/// # Example
/// ```rust,no_run
/// use pdftranslate::{translate_pdf, TranslationConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let file = tokio::fs::File::open("document.pdf").await?;
/// let config = TranslationConfig::default();
/// let output = translate_pdf(file, "es", &config).await?;
/// std::fs::write("translated.pdf", &output.pdf)?;
/// # Ok(())
/// # }
/// ```
pub async fn translate_pdf<R>(
    reader: R,
    target: &str,
    config: &TranslationConfig,
) -> Result<TranslationOutput, TranslateError>
where
    R: AsyncRead + Unpin,
{
    let translator = Translator::from_config(config)?;
    translator.validate_target(target)?;
    let source = input::read_source(reader, "upload").await?;
    translate_bytes_with(source, target, &translator, config).await
}

/// Translate a local PDF file.
pub async fn translate_pdf_file(
    path: impl AsRef<Path>,
    target: &str,
    config: &TranslationConfig,
) -> Result<TranslationOutput, TranslateError> {
    let path = path.as_ref();
    let translator = Translator::from_config(config)?;
    translator.validate_target(target)?;
    let source = input::read_source_file(path).await?;
    translate_bytes_with(source, target, &translator, config).await
}

/// Translate a PDF and write the result to `output_path`.
///
/// Writes the zip bundle when `config.bundle` is set, the PDF otherwise.
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn translate_pdf_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    target: &str,
    config: &TranslationConfig,
) -> Result<TranslationStats, TranslateError> {
    let output = translate_pdf_file(input_path, target, config).await?;
    let path = output_path.as_ref();

    let bytes = match output.bundle {
        Some(ref bundle) => &bundle.archive,
        None => &output.pdf,
    };
    write_atomic(path, bytes).await?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());

    Ok(output.stats)
}

/// Synchronous wrapper around [`translate_pdf_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn translate_pdf_sync(
    path: impl AsRef<Path>,
    target: &str,
    config: &TranslationConfig,
) -> Result<TranslationOutput, TranslateError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| TranslateError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(translate_pdf_file(path, target, config))
}

/// Run the post-load pipeline on an already-loaded document.
///
/// Useful when the document comes from somewhere other than pdfium, and in
/// tests.
pub async fn translate_source(
    document: SourceDocument,
    target: &str,
    translator: &Translator,
    config: &TranslationConfig,
) -> Result<TranslationOutput, TranslateError> {
    let total_start = Instant::now();
    translator.validate_target(target)?;
    let font = match &config.font_path {
        Some(path) => Some(UnicodeFont::load(path).await?),
        None => None,
    };

    // ── Step 1: Extract ─────────────────────────────────────────────────
    let extract_start = Instant::now();
    let text = extract::extract(&document);
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    if text.is_blank() {
        return Err(TranslateError::EmptyContent {
            pages: document.page_count(),
        });
    }

    // ── Step 2: Translate ───────────────────────────────────────────────
    let translate_start = Instant::now();
    let result = translator.translate(&text, target).await?;
    let translate_duration_ms = translate_start.elapsed().as_millis() as u64;

    // ── Step 3: Paginate + render ───────────────────────────────────────
    let render_start = Instant::now();
    let output_document = paginate::paginate(&result.text, &config.layout);
    let pdf = render::render_pdf(&output_document, font.as_ref())?;
    debug!(
        "Paginated {} line(s) onto {} page(s)",
        output_document.line_count(),
        output_document.page_count()
    );

    // ── Step 4: Bundle (opt-in) ─────────────────────────────────────────
    let bundle = if config.bundle {
        let record = TranslationRecord {
            source_language: translator.source_language().to_string(),
            target_language: target.to_string(),
            translated_text: result.text.clone(),
        };
        Some(bundle::build_bundle(&pdf, record)?)
    } else {
        None
    };
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    let stats = TranslationStats {
        source_pages: document.page_count(),
        extracted_chars: text.char_count(),
        chunks: result.chunks,
        backend_calls: result.backend_calls,
        translated_lines: output_document.line_count(),
        output_pages: output_document.page_count(),
        extract_duration_ms,
        translate_duration_ms,
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Translation complete: {} source page(s) → {} output page(s), {}ms total",
        stats.source_pages, stats.output_pages, stats.total_duration_ms
    );

    Ok(TranslationOutput {
        pdf,
        document: output_document,
        translated_text: result.text,
        bundle,
        stats,
    })
}

/// Page count and extracted characters per page, without any backend.
pub async fn inspect_file(
    path: impl AsRef<Path>,
    config: &TranslationConfig,
) -> Result<DocumentInfo, TranslateError> {
    let source = input::read_source_file(path.as_ref()).await?;
    let document = extract::load_document(source, config).await?;
    Ok(document_info(&document))
}

/// Summarise a loaded document.
pub fn document_info(document: &SourceDocument) -> DocumentInfo {
    DocumentInfo {
        name: document.name().to_string(),
        page_count: document.page_count(),
        chars_per_page: document
            .pages()
            .iter()
            .map(|p| p.text.chars().count())
            .collect(),
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn translate_bytes_with(
    source: SourceBytes,
    target: &str,
    translator: &Translator,
    config: &TranslationConfig,
) -> Result<TranslationOutput, TranslateError> {
    let total_start = Instant::now();
    info!(
        "Starting translation of '{}' ({} bytes) into '{}'",
        source.name,
        source.len(),
        target
    );

    let load_start = Instant::now();
    let document = extract::load_document(source, config).await?;
    let load_ms = load_start.elapsed().as_millis() as u64;
    info!("PDF has {} pages", document.page_count());

    let mut output = translate_source(document, target, translator, config).await?;
    output.stats.extract_duration_ms += load_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(output)
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), TranslateError> {
    let write_err = |e: std::io::Error| TranslateError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_atomic_creates_parent_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("translated_document_es.pdf");
        write_atomic(&path, b"%PDF-1.7").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn document_info_counts_chars() {
        let doc = SourceDocument::from_page_texts("d.pdf", ["日本", "", "abc"]);
        let info = document_info(&doc);
        assert_eq!(info.page_count, 3);
        assert_eq!(info.chars_per_page, vec![2, 0, 3]);
        assert_eq!(info.total_chars(), 5);
        assert!(!info.is_blank());
    }
}
