//! Error types for the pdftranslate library.
//!
//! Two error types map to two layers of the pipeline:
//!
//! * [`TranslateError`]: **fatal** for the request. Every pipeline stage
//!   fails closed, so a request either yields a complete translated document
//!   or one of these. Each variant belongs to exactly one [`ErrorCategory`],
//!   which is what callers (CLI, web handlers) branch on.
//!
//! * [`BackendError`]: a classified failure reported by a
//!   [`crate::backend::TranslationBackend`]. It never escapes on its own; the
//!   translator wraps it in [`TranslateError::TranslationBackend`] together
//!   with the backend name so the cause stays attached.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdftranslate library.
#[derive(Debug, Error)]
pub enum TranslateError {
    // ── Source read errors ────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The source byte stream could not be read to the end.
    #[error("Failed to read source document '{name}': {source}")]
    SourceRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The bytes were read, but they are not a PDF.
    #[error("Source document '{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: Vec<u8> },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{name}' is corrupt: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// pdfium opened the document but failed to read a page's text layer.
    #[error("Text extraction failed for page {page}: {detail}")]
    ExtractionFailed { page: usize, detail: String },

    // ── Content errors ────────────────────────────────────────────────────
    /// Extraction succeeded but produced no text at all (e.g. a scanned
    /// document without a text layer). Nothing is sent to the backend.
    #[error("No extractable text found in {pages} page(s)\nScanned documents need OCR before they can be translated.")]
    EmptyContent { pages: usize },

    /// The requested target language is not in the configured set.
    #[error("Unsupported target language '{code}'\nSupported: {}", join_codes(.supported))]
    UnsupportedLanguage { code: String, supported: Vec<String> },

    // ── Backend errors ────────────────────────────────────────────────────
    /// The translation backend failed. No partial translation is returned.
    #[error("Translation backend '{backend}' failed: {source}")]
    TranslationBackend {
        backend: String,
        #[source]
        source: BackendError,
    },

    // ── Render errors ─────────────────────────────────────────────────────
    /// Building or serialising the output PDF failed.
    #[error("Rendering the output document failed: {0}")]
    RenderFailed(String),

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configured LLM provider could not be created.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    /// The configured output font could not be read or is not usable.
    #[error("Cannot use font '{path}': {reason}")]
    FontLoadFailed { path: PathBuf, reason: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`TranslateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    SourceRead,
    Extraction,
    EmptyContent,
    UnsupportedLanguage,
    TranslationBackend,
    Render,
    Configuration,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::SourceRead => "source_read",
            ErrorCategory::Extraction => "extraction",
            ErrorCategory::EmptyContent => "empty_content",
            ErrorCategory::UnsupportedLanguage => "unsupported_language",
            ErrorCategory::TranslationBackend => "translation_backend",
            ErrorCategory::Render => "render",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TranslateError {
    /// The category this error is reported under.
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslateError::FileNotFound { .. }
            | TranslateError::PermissionDenied { .. }
            | TranslateError::SourceRead { .. } => ErrorCategory::SourceRead,

            TranslateError::NotAPdf { .. }
            | TranslateError::CorruptPdf { .. }
            | TranslateError::PasswordRequired { .. }
            | TranslateError::WrongPassword { .. }
            | TranslateError::ExtractionFailed { .. } => ErrorCategory::Extraction,

            TranslateError::EmptyContent { .. } => ErrorCategory::EmptyContent,
            TranslateError::UnsupportedLanguage { .. } => ErrorCategory::UnsupportedLanguage,
            TranslateError::TranslationBackend { .. } => ErrorCategory::TranslationBackend,

            TranslateError::RenderFailed(_) | TranslateError::OutputWriteFailed { .. } => {
                ErrorCategory::Render
            }

            TranslateError::InvalidConfig(_)
            | TranslateError::ProviderNotConfigured { .. }
            | TranslateError::PdfiumBindingFailed(_)
            | TranslateError::FontLoadFailed { .. } => ErrorCategory::Configuration,

            TranslateError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Whether the user can fix this by changing the input rather than the
    /// deployment (another file, another language).
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::EmptyContent | ErrorCategory::UnsupportedLanguage
        )
    }
}

/// A classified failure from a translation backend.
///
/// Backends map transport and provider errors into these variants so the
/// pipeline can report them uniformly. None of them are retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The call did not complete in time.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// HTTP 429 or an exhausted quota.
    #[error("rate limit or quota exceeded{}", retry_suffix(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    /// Credentials were rejected (401/403).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Any other non-success answer from the service.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Could not reach the service.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered, but not in the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The service answered with no text for a non-empty input.
    #[error("backend returned an empty translation")]
    EmptyResponse,

    /// The backend is missing required settings (API key, endpoint).
    #[error("backend not configured: {0}")]
    NotConfigured(String),
}

fn join_codes(codes: &[String]) -> String {
    codes.join(", ")
}

fn retry_suffix(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(" (retry after {secs}s)"),
        None => String::new(),
    }
}
