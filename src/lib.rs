//! # pdftranslate
//!
//! Translate the text of a PDF and re-render it as a new, paginated PDF.
//!
//! The source layout is not preserved: text is pulled from each page's text
//! layer, sent through a translation backend, and laid out line by line on
//! fixed-size pages in a standard font.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Input      read the stream, check the %PDF header
//!  ├─ 2. Extract    page text via pdfium (spawn_blocking), joined with '\n'
//!  ├─ 3. Translate  validate target, chunk by lines, call the backend in order
//!  ├─ 4. Paginate   place lines top-to-bottom, break at the bottom margin
//!  ├─ 5. Render     write the pages as PDF 1.7 (lopdf), optional embedded font
//!  └─ 6. Bundle     optional zip: PDF + JSON translation record
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdftranslate::{translate_pdf_file, BackendConfig, MachineConfig, TranslationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TranslationConfig::builder()
//!         .backend(BackendConfig::Machine(MachineConfig {
//!             api_key: std::env::var("GOOGLE_TRANSLATE_API_KEY").ok(),
//!             ..Default::default()
//!         }))
//!         .build()?;
//!     let output = translate_pdf_file("document.pdf", "es", &config).await?;
//!     std::fs::write("translated_document_es.pdf", &output.pdf)?;
//!     eprintln!("{} page(s) written", output.stats.output_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Backends
//!
//! | Backend | Target identifiers | Default source |
//! |---------|--------------------|----------------|
//! | `machine` | ISO codes (`es`, `zh-CN`) | `ja` |
//! | `llm` | language names (`Spanish`) | `Japanese` |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdftranslate` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdftranslate = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod bundle;
pub mod config;
pub mod convert;
pub mod error;
pub mod languages;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{BackendRequest, TranslationBackend};
pub use config::{
    BackendConfig, BackendKind, BaseFont, LlmConfig, MachineConfig, PageLayout, TranslationConfig,
    TranslationConfigBuilder,
};
pub use convert::{
    document_info, inspect_file, translate_pdf, translate_pdf_file, translate_pdf_sync,
    translate_pdf_to_file, translate_source,
};
pub use error::{BackendError, ErrorCategory, TranslateError};
pub use languages::{Language, LanguageSet};
pub use output::{Bundle, DocumentInfo, TranslationOutput, TranslationRecord, TranslationStats};
pub use pipeline::extract::{ExtractedText, SourceDocument};
pub use pipeline::font::UnicodeFont;
pub use pipeline::paginate::{OutputDocument, PlacedLine, RenderedPage};
pub use pipeline::translate::{TranslationRequest, TranslationResult, Translator};
