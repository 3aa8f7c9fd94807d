//! Configuration types for PDF translation.
//!
//! Everything the pipeline needs is carried by one explicit
//! [`TranslationConfig`], built once at startup via its
//! [`TranslationConfigBuilder`] and passed by reference into every entry
//! point. Nothing inside the library reads environment variables or global
//! state; the CLI maps flags and env vars onto the builder.

use crate::backend::TranslationBackend;
use crate::error::TranslateError;
use crate::languages::LanguageSet;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default Google Cloud Translation v2 endpoint.
pub const DEFAULT_MACHINE_ENDPOINT: &str =
    "https://translation.googleapis.com/language/translate/v2";

/// Default per-chunk size limit, in characters. Public machine-translation
/// endpoints reject single requests somewhere above 5 000 characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 4500;

/// Configuration for a translation run.
///
/// # Example
/// ```rust
/// use pdftranslate::{PageLayout, TranslationConfig};
///
/// let config = TranslationConfig::builder()
///     .source_language("ja")
///     .layout(PageLayout::a4())
///     .bundle(true)
///     .build()
///     .unwrap();
/// assert!(config.languages.is_supported("es"));
/// ```
#[derive(Clone)]
pub struct TranslationConfig {
    /// Which backend to construct, and its settings.
    pub backend: BackendConfig,

    /// Pre-constructed backend. Takes precedence over `backend`.
    pub backend_override: Option<Arc<dyn TranslationBackend>>,

    /// Fixed source language identifier, in the same form as `languages`.
    /// Default: `"ja"` (machine) / `"Japanese"` (llm).
    pub source_language: String,

    /// Accepted target languages. Default depends on the backend kind.
    pub languages: LanguageSet,

    /// Upper bound on characters sent to the backend per call. Default: 4500.
    ///
    /// Text is split on line boundaries; a single line longer than this is
    /// still sent whole.
    pub max_chunk_chars: usize,

    /// Output page geometry. Default: [`PageLayout::letter`].
    pub layout: PageLayout,

    /// Also produce a zip bundle with a JSON translation record. Default: false.
    pub bundle: bool,

    /// Password for encrypted source PDFs.
    pub password: Option<String>,

    /// Path to the pdfium shared library. If None, binds to the system library.
    pub pdfium_library_path: Option<PathBuf>,

    /// TrueType/OpenType font embedded in the output PDF. Needed for any
    /// text outside WinAnsi (Cyrillic, CJK, ...). If None, the standard
    /// `layout.font` is used and such text fails to render.
    pub font_path: Option<PathBuf>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        let backend = BackendConfig::default();
        Self {
            source_language: backend.kind().default_source_language().to_string(),
            languages: backend.kind().default_languages(),
            backend,
            backend_override: None,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            layout: PageLayout::default(),
            bundle: false,
            password: None,
            pdfium_library_path: None,
            font_path: None,
        }
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("backend", &self.backend)
            .field(
                "backend_override",
                &self.backend_override.as_ref().map(|b| b.name().to_string()),
            )
            .field("source_language", &self.source_language)
            .field("languages", &self.languages.codes())
            .field("max_chunk_chars", &self.max_chunk_chars)
            .field("layout", &self.layout)
            .field("bundle", &self.bundle)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("font_path", &self.font_path)
            .finish()
    }
}

impl TranslationConfig {
    /// Create a new builder for `TranslationConfig`.
    pub fn builder() -> TranslationConfigBuilder {
        TranslationConfigBuilder {
            config: Self::default(),
            source_language_set: false,
            languages_set: false,
        }
    }
}

/// Builder for [`TranslationConfig`].
///
/// Switching the backend kind also switches the default source language and
/// language set, unless they were set explicitly.
#[derive(Debug)]
pub struct TranslationConfigBuilder {
    config: TranslationConfig,
    source_language_set: bool,
    languages_set: bool,
}

impl TranslationConfigBuilder {
    pub fn backend(mut self, backend: BackendConfig) -> Self {
        let kind = backend.kind();
        self.config.backend = backend;
        if !self.source_language_set {
            self.config.source_language = kind.default_source_language().to_string();
        }
        if !self.languages_set {
            self.config.languages = kind.default_languages();
        }
        self
    }

    pub fn backend_override(mut self, backend: Arc<dyn TranslationBackend>) -> Self {
        self.config.backend_override = Some(backend);
        self
    }

    pub fn source_language(mut self, code: impl Into<String>) -> Self {
        self.config.source_language = code.into();
        self.source_language_set = true;
        self
    }

    pub fn languages(mut self, languages: LanguageSet) -> Self {
        self.config.languages = languages;
        self.languages_set = true;
        self
    }

    pub fn max_chunk_chars(mut self, n: usize) -> Self {
        self.config.max_chunk_chars = n;
        self
    }

    pub fn layout(mut self, layout: PageLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn bundle(mut self, v: bool) -> Self {
        self.config.bundle = v;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranslationConfig, TranslateError> {
        let c = &self.config;
        if c.max_chunk_chars == 0 {
            return Err(TranslateError::InvalidConfig(
                "max_chunk_chars must be ≥ 1".into(),
            ));
        }
        if c.languages.is_empty() {
            return Err(TranslateError::InvalidConfig(
                "at least one target language must be configured".into(),
            ));
        }
        if c.source_language.trim().is_empty() {
            return Err(TranslateError::InvalidConfig(
                "source language must not be empty".into(),
            ));
        }
        c.layout.validate()?;
        Ok(self.config)
    }
}

// ── Backend settings ─────────────────────────────────────────────────────

/// Which translation backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Direct text-in/text-out translation service.
    #[default]
    Machine,
    /// Prompt over a generative language model.
    Llm,
}

impl BackendKind {
    pub fn default_source_language(&self) -> &'static str {
        match self {
            BackendKind::Machine => "ja",
            BackendKind::Llm => "Japanese",
        }
    }

    pub fn default_languages(&self) -> LanguageSet {
        match self {
            BackendKind::Machine => LanguageSet::iso_codes(),
            BackendKind::Llm => LanguageSet::natural_names(),
        }
    }
}

/// Backend selection plus its settings.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    Machine(MachineConfig),
    Llm(LlmConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Machine(MachineConfig::default())
    }
}

impl BackendConfig {
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendConfig::Machine(_) => BackendKind::Machine,
            BackendConfig::Llm(_) => BackendKind::Llm,
        }
    }
}

/// Settings for the machine-translation HTTP backend.
#[derive(Clone)]
pub struct MachineConfig {
    /// Translation endpoint URL.
    pub endpoint: String,
    /// API key, sent as the `key` query parameter.
    pub api_key: Option<String>,
    /// Client-side request timeout. None leaves the HTTP client default.
    pub timeout_secs: Option<u64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_MACHINE_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: None,
        }
    }
}

impl fmt::Debug for MachineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Settings for the generative-model backend.
#[derive(Clone)]
pub struct LlmConfig {
    /// Provider name understood by `edgequake_llm::ProviderFactory`
    /// (e.g. "openai", "anthropic", "ollama"). If None, auto-detected.
    pub provider_name: Option<String>,
    /// Model identifier. If None, uses `gpt-4.1-nano`.
    pub model: Option<String>,
    /// Pre-constructed provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,
    /// Sampling temperature. Default: 0.1.
    pub temperature: f32,
    /// Maximum output tokens per chunk. Default: 4096.
    pub max_tokens: usize,
    /// Custom system prompt. If None, uses [`crate::prompts::DEFAULT_TRANSLATION_PROMPT`].
    pub system_prompt: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_name: None,
            model: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 4096,
            system_prompt: None,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

// ── Page layout ──────────────────────────────────────────────────────────

/// One of the PDF standard base fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BaseFont {
    #[default]
    Helvetica,
    TimesRoman,
    Courier,
}

impl BaseFont {
    /// The `BaseFont` name written into the PDF font dictionary.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            BaseFont::Helvetica => "Helvetica",
            BaseFont::TimesRoman => "Times-Roman",
            BaseFont::Courier => "Courier",
        }
    }
}

/// Output page geometry, in PDF points (1/72 inch).
///
/// The cursor for the first line on each page starts at
/// `height - top_margin`; a page is full once the cursor reaches
/// `bottom_margin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub left_margin: f32,
    pub top_margin: f32,
    pub bottom_margin: f32,
    pub line_height: f32,
    pub font: BaseFont,
    pub font_size: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::letter()
    }
}

impl PageLayout {
    /// US Letter, first baseline at y = 750.
    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            left_margin: 10.0,
            top_margin: 42.0,
            bottom_margin: 50.0,
            line_height: 14.0,
            font: BaseFont::Helvetica,
            font_size: 12.0,
        }
    }

    /// ISO A4, first baseline at y = 792.
    pub fn a4() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
            left_margin: 50.0,
            top_margin: 50.0,
            bottom_margin: 50.0,
            line_height: 15.0,
            font: BaseFont::Helvetica,
            font_size: 12.0,
        }
    }

    /// The y-coordinate of the first line on a page.
    pub fn top_y(&self) -> f32 {
        self.height - self.top_margin
    }

    /// How many lines fit on one page: every cursor position strictly above
    /// the bottom margin. Always at least 1 for a valid layout.
    pub fn lines_per_page(&self) -> usize {
        if self.line_height.is_nan() || self.line_height <= 0.0 {
            return 1;
        }
        let room = (self.top_y() - self.bottom_margin) / self.line_height;
        (room.ceil() as usize).max(1)
    }

    /// The y-coordinate of the `index`-th line (0-based) on a page.
    ///
    /// Computed from the index rather than by repeated subtraction so that
    /// fractional line heights do not drift.
    pub fn line_y(&self, index: usize) -> f32 {
        self.top_y() - self.line_height * index as f32
    }

    pub fn validate(&self) -> Result<(), TranslateError> {
        let finite = [
            self.width,
            self.height,
            self.left_margin,
            self.top_margin,
            self.bottom_margin,
            self.line_height,
            self.font_size,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(TranslateError::InvalidConfig(
                "page layout values must be finite".into(),
            ));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(TranslateError::InvalidConfig(format!(
                "page size must be positive, got {}×{}",
                self.width, self.height
            )));
        }
        if self.line_height <= 0.0 {
            return Err(TranslateError::InvalidConfig(format!(
                "line height must be positive, got {}",
                self.line_height
            )));
        }
        if self.font_size <= 0.0 {
            return Err(TranslateError::InvalidConfig(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if self.top_y() <= self.bottom_margin {
            return Err(TranslateError::InvalidConfig(format!(
                "first line y ({}) must be above the bottom margin ({})",
                self.top_y(),
                self.bottom_margin
            )));
        }
        Ok(())
    }
}
