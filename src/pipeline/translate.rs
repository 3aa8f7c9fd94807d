//! Translator: language validation, chunking and backend orchestration.
//!
//! ## Chunking
//!
//! Backends cap the size of a single request, so the extracted text is cut
//! into chunks of whole lines, each at most `max_chunk_chars` characters.
//! A line longer than the limit travels alone and unsplit; cutting inside a
//! line would change the translation. Chunks are sent one at a time, in
//! order, and rejoined with `\n`, so chunk boundaries never add or remove
//! lines.
//!
//! Whitespace-only chunks are passed through without a backend call.

use crate::backend::{self, BackendRequest, TranslationBackend};
use crate::config::TranslationConfig;
use crate::error::{BackendError, TranslateError};
use crate::languages::LanguageSet;
use crate::pipeline::extract::ExtractedText;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// A validated translation request. Only [`Translator::request`] builds one,
/// so `target_language` is always a member of the configured set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    source_language: String,
    target_language: String,
    text: String,
}

impl TranslationRequest {
    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Newline-delimited translated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub text: String,
    /// Chunks the input was split into.
    pub chunks: usize,
    /// Chunks that actually reached the backend.
    pub backend_calls: usize,
}

impl TranslationResult {
    pub fn line_count(&self) -> usize {
        if self.text.is_empty() {
            0
        } else {
            self.text.split('\n').count()
        }
    }
}

/// Translates text through one backend. Holds no mutable state, so one
/// instance can serve concurrent requests.
pub struct Translator {
    backend: Arc<dyn TranslationBackend>,
    languages: LanguageSet,
    source_language: String,
    max_chunk_chars: usize,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("backend", &self.backend.name())
            .field("languages", &self.languages.codes())
            .field("source_language", &self.source_language)
            .field("max_chunk_chars", &self.max_chunk_chars)
            .finish()
    }
}

impl Translator {
    pub fn new(
        backend: Arc<dyn TranslationBackend>,
        languages: LanguageSet,
        source_language: impl Into<String>,
        max_chunk_chars: usize,
    ) -> Self {
        Self {
            backend,
            languages,
            source_language: source_language.into(),
            max_chunk_chars: max_chunk_chars.max(1),
        }
    }

    /// Build the configured backend and wrap it.
    pub fn from_config(config: &TranslationConfig) -> Result<Self, TranslateError> {
        let backend = backend::from_config(config)?;
        Ok(Self::new(
            backend,
            config.languages.clone(),
            config.source_language.clone(),
            config.max_chunk_chars,
        ))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    /// Reject targets outside the configured set. Never touches the backend.
    pub fn validate_target(&self, target: &str) -> Result<(), TranslateError> {
        if self.languages.is_supported(target) {
            Ok(())
        } else {
            Err(TranslateError::UnsupportedLanguage {
                code: target.to_string(),
                supported: self.languages.codes(),
            })
        }
    }

    /// Validate `target` and pair it with the text.
    pub fn request(
        &self,
        text: &ExtractedText,
        target: &str,
    ) -> Result<TranslationRequest, TranslateError> {
        self.validate_target(target)?;
        Ok(TranslationRequest {
            source_language: self.source_language.clone(),
            target_language: target.to_string(),
            text: text.as_str().to_string(),
        })
    }

    /// Translate the whole text into `target`.
    ///
    /// Fails on the first backend error; nothing partial is returned.
    pub async fn translate(
        &self,
        text: &ExtractedText,
        target: &str,
    ) -> Result<TranslationResult, TranslateError> {
        let request = self.request(text, target)?;
        self.execute(&request).await
    }

    /// Run an already-validated request.
    pub async fn execute(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, TranslateError> {
        let start = Instant::now();
        let chunks = chunk_lines(&request.text, self.max_chunk_chars);
        info!(
            "Translating {} chars in {} chunk(s) via '{}' ({} → {})",
            request.text.chars().count(),
            chunks.len(),
            self.backend.name(),
            request.source_language,
            request.target_language
        );

        let mut translated = Vec::with_capacity(chunks.len());
        let mut backend_calls = 0usize;

        for (i, chunk) in chunks.iter().enumerate() {
            if chunk.trim().is_empty() {
                translated.push(chunk.clone());
                continue;
            }

            backend_calls += 1;
            let out = self
                .backend
                .translate(BackendRequest {
                    text: chunk,
                    source_language: &request.source_language,
                    target_language: &request.target_language,
                })
                .await
                .and_then(|out| {
                    if out.trim().is_empty() {
                        Err(BackendError::EmptyResponse)
                    } else {
                        Ok(out)
                    }
                })
                .map_err(|source| TranslateError::TranslationBackend {
                    backend: self.backend.name().to_string(),
                    source,
                })?;

            debug!(
                "Chunk {}/{}: {} → {} chars",
                i + 1,
                chunks.len(),
                chunk.chars().count(),
                out.chars().count()
            );
            translated.push(out);
        }

        let result = TranslationResult {
            text: translated.join("\n"),
            chunks: chunks.len(),
            backend_calls,
        };
        info!(
            "Translation finished: {} line(s), {} backend call(s), {:?}",
            result.line_count(),
            backend_calls,
            start.elapsed()
        );
        Ok(result)
    }
}

/// Split `text` into chunks of whole lines, each at most `max_chars`
/// characters unless a single line alone exceeds it.
///
/// Joining the chunks with `\n` reproduces `text` exactly.
pub fn chunk_lines(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for line in text.split('\n') {
        let len = line.chars().count();
        if !current.is_empty() && current_len + 1 + len > max_chars {
            chunks.push(current.join("\n"));
            current.clear();
            current_len = 0;
        }
        current_len = if current.is_empty() {
            len
        } else {
            current_len + 1 + len
        };
        current.push(line);
    }
    chunks.push(current.join("\n"));
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;

    fn translator(mock: Arc<MockBackend>, max: usize) -> Translator {
        Translator::new(
            mock,
            LanguageSet::new([("English", "English"), ("Spanish", "Spanish"), ("French", "French")]),
            "Japanese",
            max,
        )
    }

    #[test]
    fn chunks_respect_line_boundaries() {
        let chunks = chunk_lines("aaa\nbbb\nccc", 7);
        assert_eq!(chunks, vec!["aaa\nbbb", "ccc"]);
        assert_eq!(chunks.join("\n"), "aaa\nbbb\nccc");
    }

    #[test]
    fn oversize_line_is_its_own_chunk() {
        let chunks = chunk_lines("ab\nabcdefghij\ncd", 4);
        assert_eq!(chunks, vec!["ab", "abcdefghij", "cd"]);
    }

    #[test]
    fn chunks_count_characters_not_bytes() {
        // 3 chars each, 9 bytes each in UTF-8
        let chunks = chunk_lines("日本語\n日本語", 7);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn empty_lines_survive_chunking() {
        let text = "a\n\n\nb\n";
        assert_eq!(chunk_lines(text, 1).join("\n"), text);
        assert_eq!(chunk_lines(text, 100), vec![text.to_string()]);
    }

    #[tokio::test]
    async fn unsupported_target_makes_no_backend_call() {
        let mock = Arc::new(MockBackend::echo());
        let t = translator(mock.clone(), 100);
        let err = t
            .translate(&ExtractedText::new("こんにちは"), "Klingon")
            .await
            .unwrap_err();
        match err {
            TranslateError::UnsupportedLanguage { code, supported } => {
                assert_eq!(code, "Klingon");
                assert_eq!(supported, vec!["English", "Spanish", "French"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn chunks_sent_in_order_and_rejoined() {
        let mock = Arc::new(MockBackend::uppercase());
        let t = translator(mock.clone(), 2);
        let result = t
            .translate(&ExtractedText::new("ab\ncd\n\nef"), "Spanish")
            .await
            .unwrap();
        assert_eq!(result.text, "AB\nCD\n\nEF");
        assert_eq!(result.chunks, 4);
        assert_eq!(result.backend_calls, 3, "blank chunk skips the backend");
        let sent: Vec<String> = mock.requests().into_iter().map(|r| r.text).collect();
        assert_eq!(sent, vec!["ab", "cd", "ef"]);
        assert!(mock
            .requests()
            .iter()
            .all(|r| r.source_language == "Japanese" && r.target_language == "Spanish"));
    }

    #[tokio::test]
    async fn backend_failure_aborts_translation() {
        let mock = Arc::new(MockBackend::fail_after(
            1,
            BackendError::RateLimited {
                retry_after_secs: Some(5),
            },
        ));
        let t = translator(mock.clone(), 2);
        let err = t
            .translate(&ExtractedText::new("a\nb\nc"), "French")
            .await
            .unwrap_err();
        match err {
            TranslateError::TranslationBackend { backend, source } => {
                assert_eq!(backend, "mock");
                assert!(matches!(source, BackendError::RateLimited { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(mock.call_count(), 2, "no retry after the failure");
    }

    #[tokio::test]
    async fn blank_backend_output_is_an_error() {
        let mock = Arc::new(MockBackend::fixed("   "));
        let t = translator(mock, 100);
        let err = t
            .translate(&ExtractedText::new("texto"), "English")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TranslateError::TranslationBackend {
                source: BackendError::EmptyResponse,
                ..
            }
        ));
    }

    #[test]
    fn result_line_count() {
        let r = TranslationResult {
            text: "a\n\nb".into(),
            chunks: 1,
            backend_calls: 1,
        };
        assert_eq!(r.line_count(), 3);
    }
}
