//! Backend B: translation by prompting a generative language model.
//!
//! Every chunk becomes one chat completion with two messages:
//! 1. **System message**: the translation prompt, naming source and target
//!    language (see [`crate::prompts`]).
//! 2. **User message**: the chunk text, verbatim.
//!
//! The provider is any `edgequake_llm::LLMProvider`; resolution follows the
//! same most-specific-first chain as the rest of the library, so tests can
//! inject a provider and the CLI can rely on environment auto-detection.

use super::{BackendRequest, TranslationBackend};
use crate::config::LlmConfig;
use crate::error::{BackendError, TranslateError};
use crate::prompts::translation_system_prompt;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Model used when a provider is named without a model.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4.1-nano";

/// Translation over an `edgequake_llm` chat provider.
pub struct LlmTranslationBackend {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
    system_prompt: Option<String>,
}

impl std::fmt::Debug for LlmTranslationBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmTranslationBackend")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl LlmTranslationBackend {
    /// Wrap an already-constructed provider.
    pub fn new(provider: Arc<dyn LLMProvider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
        }
    }

    /// Resolve the provider, from most-specific to least-specific:
    ///
    /// 1. `config.provider`, used as-is.
    /// 2. `config.provider_name` + `config.model` (default [`DEFAULT_LLM_MODEL`]),
    ///    via `ProviderFactory::create_llm_provider`, which reads the matching
    ///    API key from the environment.
    /// 3. `ProviderFactory::from_env`, which picks the first provider whose
    ///    credentials are present.
    pub fn from_config(config: &LlmConfig) -> Result<Self, TranslateError> {
        if let Some(ref provider) = config.provider {
            return Ok(Self::new(Arc::clone(provider), config));
        }

        if let Some(ref name) = config.provider_name {
            let model = config.model.as_deref().unwrap_or(DEFAULT_LLM_MODEL);
            let provider = ProviderFactory::create_llm_provider(name, model).map_err(|e| {
                TranslateError::ProviderNotConfigured {
                    provider: name.clone(),
                    hint: format!("{e}"),
                }
            })?;
            return Ok(Self::new(provider, config));
        }

        let (provider, _embedding) =
            ProviderFactory::from_env().map_err(|e| TranslateError::ProviderNotConfigured {
                provider: "auto".to_string(),
                hint: format!(
                    "No LLM provider could be auto-detected from environment.\n\
                    Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                    Error: {}",
                    e
                ),
            })?;
        Ok(Self::new(provider, config))
    }

    fn build_messages(&self, request: &BackendRequest<'_>) -> Vec<ChatMessage> {
        let prompt = translation_system_prompt(
            self.system_prompt.as_deref(),
            request.source_language,
            request.target_language,
        );
        vec![ChatMessage::system(prompt), ChatMessage::user(request.text)]
    }

    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

#[async_trait]
impl TranslationBackend for LlmTranslationBackend {
    fn name(&self) -> &str {
        "llm"
    }

    async fn translate(&self, request: BackendRequest<'_>) -> Result<String, BackendError> {
        let start = Instant::now();
        let messages = self.build_messages(&request);
        let options = self.build_options();

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| classify_provider_error(&e.to_string()))?;

        debug!(
            "llm backend: {} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        clean_completion(&response.content)
    }
}

/// The completion is opaque text: only surrounding whitespace is removed.
fn clean_completion(content: &str) -> Result<String, BackendError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(BackendError::EmptyResponse);
    }
    Ok(trimmed.to_string())
}

/// Provider errors arrive as opaque messages; sort them by their wording.
fn classify_provider_error(message: &str) -> BackendError {
    let lower = message.to_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        BackendError::Timeout(message.to_string())
    } else if lower.contains("429")
        || lower.contains("rate limit")
        || lower.contains("quota")
        || lower.contains("too many requests")
    {
        BackendError::RateLimited {
            retry_after_secs: None,
        }
    } else if lower.contains("401")
        || lower.contains("403")
        || lower.contains("unauthorized")
        || lower.contains("api key")
        || lower.contains("authentication")
    {
        BackendError::Auth(message.to_string())
    } else if lower.contains("connect") || lower.contains("dns") || lower.contains("network") {
        BackendError::Network(message.to_string())
    } else if lower.contains("parse") || lower.contains("deserializ") || lower.contains("json") {
        BackendError::MalformedResponse(message.to_string())
    } else {
        BackendError::Api {
            status: 0,
            message: message.to_string(),
        }
    }
}
