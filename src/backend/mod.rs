//! Pluggable translation backends.
//!
//! The pipeline only ever talks to `dyn TranslationBackend`; which concrete
//! implementation sits behind it is decided once, by [`from_config`], from
//! [`crate::config::TranslationConfig`]. The translator never branches on
//! backend identity.
//!
//! | Backend | Identifiers | Transport |
//! |---------|-------------|-----------|
//! | [`machine::MachineTranslationBackend`] | ISO codes (`es`, `zh-CN`) | JSON over HTTPS |
//! | [`llm::LlmTranslationBackend`] | language names (`Spanish`) | `edgequake_llm` chat completion |
//! | [`mock::MockBackend`] | anything | in-process, for tests and dry runs |

pub mod llm;
pub mod machine;
pub mod mock;

use crate::config::{BackendConfig, TranslationConfig};
use crate::error::{BackendError, TranslateError};
use async_trait::async_trait;
use std::sync::Arc;

/// One backend call: a single chunk of text and the language pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendRequest<'a> {
    pub text: &'a str,
    pub source_language: &'a str,
    pub target_language: &'a str,
}

/// A translation capability the pipeline can delegate to.
///
/// Implementations must classify every failure into a [`BackendError`] and
/// must not retry internally. An `Ok` value is the complete translation of
/// `request.text`.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &str;

    /// Translate one chunk.
    async fn translate(&self, request: BackendRequest<'_>) -> Result<String, BackendError>;
}

/// Build the backend described by `config`.
///
/// Resolution order:
/// 1. `config.backend_override`, used as-is.
/// 2. `config.backend`: the machine HTTP client or an LLM provider.
pub fn from_config(config: &TranslationConfig) -> Result<Arc<dyn TranslationBackend>, TranslateError> {
    if let Some(ref backend) = config.backend_override {
        return Ok(Arc::clone(backend));
    }

    match &config.backend {
        BackendConfig::Machine(machine) => Ok(Arc::new(
            machine::MachineTranslationBackend::new(machine.clone())?,
        )),
        BackendConfig::Llm(llm) => Ok(Arc::new(llm::LlmTranslationBackend::from_config(llm)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;

    #[test]
    fn override_takes_precedence() {
        let mock = Arc::new(mock::MockBackend::echo());
        let config = TranslationConfig::builder()
            .backend(BackendConfig::Machine(MachineConfig::default()))
            .backend_override(mock.clone())
            .build()
            .unwrap();
        let backend = from_config(&config).unwrap();
        assert_eq!(backend.name(), "mock");
    }

    #[test]
    fn machine_backend_is_built_from_config() {
        let config = TranslationConfig::builder()
            .backend(BackendConfig::Machine(MachineConfig {
                api_key: Some("k".into()),
                ..Default::default()
            }))
            .build()
            .unwrap();
        let backend = from_config(&config).unwrap();
        assert_eq!(backend.name(), "machine");
    }
}
