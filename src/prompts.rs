//! Prompts for the generative-model translation backend.
//!
//! Kept in one place so the wording can change without touching request or
//! error-handling code, and so tests can inspect the exact text sent.
//!
//! Callers can override the system prompt via
//! [`crate::config::LlmConfig::system_prompt`]. An override may use the
//! `{source}` and `{target}` placeholders.

/// Default system prompt. `{source}` and `{target}` are substituted with the
/// configured source language and the requested target language.
pub const DEFAULT_TRANSLATION_PROMPT: &str = r#"You are a professional translator. Translate the text supplied by the user from {source} to {target}.

Follow these rules precisely:

1. Translate ALL of the text. Do not summarise, shorten or skip anything.
2. Keep the line structure: every input line break must appear in your output.
   Empty input lines stay empty.
3. Do not add commentary, explanations, notes or quotation marks.
4. Do not wrap the output in code fences.
5. Output ONLY the translated text."#;

/// Render the system prompt for one request.
pub fn translation_system_prompt(template: Option<&str>, source: &str, target: &str) -> String {
    template
        .unwrap_or(DEFAULT_TRANSLATION_PROMPT)
        .replace("{source}", source)
        .replace("{target}", target)
}
