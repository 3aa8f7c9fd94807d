//! Supported target languages.
//!
//! A [`LanguageSet`] maps a human-readable display name to the identifier the
//! active backend understands. The machine-translation backend speaks ISO-style
//! codes (`"es"`, `"zh-CN"`), the generative backend speaks natural-language
//! names (`"Spanish"`). The pipeline never assumes either form: it validates a
//! target identifier against the set's *codes* and forwards it unchanged.

use serde::{Deserialize, Serialize};

/// Display names shipped by default, in menu order.
const DEFAULT_LANGUAGES: &[(&str, &str)] = &[
    ("English", "en"),
    ("Japanese", "ja"),
    ("Spanish", "es"),
    ("French", "fr"),
    ("German", "de"),
    ("Chinese (Simplified)", "zh-CN"),
    ("Korean", "ko"),
    ("Russian", "ru"),
    ("Portuguese", "pt"),
];

/// One selectable language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Label shown to users, e.g. "Chinese (Simplified)".
    pub display_name: String,
    /// Identifier passed to the backend, e.g. "zh-CN" or "Chinese (Simplified)".
    pub code: String,
}

/// Ordered enumeration of supported target languages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LanguageSet {
    languages: Vec<Language>,
}

impl LanguageSet {
    /// Build a set from `(display name, code)` pairs. Later duplicates of a
    /// code are ignored.
    pub fn new<I, D, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (D, C)>,
        D: Into<String>,
        C: Into<String>,
    {
        let mut languages: Vec<Language> = Vec::new();
        for (display, code) in pairs {
            let code = code.into();
            if languages.iter().any(|l| l.code == code) {
                continue;
            }
            languages.push(Language {
                display_name: display.into(),
                code,
            });
        }
        Self { languages }
    }

    /// ISO-style codes, for the machine-translation backend.
    pub fn iso_codes() -> Self {
        Self::new(DEFAULT_LANGUAGES.iter().copied())
    }

    /// Natural-language names, for the generative backend. Display name and
    /// code are identical.
    pub fn natural_names() -> Self {
        Self::new(DEFAULT_LANGUAGES.iter().map(|(name, _)| (*name, *name)))
    }

    /// Whether `code` is a member of this set. Exact match.
    pub fn is_supported(&self, code: &str) -> bool {
        self.languages.iter().any(|l| l.code == code)
    }

    /// Look up the backend code for a display name (case-insensitive).
    pub fn code_for(&self, display_name: &str) -> Option<&str> {
        self.languages
            .iter()
            .find(|l| l.display_name.eq_ignore_ascii_case(display_name))
            .map(|l| l.code.as_str())
    }

    /// Accept either a code or a display name and return the backend code.
    pub fn resolve(&self, input: &str) -> Option<&str> {
        self.languages
            .iter()
            .find(|l| l.code == input)
            .map(|l| l.code.as_str())
            .or_else(|| self.code_for(input))
    }

    /// All codes, in order.
    pub fn codes(&self) -> Vec<String> {
        self.languages.iter().map(|l| l.code.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Language> {
        self.languages.iter()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_set_contains_defaults() {
        let set = LanguageSet::iso_codes();
        assert_eq!(set.len(), 9);
        assert!(set.is_supported("ja"));
        assert!(set.is_supported("zh-CN"));
        assert!(!set.is_supported("zh-cn"), "membership is exact");
        assert!(!set.is_supported("Japanese"));
    }

    #[test]
    fn natural_set_uses_names_as_codes() {
        let set = LanguageSet::natural_names();
        assert!(set.is_supported("Spanish"));
        assert!(!set.is_supported("es"));
        assert_eq!(set.code_for("spanish"), Some("Spanish"));
    }

    #[test]
    fn resolve_accepts_code_or_display_name() {
        let set = LanguageSet::iso_codes();
        assert_eq!(set.resolve("fr"), Some("fr"));
        assert_eq!(set.resolve("French"), Some("fr"));
        assert_eq!(set.resolve("Chinese (Simplified)"), Some("zh-CN"));
        assert_eq!(set.resolve("Klingon"), None);
    }

    #[test]
    fn custom_set_ignores_duplicate_codes() {
        let set = LanguageSet::new([
            ("English", "English"),
            ("Spanish", "Spanish"),
            ("French", "French"),
            ("Also English", "English"),
        ]);
        assert_eq!(set.codes(), vec!["English", "Spanish", "French"]);
        assert!(!set.is_supported("Klingon"));
    }
}
