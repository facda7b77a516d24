//! Language type: Flexible, validated language representation.
//!
//! This module provides the `Language` type, a small copyable handle that is
//! always backed by a registry entry, so a constructed value is guaranteed to
//! be a language the widget actually offers.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};

/// A validated language.
///
/// This type represents a language that has been validated against the registry.
/// It ensures that only supported, enabled languages can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "es")
    code: &'static str,
}

impl Language {
    /// Spanish, the language the site is authored in.
    pub const SPANISH: Language = Language { code: "es" };

    /// English translation target.
    pub const ENGLISH: Language = Language { code: "en" };

    /// Portuguese translation target.
    pub const PORTUGUESE: Language = Language { code: "pt" };

    /// Create a Language from a language code string.
    ///
    /// # Arguments
    /// * `code` - The ISO 639-1 language code (e.g., "en", "es")
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    ///
    /// # Example
    /// ```ignore
    /// let english = Language::from_code("en")?;
    /// ```
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language {
                code: config.code, // Use the static str from the registry
            }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Get the source language.
    ///
    /// This is the language the page content is written in and the language
    /// every switch resets back to. The widget translates out of it.
    ///
    /// # Returns
    /// The source Language (Spanish for this site).
    pub fn source() -> Language {
        let config = LanguageRegistry::get().source();
        Language { code: config.code }
    }

    /// Get the ISO 639-1 language code.
    ///
    /// # Returns
    /// The language code as a static string (e.g., "en", "es").
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Returns
    /// A reference to the `LanguageConfig` for this language.
    ///
    /// # Panics
    /// Panics if the language code is not found in the registry. This should
    /// never happen if the Language was constructed properly (via `from_code`
    /// or constants).
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// Get the English name of the language.
    ///
    /// # Returns
    /// The language name in English (e.g., "English", "Spanish").
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Get the native name of the language.
    ///
    /// # Returns
    /// The language name in its native form (e.g., "English", "Español").
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Check if this is the source language.
    ///
    /// # Returns
    /// `true` if this is the page's authored language, `false` if it's a
    /// translation target.
    pub fn is_source(&self) -> bool {
        self.config().is_source
    }
}
