//! Language registry: Single source of truth for all supported languages.
//!
//! This module provides a centralized registry of the languages the site
//! offers through the embedded translation widget. It uses a singleton
//! pattern with `OnceLock` to ensure thread-safe initialization and access.

use std::sync::OnceLock;

/// Configuration for a supported language.
///
/// Contains all metadata for a specific language, including its code, names,
/// enabled status, and whether it's the source language of the page content.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "es", "pt")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Spanish")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "Español")
    pub native_name: &'static str,

    /// Whether this is the language the page is authored in (only one should be true)
    pub is_source: bool,

    /// Whether this language is enabled for use
    pub enabled: bool,
}

/// Global language registry singleton.
///
/// This registry contains all supported languages and provides methods to query
/// and access them. It's initialized once on first access and remains immutable
/// thereafter.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    ///
    /// This method initializes the registry on first call and returns a reference
    /// to the singleton instance on subsequent calls.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Arguments
    /// * `code` - The ISO 639-1 language code (e.g., "en", "es")
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages.
    ///
    /// # Returns
    /// A vector of references to all language configurations where `enabled` is true.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get all languages (including disabled ones).
    ///
    /// # Returns
    /// A vector of references to all language configurations.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Get the source language configuration.
    ///
    /// The source language is the one the page content is written in; the
    /// widget translates out of it. There should be exactly one.
    ///
    /// # Returns
    /// A reference to the source language configuration.
    ///
    /// # Panics
    /// Panics if no source language is found or if multiple source languages
    /// are defined (this indicates a configuration error).
    pub fn source(&self) -> &LanguageConfig {
        let source_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_source)
            .collect();

        match source_langs.len() {
            0 => panic!("No source language found in registry"),
            1 => source_langs[0],
            _ => panic!("Multiple source languages found in registry"),
        }
    }

    /// Check if a language code is supported and enabled.
    ///
    /// # Arguments
    /// * `code` - The ISO 639-1 language code to check
    ///
    /// # Returns
    /// `true` if the language exists and is enabled, `false` otherwise.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }

    /// Comma-joined codes of all enabled languages, in registry order.
    ///
    /// This is the exact string the translation widget expects as its
    /// `includedLanguages` bootstrap option.
    pub fn included_languages(&self) -> String {
        self.list_enabled()
            .iter()
            .map(|lang| lang.code)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Default language configurations.
///
/// This function returns the set of languages offered on the site.
/// Spanish is the source language; English and Portuguese are targets.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_source: false,
            enabled: true,
        },
        LanguageConfig {
            code: "es",
            name: "Spanish",
            native_name: "Español",
            is_source: true,
            enabled: true,
        },
        LanguageConfig {
            code: "pt",
            name: "Portuguese",
            native_name: "Português",
            is_source: false,
            enabled: true,
        },
    ]
}
