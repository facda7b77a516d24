//! Internationalization (i18n) module for multi-language support.
//!
//! This module is the language model for the translation subsystem: which
//! languages the site offers, which one the page is authored in, and a
//! validated `Language` type the rest of the crate passes around.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Type-safe Language type that validates against the registry
//!
//! # Example
//!
//! ```rust,ignore
//! use translate_bridge::i18n::{Language, LanguageRegistry};
//!
//! // Get the source language (Spanish)
//! let source = Language::source();
//!
//! // Create language from code
//! let english = Language::from_code("en")?;
//!
//! // List all enabled languages
//! let languages = LanguageRegistry::get().list_enabled();
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
