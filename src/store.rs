use tracing::debug;

use crate::config::STORAGE_KEY;
use crate::i18n::Language;
use crate::page::Page;

/// Persisted user language choice.
///
/// Wraps the page's key-value storage under a single fixed key. Reads are
/// validated against the registry, so junk left behind by older builds
/// resolves to the source default instead of leaking out as a raw string.
#[derive(Clone)]
pub struct PreferenceStore<P: Page> {
    page: P,
}

impl<P: Page> PreferenceStore<P> {
    pub fn new(page: P) -> Self {
        Self { page }
    }

    /// The persisted language, or the source default when absent or invalid.
    pub fn get(&self) -> Language {
        match self.page.storage_get(STORAGE_KEY) {
            Some(raw) => match Language::from_code(&raw) {
                Ok(language) => language,
                Err(_) => {
                    debug!("ignoring unsupported stored language '{}'", raw);
                    Language::source()
                }
            },
            None => Language::source(),
        }
    }

    /// Persist a language choice.
    pub fn set(&self, language: Language) {
        self.page.storage_set(STORAGE_KEY, language.code());
    }

    /// The raw stored value, if any. Diagnostics report this unvalidated.
    pub fn raw(&self) -> Option<String> {
        self.page.storage_get(STORAGE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;

    #[test]
    fn test_get_defaults_to_source_when_absent() {
        let store = PreferenceStore::new(MemoryPage::new());
        assert_eq!(store.get(), Language::SPANISH);
        assert_eq!(store.raw(), None);
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let store = PreferenceStore::new(MemoryPage::new());

        store.set(Language::ENGLISH);
        assert_eq!(store.get(), Language::ENGLISH);

        store.set(Language::PORTUGUESE);
        assert_eq!(store.get(), Language::PORTUGUESE);
    }

    #[test]
    fn test_set_writes_under_fixed_key() {
        let page = MemoryPage::new();
        let store = PreferenceStore::new(page.clone());

        store.set(Language::ENGLISH);
        assert_eq!(page.storage_get("preferredLanguage"), Some("en".to_string()));
    }

    #[test]
    fn test_get_defaults_to_source_on_junk() {
        let page = MemoryPage::new();
        page.storage_set(STORAGE_KEY, "klingon");

        let store = PreferenceStore::new(page);
        assert_eq!(store.get(), Language::SPANISH);
    }

    #[test]
    fn test_raw_exposes_junk_unvalidated() {
        let page = MemoryPage::new();
        page.storage_set(STORAGE_KEY, "klingon");

        let store = PreferenceStore::new(page);
        assert_eq!(store.raw(), Some("klingon".to_string()));
    }
}
