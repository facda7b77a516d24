use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::config::{COOKIE_NAME, EPOCH_EXPIRY};
use crate::i18n::Language;
use crate::metrics::SyncMetrics;
use crate::page::Page;
use crate::store::PreferenceStore;

/// Cookie-based language switching.
///
/// The widget reads its `googtrans` cookie once, on page load. Writing the
/// cookie and forcing a reload is therefore the switching path that always
/// works, even when the widget never finished initializing. The cost is the
/// reload itself.
#[derive(Clone)]
pub struct CookieBridge<P: Page> {
    page: P,
    store: PreferenceStore<P>,
}

/// Matches the widget cookie and captures its target segment.
fn cookie_target_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!("{}=/[^/;]+/([^;]+)", COOKIE_NAME)).expect("cookie pattern is valid")
    })
}

fn cookie_value(language: Language) -> String {
    format!("/{}/{}", Language::source().code(), language.code())
}

fn is_local_host(hostname: &str) -> bool {
    hostname == "localhost" || hostname == "127.0.0.1"
}

impl<P: Page> CookieBridge<P> {
    pub fn new(page: P) -> Self {
        let store = PreferenceStore::new(page.clone());
        Self { page, store }
    }

    /// The language currently in effect.
    ///
    /// Precedence: widget cookie, then stored preference, then the source
    /// default. The cookie wins because the widget itself consumed it on
    /// load, so it is the closest thing to observed truth.
    pub fn read(&self) -> Language {
        if let Some(target) = self.cookie_target() {
            match Language::from_code(&target) {
                Ok(language) => return language,
                Err(_) => warn!("ignoring unsupported cookie target '{}'", target),
            }
        }
        self.store.get()
    }

    /// Raw target segment of the widget cookie, if one is present.
    pub fn cookie_target(&self) -> Option<String> {
        let cookies = self.page.cookies();
        cookie_target_pattern()
            .captures(&cookies)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Switch language through the cookie and reload the page.
    ///
    /// The preference is persisted before anything else so it survives the
    /// reload that ends this page context.
    pub fn write(&self, language: Language) {
        self.store.set(language);

        let value = cookie_value(language);
        self.clear_root_cookie();
        self.page
            .set_cookie(&format!("{}={}; path=/", COOKIE_NAME, value));

        let hostname = self.page.hostname();
        if !is_local_host(&hostname) {
            // Hosted environments also need a domain-wide copy so the
            // widget's iframe sees the cookie across subdomains.
            self.page.set_cookie(&format!(
                "{}={}; path=/; domain=.{}",
                COOKIE_NAME, value, hostname
            ));
        }

        SyncMetrics::global().record_cookie_write();
        info!(
            "switching language to '{}' via cookie, reloading",
            language.code()
        );
        self.page.reload();
    }

    /// Drop every widget cookie and return to the untranslated page.
    pub fn reset(&self) {
        self.store.set(Language::source());

        self.clear_root_cookie();
        let hostname = self.page.hostname();
        if !is_local_host(&hostname) {
            self.page.set_cookie(&format!(
                "{}=; expires={}; path=/; domain={};",
                COOKIE_NAME, EPOCH_EXPIRY, hostname
            ));
            self.page.set_cookie(&format!(
                "{}=; expires={}; path=/; domain=.{};",
                COOKIE_NAME, EPOCH_EXPIRY, hostname
            ));
        }

        info!(
            "resetting language to '{}', reloading",
            Language::source().code()
        );
        self.page.reload();
    }

    fn clear_root_cookie(&self) {
        self.page.set_cookie(&format!(
            "{}=; expires={}; path=/;",
            COOKIE_NAME, EPOCH_EXPIRY
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;

    fn bridge() -> (CookieBridge<MemoryPage>, MemoryPage) {
        let page = MemoryPage::new();
        (CookieBridge::new(page.clone()), page)
    }

    // ==================== write Tests ====================

    #[test]
    fn test_write_sets_cookie_store_and_reloads() {
        let (bridge, page) = bridge();

        bridge.write(Language::ENGLISH);

        assert_eq!(page.cookies(), "googtrans=/es/en");
        assert_eq!(page.storage_get("preferredLanguage"), Some("en".to_string()));
        assert_eq!(page.reload_count(), 1);
    }

    #[test]
    fn test_write_on_localhost_skips_domain_copy() {
        let (bridge, page) = bridge();

        bridge.write(Language::PORTUGUESE);

        assert_eq!(
            page.cookie_entries(),
            vec!["googtrans=/es/pt; path=/".to_string()]
        );
    }

    #[test]
    fn test_write_on_hosted_domain_adds_domain_copy() {
        let page = MemoryPage::with_hostname("example.com");
        let bridge = CookieBridge::new(page.clone());

        bridge.write(Language::ENGLISH);

        assert_eq!(
            page.cookie_entries(),
            vec![
                "googtrans=/es/en; path=/".to_string(),
                "googtrans=/es/en; path=/; domain=.example.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_write_replaces_previous_root_cookie() {
        let (bridge, page) = bridge();
        page.set_cookie("googtrans=/es/pt; path=/");

        bridge.write(Language::ENGLISH);

        assert_eq!(page.cookies(), "googtrans=/es/en");
    }

    // ==================== read Tests ====================

    #[test]
    fn test_read_defaults_to_source_when_nothing_set() {
        let (bridge, _page) = bridge();
        assert_eq!(bridge.read(), Language::SPANISH);
    }

    #[test]
    fn test_read_prefers_cookie_over_store() {
        let (bridge, page) = bridge();
        page.set_cookie("googtrans=/es/en; path=/");
        page.storage_set("preferredLanguage", "pt");

        assert_eq!(bridge.read(), Language::ENGLISH);
    }

    #[test]
    fn test_read_falls_back_to_store_without_cookie() {
        let (bridge, page) = bridge();
        page.storage_set("preferredLanguage", "pt");

        assert_eq!(bridge.read(), Language::PORTUGUESE);
    }

    #[test]
    fn test_read_falls_back_on_unsupported_cookie_target() {
        let (bridge, page) = bridge();
        page.set_cookie("googtrans=/es/fr; path=/");
        page.storage_set("preferredLanguage", "pt");

        assert_eq!(bridge.read(), Language::PORTUGUESE);
    }

    #[test]
    fn test_read_ignores_malformed_cookie_value() {
        let (bridge, page) = bridge();
        page.set_cookie("googtrans=garbage; path=/");

        assert_eq!(bridge.read(), Language::SPANISH);
    }

    #[test]
    fn test_cookie_target_extraction() {
        let (bridge, page) = bridge();
        assert_eq!(bridge.cookie_target(), None);

        page.set_cookie("googtrans=/es/en; path=/");
        assert_eq!(bridge.cookie_target(), Some("en".to_string()));
    }

    #[test]
    fn test_cookie_target_amid_other_cookies() {
        let (bridge, page) = bridge();
        page.set_cookie("session=abc123; path=/");
        page.set_cookie("googtrans=/es/pt; path=/");
        page.set_cookie("theme=dark; path=/");

        assert_eq!(bridge.cookie_target(), Some("pt".to_string()));
    }

    #[test]
    fn test_read_survives_reload_roundtrip() {
        for language in [Language::ENGLISH, Language::PORTUGUESE] {
            let (bridge, page) = bridge();

            bridge.write(language);
            // write() already reloaded; state must still resolve afterwards
            assert_eq!(page.reload_count(), 1);
            assert_eq!(bridge.read(), language);
        }
    }

    // ==================== reset Tests ====================

    #[test]
    fn test_reset_clears_cookie_and_store() {
        let (bridge, page) = bridge();
        bridge.write(Language::ENGLISH);

        bridge.reset();

        assert_eq!(page.cookies(), "");
        assert_eq!(page.storage_get("preferredLanguage"), Some("es".to_string()));
        assert_eq!(bridge.read(), Language::SPANISH);
        assert_eq!(page.reload_count(), 2);
    }

    #[test]
    fn test_reset_clears_domain_scoped_cookies() {
        let page = MemoryPage::with_hostname("example.com");
        let bridge = CookieBridge::new(page.clone());
        bridge.write(Language::ENGLISH);
        assert_eq!(page.cookie_entries().len(), 2);

        bridge.reset();

        assert!(page.cookie_entries().is_empty());
    }

    // ==================== Robustness ====================

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Arbitrary cookie content never panics and read() always
            /// resolves to a supported language.
            #[test]
            fn read_is_total_over_cookie_junk(raw in "\\PC*") {
                let page = MemoryPage::new();
                page.set_cookie(&format!("googtrans={}; path=/", raw));

                let bridge = CookieBridge::new(page);
                let language = bridge.read();
                prop_assert!(["es", "en", "pt"].contains(&language.code()));
            }

            /// Arbitrary storage content never panics and read() always
            /// resolves to a supported language.
            #[test]
            fn read_is_total_over_storage_junk(raw in "\\PC*") {
                let page = MemoryPage::new();
                page.storage_set("preferredLanguage", &raw);

                let bridge = CookieBridge::new(page);
                let language = bridge.read();
                prop_assert!(["es", "en", "pt"].contains(&language.code()));
            }
        }
    }
}
