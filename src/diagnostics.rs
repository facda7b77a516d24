//! Support-call snapshot of the translation state.
//!
//! Pulls every observable input into one serializable report so a "the site
//! is stuck in English" ticket can be answered from a single console call
//! instead of a screen-share spelunking session.

use serde::Serialize;

use crate::config::{CONTAINER_ID, SCRIPT_ID};
use crate::cookie::CookieBridge;
use crate::metrics::{MetricsReport, SyncMetrics};
use crate::page::Page;
use crate::store::PreferenceStore;

/// Point-in-time view of everything the subsystem can observe.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsReport {
    /// Widget script element is in the document.
    pub script_present: bool,
    /// Hidden mount container is in the document.
    pub container_present: bool,
    /// The live select control is queryable.
    pub control_present: bool,
    /// Raw value of the live control, when present.
    pub control_value: Option<String>,
    /// Target segment of the translation cookie, unvalidated.
    pub cookie_target: Option<String>,
    /// Raw persisted preference, unvalidated.
    pub stored_preference: Option<String>,
    /// The language the subsystem resolves after validation and fallback.
    pub resolved_language: String,
    pub hostname: String,
    pub metrics: MetricsReport,
}

/// Collect a diagnostics report from the page.
pub fn report<P: Page>(page: &P) -> DiagnosticsReport {
    let bridge = CookieBridge::new(page.clone());
    let store = PreferenceStore::new(page.clone());

    DiagnosticsReport {
        script_present: page.element_exists(SCRIPT_ID),
        container_present: page.element_exists(CONTAINER_ID),
        control_present: page.control_value().is_some(),
        control_value: page.control_value(),
        cookie_target: bridge.cookie_target(),
        stored_preference: store.raw(),
        resolved_language: bridge.read().code().to_string(),
        hostname: page.hostname(),
        metrics: SyncMetrics::global().report(),
    }
}

/// Console entry point: `diagnoseTranslate()` in the browser devtools.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(js_name = diagnoseTranslate)]
pub fn diagnose_translate() -> String {
    let report = report(&crate::page::WebPage);
    tracing::info!(
        "diagnostics: resolved '{}', control present: {}",
        report.resolved_language, report.control_present
    );
    serde_json::to_string_pretty(&report)
        .unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CONTAINER_ID, SCRIPT_ID, SCRIPT_SRC, STORAGE_KEY};
    use crate::page::MemoryPage;

    // ==================== Report Tests ====================

    #[test]
    fn test_report_on_untouched_page() {
        let page = MemoryPage::new();

        let report = report(&page);

        assert!(!report.script_present);
        assert!(!report.container_present);
        assert!(!report.control_present);
        assert_eq!(report.control_value, None);
        assert_eq!(report.cookie_target, None);
        assert_eq!(report.stored_preference, None);
        assert_eq!(report.resolved_language, "es");
        assert_eq!(report.hostname, "localhost");
    }

    #[test]
    fn test_report_reflects_active_translation() {
        let page = MemoryPage::new();
        page.storage_set(STORAGE_KEY, "pt");
        page.set_cookie("googtrans=/es/pt; path=/");
        page.mount_hidden_container(CONTAINER_ID).unwrap();
        page.inject_script(SCRIPT_ID, SCRIPT_SRC, Box::new(|| {}))
            .unwrap();
        page.render_control("pt");

        let report = report(&page);

        assert!(report.script_present);
        assert!(report.container_present);
        assert!(report.control_present);
        assert_eq!(report.control_value.as_deref(), Some("pt"));
        assert_eq!(report.cookie_target.as_deref(), Some("pt"));
        assert_eq!(report.stored_preference.as_deref(), Some("pt"));
        assert_eq!(report.resolved_language, "pt");
    }

    #[test]
    fn test_report_keeps_raw_values_unvalidated() {
        // The report is for debugging: junk must show up as-is, while the
        // resolved language still falls back.
        let page = MemoryPage::new();
        page.storage_set(STORAGE_KEY, "klingon");
        page.set_cookie("googtrans=/es/xx; path=/");

        let report = report(&page);

        assert_eq!(report.stored_preference.as_deref(), Some("klingon"));
        assert_eq!(report.cookie_target.as_deref(), Some("xx"));
        assert_eq!(report.resolved_language, "es");
    }

    #[test]
    fn test_report_serializes_to_json() {
        let page = MemoryPage::new();
        page.set_cookie("googtrans=/es/en; path=/");

        let report = report(&page);
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("\"resolved_language\":\"en\""));
        assert!(json.contains("\"cookie_target\":\"en\""));
        assert!(json.contains("\"metrics\""));
    }
}
