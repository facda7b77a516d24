use thiserror::Error;
use tracing::{debug, info, warn};

use crate::i18n::Language;
use crate::metrics::SyncMetrics;
use crate::page::{ControlEvent, Page};
use crate::store::PreferenceStore;

/// Outcome of a successful activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The control was set to the requested language and notified.
    Applied,
    /// The control already showed the requested language; nothing was done.
    AlreadyActive,
}

/// Failure conditions an activation caller can react to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The widget has not rendered its select control yet, or a re-render
    /// tore it out. Retryable; the cookie path is the fallback.
    #[error("translate control not present in the page")]
    ControlNotFound,
}

/// Drives the widget's live select control.
///
/// Activation changes the displayed language in place, without a reload. It
/// only works once the widget has rendered its control; before that, the
/// cookie bridge is the path that works.
#[derive(Clone)]
pub struct ControlDispatcher<P: Page> {
    page: P,
    store: PreferenceStore<P>,
}

impl<P: Page> ControlDispatcher<P> {
    pub fn new(page: P) -> Self {
        let store = PreferenceStore::new(page.clone());
        Self { page, store }
    }

    /// Whether the live control is currently queryable.
    pub fn control_ready(&self) -> bool {
        self.page.control_value().is_some()
    }

    /// Switch the displayed language through the live control.
    ///
    /// Sets the select value, then dispatches a `change` plus a bubbling
    /// Enter `keyup`; the widget's own handler does the rest. The stored
    /// preference is updated only when a switch actually happens, so
    /// repeated activations stay idempotent.
    pub fn activate(&self, language: Language) -> Result<Activation, DispatchError> {
        let current = match self.page.control_value() {
            Some(value) => value,
            None => {
                warn!(
                    "cannot activate '{}': translate control not found",
                    language.code()
                );
                SyncMetrics::global().record_control_miss();
                return Err(DispatchError::ControlNotFound);
            }
        };

        if current == language.code() {
            debug!("control already at '{}', skipping activation", language.code());
            return Ok(Activation::AlreadyActive);
        }

        self.page.set_control_value(language.code());
        self.page.dispatch_control_event(ControlEvent::Change);
        self.page.dispatch_control_event(ControlEvent::CommitKey);
        self.store.set(language);

        SyncMetrics::global().record_activation();
        info!("activated language '{}' on live control", language.code());
        Ok(Activation::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;

    fn dispatcher() -> (ControlDispatcher<MemoryPage>, MemoryPage) {
        let page = MemoryPage::new();
        (ControlDispatcher::new(page.clone()), page)
    }

    #[test]
    fn test_activate_without_control_fails() {
        let (dispatcher, page) = dispatcher();

        let result = dispatcher.activate(Language::ENGLISH);

        assert_eq!(result, Err(DispatchError::ControlNotFound));
        assert_eq!(page.storage_get("preferredLanguage"), None);
        assert!(page.control_events().is_empty());
    }

    #[test]
    fn test_activate_applies_value_events_and_store() {
        let (dispatcher, page) = dispatcher();
        page.render_control("es");

        let result = dispatcher.activate(Language::ENGLISH);

        assert_eq!(result, Ok(Activation::Applied));
        assert_eq!(page.control_value(), Some("en".to_string()));
        assert_eq!(
            page.control_events(),
            vec![ControlEvent::Change, ControlEvent::CommitKey]
        );
        assert_eq!(page.storage_get("preferredLanguage"), Some("en".to_string()));
    }

    #[test]
    fn test_activate_same_value_is_noop() {
        let (dispatcher, page) = dispatcher();
        page.render_control("en");
        // A stale stored value must survive the no-op: no store write happens.
        page.storage_set("preferredLanguage", "pt");

        let result = dispatcher.activate(Language::ENGLISH);

        assert_eq!(result, Ok(Activation::AlreadyActive));
        assert!(page.control_events().is_empty());
        assert_eq!(page.storage_get("preferredLanguage"), Some("pt".to_string()));
    }

    #[test]
    fn test_double_activate_dispatches_one_event_pair() {
        let (dispatcher, page) = dispatcher();
        page.render_control("es");

        assert_eq!(dispatcher.activate(Language::ENGLISH), Ok(Activation::Applied));
        assert_eq!(
            dispatcher.activate(Language::ENGLISH),
            Ok(Activation::AlreadyActive)
        );

        assert_eq!(
            page.control_events(),
            vec![ControlEvent::Change, ControlEvent::CommitKey]
        );
    }

    #[test]
    fn test_activate_after_control_removed_fails() {
        let (dispatcher, page) = dispatcher();
        page.render_control("es");
        page.remove_control();

        assert_eq!(
            dispatcher.activate(Language::PORTUGUESE),
            Err(DispatchError::ControlNotFound)
        );
    }

    #[test]
    fn test_activate_never_reloads() {
        let (dispatcher, page) = dispatcher();
        page.render_control("es");

        dispatcher.activate(Language::PORTUGUESE).unwrap();
        dispatcher.activate(Language::ENGLISH).unwrap();

        assert_eq!(page.reload_count(), 0);
    }

    #[test]
    fn test_control_ready_tracks_presence() {
        let (dispatcher, page) = dispatcher();
        assert!(!dispatcher.control_ready());

        page.render_control("es");
        assert!(dispatcher.control_ready());

        page.remove_control();
        assert!(!dispatcher.control_ready());
    }
}
