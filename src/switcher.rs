use tracing::{debug, info};

use crate::cookie::CookieBridge;
use crate::dispatcher::{Activation, ControlDispatcher, DispatchError};
use crate::i18n::{Language, LanguageConfig, LanguageRegistry};
use crate::page::Page;

/// How a language selection was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The live control accepted the change; no reload happened.
    Live(Activation),
    /// The change went through the cookie and a page reload.
    Reloaded,
}

/// Front door for language selection UI.
///
/// Routes each request down the cheapest path that works: the live widget
/// control when it is present, the cookie-and-reload fallback otherwise.
/// Callers never need to know which path ran, only whether the page is
/// about to reload.
#[derive(Clone)]
pub struct LanguageSwitcher<P: Page> {
    page: P,
    dispatcher: ControlDispatcher<P>,
    bridge: CookieBridge<P>,
}

impl<P: Page> LanguageSwitcher<P> {
    pub fn new(page: P) -> Self {
        Self {
            dispatcher: ControlDispatcher::new(page.clone()),
            bridge: CookieBridge::new(page.clone()),
            page,
        }
    }

    /// The language the page is currently presenting.
    pub fn current(&self) -> Language {
        self.bridge.read()
    }

    /// Whether the live control can take changes without a reload.
    pub fn widget_ready(&self) -> bool {
        self.page.control_value().is_some()
    }

    /// Languages available for selection, in display order.
    pub fn languages(&self) -> Vec<&'static LanguageConfig> {
        LanguageRegistry::get().list_enabled()
    }

    /// Apply a language selection.
    ///
    /// Prefers the live control; if it is missing, falls back to writing the
    /// cookie and reloading. Selecting the source language without a live
    /// control resets the translation cookies instead of pinning a
    /// source-to-source translation.
    pub fn select(&self, language: Language) -> SwitchOutcome {
        if self.widget_ready() {
            match self.dispatcher.activate(language) {
                Ok(activation) => {
                    debug!(
                        "switched to '{}' through the live control",
                        language.code()
                    );
                    return SwitchOutcome::Live(activation);
                }
                // The control vanished between the readiness probe and the
                // dispatch; treat it as not ready.
                Err(DispatchError::ControlNotFound) => {
                    debug!("live control disappeared mid-switch, using cookie path");
                }
            }
        }

        if language.is_source() {
            info!("selected source language without live control, resetting");
            self.bridge.reset();
        } else {
            info!(
                "selected '{}' without live control, reloading",
                language.code()
            );
            self.bridge.write(language);
        }
        SwitchOutcome::Reloaded
    }
}
