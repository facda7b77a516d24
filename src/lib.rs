//! Language preference sync for the Google website translator widget.
//!
//! The site is authored in Spanish and translated in the browser by Google's
//! widget. The widget keeps its state in a `googtrans` cookie and renders a
//! select control at its own pace, while the site keeps the visitor's choice
//! in localStorage. This crate keeps the three in agreement: it loads the
//! widget, replays the saved choice once the control shows up, switches
//! languages through the control when it is live and through the cookie plus
//! a reload when it is not, and watches for the widget drifting away from
//! the recorded choice.
//!
//! # Architecture
//!
//! - `i18n`: Single source of truth for supported languages and their metadata
//! - `page`: Browser surface trait with a real DOM backend and an in-memory test backend
//! - `store`: Persisted preference in localStorage
//! - `cookie`: Translation cookie encode/decode, reset, and the reload fallback
//! - `loader`: One-time widget bootstrap (container, callback, script)
//! - `dispatcher`: Pushes a language into the live select control
//! - `switcher`: Front door that routes selections down the live or cookie path
//! - `poller`: Watches for the control appearing and for language drift
//! - `diagnostics`: Serializable snapshot for support calls
//! - `metrics`: Counters over activations, misses, and drift
//!
//! # Example
//!
//! ```rust,ignore
//! use translate_bridge::{Config, Language, LanguageSwitcher, WidgetLoader};
//!
//! let page = /* platform page handle */;
//! let loader = WidgetLoader::new(page.clone(), Config::default());
//! loader.initialize().await;
//!
//! let switcher = LanguageSwitcher::new(page);
//! switcher.select(Language::ENGLISH);
//! ```

mod config;
mod cookie;
pub mod diagnostics;
mod dispatcher;
mod i18n;
mod loader;
mod metrics;
mod page;
mod poller;
mod retry;
mod store;
mod switcher;
mod timer;

pub use config::Config;
pub use cookie::CookieBridge;
pub use diagnostics::DiagnosticsReport;
pub use dispatcher::{Activation, ControlDispatcher, DispatchError};
pub use i18n::{Language, LanguageConfig, LanguageRegistry};
pub use loader::WidgetLoader;
pub use metrics::{MetricsReport, SyncMetrics};
pub use page::{ControlEvent, MemoryPage, Page, PageError, WidgetSettings};
pub use poller::{PollerHandle, PollerState, StatePoller};
pub use retry::{with_retry_if, RetryConfig};
pub use store::PreferenceStore;
pub use switcher::{LanguageSwitcher, SwitchOutcome};

#[cfg(target_arch = "wasm32")]
pub use diagnostics::diagnose_translate;
#[cfg(target_arch = "wasm32")]
pub use page::WebPage;
