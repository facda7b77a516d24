use std::time::Duration;

use crate::retry::RetryConfig;

// Fixed strings dictated by the Google Website Translator widget. These are
// part of the third-party contract and must not be made configurable: the
// widget reads the cookie and the callback name verbatim.

/// localStorage key holding the user's persisted language choice.
pub const STORAGE_KEY: &str = "preferredLanguage";

/// Cookie the widget reads on page load. Value format: `/<source>/<target>`.
pub const COOKIE_NAME: &str = "googtrans";

/// Id of the hidden container element the widget renders into.
pub const CONTAINER_ID: &str = "google_translate_element";

/// Id given to the injected widget script element.
pub const SCRIPT_ID: &str = "google-translate-script";

/// Protocol-relative source of the widget script.
pub const SCRIPT_SRC: &str =
    "//translate.google.com/translate_a/element.js?cb=googleTranslateElementInit";

/// Name of the global function the widget script calls when it has loaded.
pub const CALLBACK_NAME: &str = "googleTranslateElementInit";

/// Past expiry used to clear cookies.
pub const EPOCH_EXPIRY: &str = "Thu, 01 Jan 1970 00:00:00 UTC";

/// CSS selector for the language `<select>` the widget injects.
pub const CONTROL_SELECTOR: &str = ".goog-te-combo";

#[derive(Debug, Clone)]
pub struct Config {
    // Activation
    /// Wait after widget bootstrap before driving the control; the select is
    /// usually not queryable in the same tick the completion callback fires.
    pub activation_delay: Duration,
    pub activation_retry: RetryConfig,

    // Polling
    pub poll_interval_uninitialized: Duration,
    pub poll_interval_ready: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            activation_delay: Duration::from_millis(1000),
            activation_retry: RetryConfig::activation(),
            poll_interval_uninitialized: Duration::from_millis(500),
            poll_interval_ready: Duration::from_millis(2000),
        }
    }
}
