//! Page abstraction: everything the subsystem needs from the browser.
//!
//! All browser effects (storage, cookies, script injection, the widget's
//! select control) go through the `Page` trait so that every component is
//! testable on the host. `WebPage` is the real web-sys implementation,
//! compiled only for wasm32; `MemoryPage` is an in-memory page used natively
//! and in tests.

mod memory;
#[cfg(target_arch = "wasm32")]
mod web;

pub use memory::MemoryPage;
#[cfg(target_arch = "wasm32")]
pub use web::WebPage;

use thiserror::Error;

/// Synthetic events dispatched at the widget's select control.
///
/// The widget listens for a plain `change`, but some builds of it only commit
/// the new value after a bubbling Enter keystroke, so activation always sends
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// A generic `change` event.
    Change,
    /// A bubbling Enter `keyup`.
    CommitKey,
}

/// Bootstrap options handed to the widget constructor.
#[derive(Debug, Clone)]
pub struct WidgetSettings {
    /// Language the page content is authored in.
    pub page_language: &'static str,
    /// Comma-joined codes the widget may offer.
    pub included_languages: String,
    /// Id of the container element the widget renders into.
    pub container_id: &'static str,
}

/// Failures raised by a `Page` while wiring up the widget.
///
/// These never reach the end user; the loader logs them and resolves its
/// initialization future with `false`.
#[derive(Debug, Clone, Error)]
pub enum PageError {
    #[error("failed to mount widget container: {0}")]
    ContainerMount(String),

    #[error("failed to register init callback: {0}")]
    CallbackRegistration(String),

    #[error("failed to inject widget script: {0}")]
    ScriptInjection(String),

    #[error("widget bootstrap failed: {0}")]
    WidgetBootstrap(String),
}

/// The browser surface the subsystem runs against.
///
/// Implementations are cheap handles (`Clone` copies the handle, not the
/// page) so components and spawned tasks can each hold one. The whole model
/// is single-threaded; nothing here is `Send`.
pub trait Page: Clone + 'static {
    /// Read a value from persistent key-value storage.
    fn storage_get(&self, key: &str) -> Option<String>;

    /// Write a value to persistent key-value storage.
    fn storage_set(&self, key: &str, value: &str);

    /// The readable cookie string: `name=value` pairs joined by `; `.
    fn cookies(&self) -> String;

    /// Apply one cookie assignment string, attributes included.
    fn set_cookie(&self, cookie: &str);

    /// Hostname of the current page.
    fn hostname(&self) -> String;

    /// Force a full page reload.
    fn reload(&self);

    /// Whether an element with the given id exists.
    fn element_exists(&self, id: &str) -> bool;

    /// Create the hidden widget container if it does not exist yet.
    fn mount_hidden_container(&self, id: &str) -> Result<(), PageError>;

    /// Expose `callback` under a global name for the widget script to call.
    fn expose_init_callback(
        &self,
        name: &str,
        callback: Box<dyn FnOnce()>,
    ) -> Result<(), PageError>;

    /// Append the widget script element; `on_error` fires if the load fails.
    fn inject_script(
        &self,
        id: &str,
        src: &str,
        on_error: Box<dyn FnOnce()>,
    ) -> Result<(), PageError>;

    /// Construct the third-party widget inside its container.
    fn install_widget(&self, settings: &WidgetSettings) -> Result<(), PageError>;

    /// Current value of the widget's select control, `None` while the
    /// control has not been rendered.
    fn control_value(&self) -> Option<String>;

    /// Set the select control's value. No-op while the control is absent.
    fn set_control_value(&self, value: &str);

    /// Dispatch a synthetic event at the select control.
    fn dispatch_control_event(&self, event: ControlEvent);
}
