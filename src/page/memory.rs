//! In-memory `Page` implementation.
//!
//! Models the parts of a browser page the subsystem touches: a storage map,
//! a cookie jar with `document.cookie` assignment semantics, the widget
//! scaffolding elements, and the select control. Native code and tests run
//! against this; the hooks at the bottom let tests play the third party's
//! side of the protocol (render the control, fire the init callback, fail
//! the script load).

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::{ControlEvent, Page, PageError, WidgetSettings};

/// One cookie as the browser stores it. Identity is (name, domain, path):
/// the same name can coexist at several scopes, which is exactly the stale
/// multi-value hazard the bridge's clear-before-write guards against.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CookieEntry {
    name: String,
    value: String,
    domain: Option<String>,
    path: String,
}

#[derive(Default)]
struct MemoryState {
    storage: HashMap<String, String>,
    cookies: Vec<CookieEntry>,
    hostname: String,
    reloads: u32,

    // Widget scaffolding
    elements: HashSet<String>,
    script_src: Option<String>,
    script_injections: u32,
    init_callbacks: HashMap<String, Box<dyn FnOnce()>>,
    on_script_error: Option<Box<dyn FnOnce()>>,
    widget_installs: u32,

    // Live control
    control: Option<String>,
    control_events: Vec<ControlEvent>,

    // Failure injection
    fail_script_load: bool,
    fail_widget_install: bool,
}

/// An in-memory page. Cloning copies the handle; all clones share state.
#[derive(Clone)]
pub struct MemoryPage {
    state: Rc<RefCell<MemoryState>>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::with_hostname("localhost")
    }

    pub fn with_hostname(hostname: &str) -> Self {
        let state = MemoryState {
            hostname: hostname.to_string(),
            ..Default::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    // ---- Hooks for playing the widget's side of the protocol ----

    /// Render the select control with the given value, as the widget does
    /// some time after bootstrap.
    pub fn render_control(&self, value: &str) {
        self.state.borrow_mut().control = Some(value.to_string());
    }

    /// Tear the select control out of the page, as widget re-renders do.
    pub fn remove_control(&self) {
        self.state.borrow_mut().control = None;
    }

    /// Invoke the registered global init callback, as the widget script does
    /// once it has loaded. Returns `false` if no callback is registered
    /// under that name.
    pub fn fire_init_callback(&self, name: &str) -> bool {
        let callback = self.state.borrow_mut().init_callbacks.remove(name);
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Invoke the script element's error handler, as the browser does when
    /// the script fails to load. Returns `false` if no handler is pending.
    pub fn fire_script_error(&self) -> bool {
        let on_error = self.state.borrow_mut().on_script_error.take();
        match on_error {
            Some(on_error) => {
                on_error();
                true
            }
            None => false,
        }
    }

    /// Make the next `inject_script` call fail synchronously.
    pub fn fail_next_script_load(&self) {
        self.state.borrow_mut().fail_script_load = true;
    }

    /// Make the next `install_widget` call return an error.
    pub fn fail_next_widget_install(&self) {
        self.state.borrow_mut().fail_widget_install = true;
    }

    // ---- Observations for assertions ----

    pub fn reload_count(&self) -> u32 {
        self.state.borrow().reloads
    }

    pub fn script_injection_count(&self) -> u32 {
        self.state.borrow().script_injections
    }

    pub fn widget_install_count(&self) -> u32 {
        self.state.borrow().widget_installs
    }

    pub fn script_src(&self) -> Option<String> {
        self.state.borrow().script_src.clone()
    }

    pub fn has_init_callback(&self, name: &str) -> bool {
        self.state.borrow().init_callbacks.contains_key(name)
    }

    /// Every event dispatched at the control so far, in order.
    pub fn control_events(&self) -> Vec<ControlEvent> {
        self.state.borrow().control_events.clone()
    }

    /// Full cookie entries including scope, for asserting on domain copies.
    pub fn cookie_entries(&self) -> Vec<String> {
        self.state
            .borrow()
            .cookies
            .iter()
            .map(|entry| {
                let mut s = format!("{}={}; path={}", entry.name, entry.value, entry.path);
                if let Some(domain) = &entry.domain {
                    s.push_str("; domain=");
                    s.push_str(domain);
                }
                s
            })
            .collect()
    }
}

/// Split a cookie assignment string into its (name, value) pair and its
/// lowercased attribute list.
fn parse_cookie_assignment(cookie: &str) -> Option<(CookieEntry, bool)> {
    let mut segments = cookie.split(';').map(str::trim);

    let first = segments.next()?;
    let (name, value) = first.split_once('=')?;
    if name.is_empty() {
        return None;
    }

    let mut path = "/".to_string();
    let mut domain = None;
    let mut expired = false;

    for segment in segments {
        let (key, val) = match segment.split_once('=') {
            Some((key, val)) => (key.trim().to_ascii_lowercase(), val.trim()),
            None => (segment.to_ascii_lowercase(), ""),
        };
        match key.as_str() {
            "path" => path = val.to_string(),
            "domain" => domain = Some(val.to_string()),
            // The subsystem only ever writes past expiries, so an explicit
            // expires attribute always means deletion here.
            "expires" => expired = true,
            _ => {}
        }
    }

    Some((
        CookieEntry {
            name: name.to_string(),
            value: value.to_string(),
            domain,
            path,
        },
        expired,
    ))
}

impl Page for MemoryPage {
    fn storage_get(&self, key: &str) -> Option<String> {
        self.state.borrow().storage.get(key).cloned()
    }

    fn storage_set(&self, key: &str, value: &str) {
        self.state
            .borrow_mut()
            .storage
            .insert(key.to_string(), value.to_string());
    }

    fn cookies(&self) -> String {
        self.state
            .borrow()
            .cookies
            .iter()
            .map(|entry| format!("{}={}", entry.name, entry.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn set_cookie(&self, cookie: &str) {
        let Some((entry, expired)) = parse_cookie_assignment(cookie) else {
            return;
        };
        let mut state = self.state.borrow_mut();
        let same_scope = |existing: &CookieEntry| {
            existing.name == entry.name
                && existing.domain == entry.domain
                && existing.path == entry.path
        };
        state.cookies.retain(|existing| !same_scope(existing));
        if !expired {
            state.cookies.push(entry);
        }
    }

    fn hostname(&self) -> String {
        self.state.borrow().hostname.clone()
    }

    fn reload(&self) {
        let mut state = self.state.borrow_mut();
        state.reloads += 1;
        // A navigation destroys the page context: scaffolding and control
        // are gone, storage and cookies survive.
        state.elements.clear();
        state.script_src = None;
        state.init_callbacks.clear();
        state.on_script_error = None;
        state.control = None;
    }

    fn element_exists(&self, id: &str) -> bool {
        self.state.borrow().elements.contains(id)
    }

    fn mount_hidden_container(&self, id: &str) -> Result<(), PageError> {
        self.state.borrow_mut().elements.insert(id.to_string());
        Ok(())
    }

    fn expose_init_callback(
        &self,
        name: &str,
        callback: Box<dyn FnOnce()>,
    ) -> Result<(), PageError> {
        self.state
            .borrow_mut()
            .init_callbacks
            .insert(name.to_string(), callback);
        Ok(())
    }

    fn inject_script(
        &self,
        id: &str,
        src: &str,
        on_error: Box<dyn FnOnce()>,
    ) -> Result<(), PageError> {
        let fail_now = {
            let mut state = self.state.borrow_mut();
            state.script_injections += 1;
            // The element lands in the page even when the load later fails.
            state.elements.insert(id.to_string());
            state.script_src = Some(src.to_string());
            if state.fail_script_load {
                state.fail_script_load = false;
                Some(on_error)
            } else {
                state.on_script_error = Some(on_error);
                None
            }
        };
        if let Some(on_error) = fail_now {
            on_error();
        }
        Ok(())
    }

    fn install_widget(&self, _settings: &WidgetSettings) -> Result<(), PageError> {
        let mut state = self.state.borrow_mut();
        state.widget_installs += 1;
        if state.fail_widget_install {
            state.fail_widget_install = false;
            return Err(PageError::WidgetBootstrap(
                "simulated bootstrap failure".to_string(),
            ));
        }
        // The real widget renders its control asynchronously; tests decide
        // when (and whether) that happens via `render_control`.
        Ok(())
    }

    fn control_value(&self) -> Option<String> {
        self.state.borrow().control.clone()
    }

    fn set_control_value(&self, value: &str) {
        let mut state = self.state.borrow_mut();
        if state.control.is_some() {
            state.control = Some(value.to_string());
        }
    }

    fn dispatch_control_event(&self, event: ControlEvent) {
        self.state.borrow_mut().control_events.push(event);
    }
}
