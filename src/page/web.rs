//! Browser `Page` implementation over web-sys.
//!
//! Thin by intent: no decisions are made here, only DOM plumbing. Every
//! accessor degrades to `None`/no-op when the environment is missing a
//! piece, mirroring how the page behaves when the third party misbehaves.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlDocument, HtmlElement, HtmlScriptElement, HtmlSelectElement};

use tracing::warn;

use super::{ControlEvent, Page, PageError, WidgetSettings};
use crate::config::CONTROL_SELECTOR;

/// Handle to the real browser page. Carries no state of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebPage;

impl WebPage {
    pub fn new() -> Self {
        WebPage
    }
}

fn document() -> Option<Document> {
    web_sys::window().and_then(|window| window.document())
}

fn html_document() -> Option<HtmlDocument> {
    document().and_then(|doc| doc.dyn_into::<HtmlDocument>().ok())
}

fn control() -> Option<HtmlSelectElement> {
    document()
        .and_then(|doc| doc.query_selector(CONTROL_SELECTOR).ok().flatten())
        .and_then(|element| element.dyn_into::<HtmlSelectElement>().ok())
}

fn describe(error: &JsValue) -> String {
    error
        .as_string()
        .unwrap_or_else(|| format!("{:?}", error))
}

fn set_option(target: &js_sys::Object, key: &str, value: &JsValue) -> Result<(), PageError> {
    js_sys::Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| PageError::WidgetBootstrap(describe(&e)))
}

impl Page for WebPage {
    fn storage_get(&self, key: &str) -> Option<String> {
        web_sys::window()?
            .local_storage()
            .ok()
            .flatten()?
            .get_item(key)
            .ok()
            .flatten()
    }

    fn storage_set(&self, key: &str, value: &str) {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        match storage {
            Some(storage) => {
                if storage.set_item(key, value).is_err() {
                    warn!("localStorage write failed for key '{}'", key);
                }
            }
            None => warn!("localStorage unavailable, dropping write for key '{}'", key),
        }
    }

    fn cookies(&self) -> String {
        html_document()
            .and_then(|doc| doc.cookie().ok())
            .unwrap_or_default()
    }

    fn set_cookie(&self, cookie: &str) {
        match html_document() {
            Some(doc) => {
                if doc.set_cookie(cookie).is_err() {
                    warn!("cookie assignment rejected");
                }
            }
            None => warn!("document unavailable, dropping cookie assignment"),
        }
    }

    fn hostname(&self) -> String {
        web_sys::window()
            .and_then(|window| window.location().hostname().ok())
            .unwrap_or_default()
    }

    fn reload(&self) {
        if let Some(window) = web_sys::window() {
            if window.location().reload().is_err() {
                warn!("page reload was rejected");
            }
        }
    }

    fn element_exists(&self, id: &str) -> bool {
        document()
            .and_then(|doc| doc.get_element_by_id(id))
            .is_some()
    }

    fn mount_hidden_container(&self, id: &str) -> Result<(), PageError> {
        let document =
            document().ok_or_else(|| PageError::ContainerMount("document unavailable".into()))?;
        if document.get_element_by_id(id).is_some() {
            return Ok(());
        }

        let container = document
            .create_element("div")
            .map_err(|e| PageError::ContainerMount(describe(&e)))?;
        container.set_id(id);

        // Parked off-screen rather than display:none, which would keep the
        // widget from initializing.
        if let Some(element) = container.dyn_ref::<HtmlElement>() {
            let style = element.style();
            let _ = style.set_property("position", "absolute");
            let _ = style.set_property("top", "-9999px");
            let _ = style.set_property("left", "-9999px");
        }

        let body = document
            .body()
            .ok_or_else(|| PageError::ContainerMount("document has no body".into()))?;
        body.append_child(&container)
            .map_err(|e| PageError::ContainerMount(describe(&e)))?;
        Ok(())
    }

    fn expose_init_callback(
        &self,
        name: &str,
        callback: Box<dyn FnOnce()>,
    ) -> Result<(), PageError> {
        let window = web_sys::window()
            .ok_or_else(|| PageError::CallbackRegistration("window unavailable".into()))?;
        let closure = Closure::once_into_js(callback);
        js_sys::Reflect::set(&window, &JsValue::from_str(name), &closure)
            .map(|_| ())
            .map_err(|e| PageError::CallbackRegistration(describe(&e)))
    }

    fn inject_script(
        &self,
        id: &str,
        src: &str,
        on_error: Box<dyn FnOnce()>,
    ) -> Result<(), PageError> {
        let document =
            document().ok_or_else(|| PageError::ScriptInjection("document unavailable".into()))?;

        let script: HtmlScriptElement = document
            .create_element("script")
            .map_err(|e| PageError::ScriptInjection(describe(&e)))?
            .dyn_into()
            .map_err(|_| PageError::ScriptInjection("script element cast failed".into()))?;
        script.set_id(id);
        script.set_src(src);
        script
            .set_attribute("async", "")
            .map_err(|e| PageError::ScriptInjection(describe(&e)))?;

        let on_error = Closure::once_into_js(on_error);
        script.set_onerror(Some(on_error.unchecked_ref()));

        let body = document
            .body()
            .ok_or_else(|| PageError::ScriptInjection("document has no body".into()))?;
        body.append_child(&script)
            .map_err(|e| PageError::ScriptInjection(describe(&e)))?;
        Ok(())
    }

    fn install_widget(&self, settings: &WidgetSettings) -> Result<(), PageError> {
        let window = web_sys::window()
            .ok_or_else(|| PageError::WidgetBootstrap("window unavailable".into()))?;

        // google.translate.TranslateElement is only present once the widget
        // script has run; any missing link in the chain surfaces as an Err.
        let google = js_sys::Reflect::get(&window, &JsValue::from_str("google"))
            .map_err(|e| PageError::WidgetBootstrap(describe(&e)))?;
        let translate = js_sys::Reflect::get(&google, &JsValue::from_str("translate"))
            .map_err(|e| PageError::WidgetBootstrap(describe(&e)))?;
        let constructor: js_sys::Function =
            js_sys::Reflect::get(&translate, &JsValue::from_str("TranslateElement"))
                .map_err(|e| PageError::WidgetBootstrap(describe(&e)))?
                .dyn_into()
                .map_err(|_| {
                    PageError::WidgetBootstrap("TranslateElement constructor missing".into())
                })?;

        let layouts = js_sys::Reflect::get(&constructor, &JsValue::from_str("InlineLayout"))
            .map_err(|e| PageError::WidgetBootstrap(describe(&e)))?;
        let simple_layout = js_sys::Reflect::get(&layouts, &JsValue::from_str("SIMPLE"))
            .map_err(|e| PageError::WidgetBootstrap(describe(&e)))?;

        let options = js_sys::Object::new();
        set_option(
            &options,
            "pageLanguage",
            &JsValue::from_str(settings.page_language),
        )?;
        set_option(
            &options,
            "includedLanguages",
            &JsValue::from_str(&settings.included_languages),
        )?;
        set_option(&options, "layout", &simple_layout)?;
        set_option(&options, "autoDisplay", &JsValue::FALSE)?;

        let args = js_sys::Array::of2(&options, &JsValue::from_str(settings.container_id));
        js_sys::Reflect::construct(&constructor, &args)
            .map(|_| ())
            .map_err(|e| PageError::WidgetBootstrap(describe(&e)))
    }

    fn control_value(&self) -> Option<String> {
        control().map(|select| select.value())
    }

    fn set_control_value(&self, value: &str) {
        if let Some(select) = control() {
            select.set_value(value);
        }
    }

    fn dispatch_control_event(&self, event: ControlEvent) {
        let Some(select) = control() else {
            return;
        };

        let synthetic: Option<web_sys::Event> = match event {
            ControlEvent::Change => web_sys::Event::new("change").ok(),
            ControlEvent::CommitKey => {
                let init = web_sys::KeyboardEventInit::new();
                init.set_key("Enter");
                init.set_bubbles(true);
                web_sys::KeyboardEvent::new_with_keyboard_event_init_dict("keyup", &init)
                    .ok()
                    .map(Into::into)
            }
        };

        match synthetic {
            Some(synthetic) => {
                if select.dispatch_event(&synthetic).is_err() {
                    warn!("control event dispatch failed: {:?}", event);
                }
            }
            None => warn!("could not build control event: {:?}", event),
        }
    }
}
