//! Rust bindings for the callback-style `chrome` namespace that is available to extensions.
//!
//! Every method that takes a completion callback is imported with `catch`, so a synchronous
//! throw from the host surfaces as `Err(JsValue)` instead of unwinding through wasm.

use js_sys::Function;
use wasm_bindgen::prelude::*;

pub mod browser_action;
pub mod context_menus;
pub mod notifications;
pub mod proxy;
pub mod runtime;
pub mod storage;
pub mod tabs;
pub mod web_request;

pub use browser_action::BrowserAction;
pub use context_menus::ContextMenus;
pub use notifications::Notifications;
pub use proxy::{ChromeSetting, Proxy};
pub use runtime::{LastError, Runtime};
pub use storage::{Storage, StorageArea};
pub use tabs::Tabs;
pub use web_request::WebRequest;

#[wasm_bindgen]
extern "C" {
    #[derive(Debug)]
    pub type Chrome;

    pub static chrome: Chrome;

    #[wasm_bindgen(method, getter)]
    pub fn runtime(this: &Chrome) -> Runtime;

    #[wasm_bindgen(method, getter)]
    pub fn tabs(this: &Chrome) -> Tabs;

    #[wasm_bindgen(method, getter)]
    pub fn storage(this: &Chrome) -> Storage;

    #[wasm_bindgen(method, getter)]
    pub fn notifications(this: &Chrome) -> Notifications;

    #[wasm_bindgen(method, getter, js_name = contextMenus)]
    pub fn context_menus(this: &Chrome) -> ContextMenus;

    #[wasm_bindgen(method, getter, js_name = browserAction)]
    pub fn browser_action(this: &Chrome) -> BrowserAction;

    #[wasm_bindgen(method, getter)]
    pub fn proxy(this: &Chrome) -> Proxy;

    #[wasm_bindgen(method, getter, js_name = webRequest)]
    pub fn web_request(this: &Chrome) -> WebRequest;
}

#[wasm_bindgen]
extern "C" {
    #[derive(Debug, Clone)]
    pub type Event;

    #[wasm_bindgen(method, catch, js_name = addListener)]
    pub fn add_listener(this: &Event, closure: &Function) -> Result<(), JsValue>;

    /// `addListener` for events that take a filter and extra info, like `webRequest.onAuthRequired`.
    #[wasm_bindgen(method, catch, js_name = addListener)]
    pub fn add_listener_with_filter(
        this: &Event,
        closure: &Function,
        filter: &JsValue,
        extra_info_spec: &JsValue,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = removeListener)]
    pub fn remove_listener(this: &Event, closure: &Function);
}
