use js_sys::Function;
use wasm_bindgen::prelude::*;

use crate::Event;

#[wasm_bindgen]
extern "C" {
    #[derive(Debug)]
    pub type Runtime;

    /// Only meaningful while a completion callback is running.
    #[wasm_bindgen(method, getter, js_name = lastError)]
    pub fn last_error(this: &Runtime) -> Option<LastError>;

    #[wasm_bindgen(method, getter, js_name = onMessage)]
    pub fn on_message(this: &Runtime) -> Event;

    #[wasm_bindgen(method, catch, js_name = sendMessage)]
    pub fn send_message(
        this: &Runtime,
        message: &JsValue,
        callback: &Function,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = openOptionsPage)]
    pub fn open_options_page(this: &Runtime, callback: &Function) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = getBackgroundPage)]
    pub fn get_background_page(this: &Runtime, callback: &Function) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = getManifest)]
    pub fn get_manifest(this: &Runtime) -> JsValue;
}

#[wasm_bindgen]
extern "C" {
    #[derive(Debug)]
    pub type LastError;

    #[wasm_bindgen(method, getter)]
    pub fn message(this: &LastError) -> Option<String>;
}
