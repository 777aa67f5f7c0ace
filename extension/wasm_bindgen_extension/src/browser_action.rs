use js_sys::Function;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[derive(Debug)]
    pub type BrowserAction;

    #[wasm_bindgen(method, catch, js_name = setBadgeText)]
    pub fn set_badge_text(
        this: &BrowserAction,
        details: &JsValue,
        callback: &Function,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setBadgeBackgroundColor)]
    pub fn set_badge_background_color(
        this: &BrowserAction,
        details: &JsValue,
        callback: &Function,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setTitle)]
    pub fn set_title(
        this: &BrowserAction,
        details: &JsValue,
        callback: &Function,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setIcon)]
    pub fn set_icon(
        this: &BrowserAction,
        details: &JsValue,
        callback: &Function,
    ) -> Result<(), JsValue>;
}
