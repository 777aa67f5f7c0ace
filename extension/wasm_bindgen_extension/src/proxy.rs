use js_sys::Function;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[derive(Debug)]
    pub type Proxy;

    #[wasm_bindgen(method, getter)]
    pub fn settings(this: &Proxy) -> ChromeSetting;
}

#[wasm_bindgen]
extern "C" {
    #[derive(Debug)]
    pub type ChromeSetting;

    #[wasm_bindgen(method, catch)]
    pub fn get(this: &ChromeSetting, details: &JsValue, callback: &Function)
        -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn set(this: &ChromeSetting, details: &JsValue, callback: &Function)
        -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn clear(
        this: &ChromeSetting,
        details: &JsValue,
        callback: &Function,
    ) -> Result<(), JsValue>;
}
