use js_sys::Function;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[derive(Debug)]
    pub type ContextMenus;

    #[wasm_bindgen(method, catch)]
    pub fn create(
        this: &ContextMenus,
        properties: &JsValue,
        callback: &Function,
    ) -> Result<JsValue, JsValue>;
}
