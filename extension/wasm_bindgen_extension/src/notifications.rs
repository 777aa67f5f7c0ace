use js_sys::Function;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[derive(Debug)]
    pub type Notifications;

    /// An `id` of `None` lets the browser generate one.
    #[wasm_bindgen(method, catch)]
    pub fn create(
        this: &Notifications,
        id: Option<&str>,
        options: &JsValue,
        callback: &Function,
    ) -> Result<(), JsValue>;
}
