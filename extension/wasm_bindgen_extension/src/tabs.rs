use js_sys::Function;
use wasm_bindgen::{prelude::*, JsValue};

#[wasm_bindgen]
extern "C" {
    #[derive(Debug)]
    pub type Tabs;

    #[wasm_bindgen(method, catch)]
    pub fn create(this: &Tabs, properties: &JsValue, callback: &Function) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn get(this: &Tabs, tab_id: i32, callback: &Function) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn query(this: &Tabs, info: &JsValue, callback: &Function) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn update(
        this: &Tabs,
        tab_id: i32,
        properties: &JsValue,
        callback: &Function,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn remove(this: &Tabs, tab_id: i32, callback: &Function) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = executeScript)]
    pub fn execute_script(
        this: &Tabs,
        tab_id: Option<i32>,
        details: &JsValue,
        callback: &Function,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = sendMessage)]
    pub fn send_message(
        this: &Tabs,
        tab_id: i32,
        message: &JsValue,
        callback: &Function,
    ) -> Result<(), JsValue>;
}
