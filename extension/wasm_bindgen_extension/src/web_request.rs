use wasm_bindgen::prelude::*;

use crate::Event;

#[wasm_bindgen]
extern "C" {
    #[derive(Debug)]
    pub type WebRequest;

    #[wasm_bindgen(method, getter, js_name = onAuthRequired)]
    pub fn on_auth_required(this: &WebRequest) -> Event;
}
