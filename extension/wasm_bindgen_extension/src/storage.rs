use js_sys::Function;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[derive(Debug)]
    pub type Storage;

    #[wasm_bindgen(method, getter)]
    pub fn local(this: &Storage) -> StorageArea;

    #[wasm_bindgen(method, getter)]
    pub fn sync(this: &Storage) -> StorageArea;
}

#[wasm_bindgen]
extern "C" {
    #[derive(Debug)]
    pub type StorageArea;

    /// `keys` is `null` to fetch every item in the area.
    #[wasm_bindgen(method, catch)]
    pub fn get(this: &StorageArea, keys: &JsValue, callback: &Function) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn set(this: &StorageArea, items: &JsValue, callback: &Function) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn remove(this: &StorageArea, keys: &JsValue, callback: &Function)
        -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn clear(this: &StorageArea, callback: &Function) -> Result<(), JsValue>;
}
