//! Future-returning wrappers around the callback-style extension APIs of the browser.
//!
//! Every wrapper hands the host a [`host::Completion`] and resolves with whatever the host
//! reports through it. Host events are exposed as [`observable::Observable`]s.

use wasm_bindgen::prelude::*;

pub mod browser_action;
pub mod callback;
pub mod chrome;
pub mod context_menu;
mod error;
pub mod host;
mod logger;
pub mod message;
pub mod notify;
pub mod observable;
pub mod pages;
pub mod proxy;
pub mod storage;
pub mod tabs;
pub mod web_request;

#[cfg(test)]
mod testing;

pub use crate::{
    chrome::{ChromeHost, WasmSpawner},
    error::{Error, Result},
};

pub mod constants {
    include!(concat!(env!("OUT_DIR"), "/", "constants.rs"));
}

#[wasm_bindgen]
pub fn initialize() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logger::try_init();

    log::info!("Extension bindings initialized");
}
