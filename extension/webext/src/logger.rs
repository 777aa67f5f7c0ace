use conquer_once::Lazy;

use crate::constants::LOG_LEVEL;

static LOGGER: Lazy<()> = Lazy::new(|| wasm_logger::init(wasm_logger::Config::new(LOG_LEVEL)));

/// Installs the console logger. Only the first call has an effect.
pub fn try_init() {
    let () = *LOGGER;
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn initializing_twice_keeps_the_first_logger() {
        try_init();
        try_init();

        assert_eq!(log::max_level(), LOG_LEVEL.to_level_filter());
    }
}
