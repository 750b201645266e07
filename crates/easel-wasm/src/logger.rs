//! Browser console logging through `wasm-logger`.

use log::{Level, LevelFilter};
use std::sync::Once;

static INSTALL: Once = Once::new();

/// Install the console logger on first use. Later calls only adjust the level.
pub fn init(level: LevelFilter) {
    INSTALL.call_once(|| {
        let initial = level.to_level().unwrap_or(Level::Error);
        wasm_logger::init(wasm_logger::Config::new(initial));
    });
    log::set_max_level(level);
}
