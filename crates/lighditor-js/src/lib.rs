//! WASM bindings for lighditor.
//!
//! Exposes the `Lighditor` class to JavaScript. Positions and selections
//! cross the boundary as plain `{ row, column }` / `{ start, end }` objects.

mod editor;

pub use editor::*;

use wasm_bindgen::prelude::*;

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        use tracing::Level;
        use tracing::subscriber::set_global_default;
        use tracing_subscriber::Registry;
        use tracing_subscriber::layer::SubscriberExt;

        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::WARN
        };

        let wasm_layer = tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(console_level)
                .build(),
        );

        // The host page may already have installed one.
        let _ = set_global_default(Registry::default().with(wasm_layer));
    }
}
