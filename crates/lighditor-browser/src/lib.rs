//! Browser DOM layer for lighditor.
//!
//! Implements the core's rendering-tree traits over a `contenteditable`
//! element and wires browser events into the controller. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom`: `DomSurface`, the DOM adapter (UTF-16 offsets, `<br>` markers)
//! - `events`: keyboard event parsing
//! - `platform`: selection/range capability detection
//! - `contenteditable`: mounting, listeners and teardown
//!
//! # Re-exports
//!
//! This crate re-exports `lighditor-core` for convenience, so consumers
//! only need to depend on `lighditor-browser`.

// Re-export core crate
pub use lighditor_core;
pub use lighditor_core::*;

pub mod contenteditable;
pub mod dom;
pub mod events;
pub mod platform;

pub use contenteditable::BrowserEditor;
pub use dom::DomSurface;
pub use events::{key_from_event, parse_key};
pub use platform::capabilities;
